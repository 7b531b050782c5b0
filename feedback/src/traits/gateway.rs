//!
//! # Model Gateway Trait
//!
//! This module defines the [`ModelGateway`] trait, the single external boundary of the
//! feedback pipeline. A gateway sends a compiled [`ModelRequest`] to a language-model
//! completion service and returns the raw completion text. One attempt, no retry; any
//! transport failure, non-success status, or empty completion surfaces as
//! [`FeedbackError::UpstreamError`].
//!
//! The returned text is only *believed* to be structured data; validating it is the
//! response parser's job, never the gateway's.

use crate::error::FeedbackError;
use crate::types::ModelRequest;
use async_trait::async_trait;

/// The boundary to an external language-model completion service.
///
/// Implementations carry no business logic. Any completion service accepting text
/// instructions and returning text completions satisfies this contract.
#[async_trait]
pub trait ModelGateway {
    async fn complete(&self, request: &ModelRequest) -> Result<String, FeedbackError>;
}
