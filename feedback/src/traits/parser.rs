//! Parser Trait
//!
//! This module defines the [`Parser`] trait, which provides a generic interface for
//! validating raw data into strongly-typed Rust structures against the active rubric.
//! Implementations are responsible for checking the input and converting it into the
//! appropriate domain model, returning a typed error on any violation.
//!
//! # Usage
//!
//! Implement this trait for any parser that converts an input type into a specific
//! output type.
//!
//! # Example
//!
//! ```rust
//! use feedback::error::FeedbackError;
//! use feedback::traits::parser::Parser;
//! use util::rubric_store::Rubric;
//!
//! struct MyParser;
//! struct MyReport;
//!
//! impl Parser<&str, MyReport> for MyParser {
//!     fn parse(&self, _raw: &str, _rubric: &Rubric) -> Result<MyReport, FeedbackError> {
//!         // Dummy implementation
//!         Ok(MyReport)
//!     }
//! }
//! ```

use crate::error::FeedbackError;
use util::rubric_store::Rubric;

/// A generic trait for validating data into a strongly-typed Rust structure.
///
/// Implementors should check the input against the active rubric and return a
/// domain-specific type or a [`FeedbackError`] on failure.
///
/// # Type Parameters
///
/// * `Input` - The input type to be validated.
/// * `Output` - The output type produced by the parser.
pub trait Parser<Input, Output> {
    /// Parse an input value into the target type.
    ///
    /// # Arguments
    ///
    /// * `input` - The input value to parse.
    /// * `rubric` - The active rubric the output must conform to.
    ///
    /// # Errors
    ///
    /// Returns a [`FeedbackError`] if the input does not conform to the expected
    /// schema or cannot be parsed.
    fn parse(&self, input: Input, rubric: &Rubric) -> Result<Output, FeedbackError>;
}
