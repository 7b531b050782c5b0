//! # Gateways Module
//!
//! This module provides implementations of the [`crate::traits::gateway::ModelGateway`]
//! trait. Each gateway speaks to one completion provider; the pipeline is indifferent
//! to which one is plugged in.
//!
//! ## Available Gateways
//!
//! - [`gemini_gateway`]: Sends requests to Google's Gemini API.

pub mod gemini_gateway;
