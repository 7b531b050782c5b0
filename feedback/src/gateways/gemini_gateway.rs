//! # Gemini Gateway
//!
//! This module provides an implementation of the [`ModelGateway`] trait backed by
//! Google's Gemini API. It sends the compiled instruction and payload to the
//! `generateContent` endpoint and returns the raw completion text for validation
//! downstream.
//!
//! ## Overview
//!
//! - The [`GeminiGateway`] struct implements the [`ModelGateway`] trait asynchronously.
//! - The instruction block travels as the system instruction; the payload is the sole
//!   user content part.
//! - Generation runs with a low temperature and a JSON response MIME type so the
//!   completion stays parseable, and with thinking disabled for faster requests.
//! - One attempt per call; transport failures, non-success statuses, and empty
//!   candidates surface as [`FeedbackError::UpstreamError`].
//!
//! ## Environment
//!
//! - Requires the `GEMINI_API_KEY` environment variable (via [`AppConfig`]) for
//!   authenticating with the Gemini API; `GEMINI_MODEL` selects the model.

use crate::error::FeedbackError;
use crate::traits::gateway::ModelGateway;
use crate::types::ModelRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use util::config::AppConfig;

/// Request body for the Gemini API.
#[derive(Serialize)]
struct GeminiRequest {
    /// The content to send to the LLM.
    contents: Vec<Content>,
    /// The fixed behavior contract, kept separate from user content.
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    /// Optional generation configuration for the LLM.
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Content wrapper for the Gemini API request.
#[derive(Serialize)]
struct Content {
    /// The parts of the message (e.g., prompt text).
    parts: Vec<Part>,
}

/// A single part of the content, typically a text prompt.
#[derive(Serialize)]
struct Part {
    /// The text content to send to the LLM.
    text: String,
}

/// Optional configuration for the LLM generation process.
#[derive(Serialize)]
struct GenerationConfig {
    /// Sampling temperature; low for consistent scoring.
    temperature: f32,
    /// MIME type the completion must conform to.
    response_mime_type: String,
    /// Configuration for the LLM's thinking process.
    thinking_config: ThinkingConfig,
}

/// Configuration for the LLM's thinking process.
#[derive(Serialize)]
struct ThinkingConfig {
    /// The thinking budget for the LLM (set to 0 to disable thinking for faster requests).
    thinking_budget: u32,
}

/// Response from the Gemini API.
#[derive(Deserialize)]
struct GeminiResponse {
    /// List of candidate completions from the LLM.
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// A single candidate response from the Gemini API.
#[derive(Deserialize)]
struct Candidate {
    /// The content of the candidate response.
    content: ContentResponse,
}

/// Content of a candidate response.
#[derive(Deserialize)]
struct ContentResponse {
    /// The parts of the response (e.g., generated text).
    #[serde(default)]
    parts: Vec<PartResponse>,
}

/// A single part of the response content.
#[derive(Deserialize)]
struct PartResponse {
    /// The generated text from the LLM.
    text: String,
}

const GENERATION_TEMPERATURE: f32 = 0.2;

/// Gateway to Google's Gemini completion API.
pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiGateway {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Builds a gateway from `.env`/environment configuration.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let cfg = AppConfig::global();
        Self::new(cfg.gemini_api_key.clone(), cfg.gemini_model.clone())
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        )
    }

    fn build_body(request: &ModelRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.payload.clone(),
                }],
            }],
            system_instruction: Some(Content {
                parts: vec![Part {
                    text: request.instruction.clone(),
                }],
            }),
            generation_config: Some(GenerationConfig {
                temperature: GENERATION_TEMPERATURE,
                response_mime_type: "application/json".to_string(),
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            }),
        }
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    /// Sends one completion request and returns the raw response text.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::UpstreamError`] on transport failure, a non-success
    /// status, an undecodable provider envelope, or an empty completion.
    async fn complete(&self, request: &ModelRequest) -> Result<String, FeedbackError> {
        if self.api_key.is_empty() {
            return Err(FeedbackError::UpstreamError(
                "GEMINI_API_KEY is not configured".to_string(),
            ));
        }

        let body = Self::build_body(request);
        debug!(model = %self.model, payload_len = request.payload.len(), "sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                FeedbackError::UpstreamError(format!("Request to model provider failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(%status, "model provider returned an error");
            return Err(FeedbackError::UpstreamError(format!(
                "Model provider returned {status}: {detail}"
            )));
        }

        let response_text = response.text().await.map_err(|e| {
            FeedbackError::UpstreamError(format!("Failed to read response body: {e}"))
        })?;
        let parsed = serde_json::from_str::<GeminiResponse>(&response_text).map_err(|e| {
            FeedbackError::UpstreamError(format!(
                "error decoding response body: {}. Full response: {}",
                e, response_text
            ))
        })?;

        let text = parsed
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.clone())
            .ok_or_else(|| {
                FeedbackError::UpstreamError("Model returned no completion content".to_string())
            })?;

        if text.trim().is_empty() {
            return Err(FeedbackError::UpstreamError(
                "Model returned an empty completion".to_string(),
            ));
        }

        Ok(text)
    }
}
