//! # Types Module
//!
//! This module defines the core data structures used throughout the feedback pipeline:
//! the per-interaction [`FeedbackRequest`] and the compiled [`ModelRequest`] handed to
//! the model gateway.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lower bound for the requested number of next-step suggestions.
pub const NEXT_STEPS_MIN: u32 = 2;
/// Upper bound for the requested number of next-step suggestions.
pub const NEXT_STEPS_MAX: u32 = 6;

const DEFAULT_NEXT_STEPS: u32 = 3;
const DEFAULT_YEAR_GROUP: &str = "Year 7";

/// Tone the generated feedback should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackTone {
    Supportive,
    ExamPrep,
    Concise,
}

impl FeedbackTone {
    /// Human-readable label rendered into the prompt payload.
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackTone::Supportive => "Supportive & specific",
            FeedbackTone::ExamPrep => "Exam-prep focused",
            FeedbackTone::Concise => "Concise bullets",
        }
    }
}

impl Default for FeedbackTone {
    fn default() -> Self {
        FeedbackTone::Supportive
    }
}

/// A single feedback interaction: one submission scored against one rubric.
///
/// Built fresh per interaction, immutable once built, never persisted. Weight
/// overrides are request-scoped; they die with the request.
#[derive(Debug, Clone)]
pub struct FeedbackRequest {
    pub task_id: String,
    pub submission_text: String,
    pub year_group: String,
    pub tone: FeedbackTone,
    /// Clamped to [`NEXT_STEPS_MIN`]..=[`NEXT_STEPS_MAX`].
    pub next_steps_count: u32,
    pub weight_overrides: HashMap<String, u32>,
}

impl FeedbackRequest {
    pub fn new(task_id: impl Into<String>, submission_text: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            submission_text: submission_text.into(),
            year_group: DEFAULT_YEAR_GROUP.to_string(),
            tone: FeedbackTone::default(),
            next_steps_count: DEFAULT_NEXT_STEPS,
            weight_overrides: HashMap::new(),
        }
    }

    pub fn with_year_group(mut self, year_group: impl Into<String>) -> Self {
        self.year_group = year_group.into();
        self
    }

    pub fn with_tone(mut self, tone: FeedbackTone) -> Self {
        self.tone = tone;
        self
    }

    /// Request a number of next-step suggestions, clamped to the allowed range.
    pub fn with_next_steps(mut self, count: u32) -> Self {
        self.next_steps_count = count.clamp(NEXT_STEPS_MIN, NEXT_STEPS_MAX);
        self
    }

    pub fn with_weight_override(mut self, criterion_id: impl Into<String>, weight: u32) -> Self {
        self.weight_overrides.insert(criterion_id.into(), weight);
        self
    }

    /// Whether the submission carries any text after trimming. Hosts should
    /// reject empty submissions before invoking the pipeline; the prompt
    /// compiler's placeholder is a fallback, not the guard.
    pub fn has_submission(&self) -> bool {
        !self.submission_text.trim().is_empty()
    }
}

/// A compiled model request: a fixed instruction block plus the per-request
/// payload. The gateway maps these onto the provider's role scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub instruction: String,
    pub payload: String,
}
