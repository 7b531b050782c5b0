//! # Feedback Report Module
//!
//! This module defines the validated report produced by the pipeline and the response
//! envelope handed to presentation code.
//!
//! ## Overview
//!
//! The main types are:
//! - [`FeedbackReport`]: the fully validated model output — overall comment, per-criterion
//!   scores, next steps, and the /20 total.
//! - [`FeedbackReportResponse`]: a response envelope that wraps a [`FeedbackReport`] with
//!   success and message fields for presentation layers.
//!
//! ## JSON Output Example
//!
//! When serialized, the response will look like:
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Feedback generated.",
//!   "data": {
//!     "overall_comment": "...",
//!     "criteria": [
//!       { "id": "planning", "score": 4, "out_of": 5, "feedback": "..." },
//!       ...
//!     ],
//!     "next_steps": ["...", "..."],
//!     "total_score": 16
//!   }
//! }
//! ```
//!
//! A report only ever exists fully validated; there is no partially populated form.

use serde::{Deserialize, Serialize};

/// The fixed report scale: totals are always out of 20.
pub const REPORT_SCALE: u32 = 20;

/// One criterion's validated score and feedback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriterionScore {
    /// Criterion id; always one of the active rubric's ids.
    pub id: String,
    /// Awarded score; `0 <= score <= out_of`.
    pub score: u32,
    /// Maximum for this criterion; positive.
    pub out_of: u32,
    /// Feedback addressed to the student.
    pub feedback: String,
}

/// The validated, structured result of scoring a submission against a rubric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackReport {
    pub overall_comment: String,
    pub criteria: Vec<CriterionScore>,
    pub next_steps: Vec<String>,
    /// Total in `0..=REPORT_SCALE`.
    pub total_score: u32,
}

/// The response envelope for presentation layers.
#[derive(Debug, Serialize)]
pub struct FeedbackReportResponse {
    /// Indicates generation was successful.
    success: bool,
    /// A human-readable message for the client.
    message: String,
    /// The validated report.
    data: FeedbackReport,
}

impl From<FeedbackReport> for FeedbackReportResponse {
    fn from(report: FeedbackReport) -> Self {
        FeedbackReportResponse {
            success: true,
            message: "Feedback generated.".to_string(),
            data: report,
        }
    }
}
