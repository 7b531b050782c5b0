//! Model Response Parser
//!
//! This module provides the [`ResponseParser`] for validating the model's raw completion
//! text into a strongly-typed [`FeedbackReport`]. The parser checks the expected JSON
//! schema field by field and provides a specific error for every violation.
//!
//! # JSON Schema
//!
//! The expected JSON structure is as follows:
//!
//! ```json
//! {
//!   "overall_comment": "<string>",
//!   "criteria": [
//!     {
//!       "id": "<rubric criterion id>",
//!       "score": <u32>,
//!       "out_of": <u32>,
//!       "feedback": "<string>"
//!     },
//!     ...
//!   ],
//!   "next_steps": ["<string>", ...],
//!   "total_score": <u32>
//! }
//! ```
//!
//! - Every `id` must belong to the active rubric.
//! - `score` and `out_of` must be integers with `0 <= score <= out_of` and `out_of >= 1`.
//! - `total_score` must be an integer in `0..=20`.
//! - `next_steps` beyond the requested count are truncated; fewer are accepted as-is.
//!
//! # Error Handling
//!
//! Unparseable text is a [`FeedbackError::MalformedResponse`]; missing or mistyped
//! fields and unknown criterion ids are [`FeedbackError::SchemaViolation`]s naming the
//! offending field; numeric contract breaches are [`FeedbackError::ScoreRange`]s naming
//! the criterion id and values. Validation is total: every failure path yields one of
//! these, and a hard failure aborts with no partial report.
//!
//! # Tests
//!
//! This module includes tests for valid and invalid responses, covering edge cases and
//! error reporting.

use crate::error::FeedbackError;
use crate::report::{CriterionScore, FeedbackReport, REPORT_SCALE};
use crate::traits::parser::Parser;
use serde_json::Value;
use tracing::warn;
use util::rubric_store::Rubric;

/// Parser for raw model completions.
///
/// Input is `(raw_text, next_steps_count)`: the gateway's raw completion plus the
/// caller-requested next-step bound used for advisory truncation.
pub struct ResponseParser;

/// Extracts a field that must be a non-negative integer fitting the report's
/// numeric range. Missing fields are the caller's concern; this only judges type.
fn integer_field(value: &Value, criterion_id: &str, field: &str) -> Result<u32, FeedbackError> {
    match value {
        Value::Number(n) if n.is_u64() => {
            u32::try_from(n.as_u64().unwrap()).map_err(|_| {
                FeedbackError::ScoreRange(format!(
                    "Criterion '{criterion_id}' has '{field}' value {n} beyond the supported range"
                ))
            })
        }
        other => Err(FeedbackError::ScoreRange(format!(
            "Criterion '{criterion_id}' has non-integer '{field}' value {other}"
        ))),
    }
}

impl<'a> Parser<(&'a str, usize), FeedbackReport> for ResponseParser {
    /// Validates raw completion text into a [`FeedbackReport`].
    ///
    /// # Errors
    ///
    /// Returns the most specific applicable [`FeedbackError`] if the text does not
    /// conform to the expected schema.
    fn parse(
        &self,
        input: (&'a str, usize),
        rubric: &Rubric,
    ) -> Result<FeedbackReport, FeedbackError> {
        let (raw, next_steps_count) = input;

        let value: Value = serde_json::from_str(raw).map_err(|e| {
            FeedbackError::MalformedResponse(format!("Response is not valid JSON: {e}"))
        })?;

        let obj = value.as_object().ok_or_else(|| {
            FeedbackError::MalformedResponse("Response is not a JSON object".to_string())
        })?;

        let overall_comment = match obj.get("overall_comment") {
            Some(Value::String(s)) => s.clone(),
            _ => {
                return Err(FeedbackError::SchemaViolation(
                    "Missing or invalid 'overall_comment' field".to_string(),
                ));
            }
        };

        let criteria_arr = obj.get("criteria").and_then(Value::as_array).ok_or_else(|| {
            FeedbackError::SchemaViolation("Missing or invalid 'criteria' field".to_string())
        })?;

        let steps_arr = obj.get("next_steps").and_then(Value::as_array).ok_or_else(|| {
            FeedbackError::SchemaViolation("Missing or invalid 'next_steps' field".to_string())
        })?;

        let total_num = match obj.get("total_score") {
            Some(Value::Number(n)) => n.clone(),
            _ => {
                return Err(FeedbackError::SchemaViolation(
                    "Missing or invalid 'total_score' field".to_string(),
                ));
            }
        };

        let mut criteria = Vec::with_capacity(criteria_arr.len());
        for (i, entry) in criteria_arr.iter().enumerate() {
            let entry_obj = entry.as_object().ok_or_else(|| {
                FeedbackError::SchemaViolation(format!(
                    "Criterion entry at index {i} is not an object"
                ))
            })?;

            let id = match entry_obj.get("id") {
                Some(Value::String(s)) => s.clone(),
                _ => {
                    return Err(FeedbackError::SchemaViolation(format!(
                        "Criterion entry at index {i} missing or invalid 'id' field"
                    )));
                }
            };

            if !rubric.has_criterion(&id) {
                return Err(FeedbackError::SchemaViolation(format!(
                    "Criterion id '{id}' is not part of the active rubric"
                )));
            }

            let feedback = match entry_obj.get("feedback") {
                Some(Value::String(s)) => s.clone(),
                _ => {
                    return Err(FeedbackError::SchemaViolation(format!(
                        "Criterion '{id}' missing or invalid 'feedback' field"
                    )));
                }
            };

            let score_val = entry_obj.get("score").ok_or_else(|| {
                FeedbackError::SchemaViolation(format!("Criterion '{id}' missing 'score' field"))
            })?;
            let out_of_val = entry_obj.get("out_of").ok_or_else(|| {
                FeedbackError::SchemaViolation(format!("Criterion '{id}' missing 'out_of' field"))
            })?;

            let score = integer_field(score_val, &id, "score")?;
            let out_of = integer_field(out_of_val, &id, "out_of")?;

            if out_of == 0 {
                return Err(FeedbackError::ScoreRange(format!(
                    "Criterion '{id}' has out_of 0; must be a positive integer"
                )));
            }
            if score > out_of {
                return Err(FeedbackError::ScoreRange(format!(
                    "Criterion '{id}' score {score} exceeds out_of {out_of}"
                )));
            }

            criteria.push(CriterionScore {
                id,
                score,
                out_of,
                feedback,
            });
        }

        let total_score = if total_num.is_u64() {
            total_num.as_u64().unwrap()
        } else {
            return Err(FeedbackError::ScoreRange(format!(
                "'total_score' must be a non-negative integer, got {total_num}"
            )));
        };
        if total_score > u64::from(REPORT_SCALE) {
            return Err(FeedbackError::ScoreRange(format!(
                "'total_score' {total_score} is outside the 0..={REPORT_SCALE} report scale"
            )));
        }

        let mut next_steps = Vec::with_capacity(steps_arr.len());
        for (i, step) in steps_arr.iter().enumerate() {
            match step {
                Value::String(s) => next_steps.push(s.clone()),
                _ => {
                    return Err(FeedbackError::SchemaViolation(format!(
                        "Next step at index {i} is not a string"
                    )));
                }
            }
        }
        // Advisory bound only: the model may judge fewer steps sufficient.
        if next_steps.len() > next_steps_count {
            warn!(
                requested = next_steps_count,
                returned = next_steps.len(),
                "truncating surplus next steps"
            );
            next_steps.truncate(next_steps_count);
        }

        Ok(FeedbackReport {
            overall_comment,
            criteria,
            next_steps,
            total_score: total_score as u32,
        })
    }
}
