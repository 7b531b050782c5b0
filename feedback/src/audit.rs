//! Audit record assembly.
//!
//! The pipeline supplies everything an audit trail needs; persisting the record
//! (see `util::audit_log`) belongs to the presentation layer.

use crate::report::FeedbackReport;
use crate::types::FeedbackRequest;
use crate::weights::ResolvedWeights;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One generated report plus the request metadata worth keeping.
///
/// Carries the submission's length, never its text.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub recorded_at: DateTime<Utc>,
    pub task_id: String,
    pub year_group: String,
    /// The weights the report was generated against, post-resolution.
    pub weights: HashMap<String, u32>,
    pub submission_len: usize,
    pub report: FeedbackReport,
}

impl AuditRecord {
    pub fn new(
        request: &FeedbackRequest,
        resolved: &ResolvedWeights,
        report: &FeedbackReport,
    ) -> Self {
        AuditRecord {
            recorded_at: Utc::now(),
            task_id: request.task_id.clone(),
            year_group: request.year_group.clone(),
            weights: resolved.weights.clone(),
            submission_len: request.submission_text.len(),
            report: report.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CriterionScore;

    #[test]
    fn test_record_keeps_length_not_text() {
        let request = FeedbackRequest::new("design_journal", "secret student work");
        let resolved = ResolvedWeights {
            weights: HashMap::from([("planning".to_string(), 5)]),
            total: 5,
        };
        let report = FeedbackReport {
            overall_comment: "Solid".to_string(),
            criteria: vec![CriterionScore {
                id: "planning".to_string(),
                score: 4,
                out_of: 5,
                feedback: "Good plan.".to_string(),
            }],
            next_steps: vec!["Review your timeline".to_string()],
            total_score: 16,
        };

        let record = AuditRecord::new(&request, &resolved, &report);
        assert_eq!(record.submission_len, "secret student work".len());
        assert_eq!(record.task_id, "design_journal");
        assert_eq!(record.weights.get("planning"), Some(&5));

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("secret student work"));
        assert!(json.contains("submission_len"));
        assert!(json.contains("recorded_at"));
    }
}
