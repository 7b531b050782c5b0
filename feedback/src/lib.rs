//! # Feedback Library
//!
//! This crate provides the core logic for rubric-driven feedback generation on student
//! submissions. It resolves rubric weights against caller overrides, deterministically
//! compiles a model request, sends it through a pluggable model gateway, and validates
//! the model's structured response into a trustworthy score report.
//!
//! ## Key Concepts
//! - **FeedbackJob**: The main struct representing one feedback generation for a single submission.
//! - **Gateways**: Pluggable boundaries to language-model completion services (e.g., Gemini).
//! - **Parsers**: Schema validation of raw model output into typed reports.
//! - **Reports**: Structured output with per-criterion scores, next steps, and a /20 total.
//!
//! The pipeline is fail-fast: configuration problems surface before any model call, and
//! a response that breaks the schema or score bounds aborts with a typed error rather
//! than a partial report.

pub mod audit;
pub mod error;
pub mod gateways;
pub mod parsers;
pub mod prompt;
pub mod report;
pub mod traits;
pub mod types;
pub mod weights;

use crate::audit::AuditRecord;
use crate::error::FeedbackError;
use crate::gateways::gemini_gateway::GeminiGateway;
use crate::parsers::response_parser::ResponseParser;
use crate::prompt::compile_prompt;
use crate::report::{FeedbackReport, FeedbackReportResponse};
use crate::traits::gateway::ModelGateway;
use crate::traits::parser::Parser;
use crate::types::FeedbackRequest;
use crate::weights::resolve_weights;

use tracing::debug;
use util::rubric_store::{ExemplarSet, Rubric};

/// The full outcome of one feedback generation: the validated report plus the
/// audit record the presentation layer may persist.
#[derive(Debug)]
pub struct ScoredFeedback {
    pub report: FeedbackReport,
    pub audit: AuditRecord,
}

impl From<ScoredFeedback> for FeedbackReportResponse {
    fn from(scored: ScoredFeedback) -> Self {
        scored.report.into()
    }
}

/// Represents one feedback generation for a single student submission.
///
/// This struct encapsulates the rubric, optional calibration exemplars, the request
/// parameters, and the gateway used to reach the model.
///
/// # Fields
/// - `rubric`: The active rubric the submission is scored against.
/// - `exemplars`: Optional high/mid/low calibration exemplars for the task.
/// - `request`: The per-interaction parameters (submission, tone, overrides).
/// - `gateway`: Boundary to the completion service (defaults to Gemini).
pub struct FeedbackJob<'a> {
    rubric: &'a Rubric,
    exemplars: Option<&'a ExemplarSet>,
    request: FeedbackRequest,
    gateway: Box<dyn ModelGateway + Send + Sync + 'a>,
    exemplar_limit: Option<usize>,
}

impl<'a> FeedbackJob<'a> {
    /// Create a new feedback job for a rubric and request.
    ///
    /// The gateway defaults to [`GeminiGateway`] configured from the environment;
    /// swap it with [`FeedbackJob::with_gateway`].
    pub fn new(rubric: &'a Rubric, request: FeedbackRequest) -> Self {
        Self {
            rubric,
            exemplars: None,
            request,
            gateway: Box::new(GeminiGateway::from_env()),
            exemplar_limit: None,
        }
    }

    /// Attach calibration exemplars for the task.
    pub fn with_exemplars(mut self, exemplars: &'a ExemplarSet) -> Self {
        self.exemplars = Some(exemplars);
        self
    }

    /// Cap each rendered exemplar at `limit` characters.
    pub fn with_exemplar_limit(mut self, limit: usize) -> Self {
        self.exemplar_limit = Some(limit);
        self
    }

    /// Set a custom model gateway for this job.
    pub fn with_gateway<G: ModelGateway + Send + Sync + 'a>(mut self, gateway: G) -> Self {
        self.gateway = Box::new(gateway);
        self
    }

    /// Run the pipeline and produce a validated report.
    ///
    /// # Returns
    /// * `Ok(ScoredFeedback)` on success, containing the report and its audit record.
    /// * `Err(FeedbackError)` if any stage fails.
    ///
    /// # Steps
    /// 1. Resolves rubric weights against the request's overrides (fails fast on
    ///    configuration errors, before any model call).
    /// 2. Compiles the deterministic model request.
    /// 3. Sends it through the gateway (single attempt).
    /// 4. Validates the raw response into a [`FeedbackReport`].
    /// 5. Assembles the audit record.
    pub async fn run(self) -> Result<ScoredFeedback, FeedbackError> {
        let resolved = resolve_weights(self.rubric, &self.request.weight_overrides)?;

        let compiled = compile_prompt(
            self.rubric,
            self.exemplars,
            &resolved,
            &self.request,
            self.exemplar_limit,
        );
        debug!(
            task_id = %self.request.task_id,
            total_weight = resolved.total,
            "compiled model request"
        );

        let raw = self.gateway.complete(&compiled).await?;

        let report = ResponseParser.parse(
            (raw.as_str(), self.request.next_steps_count as usize),
            self.rubric,
        )?;

        let audit = AuditRecord::new(&self.request, &resolved, &report);
        Ok(ScoredFeedback { report, audit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use util::rubric_store::Criterion;

    /// Gateway returning a canned completion.
    struct StubGateway {
        response: String,
    }

    #[async_trait]
    impl ModelGateway for StubGateway {
        async fn complete(&self, _request: &ModelRequest) -> Result<String, FeedbackError> {
            Ok(self.response.clone())
        }
    }

    /// Gateway that must never be reached.
    struct UnreachableGateway;

    #[async_trait]
    impl ModelGateway for UnreachableGateway {
        async fn complete(&self, _request: &ModelRequest) -> Result<String, FeedbackError> {
            panic!("gateway must not be called when configuration fails");
        }
    }

    /// Gateway simulating a provider outage.
    struct FailingGateway;

    #[async_trait]
    impl ModelGateway for FailingGateway {
        async fn complete(&self, _request: &ModelRequest) -> Result<String, FeedbackError> {
            Err(FeedbackError::UpstreamError(
                "Model provider returned 503 Service Unavailable".to_string(),
            ))
        }
    }

    use crate::types::ModelRequest;

    fn make_rubric() -> Rubric {
        Rubric {
            label: "Design Journal".to_string(),
            criteria: vec![
                Criterion {
                    id: "planning".to_string(),
                    name: "Planning".to_string(),
                    desc: "Clear plan with steps".to_string(),
                    weight: 5,
                },
                Criterion {
                    id: "execution".to_string(),
                    name: "Execution".to_string(),
                    desc: "Work carried out".to_string(),
                    weight: 10,
                },
                Criterion {
                    id: "reflection".to_string(),
                    name: "Reflection".to_string(),
                    desc: "What would change".to_string(),
                    weight: 5,
                },
            ],
        }
    }

    fn model_response() -> String {
        r#"{
            "overall_comment": "Good start",
            "criteria": [
                {"id": "planning", "score": 4, "out_of": 5, "feedback": "Plan each stage before you build."},
                {"id": "execution", "score": 8, "out_of": 10, "feedback": "Careful work throughout."},
                {"id": "reflection", "score": 4, "out_of": 5, "feedback": "Honest look at what to change."}
            ],
            "next_steps": ["A", "B"],
            "total_score": 16
        }"#
        .to_string()
    }

    #[tokio::test]
    async fn test_pipeline_end_to_end() {
        let rubric = make_rubric();
        let request = FeedbackRequest::new("design_journal", "I planned, built, and reflected.");

        let scored = FeedbackJob::new(&rubric, request)
            .with_gateway(StubGateway {
                response: model_response(),
            })
            .run()
            .await
            .expect("pipeline should succeed");

        assert_eq!(scored.report.total_score, 16);
        assert_eq!(scored.report.overall_comment, "Good start");
        assert_eq!(scored.report.criteria.len(), 3);
        assert_eq!(scored.report.next_steps, vec!["A", "B"]);

        // Audit record mirrors the request and resolution, not the submission text.
        assert_eq!(scored.audit.task_id, "design_journal");
        assert_eq!(scored.audit.weights.get("execution"), Some(&10));
        assert_eq!(
            scored.audit.submission_len,
            "I planned, built, and reflected.".len()
        );
        assert_eq!(scored.audit.report.total_score, 16);
    }

    #[tokio::test]
    async fn test_config_error_prevents_model_call() {
        let rubric = make_rubric();
        let request = FeedbackRequest::new("design_journal", "Some work")
            .with_weight_override("nonexistent_id", 5);

        let result = FeedbackJob::new(&rubric, request)
            .with_gateway(UnreachableGateway)
            .run()
            .await;

        match result {
            Err(FeedbackError::ConfigError(msg)) => {
                assert!(msg.contains("nonexistent_id"), "got: {msg}");
            }
            other => panic!("Expected ConfigError before gateway call, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let rubric = make_rubric();
        let request = FeedbackRequest::new("design_journal", "Some work");

        let result = FeedbackJob::new(&rubric, request)
            .with_gateway(FailingGateway)
            .run()
            .await;

        match result {
            Err(FeedbackError::UpstreamError(msg)) => {
                assert!(msg.contains("503"), "got: {msg}");
            }
            other => panic!("Expected UpstreamError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_response_yields_no_partial_report() {
        let rubric = make_rubric();
        let request = FeedbackRequest::new("design_journal", "Some work");

        // Valid JSON, but one criterion breaks the score contract.
        let result = FeedbackJob::new(&rubric, request)
            .with_gateway(StubGateway {
                response: r#"{
                    "overall_comment": "ok",
                    "criteria": [{"id": "planning", "score": 6, "out_of": 5, "feedback": "f"}],
                    "next_steps": ["A"],
                    "total_score": 16
                }"#
                .to_string(),
            })
            .run()
            .await;

        assert!(matches!(result, Err(FeedbackError::ScoreRange(_))));
    }

    #[tokio::test]
    async fn test_envelope_conversion() {
        let rubric = make_rubric();
        let request = FeedbackRequest::new("design_journal", "Work");

        let scored = FeedbackJob::new(&rubric, request)
            .with_gateway(StubGateway {
                response: model_response(),
            })
            .run()
            .await
            .unwrap();

        let response: FeedbackReportResponse = scored.into();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["total_score"], 16);
    }
}
