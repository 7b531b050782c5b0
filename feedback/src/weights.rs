//! # Weight Resolution Module
//!
//! This module resolves a rubric's default criterion weights against caller-supplied
//! overrides into the weight map the prompt compiler renders and the total the model
//! is asked to scale onto the fixed /20 report scale.

use crate::error::FeedbackError;
use std::collections::HashMap;
use util::rubric_store::Rubric;

/// Maximum value any single criterion weight may take, override or default.
/// Keeps one criterion from dominating the /20 scaling.
pub const MAX_CRITERION_WEIGHT: u32 = 20;

/// The outcome of weight resolution: one weight per rubric criterion plus their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWeights {
    pub weights: HashMap<String, u32>,
    /// Sum of all resolved weights; the denominator for /20 scaling.
    pub total: u32,
}

/// Resolves the effective weight for every criterion of `rubric`.
///
/// Criteria without an override keep their default weight. Resolution fails with
/// [`FeedbackError::ConfigError`] if the rubric has no criteria, an override names
/// an unknown criterion id, or any resolved weight exceeds [`MAX_CRITERION_WEIGHT`].
/// No side effects.
pub fn resolve_weights(
    rubric: &Rubric,
    overrides: &HashMap<String, u32>,
) -> Result<ResolvedWeights, FeedbackError> {
    if rubric.criteria.is_empty() {
        return Err(FeedbackError::ConfigError(format!(
            "Rubric '{}' has no criteria",
            rubric.label
        )));
    }

    for key in overrides.keys() {
        if !rubric.has_criterion(key) {
            return Err(FeedbackError::ConfigError(format!(
                "Unknown criterion id '{key}' in weight overrides"
            )));
        }
    }

    let mut weights = HashMap::with_capacity(rubric.criteria.len());
    let mut total: u32 = 0;
    for criterion in &rubric.criteria {
        let weight = overrides
            .get(&criterion.id)
            .copied()
            .unwrap_or(criterion.weight);
        if weight > MAX_CRITERION_WEIGHT {
            return Err(FeedbackError::ConfigError(format!(
                "Weight {weight} for criterion '{}' exceeds maximum of {MAX_CRITERION_WEIGHT}",
                criterion.id
            )));
        }
        weights.insert(criterion.id.clone(), weight);
        total += weight;
    }

    Ok(ResolvedWeights { weights, total })
}
