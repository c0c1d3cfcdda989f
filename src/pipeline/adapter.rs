//! Turns classifier probabilities into priorities.
//!
//! Thresholds here (0.8 / 0.45) differ from the fallback path (0.7 / 0.4).
//! A boosted model probability and a heuristic point total are not on the
//! same scale; do not share thresholds between them.

use std::sync::Arc;

use tracing::debug;

use super::booster;
use super::types::{Message, Priority, ScoredMessage, round2};
use crate::error::ModelError;
use crate::model::ClassifierModel;

/// Boosted score at or above which a message is P3.
pub const P3_THRESHOLD: f64 = 0.8;
/// Score (or raw P2 probability) at or above which a message is P2.
pub const P2_THRESHOLD: f64 = 0.45;

/// Priority scoring backed by a [`ClassifierModel`].
pub struct ModelScorer {
    model: Arc<dyn ClassifierModel>,
    p3_label: Option<String>,
    p2_label: Option<String>,
}

impl ModelScorer {
    /// Wrap `model`, resolving which of its labels stand for P3 and P2.
    pub fn new(model: Arc<dyn ClassifierModel>) -> Self {
        let find = |wanted: Priority| {
            model
                .classes()
                .iter()
                .find(|label| label.parse::<Priority>().ok() == Some(wanted))
                .cloned()
        };
        let p3_label = find(Priority::P3);
        let p2_label = find(Priority::P2);
        Self {
            model,
            p3_label,
            p2_label,
        }
    }

    /// Score one message: `(priority, boosted score)`, score unrounded.
    pub fn score(&self, text: &str) -> Result<(Priority, f64), ModelError> {
        let probs = self.model.predict_proba(text)?;
        let prob_of = |label: &Option<String>| {
            label
                .as_ref()
                .and_then(|l| probs.get(l).copied())
                .unwrap_or(0.0)
        };
        let prob_p3 = prob_of(&self.p3_label);
        let prob_p2 = prob_of(&self.p2_label);
        if !prob_p3.is_finite() || !prob_p2.is_finite() {
            return Err(ModelError::Inference(format!(
                "{} returned non-finite probabilities (P3={prob_p3}, P2={prob_p2})",
                self.model.name()
            )));
        }

        let score = booster::boost(prob_p3, text);
        let priority = priority_for(score, prob_p2);
        debug!(prob_p3, prob_p2, score, priority = %priority, "Model scored message");
        Ok((priority, score))
    }

    /// Score a whole batch. Any single failure fails the batch.
    pub fn score_batch(&self, messages: &[Message]) -> Result<Vec<ScoredMessage>, ModelError> {
        messages
            .iter()
            .map(|message| {
                let (priority, score) = self.score(&message.text)?;
                Ok(ScoredMessage::new(message, priority, round2(score)))
            })
            .collect()
    }
}

/// Threshold mapping for boosted model scores.
pub fn priority_for(score: f64, prob_p2: f64) -> Priority {
    if score >= P3_THRESHOLD {
        Priority::P3
    } else if score.max(prob_p2) >= P2_THRESHOLD {
        Priority::P2
    } else {
        Priority::P1
    }
}
