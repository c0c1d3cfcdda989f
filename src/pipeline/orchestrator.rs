//! Batch prioritization: score, group, summarize, rank.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::adapter::ModelScorer;
use super::fallback;
use super::summarizer::summarize;
use super::types::{AnalyzeOptions, AnalyzeResponse, ConversationSummary, Message, ScoredMessage};
use crate::model::ModelState;

/// Which path scored a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    Model,
    Fallback,
}

/// Entry point for `POST /analyze`.
pub struct Analyzer {
    state: Arc<ModelState>,
    default_top_k: usize,
}

impl Analyzer {
    pub fn new(state: Arc<ModelState>, default_top_k: usize) -> Self {
        Self {
            state,
            default_top_k,
        }
    }

    pub fn state(&self) -> &Arc<ModelState> {
        &self.state
    }

    /// Prioritize a batch and summarize its conversations.
    pub async fn analyze(&self, messages: &[Message], options: &AnalyzeOptions) -> AnalyzeResponse {
        let (mut important, mode) = self.score_all(messages).await;

        let summaries = if options.return_summary {
            summarize_conversations(messages)
        } else {
            Vec::new()
        };

        important.sort_by(|a, b| b.score.total_cmp(&a.score));
        let top_k = options.top_k.unwrap_or(self.default_top_k);
        important.truncate(top_k);

        info!(
            messages = messages.len(),
            returned = important.len(),
            conversations = summaries.len(),
            mode = ?mode,
            "Analyzed batch"
        );

        AnalyzeResponse {
            important,
            summaries,
        }
    }

    /// Score every message, in input order.
    ///
    /// A model failure latches fallback mode for the rest of the process and
    /// the same batch is rescored by the rules.
    pub async fn score_all(&self, messages: &[Message]) -> (Vec<ScoredMessage>, ScoringMode) {
        if let Some(active) = self.state.current().await {
            match ModelScorer::new(active.model).score_batch(messages) {
                Ok(scored) => return (scored, ScoringMode::Model),
                Err(e) => {
                    if self.state.mark_unavailable(active.generation).await {
                        warn!(error = %e, "Model prediction failed, switching to rule-based fallback");
                    } else {
                        debug!(error = %e, "Model prediction failed after fallback was latched");
                    }
                }
            }
        }

        let scored = messages
            .iter()
            .map(|message| {
                let (priority, score) = fallback::classify(&message.text);
                ScoredMessage::new(message, priority, score)
            })
            .collect();
        (scored, ScoringMode::Fallback)
    }
}

/// One summary per conversation, in order of first appearance.
pub fn summarize_conversations(messages: &[Message]) -> Vec<ConversationSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut texts: HashMap<&str, Vec<&str>> = HashMap::new();
    for message in messages {
        let id = message.conversation_id.as_str();
        texts
            .entry(id)
            .or_insert_with(|| {
                order.push(id);
                Vec::new()
            })
            .push(message.text.as_str());
    }

    order
        .into_iter()
        .map(|id| ConversationSummary {
            conversation_id: id.to_string(),
            bullets: summarize(&texts[id]),
        })
        .collect()
}
