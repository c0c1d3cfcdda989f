//! Message prioritization pipeline.
//!
//! Every batch flows through:
//! 1. `adapter::ModelScorer` when a model is available, otherwise
//!    `fallback::classify` — both built on `heuristics`
//! 2. `orchestrator::summarize_conversations` — per-conversation bullets
//! 3. `orchestrator::Analyzer` — ranking and `top_k` truncation
//!
//! A model failure switches every later batch to the fallback path until the
//! model is explicitly reloaded.

pub mod adapter;
pub mod booster;
pub mod fallback;
pub mod heuristics;
pub mod orchestrator;
pub mod summarizer;
pub mod types;

pub use orchestrator::{Analyzer, ScoringMode};
pub use types::{
    AnalyzeOptions, AnalyzeRequest, AnalyzeResponse, ConversationSummary, Message, Priority,
    ScoredMessage,
};
