//! Shared types for the prioritization pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Conversation id assigned to messages that arrive without one.
pub const UNASSIGNED_CONVERSATION: &str = "unassigned";

// ── Priority ────────────────────────────────────────────────────────

/// Ordinal priority level: `P1` (low) < `P2` (medium) < `P3` (high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
}

impl Priority {
    /// All levels, lowest first.
    pub const ALL: [Priority; 3] = [Priority::P1, Priority::P2, Priority::P3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "P1" | "p1" => Ok(Self::P1),
            "P2" | "p2" => Ok(Self::P2),
            "P3" | "p3" => Ok(Self::P3),
            other => Err(format!("unknown priority label: {other}")),
        }
    }
}

// ── Inbound message ─────────────────────────────────────────────────

/// A chat message submitted for prioritization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id within the batch.
    pub id: String,
    /// Conversation the message belongs to. Missing or `null` maps to
    /// [`UNASSIGNED_CONVERSATION`].
    #[serde(
        rename = "chat_id",
        alias = "conversation_id",
        default = "unassigned",
        deserialize_with = "conversation_or_unassigned"
    )]
    pub conversation_id: String,
    #[serde(default)]
    pub sender: Option<String>,
    pub text: String,
    /// Epoch seconds, as reported by the client.
    #[serde(default, rename = "ts")]
    pub timestamp: Option<i64>,
}

impl Message {
    /// Build a message with no sender or timestamp.
    pub fn new(
        id: impl Into<String>,
        conversation_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            sender: None,
            text: text.into(),
            timestamp: None,
        }
    }
}

fn unassigned() -> String {
    UNASSIGNED_CONVERSATION.to_string()
}

fn conversation_or_unassigned<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(unassigned))
}

// ── Outputs ─────────────────────────────────────────────────────────

/// A message with its assigned priority and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMessage {
    pub id: String,
    #[serde(rename = "chat_id")]
    pub conversation_id: String,
    pub priority: Priority,
    /// Confidence in [0, 1], rounded to two decimals.
    pub score: f64,
    pub text: String,
}

impl ScoredMessage {
    pub fn new(message: &Message, priority: Priority, score: f64) -> Self {
        Self {
            id: message.id.clone(),
            conversation_id: message.conversation_id.clone(),
            priority,
            score,
            text: message.text.clone(),
        }
    }
}

/// Up to three representative snippets for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(rename = "chat_id")]
    pub conversation_id: String,
    pub bullets: Vec<String>,
}

// ── Request / response ──────────────────────────────────────────────

/// Per-request options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeOptions {
    #[serde(default = "default_return_summary")]
    pub return_summary: bool,
    /// Falls back to the service default when absent.
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            return_summary: true,
            top_k: None,
        }
    }
}

fn default_return_summary() -> bool {
    true
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub messages: Vec<Message>,
    #[serde(default, rename = "opts")]
    pub options: AnalyzeOptions,
}

/// Response of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Top-k scored messages, highest score first.
    pub important: Vec<ScoredMessage>,
    pub summaries: Vec<ConversationSummary>,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ordering() {
        assert!(Priority::P1 < Priority::P2);
        assert!(Priority::P2 < Priority::P3);
        assert_eq!(Priority::ALL.iter().max(), Some(&Priority::P3));
    }

    #[test]
    fn priority_parse_and_display() {
        assert_eq!("P2".parse::<Priority>().unwrap(), Priority::P2);
        assert_eq!(" p3 ".parse::<Priority>().unwrap(), Priority::P3);
        assert!("P4".parse::<Priority>().is_err());
        assert_eq!(Priority::P1.to_string(), "P1");
    }

    #[test]
    fn message_without_chat_id_is_unassigned() {
        let msg: Message = serde_json::from_str(r#"{"id": "m1", "text": "hi"}"#).unwrap();
        assert_eq!(msg.conversation_id, UNASSIGNED_CONVERSATION);
        assert!(msg.sender.is_none());
        assert!(msg.timestamp.is_none());
    }

    #[test]
    fn message_with_null_chat_id_is_unassigned() {
        let msg: Message =
            serde_json::from_str(r#"{"id": "m1", "chat_id": null, "text": "hi"}"#).unwrap();
        assert_eq!(msg.conversation_id, UNASSIGNED_CONVERSATION);
    }

    #[test]
    fn message_accepts_conversation_id_alias() {
        let msg: Message = serde_json::from_str(
            r#"{"id": "m1", "conversation_id": "family", "sender": "Ma", "text": "hi", "ts": 1700000000}"#,
        )
        .unwrap();
        assert_eq!(msg.conversation_id, "family");
        assert_eq!(msg.sender.as_deref(), Some("Ma"));
        assert_eq!(msg.timestamp, Some(1_700_000_000));
    }

    #[test]
    fn message_missing_text_is_rejected() {
        let result: Result<Message, _> = serde_json::from_str(r#"{"id": "m1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn request_options_default() {
        let req: AnalyzeRequest = serde_json::from_str(r#"{"messages": []}"#).unwrap();
        assert!(req.options.return_summary);
        assert_eq!(req.options.top_k, None);

        let req: AnalyzeRequest =
            serde_json::from_str(r#"{"messages": [], "opts": {"top_k": 3, "extra": 1}}"#).unwrap();
        assert!(req.options.return_summary);
        assert_eq!(req.options.top_k, Some(3));
    }

    #[test]
    fn scored_message_serializes_wire_names() {
        let msg = Message::new("m1", "work", "deadline today");
        let scored = ScoredMessage::new(&msg, Priority::P3, 0.85);
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["chat_id"], "work");
        assert_eq!(json["priority"], "P3");
        assert_eq!(json["score"], 0.85);
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(0.854), 0.85);
        assert_eq!(round2(0.7000000000000001), 0.7);
        assert_eq!(round2(1.0), 1.0);
    }
}
