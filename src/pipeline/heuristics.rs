//! Heuristic detectors over raw message text.
//!
//! Every detector is a case-insensitive boolean predicate. Nothing here is
//! weighted; the booster and the fallback classifier decide what a hit is worth.

use std::sync::LazyLock;

use regex::Regex;

static URGENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(urgent|asap|today|tomorrow|deadline|invoice|payment|interview|error|issue|help|confirm|reminder)",
    )
    .unwrap()
});

static MONEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(₹|\$|\brs\.?)\s?\d+").unwrap());

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b\d{1,2}(:\d{2})?\s*(am|pm)?\b").unwrap());

static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}([/-]\d{2,4})?\b").unwrap());

static ACTIONABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\?|please|can you|need|by\s+\w+").unwrap());

const BUSINESS_KEYWORDS: [&str; 6] = ["work", "job", "project", "client", "meeting", "deadline"];

/// Urgency vocabulary: "urgent", "asap", "deadline", "invoice", ...
pub fn has_urgency_keyword(text: &str) -> bool {
    URGENCY.is_match(text)
}

/// A currency marker (`₹`, `$`, `rs`, `rs.`) followed by an amount.
pub fn has_money_mention(text: &str) -> bool {
    MONEY.is_match(text)
}

/// A clock time ("5pm", "10:30 am") or a numeric date ("12/05", "1-2-2024").
pub fn has_temporal_mention(text: &str) -> bool {
    CLOCK_TIME.is_match(text) || DATE.is_match(text)
}

/// A question or request: "?", "please", "can you", "need", "by <word>".
pub fn is_actionable(text: &str) -> bool {
    ACTIONABLE.is_match(text)
}

/// Work context: "work", "job", "project", "client", "meeting", "deadline".
pub fn has_business_context(text: &str) -> bool {
    let lower = text.to_lowercase();
    BUSINESS_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// All detector outcomes for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub urgency: bool,
    pub money: bool,
    pub temporal: bool,
    pub actionable: bool,
    pub business: bool,
}

impl Signals {
    pub fn detect(text: &str) -> Self {
        Self {
            urgency: has_urgency_keyword(text),
            money: has_money_mention(text),
            temporal: has_temporal_mention(text),
            actionable: is_actionable(text),
            business: has_business_context(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgency_is_case_insensitive_substring() {
        assert!(has_urgency_keyword("URGENT: call me"));
        assert!(has_urgency_keyword("Payment pending"));
        assert!(has_urgency_keyword("see you tomorrow"));
        assert!(has_urgency_keyword("helpful tip"));
        assert!(!has_urgency_keyword("good morning"));
    }

    #[test]
    fn money_mentions() {
        assert!(has_money_mention("pay ₹500 now"));
        assert!(has_money_mention("it costs $ 20"));
        assert!(has_money_mention("Rs. 1500 pending"));
        assert!(has_money_mention("rs200"));
        assert!(!has_money_mention("hours 5"));
        assert!(!has_money_mention("$ for nothing"));
        assert!(!has_money_mention("no amount here"));
    }

    #[test]
    fn temporal_mentions() {
        assert!(has_temporal_mention("meet at 5pm"));
        assert!(has_temporal_mention("call at 10:30 am"));
        assert!(has_temporal_mention("due 12/05"));
        assert!(has_temporal_mention("due 1-2-2024"));
        assert!(!has_temporal_mention("see you soon"));
        assert!(!has_temporal_mention("room 1234"));
    }

    #[test]
    fn actionable_markers() {
        assert!(is_actionable("are you there?"));
        assert!(is_actionable("Please send it"));
        assert!(is_actionable("can you check"));
        assert!(is_actionable("I need the file"));
        assert!(is_actionable("send it by Friday"));
        assert!(!is_actionable("thanks"));
        assert!(!is_actionable("standby"));
    }

    #[test]
    fn business_context() {
        assert!(has_business_context("Client call moved"));
        assert!(has_business_context("homework done"));
        assert!(!has_business_context("lunch?"));
    }

    #[test]
    fn signals_collects_everything() {
        let signals = Signals::detect("urgent payment of $500 due today 5pm, please confirm");
        assert_eq!(
            signals,
            Signals {
                urgency: true,
                money: true,
                temporal: true,
                actionable: true,
                business: false,
            }
        );
        assert_eq!(Signals::detect("ok"), Signals::default());
    }
}
