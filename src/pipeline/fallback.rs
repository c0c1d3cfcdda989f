//! Rule-only classifier used when no trained model is usable.

use super::heuristics::Signals;
use super::types::Priority;

// Weights in hundredths so the sum is exact before it becomes a score.
const BASE: u32 = 10;
const URGENCY: u32 = 40;
const MONEY: u32 = 30;
const TEMPORAL: u32 = 20;
const ACTIONABLE: u32 = 20;
const BUSINESS: u32 = 15;

/// Score at or above which a message is P3.
pub const P3_THRESHOLD: f64 = 0.7;
/// Score at or above which a message is P2.
pub const P2_THRESHOLD: f64 = 0.4;

/// Classify `text` from heuristics alone.
///
/// Returns the priority and a two-decimal score clamped to [0, 1]. A text
/// that trips every rule would sum past 1.0 and is capped there.
pub fn classify(text: &str) -> (Priority, f64) {
    classify_signals(&Signals::detect(text))
}

pub fn classify_signals(signals: &Signals) -> (Priority, f64) {
    let mut points = BASE;
    if signals.urgency {
        points += URGENCY;
    }
    if signals.money {
        points += MONEY;
    }
    if signals.temporal {
        points += TEMPORAL;
    }
    if signals.actionable {
        points += ACTIONABLE;
    }
    if signals.business {
        points += BUSINESS;
    }

    let score = f64::from(points.min(100)) / 100.0;
    (priority_for(score), score)
}

/// Threshold mapping for heuristic scores.
pub fn priority_for(score: f64) -> Priority {
    if score >= P3_THRESHOLD {
        Priority::P3
    } else if score >= P2_THRESHOLD {
        Priority::P2
    } else {
        Priority::P1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_gets_base_score() {
        assert_eq!(classify("good morning"), (Priority::P1, 0.1));
    }

    #[test]
    fn urgency_alone_is_p2() {
        assert_eq!(classify("urgent"), (Priority::P2, 0.5));
    }

    #[test]
    fn actionable_question_is_p1() {
        assert_eq!(classify("how was the trip?"), (Priority::P1, 0.3));
    }

    #[test]
    fn payment_request_with_time_is_p3() {
        let (priority, score) = classify("urgent payment due today, please confirm by 5pm");
        // urgency + temporal + actionable, no amount, no business keyword
        assert_eq!(score, 0.9);
        assert_eq!(priority, Priority::P3);
    }

    #[test]
    fn every_rule_clamps_to_one() {
        let (priority, score) =
            classify("urgent: client project payment of $500 due 12/05, please confirm");
        assert_eq!(score, 1.0);
        assert_eq!(priority, Priority::P3);
    }

    #[test]
    fn amount_alone_is_p2() {
        assert_eq!(classify("sent you rs 200 for lunch"), (Priority::P2, 0.4));
    }

    #[test]
    fn threshold_edges() {
        assert_eq!(priority_for(0.7), Priority::P3);
        assert_eq!(priority_for(0.69), Priority::P2);
        assert_eq!(priority_for(0.4), Priority::P2);
        assert_eq!(priority_for(0.39), Priority::P1);
    }

    #[test]
    fn exact_threshold_sums_land_on_p3() {
        // 0.1 + 0.4 + 0.2 must not drift below 0.7
        let (priority, score) = classify("see you tomorrow at 5");
        assert_eq!(score, 0.7);
        assert_eq!(priority, Priority::P3);
    }
}
