//! Heuristic score booster for classifier probabilities.

use super::heuristics::Signals;

pub const URGENCY_BOOST: f64 = 0.15;
pub const MONEY_BOOST: f64 = 0.05;
pub const TEMPORAL_BOOST: f64 = 0.05;

/// Raise a P3 probability using heuristic corroboration.
///
/// The result never falls below the (clamped) input and never exceeds 1.0.
/// Missing signals do not lower the score.
pub fn boost(prob_p3: f64, text: &str) -> f64 {
    boost_with(prob_p3, &Signals::detect(text))
}

/// [`boost`] with precomputed signals.
pub fn boost_with(prob_p3: f64, signals: &Signals) -> f64 {
    let mut score = prob_p3.clamp(0.0, 1.0);
    if signals.urgency {
        score += URGENCY_BOOST;
    }
    if signals.money {
        score += MONEY_BOOST;
    }
    if signals.temporal {
        score += TEMPORAL_BOOST;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn no_signals_leaves_score_unchanged() {
        assert_eq!(boost(0.0, "no keywords here"), 0.0);
        assert_eq!(boost(0.42, "no keywords here"), 0.42);
    }

    #[test]
    fn each_signal_adds_its_increment() {
        assert!((boost(0.1, "urgent") - 0.25).abs() < EPS);
        // "$40" is both an amount and a bare number, so money and temporal fire.
        assert!((boost(0.1, "costs $40") - 0.2).abs() < EPS);
        assert!((boost(0.1, "due 12/05") - 0.15).abs() < EPS);
    }

    #[test]
    fn time_and_date_count_once() {
        assert!((boost(0.0, "see you 12/05 at 5pm") - TEMPORAL_BOOST).abs() < EPS);
    }

    #[test]
    fn total_boost_is_bounded() {
        let text = "urgent: pay $500 by 12/05 at 5pm";
        let boosted = boost(0.0, text);
        assert!((boosted - 0.25).abs() < EPS);
    }

    #[test]
    fn clamps_at_one() {
        assert_eq!(boost(0.9, "urgent invoice for $99 due 12/05"), 1.0);
        assert_eq!(boost(1.0, "urgent"), 1.0);
    }

    #[test]
    fn never_decreases_and_never_exceeds_one() {
        let texts = [
            "ok",
            "urgent",
            "pay rs 100",
            "meeting at 10:30",
            "urgent payment due today, please confirm by 5pm",
        ];
        for text in texts {
            for step in 0..=20 {
                let p = step as f64 / 20.0;
                let boosted = boost(p, text);
                assert!(boosted >= p, "{text}: {boosted} < {p}");
                assert!(boosted <= 1.0, "{text}: {boosted} > 1");
            }
        }
    }

    #[test]
    fn monotonic_in_probability() {
        let text = "invoice attached";
        let mut last = 0.0;
        for step in 0..=100 {
            let boosted = boost(step as f64 / 100.0, text);
            assert!(boosted >= last);
            last = boosted;
        }
    }
}
