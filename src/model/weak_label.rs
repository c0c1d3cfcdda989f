//! Keyword weak labeling.
//!
//! Used offline to label raw messages for training, and available as a
//! [`ClassifierModel`] whose distribution is one-hot on the weak label.

use std::sync::LazyLock;

use regex::Regex;

use super::{ClassProbabilities, ClassifierModel};
use crate::error::ModelError;
use crate::pipeline::types::Priority;

static P3_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(urgent|asap|today|tomorrow|deadline|interview|payment|invoice|blocker|immediately)",
    )
    .unwrap()
});

static P2_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(please|can you|could you|need|reminder|follow up|schedule|meeting|call|confirm|request)",
    )
    .unwrap()
});

/// Keyword label for a message: P3 vocabulary wins over P2 vocabulary.
pub fn weak_label(text: &str) -> Priority {
    if P3_KEYWORDS.is_match(text) {
        Priority::P3
    } else if P2_KEYWORDS.is_match(text) {
        Priority::P2
    } else {
        Priority::P1
    }
}

/// Rule engine exposed through the model interface.
pub struct WeakLabelModel {
    classes: Vec<String>,
}

impl WeakLabelModel {
    pub fn new() -> Self {
        Self {
            classes: Priority::ALL.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Default for WeakLabelModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierModel for WeakLabelModel {
    fn name(&self) -> &str {
        "weak-label"
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, text: &str) -> Result<ClassProbabilities, ModelError> {
        let label = weak_label(text);
        Ok(Priority::ALL
            .iter()
            .map(|p| (p.to_string(), if *p == label { 1.0 } else { 0.0 }))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_by_keyword_tier() {
        assert_eq!(weak_label("Server down, need a fix immediately"), Priority::P3);
        assert_eq!(weak_label("Could you follow up with them?"), Priority::P2);
        assert_eq!(weak_label("lol nice pic"), Priority::P1);
        assert_eq!(weak_label(""), Priority::P1);
    }

    #[test]
    fn p3_wins_over_p2() {
        assert_eq!(weak_label("please pay the invoice"), Priority::P3);
    }

    #[test]
    fn model_is_one_hot() {
        let model = WeakLabelModel::new();
        assert_eq!(model.classes(), ["P1", "P2", "P3"]);

        let probs = model.predict_proba("schedule a call").unwrap();
        assert_eq!(probs["P2"], 1.0);
        assert_eq!(probs["P1"], 0.0);
        assert_eq!(probs["P3"], 0.0);
    }
}
