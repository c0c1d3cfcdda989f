//! Offline labeling data and classification-quality metrics.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, ModelError, Result};
use crate::model::ClassifierModel;
use crate::pipeline::types::Priority;

/// One JSON-lines record of raw input: only `text` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawText {
    pub text: String,
}

/// One labeled JSON-lines record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledText {
    pub text: String,
    pub label: Priority,
}

/// Read a JSON-lines file, skipping blank lines.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path)?;
    let mut records = Vec::new();
    for (index, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| Error::InvalidData {
            location: format!("{}:{}", path.display(), index + 1),
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Write records as JSON lines.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Most probable priority for `text`. Ties go to the earlier model class;
/// labels that are not priorities are ignored.
pub fn predict_label(
    model: &dyn ClassifierModel,
    text: &str,
) -> std::result::Result<Priority, ModelError> {
    let probs = model.predict_proba(text)?;
    let mut best: Option<(Priority, f64)> = None;
    for label in model.classes() {
        let Ok(priority) = label.parse::<Priority>() else {
            continue;
        };
        let p = probs.get(label).copied().unwrap_or(0.0);
        if best.is_none_or(|(_, top)| p > top) {
            best = Some((priority, p));
        }
    }
    best.map(|(priority, _)| priority)
        .ok_or_else(|| ModelError::Inference("model exposes no priority classes".into()))
}

/// Predicted label for one text plus the probability of every model class.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Priority,
    /// `(class, probability)` in model class order.
    pub probabilities: Vec<(String, f64)>,
}

/// Run `model` on a single text.
pub fn predict(
    model: &dyn ClassifierModel,
    text: &str,
) -> std::result::Result<Prediction, ModelError> {
    let label = predict_label(model, text)?;
    let probs = model.predict_proba(text)?;
    let probabilities = model
        .classes()
        .iter()
        .map(|class| (class.clone(), probs.get(class).copied().unwrap_or(0.0)))
        .collect();
    Ok(Prediction {
        label,
        probabilities,
    })
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "label: {}", self.label)?;
        for (class, p) in &self.probabilities {
            writeln!(f, "  {class:>4}: {p:.4}")?;
        }
        Ok(())
    }
}

// ── Report ──────────────────────────────────────────────────────────────

/// Precision / recall / F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics, accuracy and a confusion matrix over P1..P3.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub per_class: [ClassMetrics; 3],
    pub accuracy: f64,
    /// `confusion[actual][predicted]`, indices in `Priority::ALL` order.
    pub confusion: [[usize; 3]; 3],
    pub total: usize,
}

fn index_of(priority: Priority) -> usize {
    match priority {
        Priority::P1 => 0,
        Priority::P2 => 1,
        Priority::P3 => 2,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl ClassificationReport {
    /// Compare paired actual and predicted labels. Extra items in the longer
    /// slice are ignored.
    pub fn compute(actual: &[Priority], predicted: &[Priority]) -> Self {
        let mut confusion = [[0usize; 3]; 3];
        for (a, p) in actual.iter().zip(predicted) {
            confusion[index_of(*a)][index_of(*p)] += 1;
        }

        let total: usize = confusion.iter().flatten().sum();
        let correct: usize = (0..3).map(|i| confusion[i][i]).sum();

        let per_class = std::array::from_fn(|i| {
            let tp = confusion[i][i];
            let predicted_i: usize = (0..3).map(|r| confusion[r][i]).sum();
            let support: usize = confusion[i].iter().sum();
            let precision = ratio(tp, predicted_i);
            let recall = ratio(tp, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            ClassMetrics {
                precision,
                recall,
                f1,
                support,
            }
        });

        Self {
            per_class,
            accuracy: ratio(correct, total),
            confusion,
            total,
        }
    }

    pub fn metrics(&self, priority: Priority) -> &ClassMetrics {
        &self.per_class[index_of(priority)]
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>8} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for priority in Priority::ALL {
            let m = self.metrics(priority);
            writeln!(
                f,
                "{:>8} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                priority, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>8} {:>29.2} {:>9}", "accuracy", self.accuracy, self.total)?;
        writeln!(f)?;
        writeln!(f, "confusion (rows actual, columns predicted):")?;
        for (priority, row) in Priority::ALL.iter().zip(&self.confusion) {
            writeln!(f, "{:>8} {:>5} {:>5} {:>5}", priority, row[0], row[1], row[2])?;
        }
        Ok(())
    }
}
