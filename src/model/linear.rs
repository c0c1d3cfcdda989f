//! TF-IDF + logistic regression model restored from a JSON artifact.
//!
//! The training job fits the vectorizer and the classifier and exports their
//! parameters. This module only runs inference:
//!
//! 1. lowercase, tokenize into runs of two or more word characters
//! 2. build n-grams in `ngram_range`, joined by a single space
//! 3. term frequency (optionally `1 + ln(tf)`) times idf, L2-normalized
//! 4. `coef · x + intercept`, then softmax (or sigmoid for a single row)

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{ClassProbabilities, ClassifierModel};
use crate::error::ModelError;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Fitted vectorizer parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    /// Term → feature index.
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature index.
    pub idf: Vec<f64>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_lowercase() -> bool {
    true
}

impl TfidfVectorizer {
    fn validate(&self) -> Result<(), ModelError> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ModelError::InvalidArtifact(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        if let Some((term, &index)) = self
            .vocabulary
            .iter()
            .find(|(_, index)| **index >= self.idf.len())
        {
            return Err(ModelError::InvalidArtifact(format!(
                "vocabulary term {term:?} has index {index}, but idf has {} entries",
                self.idf.len()
            )));
        }
        Ok(())
    }

    /// Sparse TF-IDF vector for `text` as `(feature, weight)` pairs.
    pub fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let normalized = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        let tokens: Vec<&str> = TOKEN.find_iter(&normalized).map(|m| m.as_str()).collect();

        let mut counts: HashMap<usize, f64> = HashMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&index) = self.vocabulary.get(&gram) {
                    *counts.entry(index).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut features: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (index, tf * self.idf[index])
            })
            .collect();
        features.sort_by_key(|(index, _)| *index);

        let norm = features.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut features {
                *w /= norm;
            }
        }
        features
    }
}

/// A fitted linear text classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearTextModel {
    classes: Vec<String>,
    vectorizer: TfidfVectorizer,
    /// One row per class, or a single row for a two-class model.
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl LinearTextModel {
    pub fn new(
        classes: Vec<String>,
        vectorizer: TfidfVectorizer,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let model = Self {
            classes,
            vectorizer,
            coef,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    /// Parse and validate a JSON artifact.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let model: Self = serde_json::from_slice(bytes)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.classes.is_empty() {
            return Err(ModelError::InvalidArtifact("no classes".into()));
        }
        let unique: HashSet<&String> = self.classes.iter().collect();
        if unique.len() != self.classes.len() {
            return Err(ModelError::InvalidArtifact("duplicate class labels".into()));
        }
        self.vectorizer.validate()?;

        let expected_rows = if self.classes.len() == 2 && self.coef.len() == 1 {
            1
        } else {
            self.classes.len()
        };
        if self.coef.len() != expected_rows {
            return Err(ModelError::InvalidArtifact(format!(
                "{} classes but {} coefficient rows",
                self.classes.len(),
                self.coef.len()
            )));
        }
        if self.intercept.len() != self.coef.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "{} coefficient rows but {} intercepts",
                self.coef.len(),
                self.intercept.len()
            )));
        }
        let width = self.vectorizer.idf.len();
        if let Some(row) = self.coef.iter().position(|row| row.len() != width) {
            return Err(ModelError::InvalidArtifact(format!(
                "coefficient row {row} has {} weights, expected {width}",
                self.coef[row].len()
            )));
        }
        Ok(())
    }

    fn logits(&self, features: &[(usize, f64)]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, bias)| bias + features.iter().map(|(i, w)| row[*i] * w).sum::<f64>())
            .collect()
    }
}

impl ClassifierModel for LinearTextModel {
    fn name(&self) -> &str {
        "tfidf-logreg"
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, text: &str) -> Result<ClassProbabilities, ModelError> {
        let features = self.vectorizer.transform(text);
        let logits = self.logits(&features);

        let probs = if logits.len() == 1 {
            let positive = sigmoid(logits[0]);
            vec![1.0 - positive, positive]
        } else {
            softmax(&logits)
        };

        if probs.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::Inference(format!(
                "non-finite probability for input of {} chars",
                text.chars().count()
            )));
        }

        Ok(self.classes.iter().cloned().zip(probs).collect())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
