//! Classifier models and the shared availability state.
//!
//! A model is anything that can list its class labels and return a
//! probability per label for a text. The service loads one at startup
//! (`linear::LinearTextModel` from a JSON artifact) and keeps it in a
//! [`ModelState`], which every request reads and which latches to
//! "unavailable" the first time inference fails.

pub mod linear;
pub mod weak_label;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::ModelError;
use crate::pipeline::types::Priority;

pub use linear::LinearTextModel;
pub use weak_label::WeakLabelModel;

/// Probability per class label.
pub type ClassProbabilities = HashMap<String, f64>;

/// Capability interface for a trained (or rule-based) text classifier.
pub trait ClassifierModel: Send + Sync {
    /// Short identifier used in logs and `/health`.
    fn name(&self) -> &str;

    /// Class labels the model can predict, in model order.
    fn classes(&self) -> &[String];

    /// Probability distribution over [`classes`](Self::classes) for `text`.
    fn predict_proba(&self, text: &str) -> Result<ClassProbabilities, ModelError>;
}

/// Read a [`LinearTextModel`] artifact from disk.
pub async fn load_artifact(path: &Path) -> Result<Arc<dyn ClassifierModel>, ModelError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ModelError::NotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    let model = LinearTextModel::from_slice(&bytes)?;
    Ok(Arc::new(model))
}

// ── Model state ─────────────────────────────────────────────────────

struct LoadedModel {
    model: Arc<dyn ClassifierModel>,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

/// A model handed out by [`ModelState::current`], tagged with the load it
/// came from.
#[derive(Clone)]
pub struct ActiveModel {
    pub model: Arc<dyn ClassifierModel>,
    pub generation: u64,
}

/// Shared model slot plus a one-way availability latch.
///
/// `available` only goes from `true` to `false` through
/// [`mark_unavailable`](Self::mark_unavailable); [`reload`](Self::reload) is
/// the only way back. Every load bumps the generation, so a failure reported
/// against an older model cannot latch a newer one.
pub struct ModelState {
    slot: RwLock<Option<LoadedModel>>,
    available: AtomicBool,
}

impl ModelState {
    /// No model: every request runs in fallback mode.
    pub fn empty() -> Self {
        Self {
            slot: RwLock::new(None),
            available: AtomicBool::new(false),
        }
    }

    pub fn with_model(model: Arc<dyn ClassifierModel>) -> Self {
        Self {
            slot: RwLock::new(Some(LoadedModel {
                model,
                generation: 1,
                loaded_at: Utc::now(),
            })),
            available: AtomicBool::new(true),
        }
    }

    /// Load the artifact at `path`, starting in fallback mode if it is
    /// missing or unreadable.
    pub async fn load_or_fallback(path: &Path) -> Self {
        match load_artifact(path).await {
            Ok(model) => {
                info!(
                    path = %path.display(),
                    model = model.name(),
                    classes = ?model.classes(),
                    "Loaded trained model"
                );
                Self::with_model(model)
            }
            Err(ModelError::NotFound { path }) => {
                warn!(path = %path, "Model artifact not found, using rule-based fallback");
                Self::empty()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load model, using rule-based fallback");
                Self::empty()
            }
        }
    }

    /// Whether requests should currently use the model.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// The model, if one is loaded and has not failed.
    pub async fn current(&self) -> Option<ActiveModel> {
        if !self.is_available() {
            return None;
        }
        self.slot.read().await.as_ref().map(|loaded| ActiveModel {
            model: Arc::clone(&loaded.model),
            generation: loaded.generation,
        })
    }

    /// Latch fallback mode after the model of `generation` failed.
    ///
    /// Returns `true` only for the call that flipped the latch. Failures from
    /// a model that has since been replaced are ignored.
    pub async fn mark_unavailable(&self, generation: u64) -> bool {
        // Holding the read lock keeps `reload` from swapping the model
        // between the generation check and the flip.
        let slot = self.slot.read().await;
        if slot.as_ref().map(|loaded| loaded.generation) != Some(generation) {
            return false;
        }
        self.available
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Install a new model and leave fallback mode.
    pub async fn reload(&self, model: Arc<dyn ClassifierModel>) {
        let mut slot = self.slot.write().await;
        let generation = slot.as_ref().map_or(0, |loaded| loaded.generation) + 1;
        info!(model = model.name(), classes = ?model.classes(), generation, "Model reloaded");
        *slot = Some(LoadedModel {
            model,
            generation,
            loaded_at: Utc::now(),
        });
        self.available.store(true, Ordering::Release);
    }

    /// Snapshot for the health endpoint.
    pub async fn status(&self, default_classes: &[Priority]) -> ModelStatus {
        let available = self.is_available();
        let slot = self.slot.read().await;
        let (classes, loaded_at, model) = match slot.as_ref() {
            Some(loaded) => (
                loaded.model.classes().to_vec(),
                Some(loaded.loaded_at),
                Some(loaded.model.name().to_string()),
            ),
            None => (
                default_classes.iter().map(|p| p.to_string()).collect(),
                None,
                None,
            ),
        };

        ModelStatus {
            status: "healthy".to_string(),
            model_loaded: available,
            classes,
            fallback_mode: !available,
            model,
            loaded_at,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub status: String,
    pub model_loaded: bool,
    pub classes: Vec<String>,
    pub fallback_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_state_is_fallback() {
        let state = ModelState::empty();
        assert!(!state.is_available());
        assert!(state.current().await.is_none());
        assert!(!state.mark_unavailable(0).await);

        let status = state.status(&Priority::ALL).await;
        assert!(!status.model_loaded);
        assert!(status.fallback_mode);
        assert_eq!(status.classes, vec!["P1", "P2", "P3"]);
        assert!(status.loaded_at.is_none());
    }

    #[tokio::test]
    async fn latch_flips_once() {
        let state = ModelState::with_model(Arc::new(WeakLabelModel::new()));
        let active = state.current().await.unwrap();

        assert!(state.mark_unavailable(active.generation).await);
        assert!(!state.mark_unavailable(active.generation).await);
        assert!(state.current().await.is_none());

        let status = state.status(&[Priority::P1]).await;
        assert!(status.fallback_mode);
        // Classes still describe the model that was loaded.
        assert_eq!(status.classes, vec!["P1", "P2", "P3"]);
        assert_eq!(status.model.as_deref(), Some("weak-label"));
    }

    #[tokio::test]
    async fn concurrent_latch_has_single_winner() {
        let state = Arc::new(ModelState::with_model(Arc::new(WeakLabelModel::new())));
        let generation = state.current().await.unwrap().generation;
        let mut handles = Vec::new();
        for _ in 0..16 {
            let state = Arc::clone(&state);
            handles.push(tokio::spawn(async move {
                state.mark_unavailable(generation).await
            }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert!(!state.is_available());
    }

    #[tokio::test]
    async fn reload_restores_availability() {
        let state = ModelState::empty();
        state.reload(Arc::new(WeakLabelModel::new())).await;
        assert!(state.is_available());

        let status = state.status(&[]).await;
        assert!(status.model_loaded);
        assert!(!status.fallback_mode);
        assert!(status.loaded_at.is_some());
    }

    #[tokio::test]
    async fn failure_from_replaced_model_does_not_latch() {
        let state = ModelState::with_model(Arc::new(WeakLabelModel::new()));
        let stale = state.current().await.unwrap();

        state.reload(Arc::new(WeakLabelModel::new())).await;
        let fresh = state.current().await.unwrap();
        assert!(fresh.generation > stale.generation);

        assert!(!state.mark_unavailable(stale.generation).await);
        assert!(state.is_available());

        assert!(state.mark_unavailable(fresh.generation).await);
        assert!(!state.is_available());
    }

    #[tokio::test]
    async fn missing_artifact_starts_in_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let err = load_artifact(&path).await.err().unwrap();
        assert!(matches!(err, ModelError::NotFound { .. }));

        let state = ModelState::load_or_fallback(&path).await;
        assert!(!state.is_available());
    }

    #[tokio::test]
    async fn garbage_artifact_starts_in_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let err = load_artifact(&path).await.err().unwrap();
        assert!(matches!(err, ModelError::Parse(_)));

        let state = ModelState::load_or_fallback(&path).await;
        assert!(!state.is_available());
    }
}
