//! Model registry, path resolution, and the model-load seam.
//!
//! [`MODELS`] is the static catalog of standard multilingual Whisper GGML
//! models. [`ModelPaths`] resolves the on-disk location of a model given an
//! [`crate::config::AppPaths`] instance.
//!
//! [`ModelLoader`] is the seam the coordinator dispatches model swaps
//! against: `load(id)` produces a fresh engine that replaces the active one
//! atomically once the load completes. [`DiskModelLoader`] is the production
//! implementation over [`WhisperEngine::load`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppPaths;

use super::engine::{InferenceParams, SttEngine, SttError, WhisperEngine};

// ---------------------------------------------------------------------------
// ModelInfo
// ---------------------------------------------------------------------------

/// Static metadata for a single GGML model file.
#[derive(Debug)]
pub struct ModelInfo {
    /// Unique identifier used in `SttConfig::model` (e.g. `"base"`).
    pub id: &'static str,
    /// Human-readable display name.
    pub display_name: &'static str,
    /// File name under the models directory (e.g. `"ggml-base.bin"`).
    pub file_name: &'static str,
    /// Approximate file size in megabytes.
    pub file_size_mb: u64,
    /// Source URL for downloading the GGML file.
    pub source_url: &'static str,
}

/// Standard multilingual Whisper models, smallest first.
pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "tiny",
        display_name: "Whisper Tiny",
        file_name: "ggml-tiny.bin",
        file_size_mb: 75,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp",
    },
    ModelInfo {
        id: "base",
        display_name: "Whisper Base",
        file_name: "ggml-base.bin",
        file_size_mb: 142,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp",
    },
    ModelInfo {
        id: "small",
        display_name: "Whisper Small",
        file_name: "ggml-small.bin",
        file_size_mb: 466,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp",
    },
    ModelInfo {
        id: "medium",
        display_name: "Whisper Medium",
        file_name: "ggml-medium.bin",
        file_size_mb: 1_500,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp",
    },
    ModelInfo {
        id: "large-v3",
        display_name: "Whisper Large-v3",
        file_name: "ggml-large-v3.bin",
        file_size_mb: 2_900,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp",
    },
];

/// Look up a model by its registry identifier.
pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == id)
}

// ---------------------------------------------------------------------------
// ModelPaths
// ---------------------------------------------------------------------------

/// Resolves registry identifiers to on-disk GGML files.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    models_dir: PathBuf,
}

impl ModelPaths {
    /// Build from the application paths.
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            models_dir: paths.models_dir.clone(),
        }
    }

    /// Build from an explicit directory (useful for tests).
    pub fn in_dir(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Full path for a registry identifier.
    ///
    /// # Errors
    ///
    /// [`SttError::UnknownModel`] when `id` is not in [`MODELS`].
    pub fn resolve(&self, id: &str) -> Result<PathBuf, SttError> {
        let info = find_model(id).ok_or_else(|| SttError::UnknownModel(id.to_string()))?;
        Ok(self.models_dir.join(info.file_name))
    }
}

// ---------------------------------------------------------------------------
// ModelLoader
// ---------------------------------------------------------------------------

/// Loads a model identifier into a ready-to-use engine.
///
/// The coordinator calls this from a `spawn_blocking` task; loading a GGML
/// file takes seconds, so implementations may block freely. The returned
/// engine replaces the active one only after the coordinator observes the
/// completion — a failed load leaves the previous engine in place.
pub trait ModelLoader: Send + Sync {
    /// Load `model_id` and return the engine to swap in.
    fn load(&self, model_id: &str) -> Result<Arc<dyn SttEngine>, SttError>;
}

/// Production loader: resolves `id` against the models directory and loads
/// the GGML file with [`WhisperEngine::load`].
pub struct DiskModelLoader {
    paths: ModelPaths,
    params: InferenceParams,
}

impl DiskModelLoader {
    /// Create a loader that resolves models in `paths` and applies `params`
    /// to every engine it produces.
    pub fn new(paths: ModelPaths, params: InferenceParams) -> Self {
        Self { paths, params }
    }
}

impl ModelLoader for DiskModelLoader {
    fn load(&self, model_id: &str) -> Result<Arc<dyn SttEngine>, SttError> {
        let path = self.paths.resolve(model_id)?;
        log::debug!("loading model {model_id} from {}", path.display());
        let engine = WhisperEngine::load(&path, self.params.clone())?;
        Ok(Arc::new(engine))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_ids_are_unique() {
        for (i, a) in MODELS.iter().enumerate() {
            for b in &MODELS[i + 1..] {
                assert_ne!(a.id, b.id, "duplicate model id {}", a.id);
            }
        }
    }

    #[test]
    fn find_model_known_and_unknown() {
        assert!(find_model("base").is_some());
        assert!(find_model("large-v3").is_some());
        assert!(find_model("turbo-xxl").is_none());
    }

    #[test]
    fn resolve_joins_registry_file_name() {
        let paths = ModelPaths::in_dir("/tmp/models");
        let path = paths.resolve("base").unwrap();
        assert!(path.ends_with("ggml-base.bin"));
    }

    #[test]
    fn resolve_unknown_id_errors() {
        let paths = ModelPaths::in_dir("/tmp/models");
        let err = paths.resolve("nope").unwrap_err();
        assert!(matches!(err, SttError::UnknownModel(_)));
    }

    #[test]
    fn disk_loader_missing_file_is_model_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let loader = DiskModelLoader::new(
            ModelPaths::in_dir(dir.path()),
            InferenceParams::default(),
        );
        let err = loader.load("base").err().unwrap();
        assert!(matches!(err, SttError::ModelNotFound(_)));
    }
}
