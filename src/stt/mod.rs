//! STT (Speech-to-Text) engine module.
//!
//! Two seams face the coordinator:
//!
//! * [`SttEngine`] — transcribe a finite 16 kHz mono buffer to text; the
//!   active engine is held behind `Arc<dyn SttEngine>` and handed to a
//!   blocking worker task per transcription.
//! * [`ModelLoader`] — produce a fresh engine for a registry identifier so
//!   the active engine can be swapped at runtime.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use whisperkey::stt::{InferenceParams, SttEngine, WhisperEngine};
//!
//! let engine = WhisperEngine::load("models/ggml-base.bin", InferenceParams::default())
//!     .expect("model file missing — download it first");
//!
//! // audio: 16 kHz, mono, f32 PCM from the audio module
//! let audio: Vec<f32> = vec![0.0; 16_000]; // 1 s of silence
//! let text = engine.transcribe(&audio).unwrap();
//! println!("{text}");
//! ```

pub mod engine;
pub mod model;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{InferenceParams, SttEngine, SttError, WhisperEngine};
pub use model::{find_model, DiskModelLoader, ModelInfo, ModelLoader, ModelPaths, MODELS};

// test-only re-export so the coordinator test module can import MockSttEngine
// without `use whisperkey::stt::engine::MockSttEngine`.
#[cfg(test)]
pub use engine::MockSttEngine;
