//! Audio pipeline — microphone capture → downmix/resample → session tap.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → PcmChunk (mpsc) → downmix_to_mono
//!           → resample_to_16k → MicRecorder::feed → TailBuffer
//! ```
//!
//! The cpal stream runs for the whole process lifetime; opening and closing
//! a recording *session* ([`RecordingResource`]) only flips the tap, so the
//! coordinator's start/stop/cancel calls return promptly and never touch
//! audio hardware.

pub mod buffer;
pub mod capture;
pub mod recorder;
pub mod resample;

pub use buffer::TailBuffer;
pub use capture::{CaptureError, Microphone, PcmChunk, StreamGuard};
pub use recorder::{MicRecorder, RecordingHandle, RecordingResource};
pub use resample::{downmix_to_mono, resample_to_16k};

#[cfg(test)]
pub use recorder::MockRecorder;
