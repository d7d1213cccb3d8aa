//! whisperkey — push-to-talk dictation with swappable Whisper models.
//!
//! # Architecture
//!
//! ```text
//! rdev listener thread ──raw key events──▶ ArmingMonitor
//!                                              │ logical commands
//!                                              ▼
//!                                     Coordinator::submit_command
//!                                              │
//!                    ┌─────────────────────────┼─────────────────────────┐
//!                    ▼                         ▼                         ▼
//!             MicRecorder             transcription task          model-load task
//!          (capture session)       (spawn_blocking Whisper)    (spawn_blocking load)
//!                                              │                         │
//!                                              └───── completions ───────┘
//!                                              re-enter the Coordinator,
//!                                     text → OutputSink, state → StatusSink
//! ```
//!
//! The [`coordinator`] module owns the authoritative state (`Idle`,
//! `Recording`, `Processing`, `ModelLoading`) behind a single critical
//! section; everything else is a collaborator reached through a trait seam
//! so the state machine can be tested without a microphone, a model file or
//! a clipboard.

pub mod audio;
pub mod config;
pub mod coordinator;
pub mod hotkey;
pub mod inject;
pub mod status;
pub mod stt;
