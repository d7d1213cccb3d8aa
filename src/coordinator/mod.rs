//! Recording/transcription coordinator — the concurrent heart of whisperkey.
//!
//! # Architecture
//!
//! ```text
//! Command (arming monitor, watchdog, menu, …)
//!        │
//!        ▼
//! Coordinator::submit_command ──── one critical section ────┐
//!        │                                                  │
//!        ├─ StartRecording   → RecordingResource::start     │ state,
//!        ├─ Stop / AutoSend  → stop + transcription task    │ pending model,
//!        ├─ CancelRecording  → cancel, discard              │ active engine
//!        └─ ChangeModel      → queue / load / interrupt     │
//!                                                           │
//! transcription task ── completion ─────▶ re-enters lock ───┤
//! model-load task    ── completion ─────▶ re-enters lock ───┘
//!        │
//!        └─ text → OutputSink, transitions → StatusSink
//! ```
//!
//! The coordinator owns the microphone session, the active engine and the
//! authoritative [`CoordinatorState`]; the workers only ever hand back
//! immutable results. See [`runner`] for the interruption policy and
//! [`state`] for the data model.

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::Coordinator;
pub use state::{Command, CoordinatorState, Dispatch, RejectReason};
