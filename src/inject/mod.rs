//! Text delivery — clipboard-paste injection into the focused window.
//!
//! # Overview
//!
//! Raw key-event typing garbles anything beyond ASCII, so delivery goes
//! through the clipboard instead:
//!
//! 1. **Snapshot** the clipboard's current content.
//! 2. **Write** the transcript into the clipboard.
//! 3. **Simulate** the paste shortcut (and Return, for auto-send).
//! 4. **Restore** the snapshot (best-effort).
//!
//! [`OutputSink`] is the seam the coordinator delivers through; the shipped
//! implementation is [`ClipboardInjector`]. Delivery problems are logged and
//! swallowed — a failed paste must never disturb the state machine, the
//! transcript is still on the clipboard for a manual paste.

pub mod clipboard;
pub mod keyboard;

pub use clipboard::{restore, snapshot, write_text, ClipboardSnapshot};
pub use keyboard::{simulate_enter, simulate_paste};

use thiserror::Error;

// ---------------------------------------------------------------------------
// InjectError
// ---------------------------------------------------------------------------

/// All errors that can surface during text injection.
#[derive(Debug, Error)]
pub enum InjectError {
    /// Could not open or read the system clipboard.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// Could not write text to the system clipboard.
    #[error("cannot set clipboard text: {0}")]
    ClipboardSet(String),

    /// Could not simulate a key press/release event.
    #[error("cannot simulate key press: {0}")]
    KeySimulation(String),
}

// ---------------------------------------------------------------------------
// DeliveryMode / ErrorKind
// ---------------------------------------------------------------------------

/// How a transcript should reach the focused window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Paste the text and leave the cursor where it lands.
    Paste,
    /// Paste the text, then press Return (auto-send).
    PasteAndSend,
}

/// User-visible failure categories the coordinator reports through the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The capture device could not be acquired (no microphone, stream
    /// refused, session conflict).
    ResourceUnavailable(String),
    /// A transcription or model-load task reported failure.
    WorkerFailure(String),
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ResourceUnavailable(msg) => write!(f, "microphone unavailable: {msg}"),
            ErrorKind::WorkerFailure(msg) => write!(f, "{msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// OutputSink
// ---------------------------------------------------------------------------

/// Where finished transcripts and user-facing failures go.
///
/// Implementations must not block for long and must not propagate their own
/// failures back to the caller; the coordinator treats both methods as
/// fire-and-forget.
pub trait OutputSink: Send + Sync {
    /// Deliver a finished transcript.
    fn deliver(&self, text: &str, mode: DeliveryMode);

    /// Surface a failure to the user.
    fn report_error(&self, kind: &ErrorKind);
}

// ---------------------------------------------------------------------------
// ClipboardInjector
// ---------------------------------------------------------------------------

/// Production [`OutputSink`]: clipboard-paste delivery with configurable
/// inter-step delays.
#[derive(Debug, Clone)]
pub struct ClipboardInjector {
    /// Milliseconds to wait after setting the clipboard before pasting, so
    /// the clipboard manager has flushed before the target app reads it.
    pub paste_delay_ms: u64,
    /// Milliseconds to wait after pasting before restoring the snapshot, so
    /// the target app has finished reading the clipboard.
    pub restore_delay_ms: u64,
}

impl Default for ClipboardInjector {
    fn default() -> Self {
        Self {
            paste_delay_ms: 50,
            restore_delay_ms: 100,
        }
    }
}

impl ClipboardInjector {
    /// Build from the inject section of the application config.
    pub fn from_config(cfg: &crate::config::InjectConfig) -> Self {
        Self {
            paste_delay_ms: cfg.paste_delay_ms,
            restore_delay_ms: cfg.restore_delay_ms,
        }
    }

    /// Run the snapshot → write → paste → restore sequence.
    ///
    /// # Errors
    ///
    /// The first [`InjectError`] from the snapshot, write, or key-simulation
    /// steps. The restore step is best-effort; its result is discarded.
    fn inject(&self, text: &str, mode: DeliveryMode) -> Result<(), InjectError> {
        let saved = snapshot()?;
        write_text(text)?;
        std::thread::sleep(std::time::Duration::from_millis(self.paste_delay_ms));
        simulate_paste()?;
        if mode == DeliveryMode::PasteAndSend {
            simulate_enter()?;
        }
        std::thread::sleep(std::time::Duration::from_millis(self.restore_delay_ms));
        let _ = restore(saved);
        Ok(())
    }
}

impl OutputSink for ClipboardInjector {
    fn deliver(&self, text: &str, mode: DeliveryMode) {
        if let Err(e) = self.inject(text, mode) {
            // The transcript is still on the clipboard; the user can paste
            // manually.
            log::warn!("text injection failed: {e}");
        }
    }

    fn report_error(&self, kind: &ErrorKind) {
        log::error!("{kind}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display_names_the_device_problem() {
        let kind = ErrorKind::ResourceUnavailable("no input device".into());
        assert!(kind.to_string().contains("microphone"));
        assert!(kind.to_string().contains("no input device"));
    }

    #[test]
    fn injector_from_config_copies_delays() {
        let cfg = crate::config::InjectConfig {
            paste_delay_ms: 10,
            restore_delay_ms: 20,
        };
        let inj = ClipboardInjector::from_config(&cfg);
        assert_eq!(inj.paste_delay_ms, 10);
        assert_eq!(inj.restore_delay_ms, 20);
    }
}
