//! Coordinator data model: states, commands, and submit outcomes.
//!
//! [`CoordinatorState`] is a single mutually-exclusive tag — exactly one
//! value holds at any instant, and only the coordinator's dispatch path
//! mutates it. Worker tasks never touch it directly; they report completion
//! and the dispatch path decides what that means.

// ---------------------------------------------------------------------------
// CoordinatorState
// ---------------------------------------------------------------------------

/// The authoritative state of the recording/transcription pipeline.
///
/// ```text
/// Idle ──start-recording──▶ Recording
///      ◀─cancel-recording── Recording
/// Recording ──stop / auto-send──▶ Processing
/// Recording ──model-change──▶ ModelLoading   (capture cancelled)
/// Processing ──transcription-complete──▶ Idle │ ModelLoading (pending swap)
/// Idle ──model-change──▶ ModelLoading
/// ModelLoading ──model-load-complete──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinatorState {
    /// Nothing in flight; every command is welcome.
    #[default]
    Idle,

    /// The microphone session is open and accumulating audio.
    Recording,

    /// A transcription task is running on the captured audio.
    Processing,

    /// A model-load task is swapping the active engine.
    ModelLoading,
}

impl CoordinatorState {
    /// `true` while some activity owns the pipeline.
    ///
    /// ```
    /// use whisperkey::coordinator::CoordinatorState;
    ///
    /// assert!(!CoordinatorState::Idle.is_busy());
    /// assert!(CoordinatorState::Recording.is_busy());
    /// assert!(CoordinatorState::Processing.is_busy());
    /// assert!(CoordinatorState::ModelLoading.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, CoordinatorState::Idle)
    }

    /// A short human-readable label suitable for status display.
    pub fn label(&self) -> &'static str {
        match self {
            CoordinatorState::Idle => "Idle",
            CoordinatorState::Recording => "Recording",
            CoordinatorState::Processing => "Processing",
            CoordinatorState::ModelLoading => "Loading model",
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A logical command submitted to the coordinator.
///
/// Commands arrive from the arming monitor, from the max-duration watchdog,
/// or from any other caller of `Coordinator::submit_command`; the source
/// makes no difference to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a capture session.
    StartRecording,
    /// Close the session and transcribe it.
    StopRecording,
    /// Close the session, transcribe, and follow the paste with Enter.
    AutoSend,
    /// Close the session and discard the audio.
    CancelRecording,
    /// Swap the active model to the given registry identifier.
    ChangeModel(String),
}

// ---------------------------------------------------------------------------
// Dispatch / RejectReason
// ---------------------------------------------------------------------------

/// Outcome of `Coordinator::submit_command`.
///
/// `Accepted` means the command was processed — its side effects (state
/// change, worker dispatch) happened before the call returned, though worker
/// *completions* arrive later. Failures discovered after acceptance are
/// surfaced through the output sink, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The command was processed.
    Accepted,
    /// The current state forbids the command; nothing changed.
    Rejected(RejectReason),
}

/// Why a command was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The named state does not accept this command.
    Busy(CoordinatorState),
    /// A model change named the model that is already active.
    AlreadyActive(String),
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::Busy(state) => write!(f, "busy: state is {}", state.label()),
            RejectReason::AlreadyActive(model) => {
                write!(f, "model \"{model}\" is already active")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- CoordinatorState ---

    #[test]
    fn default_state_is_idle() {
        assert_eq!(CoordinatorState::default(), CoordinatorState::Idle);
    }

    #[test]
    fn only_idle_is_not_busy() {
        assert!(!CoordinatorState::Idle.is_busy());
        assert!(CoordinatorState::Recording.is_busy());
        assert!(CoordinatorState::Processing.is_busy());
        assert!(CoordinatorState::ModelLoading.is_busy());
    }

    #[test]
    fn labels_are_distinct() {
        let labels = [
            CoordinatorState::Idle.label(),
            CoordinatorState::Recording.label(),
            CoordinatorState::Processing.label(),
            CoordinatorState::ModelLoading.label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            for b in &labels[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    // ---- RejectReason ---

    #[test]
    fn busy_reason_names_the_state() {
        let reason = RejectReason::Busy(CoordinatorState::ModelLoading);
        assert!(reason.to_string().contains("Loading model"));
    }

    #[test]
    fn already_active_reason_names_the_model() {
        let reason = RejectReason::AlreadyActive("base".into());
        assert!(reason.to_string().contains("base"));
    }
}
