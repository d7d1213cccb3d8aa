//! Status display seam.
//!
//! [`StatusSink`] is invoked with the new state on every coordinator
//! transition. The shipped implementation logs; a tray icon or widget would
//! implement the same trait.

use crate::coordinator::CoordinatorState;

/// Observer of coordinator state transitions.
///
/// Called from inside the dispatch critical section, so implementations
/// must return promptly (hand anything slow to another thread).
pub trait StatusSink: Send + Sync {
    /// The coordinator just entered `state`.
    fn update(&self, state: CoordinatorState);
}

/// Log-backed status display.
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn update(&self, state: CoordinatorState) {
        log::info!("state: {}", state.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sink_accepts_every_state() {
        let sink = LogStatusSink;
        for state in [
            CoordinatorState::Idle,
            CoordinatorState::Recording,
            CoordinatorState::Processing,
            CoordinatorState::ModelLoading,
        ] {
            sink.update(state);
        }
    }
}
