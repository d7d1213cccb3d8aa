//! The coordinator — serialized arbitration of microphone, transcription,
//! and model loading.
//!
//! # Dispatch model
//!
//! Every command and every worker completion passes through one critical
//! section (a `Mutex` around [`Core`]). A command is fully processed — state
//! updated, status sink notified, worker dispatched — before the lock is
//! released, so no two commands ever observe an intermediate state, and at
//! most one transcription task and one model-load task are in flight at any
//! time.
//!
//! The coordinator itself never blocks inside the critical section: the
//! recording resource's start/stop/cancel are prompt by contract, and the
//! slow work (Whisper inference, GGML loading, clipboard paste) runs on
//! `spawn_blocking` tasks whose completions re-enter through the same lock.
//!
//! # Interruption policy
//!
//! Recording is the only state a model change may interrupt: no output has
//! been promised yet, so cancelling costs only the buffer captured so far.
//! A transcription in flight is never abandoned — a model change queues in
//! the single pending slot instead (last writer wins). A model load in
//! flight ignores further change requests entirely; loading a third model
//! before the second finishes would waste the swap.

use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;

use crate::audio::{RecordingHandle, RecordingResource};
use crate::inject::{DeliveryMode, ErrorKind, OutputSink};
use crate::status::StatusSink;
use crate::stt::{ModelLoader, SttEngine, SttError};

use super::state::{Command, CoordinatorState, Dispatch, RejectReason};

// ---------------------------------------------------------------------------
// Core
// ---------------------------------------------------------------------------

/// Everything the critical section protects.
struct Core {
    state: CoordinatorState,
    /// Engine transcription tasks are dispatched against.
    engine: Arc<dyn SttEngine>,
    /// Registry id of `engine`'s model.
    active_model: String,
    /// The single not-yet-applied model change. Overwritten, never queued
    /// deeper; cleared when applied or superseded.
    pending_model: Option<String>,
    /// Handle of the open capture session while in `Recording`.
    recording: Option<RecordingHandle>,
}

struct Inner {
    core: Mutex<Core>,
    recorder: Arc<dyn RecordingResource>,
    loader: Arc<dyn ModelLoader>,
    output: Arc<dyn OutputSink>,
    status: Arc<dyn StatusSink>,
    /// Runtime the worker tasks are spawned onto.
    runtime: Handle,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Handle to the coordinator. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

impl Coordinator {
    /// Create a coordinator in `Idle` with the given active engine.
    ///
    /// Must be called from within a tokio runtime — worker tasks are
    /// spawned onto [`Handle::current`].
    pub fn new(
        engine: Arc<dyn SttEngine>,
        active_model: impl Into<String>,
        recorder: Arc<dyn RecordingResource>,
        loader: Arc<dyn ModelLoader>,
        output: Arc<dyn OutputSink>,
        status: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                core: Mutex::new(Core {
                    state: CoordinatorState::Idle,
                    engine,
                    active_model: active_model.into(),
                    pending_model: None,
                    recording: None,
                }),
                recorder,
                loader,
                output,
                status,
                runtime: Handle::current(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Public surface
    // -----------------------------------------------------------------------

    /// Submit a logical command. The single entry point for all callers.
    ///
    /// All gating happens here, inside the critical section; the returned
    /// [`Dispatch`] reflects the state the command actually met, so callers
    /// never need a check-then-act dance around [`current_state`].
    ///
    /// [`current_state`]: Coordinator::current_state
    pub fn submit_command(&self, cmd: Command) -> Dispatch {
        let mut core = self.inner.core.lock().unwrap();

        match (core.state, cmd) {
            // ── start ────────────────────────────────────────────────────
            (CoordinatorState::Idle, Command::StartRecording) => {
                match self.inner.recorder.start() {
                    Ok(handle) => {
                        core.recording = Some(handle);
                        self.transition(&mut core, CoordinatorState::Recording);
                        Dispatch::Accepted
                    }
                    Err(e) => {
                        // Stay Idle; the next attempt is a fresh start.
                        drop(core);
                        log::warn!("coordinator: failed to open capture session: {e}");
                        self.inner
                            .output
                            .report_error(&ErrorKind::ResourceUnavailable(e.to_string()));
                        Dispatch::Accepted
                    }
                }
            }
            (state, Command::StartRecording) => {
                log::debug!("coordinator: start rejected, state is {}", state.label());
                Dispatch::Rejected(RejectReason::Busy(state))
            }

            // ── stop / auto-send ─────────────────────────────────────────
            (CoordinatorState::Recording, cmd @ (Command::StopRecording | Command::AutoSend)) => {
                let handle = core.recording.take().expect("Recording without a session");
                let auto_send = cmd == Command::AutoSend;
                match self.inner.recorder.stop(handle) {
                    Ok(audio) => {
                        self.transition(&mut core, CoordinatorState::Processing);
                        let engine = Arc::clone(&core.engine);
                        drop(core);
                        self.spawn_transcription(engine, audio, auto_send);
                    }
                    Err(e) => {
                        self.transition(&mut core, CoordinatorState::Idle);
                        drop(core);
                        self.inner
                            .output
                            .report_error(&ErrorKind::ResourceUnavailable(e.to_string()));
                    }
                }
                Dispatch::Accepted
            }

            // ── cancel ───────────────────────────────────────────────────
            (CoordinatorState::Recording, Command::CancelRecording) => {
                let handle = core.recording.take().expect("Recording without a session");
                self.inner.recorder.cancel(handle);
                self.transition(&mut core, CoordinatorState::Idle);
                Dispatch::Accepted
            }

            (state, Command::StopRecording | Command::AutoSend | Command::CancelRecording) => {
                log::debug!(
                    "coordinator: stop/cancel rejected, state is {}",
                    state.label()
                );
                Dispatch::Rejected(RejectReason::Busy(state))
            }

            // ── model change ─────────────────────────────────────────────
            (CoordinatorState::Idle, Command::ChangeModel(id)) => {
                if id == core.active_model {
                    return Dispatch::Rejected(RejectReason::AlreadyActive(id));
                }
                self.transition(&mut core, CoordinatorState::ModelLoading);
                drop(core);
                self.spawn_model_load(id);
                Dispatch::Accepted
            }
            (CoordinatorState::Recording, Command::ChangeModel(id)) => {
                // Recording has promised nothing yet; the swap wins and the
                // buffer so far is discarded.
                let handle = core.recording.take().expect("Recording without a session");
                self.inner.recorder.cancel(handle);
                self.transition(&mut core, CoordinatorState::ModelLoading);
                drop(core);
                self.spawn_model_load(id);
                Dispatch::Accepted
            }
            (CoordinatorState::Processing, Command::ChangeModel(id)) => {
                if let Some(old) = core.pending_model.replace(id) {
                    log::debug!("coordinator: pending model change {old} superseded");
                }
                Dispatch::Accepted
            }
            (CoordinatorState::ModelLoading, Command::ChangeModel(id)) => {
                log::debug!("coordinator: model change {id} ignored, load in flight");
                Dispatch::Rejected(RejectReason::Busy(CoordinatorState::ModelLoading))
            }
        }
    }

    /// Read-only snapshot of the current state, for display purposes only.
    ///
    /// Never gate a subsequent command on this value; submit the command and
    /// inspect the returned [`Dispatch`] instead.
    pub fn current_state(&self) -> CoordinatorState {
        self.inner.core.lock().unwrap().state
    }

    /// Registry id of the currently active model.
    pub fn active_model(&self) -> String {
        self.inner.core.lock().unwrap().active_model.clone()
    }

    // -----------------------------------------------------------------------
    // Worker dispatch
    // -----------------------------------------------------------------------

    /// Run one transcription off the dispatch path and feed the completion
    /// back in.
    fn spawn_transcription(&self, engine: Arc<dyn SttEngine>, audio: Vec<f32>, auto_send: bool) {
        log::debug!(
            "coordinator: dispatching transcription of {} samples",
            audio.len()
        );
        let this = self.clone();
        self.inner.runtime.spawn(async move {
            let result =
                match tokio::task::spawn_blocking(move || engine.transcribe(&audio)).await {
                    Ok(result) => result,
                    Err(e) => Err(SttError::Transcription(format!(
                        "transcription task panicked: {e}"
                    ))),
                };
            this.finish_transcription(result, auto_send);
        });
    }

    /// Run one model load off the dispatch path and feed the completion
    /// back in.
    fn spawn_model_load(&self, model: String) {
        log::debug!("coordinator: dispatching load of model {model}");
        let this = self.clone();
        let loader = Arc::clone(&self.inner.loader);
        self.inner.runtime.spawn(async move {
            let id = model.clone();
            let result = match tokio::task::spawn_blocking(move || loader.load(&id)).await {
                Ok(result) => result,
                Err(e) => Err(SttError::ContextInit(format!(
                    "model load task panicked: {e}"
                ))),
            };
            this.finish_model_load(model, result);
        });
    }

    // -----------------------------------------------------------------------
    // Worker completions
    // -----------------------------------------------------------------------

    /// A transcription task finished.
    ///
    /// Leaves `Processing` unconditionally: success delivers the text,
    /// failure reports it, and either way a pending model change is drained
    /// before anything else can run.
    fn finish_transcription(&self, result: Result<String, SttError>, auto_send: bool) {
        let followup = {
            let mut core = self.inner.core.lock().unwrap();
            if core.state != CoordinatorState::Processing {
                log::warn!(
                    "coordinator: stray transcription completion in {}",
                    core.state.label()
                );
                return;
            }
            self.drain_pending(&mut core)
        };

        match result {
            Ok(text) => {
                log::debug!("coordinator: transcription finished ({} chars)", text.len());
                let output = Arc::clone(&self.inner.output);
                let mode = if auto_send {
                    DeliveryMode::PasteAndSend
                } else {
                    DeliveryMode::Paste
                };
                // Clipboard delivery sleeps between steps; keep it off the
                // async workers.
                self.inner
                    .runtime
                    .spawn_blocking(move || output.deliver(&text, mode));
            }
            Err(e) => {
                log::warn!("coordinator: transcription failed: {e}");
                self.inner
                    .output
                    .report_error(&ErrorKind::WorkerFailure(format!(
                        "transcription failed: {e}"
                    )));
            }
        }

        if let Some(id) = followup {
            self.spawn_model_load(id);
        }
    }

    /// A model-load task finished.
    ///
    /// On success the new engine and id replace the active pair; on failure
    /// the previous pair stays (the failed id is discarded, never retried).
    fn finish_model_load(&self, model: String, result: Result<Arc<dyn SttEngine>, SttError>) {
        let (failure, followup) = {
            let mut core = self.inner.core.lock().unwrap();
            if core.state != CoordinatorState::ModelLoading {
                log::warn!(
                    "coordinator: stray model-load completion in {}",
                    core.state.label()
                );
                return;
            }

            let failure = match result {
                Ok(engine) => {
                    core.engine = engine;
                    core.active_model = model.clone();
                    log::info!("coordinator: model {model} is now active");
                    None
                }
                Err(e) => {
                    log::warn!(
                        "coordinator: load of model {model} failed, keeping {}: {e}",
                        core.active_model
                    );
                    Some(ErrorKind::WorkerFailure(format!(
                        "could not load model \"{model}\": {e}"
                    )))
                }
            };

            (failure, self.drain_pending(&mut core))
        };

        if let Some(kind) = failure {
            self.inner.output.report_error(&kind);
        }
        if let Some(id) = followup {
            self.spawn_model_load(id);
        }
    }

    // -----------------------------------------------------------------------
    // Helpers (called with the core lock held)
    // -----------------------------------------------------------------------

    /// Take the pending model change and pick the next state accordingly.
    ///
    /// Returns the model to dispatch, if any. A pending id equal to the
    /// now-active model is dropped — the swap already happened.
    fn drain_pending(&self, core: &mut Core) -> Option<String> {
        match core.pending_model.take() {
            Some(id) if id != core.active_model => {
                if core.state != CoordinatorState::ModelLoading {
                    self.transition(core, CoordinatorState::ModelLoading);
                }
                Some(id)
            }
            stale => {
                if let Some(id) = stale {
                    log::debug!("coordinator: pending model {id} already active, dropped");
                }
                self.transition(core, CoordinatorState::Idle);
                None
            }
        }
    }

    /// Atomically move to `to` and notify the status sink.
    fn transition(&self, core: &mut Core, to: CoordinatorState) {
        log::debug!("coordinator: {} → {}", core.state.label(), to.label());
        core.state = to;
        self.inner.status.update(to);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
