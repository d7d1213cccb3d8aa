//! Application entry point — whisperkey.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the configured Whisper model (degrades to a stub engine that
//!    reports the missing model on use).
//! 4. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 5. Build the recorder, the coordinator and its sinks.
//! 6. Build the arming monitor and spawn the key listener thread.
//! 7. Start the cpal capture stream and the resample feed thread.
//! 8. Run the dispatch loop until Ctrl-C.

use std::sync::Arc;

use tokio::sync::mpsc;

use whisperkey::{
    audio::{downmix_to_mono, resample_to_16k, MicRecorder, Microphone, PcmChunk, RecordingResource},
    config::{AppConfig, AppPaths},
    coordinator::{Command, Coordinator, Dispatch},
    hotkey::{ArmingMonitor, KeyInput, KeyListener},
    inject::{ClipboardInjector, OutputSink},
    status::{LogStatusSink, StatusSink},
    stt::{DiskModelLoader, InferenceParams, ModelLoader, ModelPaths, SttEngine, SttError},
};

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("whisperkey starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Model loader + initial engine
    let paths = AppPaths::new();
    let params = InferenceParams {
        language: config.stt.language.clone(),
        ..InferenceParams::default()
    };
    let loader = Arc::new(DiskModelLoader::new(ModelPaths::new(&paths), params));

    let (engine, active_model): (Arc<dyn SttEngine>, String) =
        match loader.load(&config.stt.model) {
            Ok(engine) => {
                log::info!("model {} loaded", config.stt.model);
                (engine, config.stt.model.clone())
            }
            Err(e) => {
                log::warn!(
                    "could not load model {} ({e}); transcription will report the missing model",
                    config.stt.model
                );
                // No active model id, so a later swap to the configured id
                // is accepted instead of rejected as already active.
                (
                    Arc::new(UnloadedEngine {
                        model: config.stt.model.clone(),
                    }),
                    String::new(),
                )
            }
        };

    // 4. Tokio runtime (2 workers — transcription and model loading)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    rt.block_on(run(config, engine, active_model, loader))
}

async fn run(
    config: AppConfig,
    engine: Arc<dyn SttEngine>,
    active_model: String,
    loader: Arc<DiskModelLoader>,
) -> anyhow::Result<()> {
    // 5. Recorder with the max-duration watchdog, coordinator, sinks
    let max_samples =
        (config.audio.max_recording_secs * config.audio.sample_rate as f32) as usize;
    let (limit_tx, mut limit_rx) = mpsc::unbounded_channel();
    let recorder = Arc::new(MicRecorder::new(max_samples, Some(limit_tx)));

    let coordinator = Coordinator::new(
        engine,
        active_model,
        Arc::clone(&recorder) as Arc<dyn RecordingResource>,
        loader as Arc<dyn ModelLoader>,
        Arc::new(ClipboardInjector::from_config(&config.inject)) as Arc<dyn OutputSink>,
        Arc::new(LogStatusSink) as Arc<dyn StatusSink>,
    );

    // 6. Arming monitor + key listener thread
    let mut monitor = ArmingMonitor::from_config(&config.hotkey)?;
    let (key_tx, mut key_rx) = mpsc::channel::<KeyInput>(64);
    let _listener = KeyListener::start(monitor.watched_keys(), key_tx);

    // 7. cpal capture stream + resample feed thread
    let _stream_guard = match Microphone::open() {
        Ok(mic) => {
            let (chunk_tx, chunk_rx) = std::sync::mpsc::channel::<PcmChunk>();
            let feed = Arc::clone(&recorder);

            std::thread::Builder::new()
                .name("audio-feed".into())
                .spawn(move || {
                    while let Ok(chunk) = chunk_rx.recv() {
                        let mono = downmix_to_mono(&chunk.samples, chunk.channels);
                        let samples = resample_to_16k(&mono, chunk.sample_rate);
                        feed.feed(&samples);
                    }
                })
                .expect("failed to spawn audio-feed thread");

            match mic.stream(chunk_tx) {
                Ok(guard) => {
                    log::info!(
                        "audio capture started ({} Hz, {} ch)",
                        mic.sample_rate(),
                        mic.channels()
                    );
                    Some(guard)
                }
                Err(e) => {
                    log::warn!("failed to start audio stream: {e}");
                    None
                }
            }
        }
        Err(e) => {
            log::warn!("audio capture unavailable: {e}");
            None
        }
    };

    // 8. Dispatch loop
    loop {
        tokio::select! {
            Some(input) = key_rx.recv() => {
                if let Some(cmd) = monitor.on_key(input.key, input.is_down) {
                    if let Dispatch::Rejected(reason) = coordinator.submit_command(cmd) {
                        // Routine for sub-chords of a larger chord; the
                        // state machine already said no.
                        log::debug!("command rejected: {reason}");
                    }
                }
            }
            Some(()) = limit_rx.recv() => {
                log::info!("maximum recording length reached, stopping");
                // Watchdog stops are not chord-driven and skip the arming
                // monitor on purpose.
                if let Dispatch::Rejected(reason) =
                    coordinator.submit_command(Command::StopRecording)
                {
                    log::debug!("auto-stop rejected: {reason}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("shutting down");
                break;
            }
            else => break,
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// UnloadedEngine — fallback SttEngine when the model file is not present
// ---------------------------------------------------------------------------

/// Keeps the application usable without a model file: every transcription
/// reports which model is missing instead of silently doing nothing.
struct UnloadedEngine {
    model: String,
}

impl SttEngine for UnloadedEngine {
    fn transcribe(&self, _audio: &[f32]) -> Result<String, SttError> {
        Err(SttError::ModelNotFound(self.model.clone()))
    }
}
