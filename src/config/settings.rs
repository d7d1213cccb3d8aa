//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! The whole tree is resolved once at startup and handed to constructors;
//! nothing re-reads the file at runtime.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// A chord bound to a model swap (e.g. `"Ctrl+Alt+2"` → `"small"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBinding {
    /// Chord string, `+`-separated key names (see `hotkey::parse_chord`).
    pub chord: String,
    /// Model identifier from the registry (e.g. `"base"`, `"small"`).
    pub model: String,
}

/// Global hotkey chords.
///
/// Chord strings are `+`-separated key names. A stop chord is allowed to be
/// a subset of the start chord (the default configuration below does exactly
/// that); the arming monitor keeps the subset from firing while the start
/// chord is still held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    /// Chord that starts a recording.
    pub start_chord: String,
    /// Chord that stops the recording and transcribes.
    pub stop_chord: String,
    /// Chord that stops, transcribes, and follows the paste with Enter.
    pub auto_send_chord: String,
    /// Chord that discards the recording.
    pub cancel_chord: String,
    /// Chords that request a model swap.
    pub model_bindings: Vec<ModelBinding>,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            start_chord: "Ctrl+Win".into(),
            stop_chord: "Ctrl".into(),
            auto_send_chord: "Win".into(),
            cancel_chord: "Escape".into(),
            model_bindings: vec![
                ModelBinding {
                    chord: "Ctrl+Alt+1".into(),
                    model: "base".into(),
                },
                ModelBinding {
                    chord: "Ctrl+Alt+2".into(),
                    model: "small".into(),
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the Whisper STT engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SttConfig {
    /// Model identifier from the registry loaded at startup (e.g. `"base"`).
    pub model: String,
    /// Primary speech language as an ISO-639-1 code, or `"auto"` for
    /// Whisper's built-in language detection.
    pub language: String,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "base".into(),
            language: "auto".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate in Hz handed to Whisper (must be 16 000).
    pub sample_rate: u32,
    /// Minimum recording length in seconds before transcription is attempted.
    pub min_recording_secs: f32,
    /// Maximum recording length in seconds; the capture side auto-stops the
    /// session once this is exceeded.
    pub max_recording_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            min_recording_secs: 0.5,
            max_recording_secs: 60.0,
        }
    }
}

// ---------------------------------------------------------------------------
// InjectConfig
// ---------------------------------------------------------------------------

/// Settings for clipboard-paste text delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectConfig {
    /// Milliseconds to wait after setting the clipboard before pasting.
    pub paste_delay_ms: u64,
    /// Milliseconds to wait after pasting before restoring the clipboard.
    pub restore_delay_ms: u64,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            paste_delay_ms: 50,
            restore_delay_ms: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use whisperkey::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global hotkey chords.
    pub hotkey: HotkeyConfig,
    /// STT engine settings.
    pub stt: SttConfig,
    /// Microphone capture settings.
    pub audio: AudioConfig,
    /// Text-delivery settings.
    pub inject: InjectConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    /// Verify the shipped defaults.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.hotkey.start_chord, "Ctrl+Win");
        assert_eq!(cfg.hotkey.stop_chord, "Ctrl");
        assert_eq!(cfg.hotkey.cancel_chord, "Escape");
        assert_eq!(cfg.hotkey.model_bindings.len(), 2);
        assert_eq!(cfg.stt.model, "base");
        assert_eq!(cfg.stt.language, "auto");
        assert_eq!(cfg.audio.sample_rate, 16_000);
        assert!(cfg.audio.max_recording_secs > cfg.audio.min_recording_secs);
        assert_eq!(cfg.inject.paste_delay_ms, 50);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.hotkey.start_chord = "Ctrl+Shift".into();
        cfg.hotkey.model_bindings = vec![ModelBinding {
            chord: "Ctrl+Alt+3".into(),
            model: "medium".into(),
        }];
        cfg.stt.model = "large-v3".into();
        cfg.stt.language = "en".into();
        cfg.audio.max_recording_secs = 120.0;
        cfg.inject.restore_delay_ms = 250;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
        assert_eq!(loaded.hotkey.model_bindings[0].model, "medium");
    }
}
