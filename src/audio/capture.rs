//! Microphone capture via `cpal`.
//!
//! [`Microphone`] wraps the cpal host/device/stream lifecycle. Call
//! [`Microphone::stream`] to begin pushing [`PcmChunk`]s over an mpsc
//! channel. The returned [`StreamGuard`] is a RAII guard — dropping it stops
//! the underlying cpal stream.
//!
//! The stream runs for the lifetime of the process; whether chunks end up in
//! a recording session is decided downstream by the recorder tap, so
//! start/stop of a session never touches the audio hardware.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use thiserror::Error;

// ---------------------------------------------------------------------------
// PcmChunk
// ---------------------------------------------------------------------------

/// One buffer of raw audio as delivered by the cpal callback.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]` at the device's
/// native rate. Use [`crate::audio::downmix_to_mono`] and
/// [`crate::audio::resample_to_16k`] before handing audio to the STT engine.
#[derive(Debug, Clone)]
pub struct PcmChunk {
    /// Interleaved PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,
    /// Number of interleaved channels (1 = mono, 2 = stereo, …).
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors from the capture subsystem.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("a capture session is already active")]
    SessionActive,
}

// ---------------------------------------------------------------------------
// StreamGuard
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// Dropping this value stops the underlying hardware stream. `cpal::Stream`
/// is not `Send` on every platform, so the guard stays on the thread that
/// opened the stream (the main thread in this application).
pub struct StreamGuard {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// Microphone
// ---------------------------------------------------------------------------

/// The system default input device, ready to stream.
pub struct Microphone {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl Microphone {
    /// Open the system default input device with its preferred stream
    /// configuration.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoDevice`] when no input device is available, or
    /// [`CaptureError::DefaultConfig`] when the device cannot report a
    /// default stream configuration.
    pub fn open() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Start streaming and send every hardware buffer to `tx` as a
    /// [`PcmChunk`].
    ///
    /// The cpal callback runs on a dedicated audio thread. Send errors
    /// (receiver dropped) are silently ignored so the audio thread never
    /// panics.
    ///
    /// # Errors
    ///
    /// [`CaptureError::BuildStream`] or [`CaptureError::PlayStream`] if the
    /// platform rejects the stream configuration.
    pub fn stream(&self, tx: mpsc::Sender<PcmChunk>) -> Result<StreamGuard, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(PcmChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                });
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None, // no timeout
        )?;

        stream.play()?;
        Ok(StreamGuard { _stream: stream })
    }

    /// Native sample rate of the device in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels in each [`PcmChunk`].
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// `PcmChunk` must be `Send` so it can cross thread boundaries.
    #[test]
    fn pcm_chunk_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<PcmChunk>();
    }

    #[test]
    fn pcm_chunk_fields() {
        let chunk = PcmChunk {
            samples: vec![0.0_f32; 256],
            sample_rate: 44_100,
            channels: 2,
        };
        assert_eq!(chunk.samples.len(), 256);
        assert_eq!(chunk.sample_rate, 44_100);
        assert_eq!(chunk.channels, 2);
    }
}
