//! Channel downmix and sample-rate conversion.
//!
//! The Whisper engine requires **16 kHz mono `f32`** audio; capture devices
//! deliver whatever rate and channel count the hardware prefers. This module
//! bridges the two:
//!
//! 1. [`downmix_to_mono`] — average interleaved channels into one.
//! 2. [`resample_to_16k`] — linear-interpolation resample to 16 000 Hz.
//!
//! Linear interpolation is audible on music but loses nothing that matters
//! for speech recognition. The `rubato` crate (already in Cargo.toml) is the
//! upgrade path if a windowed-sinc resampler ever becomes worthwhile here.

/// Target rate required by the STT engine.
const TARGET_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// downmix_to_mono
// ---------------------------------------------------------------------------

/// Average interleaved multi-channel audio down to mono.
///
/// The output length is `samples.len() / channels`. Mono input is returned
/// as an owned copy without averaging; zero channels yields an empty vector.
///
/// # Example
///
/// ```rust
/// use whisperkey::audio::downmix_to_mono;
///
/// let stereo = vec![0.6_f32, 0.2, -0.4, 0.4]; // L R L R
/// let mono = downmix_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.4).abs() < 1e-6);
/// assert!((mono[1] - 0.0).abs() < 1e-6);
/// ```
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample_to_16k
// ---------------------------------------------------------------------------

/// Resample mono `samples` from `source_rate` Hz to 16 000 Hz.
///
/// Already-16 kHz input is returned as an owned copy (no interpolation).
/// The output length is approximately `samples.len() * 16_000 / source_rate`.
///
/// # Example
///
/// ```rust
/// use whisperkey::audio::resample_to_16k;
///
/// // 10 ms at 48 kHz becomes 10 ms at 16 kHz
/// let hi = vec![0.25_f32; 480];
/// let lo = resample_to_16k(&hi, 48_000);
/// assert_eq!(lo.len(), 160);
/// ```
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_RATE || samples.is_empty() {
        return samples.to_vec();
    }

    let step = source_rate as f64 / TARGET_RATE as f64;
    let out_len = (samples.len() as f64 / step).ceil() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            samples[idx] * (1.0 - frac) + samples[next] * frac
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- downmix_to_mono ---------------------------------------------------

    #[test]
    fn downmix_mono_is_copied_unchanged() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&input, 1), input);
    }

    #[test]
    fn downmix_stereo_averages_frames() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = downmix_to_mono(&input, 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn downmix_zero_channels_is_empty() {
        assert!(downmix_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample_to_16k ---------------------------------------------------

    #[test]
    fn resample_at_target_rate_is_noop() {
        let input: Vec<f32> = (0..320).map(|i| (i as f32 / 320.0).sin()).collect();
        let out = resample_to_16k(&input, 16_000);
        assert_eq!(out, input);
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample_to_16k(&[], 48_000).is_empty());
    }

    #[test]
    fn resample_48k_halves_then_some() {
        // 480 samples @ 48 kHz = 10 ms → 160 samples @ 16 kHz
        let out = resample_to_16k(&vec![0.5_f32; 480], 48_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn resample_44100_to_16k_length() {
        // 1 second of 44.1 kHz → ~16 000 samples, ±1 for rounding
        let out = resample_to_16k(&vec![0.0_f32; 44_100], 44_100);
        assert!(out.len().abs_diff(16_000) <= 1, "got {}", out.len());
    }

    #[test]
    fn resample_preserves_dc_level() {
        let out = resample_to_16k(&vec![0.5_f32; 480], 48_000);
        for &s in &out {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }

    #[test]
    fn resample_upsamples_from_8k() {
        // 10 ms @ 8 kHz → 10 ms @ 16 kHz
        let out = resample_to_16k(&vec![0.0_f32; 80], 8_000);
        assert_eq!(out.len(), 160);
    }
}
