//! Exclusive recording sessions over the always-on capture stream.
//!
//! [`RecordingResource`] is the seam the coordinator acquires the microphone
//! through. [`MicRecorder`] implements it as a *tap*: the cpal stream runs
//! continuously (see [`crate::audio::Microphone`]) and a feed thread pushes
//! 16 kHz mono samples into [`MicRecorder::feed`]; samples are only retained
//! while a session is open.
//!
//! Session contract (relied on by the coordinator):
//!
//! * at most one session is open at a time — a second `start` fails;
//! * `stop` returns the session's samples in chronological order;
//! * `cancel` discards them, returns promptly, and is idempotent — calling
//!   it with a stale handle (session already stopped or cancelled) is a
//!   no-op;
//! * once the session exceeds the configured maximum length, a single
//!   notification is emitted so the application can submit an ordinary
//!   stop command.

use std::sync::Mutex;

use tokio::sync::mpsc;

use super::buffer::TailBuffer;
use super::capture::CaptureError;

// ---------------------------------------------------------------------------
// RecordingHandle
// ---------------------------------------------------------------------------

/// Opaque proof of an open capture session.
///
/// Created by [`RecordingResource::start`]; consumed by `stop` or `cancel`.
/// The token ties the handle to one session so a stale handle can never
/// drain a newer session's audio.
#[derive(Debug)]
pub struct RecordingHandle {
    token: u64,
}

// ---------------------------------------------------------------------------
// RecordingResource
// ---------------------------------------------------------------------------

/// Exclusive handle to the capture device.
///
/// All three methods return promptly; none of them may block on audio
/// hardware. The coordinator calls them from inside its dispatch critical
/// section.
pub trait RecordingResource: Send + Sync {
    /// Open a session. Fails with [`CaptureError::SessionActive`] when one
    /// is already open.
    fn start(&self) -> Result<RecordingHandle, CaptureError>;

    /// Close the session and return its samples (16 kHz mono f32).
    ///
    /// A stale handle yields an empty buffer.
    fn stop(&self, handle: RecordingHandle) -> Result<Vec<f32>, CaptureError>;

    /// Close the session and discard its samples. Idempotent.
    fn cancel(&self, handle: RecordingHandle);
}

// ---------------------------------------------------------------------------
// MicRecorder
// ---------------------------------------------------------------------------

/// State shared between the feed thread and the session API.
struct Tap {
    buf: TailBuffer,
    /// Token of the open session, if any.
    session: Option<u64>,
    next_token: u64,
    /// Set once the limit notification for the open session has been sent.
    limit_sent: bool,
}

/// Production [`RecordingResource`] backed by the live capture stream.
pub struct MicRecorder {
    tap: Mutex<Tap>,
    /// Session length (in samples) at which the auto-stop fires.
    limit_samples: usize,
    /// Notified once per session when `limit_samples` is reached.
    limit_tx: Option<mpsc::UnboundedSender<()>>,
}

impl MicRecorder {
    /// Create a recorder whose sessions hold at most `max_samples` of audio.
    ///
    /// `limit_tx`, when given, receives one `()` per session the first time
    /// the session length reaches `max_samples`; the receiver is expected to
    /// turn it into a stop command.
    pub fn new(max_samples: usize, limit_tx: Option<mpsc::UnboundedSender<()>>) -> Self {
        Self {
            tap: Mutex::new(Tap {
                buf: TailBuffer::new(max_samples),
                session: None,
                next_token: 1,
                limit_sent: false,
            }),
            limit_samples: max_samples,
            limit_tx,
        }
    }

    /// Push 16 kHz mono samples from the feed thread.
    ///
    /// Samples arriving while no session is open are dropped.
    pub fn feed(&self, samples: &[f32]) {
        let mut tap = self.tap.lock().unwrap();
        if tap.session.is_none() {
            return;
        }

        tap.buf.push_slice(samples);

        if !tap.limit_sent && tap.buf.len() >= self.limit_samples {
            tap.limit_sent = true;
            if let Some(tx) = &self.limit_tx {
                log::debug!("recorder: max recording length reached, requesting stop");
                let _ = tx.send(());
            }
        }
    }
}

impl RecordingResource for MicRecorder {
    fn start(&self) -> Result<RecordingHandle, CaptureError> {
        let mut tap = self.tap.lock().unwrap();
        if tap.session.is_some() {
            return Err(CaptureError::SessionActive);
        }

        let token = tap.next_token;
        tap.next_token += 1;
        tap.session = Some(token);
        tap.limit_sent = false;
        tap.buf.clear();

        Ok(RecordingHandle { token })
    }

    fn stop(&self, handle: RecordingHandle) -> Result<Vec<f32>, CaptureError> {
        let mut tap = self.tap.lock().unwrap();
        if tap.session != Some(handle.token) {
            log::debug!("recorder: stop with stale handle {:?}", handle);
            return Ok(Vec::new());
        }
        tap.session = None;
        Ok(tap.buf.drain())
    }

    fn cancel(&self, handle: RecordingHandle) {
        let mut tap = self.tap.lock().unwrap();
        if tap.session != Some(handle.token) {
            return;
        }
        tap.session = None;
        tap.buf.clear();
    }
}

// ---------------------------------------------------------------------------
// MockRecorder  (test-only)
// ---------------------------------------------------------------------------

/// Test double with a canned buffer and call counters.
#[cfg(test)]
pub struct MockRecorder {
    /// Samples returned by `stop`.
    pub buffer: Vec<f32>,
    /// When `true`, `start` fails with [`CaptureError::NoDevice`].
    pub fail_start: bool,
    started: std::sync::atomic::AtomicUsize,
    cancelled: std::sync::atomic::AtomicUsize,
    next_token: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl MockRecorder {
    pub fn with_buffer(buffer: Vec<f32>) -> Self {
        Self {
            buffer,
            fail_start: false,
            started: std::sync::atomic::AtomicUsize::new(0),
            cancelled: std::sync::atomic::AtomicUsize::new(0),
            next_token: std::sync::atomic::AtomicU64::new(1),
        }
    }

    pub fn failing() -> Self {
        let mut mock = Self::with_buffer(Vec::new());
        mock.fail_start = true;
        mock
    }

    pub fn start_count(&self) -> usize {
        self.started.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn cancel_count(&self) -> usize {
        self.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl RecordingResource for MockRecorder {
    fn start(&self) -> Result<RecordingHandle, CaptureError> {
        if self.fail_start {
            return Err(CaptureError::NoDevice);
        }
        self.started
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let token = self
            .next_token
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(RecordingHandle { token })
    }

    fn stop(&self, _handle: RecordingHandle) -> Result<Vec<f32>, CaptureError> {
        Ok(self.buffer.clone())
    }

    fn cancel(&self, _handle: RecordingHandle) {
        self.cancelled
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(max: usize) -> MicRecorder {
        MicRecorder::new(max, None)
    }

    #[test]
    fn feed_without_session_is_dropped() {
        let rec = recorder(1_000);
        rec.feed(&[0.1; 100]);

        let handle = rec.start().unwrap();
        let audio = rec.stop(handle).unwrap();
        assert!(audio.is_empty());
    }

    #[test]
    fn start_feed_stop_drains_session_audio() {
        let rec = recorder(1_000);
        let handle = rec.start().unwrap();
        rec.feed(&[0.1; 100]);
        rec.feed(&[0.2; 50]);

        let audio = rec.stop(handle).unwrap();
        assert_eq!(audio.len(), 150);
        assert!((audio[0] - 0.1).abs() < 1e-6);
        assert!((audio[149] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn second_start_while_open_fails() {
        let rec = recorder(1_000);
        let _handle = rec.start().unwrap();
        assert!(matches!(rec.start(), Err(CaptureError::SessionActive)));
    }

    #[test]
    fn cancel_discards_audio_and_frees_the_session() {
        let rec = recorder(1_000);
        let handle = rec.start().unwrap();
        rec.feed(&[0.5; 200]);
        rec.cancel(handle);

        // A fresh session starts empty.
        let handle = rec.start().unwrap();
        let audio = rec.stop(handle).unwrap();
        assert!(audio.is_empty());
    }

    #[test]
    fn stale_stop_returns_empty_without_touching_open_session() {
        let rec = recorder(1_000);
        let current = rec.start().unwrap();
        rec.feed(&[0.3; 40]);

        let stale = RecordingHandle { token: 999 };
        assert!(rec.stop(stale).unwrap().is_empty());

        // The open session is unaffected.
        let audio = rec.stop(current).unwrap();
        assert_eq!(audio.len(), 40);
    }

    #[test]
    fn stale_cancel_is_a_no_op() {
        let rec = recorder(1_000);
        let current = rec.start().unwrap();
        rec.feed(&[0.3; 40]);

        rec.cancel(RecordingHandle { token: 999 });

        let audio = rec.stop(current).unwrap();
        assert_eq!(audio.len(), 40);
    }

    #[test]
    fn limit_notification_fires_exactly_once_per_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let rec = MicRecorder::new(100, Some(tx));

        let handle = rec.start().unwrap();
        rec.feed(&[0.0; 60]);
        assert!(rx.try_recv().is_err());

        rec.feed(&[0.0; 60]); // crosses the limit
        assert!(rx.try_recv().is_ok());

        rec.feed(&[0.0; 60]); // still over the limit — no second signal
        assert!(rx.try_recv().is_err());

        let _ = rec.stop(handle);

        // A new session re-arms the notification.
        let handle = rec.start().unwrap();
        rec.feed(&[0.0; 120]);
        assert!(rx.try_recv().is_ok());
        let _ = rec.stop(handle);
    }

    #[test]
    fn session_audio_is_capped_to_the_limit() {
        let rec = recorder(100);
        let handle = rec.start().unwrap();
        rec.feed(&[0.0; 250]);
        let audio = rec.stop(handle).unwrap();
        assert_eq!(audio.len(), 100);
    }
}
