//! Dedicated OS-thread key listener using `rdev::listen`.
//!
//! `rdev::listen` is a blocking call that must live on its own OS thread.
//! [`KeyListener`] owns that thread and a stop flag; dropping it sets the
//! flag so the callback silently ignores further events.
//!
//! Only transitions for the *watched* keys (those participating in some
//! configured chord) are forwarded — the arming monitor never sees the rest
//! of the keyboard.
//!
//! # Shutdown caveat
//!
//! `rdev::listen` has **no graceful shutdown API**. Setting the stop flag
//! prevents events from being forwarded, but the OS thread itself will
//! remain blocked in the rdev event loop until the process exits. This is
//! safe and expected — rdev holds no resources that need explicit cleanup.

use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use super::{normalize_key, KeyInput};

// ---------------------------------------------------------------------------
// KeyListener
// ---------------------------------------------------------------------------

/// Handle to a running key listener thread.
///
/// Construct one with [`KeyListener::start`]. Drop it to stop forwarding
/// events. The underlying OS thread continues to exist until the process
/// exits because `rdev::listen` cannot be interrupted, but it consumes no
/// meaningful CPU while blocked waiting for keyboard events.
pub struct KeyListener {
    /// Shared stop flag — set `true` on [`Drop`].
    stop: Arc<AtomicBool>,
    /// The thread handle. Kept alive so the thread is not detached
    /// prematurely; we never `join` it because `rdev::listen` never returns.
    _thread: std::thread::JoinHandle<()>,
}

impl KeyListener {
    /// Spawn a dedicated OS thread that forwards press/release transitions
    /// of the `watched` keys as [`KeyInput`]s on `tx`.
    ///
    /// `watched` is compared against the *normalized* key (right-hand
    /// modifiers fold onto the left), so callers can pass the set returned
    /// by `ArmingMonitor::watched_keys` directly.
    ///
    /// The background thread uses `blocking_send` so it works correctly from
    /// a non-async context.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to create the thread (extremely unlikely).
    pub fn start(watched: HashSet<rdev::Key>, tx: mpsc::Sender<KeyInput>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("key-listener".into())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    // Bail out if the listener has been stopped.
                    if stop_clone.load(Ordering::Relaxed) {
                        return;
                    }

                    let (key, is_down) = match event.event_type {
                        rdev::EventType::KeyPress(k) => (k, true),
                        rdev::EventType::KeyRelease(k) => (k, false),
                        _ => return,
                    };

                    if !watched.contains(&normalize_key(key)) {
                        return;
                    }

                    // blocking_send is safe to call from non-async threads.
                    let _ = tx.blocking_send(KeyInput { key, is_down });
                });

                if let Err(e) = result {
                    log::error!("key-listener: rdev::listen exited with error: {:?}", e);
                }
            })
            .expect("failed to spawn key-listener thread");

        Self {
            stop,
            _thread: thread,
        }
    }
}

impl Drop for KeyListener {
    /// Set the stop flag so the rdev callback stops forwarding events.
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        // The OS thread continues to exist blocked inside rdev::listen until
        // the process exits — this is safe and requires no further cleanup.
    }
}
