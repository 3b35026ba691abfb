//! Cancellable one-shot timers.
//!
//! The patch window needs exactly one timer primitive: schedule a callback
//! after a delay, with the option to cancel before it fires. The
//! [`Scheduler`] trait keeps the state machine independent of the OS timer
//! mechanism; [`ThreadScheduler`] is the production implementation.

use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Callback invoked when a timer expires uncancelled.
pub type TimerCallback = Box<dyn FnOnce() + Send>;

/// One-shot timer source.
pub trait Scheduler: Send + Sync {
    /// Run `callback` after `delay` unless the returned handle is cancelled
    /// first.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

struct HandleInner {
    cancelled: Mutex<bool>,
    signal: Condvar,
}

/// Handle to a pending timer. Cancellation is best-effort: a fire that has
/// already been delivered cannot be recalled, which is why the patch window
/// also carries an epoch guard.
#[derive(Clone)]
pub struct TimerHandle {
    inner: Arc<HandleInner>,
}

impl TimerHandle {
    /// A fresh, uncancelled handle. Scheduler implementations create one
    /// per scheduled timer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                cancelled: Mutex::new(false),
                signal: Condvar::new(),
            }),
        }
    }

    /// Cancel the pending timer. Idempotent.
    pub fn cancel(&self) {
        if let Ok(mut cancelled) = self.inner.cancelled.lock() {
            *cancelled = true;
        }
        self.inner.signal.notify_all();
    }

    /// Whether the timer has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner
            .cancelled
            .lock()
            .map(|cancelled| *cancelled)
            .unwrap_or(true)
    }

    /// Block until the delay elapses or the handle is cancelled. Returns
    /// true when the timer expired uncancelled.
    fn wait_for(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let Ok(mut cancelled) = self.inner.cancelled.lock() else {
            return false;
        };
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            match self.inner.signal.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => cancelled = guard,
                Err(_) => return false,
            }
        }
        false
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Scheduler backed by one thread per pending timer.
///
/// The patch window holds at most one pending timer at a time, so the
/// thread count stays bounded at one per process in practice.
#[derive(Debug, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle::new();
        let waiter = handle.clone();
        thread::spawn(move || {
            if waiter.wait_for(delay) {
                callback();
            }
        });
        handle
    }
}
