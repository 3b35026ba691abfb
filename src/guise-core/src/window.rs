//! The patch window state machine.
//!
//! A verification flow issues several rapid successive security-service
//! lookups. On the first one the window applies the certified properties
//! and arms a revert timer; each further lookup while patched re-arms the
//! timer instead of stacking a second one, so the properties stay stable
//! across the burst and revert promptly once the flow goes quiet.
//!
//! Every state read and write, every effect, and all timer bookkeeping
//! happen under one mutex, so a revert can never race a concurrent re-arm.
//! An epoch counter makes a timer fire that lost the cancellation race a
//! no-op.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tracing::debug;

use crate::timer::{Scheduler, TimerHandle};

/// Side effect run by the window on entry and on revert.
pub type Effect = Arc<dyn Fn() + Send + Sync>;

/// Patch window states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Original properties active, no timer pending.
    Idle,
    /// Certified properties active, revert timer armed.
    Patched,
}

struct WindowInner {
    state: WindowState,
    epoch: u64,
    pending: Option<TimerHandle>,
}

/// Debounced, timed swap between two property sets.
///
/// The window itself is policy-free: the patch and revert effects are
/// injected, so the machine can be tested standalone.
pub struct PatchWindow {
    inner: Mutex<WindowInner>,
    scheduler: Arc<dyn Scheduler>,
    duration: Duration,
    on_patch: Effect,
    on_revert: Effect,
    /// Self-reference handed to timer callbacks; a fire after the window
    /// is dropped upgrades to nothing.
    weak: Weak<PatchWindow>,
}

impl PatchWindow {
    /// Create a window over the given scheduler and effects.
    #[must_use]
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        duration: Duration,
        on_patch: Effect,
        on_revert: Effect,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            inner: Mutex::new(WindowInner {
                state: WindowState::Idle,
                epoch: 0,
                pending: None,
            }),
            scheduler,
            duration,
            on_patch,
            on_revert,
            weak: weak.clone(),
        })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> WindowState {
        self.inner
            .lock()
            .map(|inner| inner.state)
            .unwrap_or(WindowState::Idle)
    }

    /// Trigger the window.
    ///
    /// Idle: run the patch effect and arm the revert timer. Patched: cancel
    /// the pending timer and arm a fresh one without re-running the patch
    /// effect (it is already active).
    pub fn trigger(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        if let Some(handle) = inner.pending.take() {
            handle.cancel();
        }
        inner.epoch += 1;
        let epoch = inner.epoch;

        match inner.state {
            WindowState::Idle => {
                inner.state = WindowState::Patched;
                debug!(epoch, "patch window opened");
                (self.on_patch)();
            }
            WindowState::Patched => {
                debug!(epoch, "patch window re-armed");
            }
        }

        let window = self.weak.clone();
        let handle = self.scheduler.schedule(
            self.duration,
            Box::new(move || {
                if let Some(window) = window.upgrade() {
                    window.expire(epoch);
                }
            }),
        );
        inner.pending = Some(handle);
    }

    /// Timer delivery. Ignored unless `epoch` still names the most recent
    /// arming: a cancelled timer whose fire was already in flight lands
    /// here and does nothing.
    fn expire(&self, epoch: u64) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if inner.epoch != epoch || inner.state != WindowState::Patched {
            debug!(epoch, current = inner.epoch, "stale patch window timer");
            return;
        }
        inner.state = WindowState::Idle;
        inner.pending = None;
        debug!(epoch, "patch window closed");
        (self.on_revert)();
    }
}
