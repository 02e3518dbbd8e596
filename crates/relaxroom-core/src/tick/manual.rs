//! Hand-driven tick source for tests and simulations.

use std::sync::{Arc, Mutex, PoisonError};

use super::{TickCallback, TickHandle, TickSource};

#[derive(Default)]
struct Inner {
    next_id: u64,
    active: Option<(TickHandle, TickCallback)>,
    arm_count: u64,
}

/// Stores the armed callback and invokes it on [`ManualTicker::fire`].
///
/// Clones share state, so a test can keep one clone while the controller
/// owns another.
#[derive(Clone, Default)]
pub struct ManualTicker {
    inner: Arc<Mutex<Inner>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick. Returns false when nothing is armed.
    pub fn fire(&self) -> bool {
        let taken = self.lock().active.take();
        let Some((handle, mut callback)) = taken else {
            return false;
        };
        callback();
        let mut inner = self.lock();
        // Re-arming or disarming during the callback wins over restoring it.
        if inner.active.is_none() && inner.next_id == handle.id() {
            inner.active = Some((handle, callback));
        }
        true
    }

    /// Total number of `arm` calls so far.
    pub fn arm_count(&self) -> u64 {
        self.lock().arm_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TickSource for ManualTicker {
    fn arm(&mut self, callback: TickCallback) -> TickHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        inner.arm_count += 1;
        let handle = TickHandle::new(inner.next_id);
        inner.active = Some((handle, callback));
        handle
    }

    fn disarm(&mut self, handle: TickHandle) {
        let mut inner = self.lock();
        if matches!(&inner.active, Some((current, _)) if *current == handle) {
            inner.active = None;
        }
        // A handle taken out by `fire` must not come back.
        if inner.next_id == handle.id() {
            inner.next_id += 1;
        }
    }

    fn is_armed(&self) -> bool {
        self.lock().active.is_some()
    }
}
