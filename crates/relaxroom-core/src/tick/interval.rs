//! Tokio-backed tick source.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{TickCallback, TickHandle, TickSource};

/// Drives the callback from a `tokio::time::interval` task.
///
/// Late wake-ups are skipped rather than bursted, so a stalled runtime
/// produces one delayed tick instead of a backlog.
pub struct IntervalTicker {
    runtime: Handle,
    period: Duration,
    next_id: u64,
    active: Option<(TickHandle, JoinHandle<()>)>,
}

impl IntervalTicker {
    /// A zero period is raised to 1ms; `tokio::time::interval` rejects zero.
    pub fn new(runtime: Handle, period: Duration) -> Self {
        Self {
            runtime,
            period: period.max(Duration::from_millis(1)),
            next_id: 0,
            active: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl TickSource for IntervalTicker {
    fn arm(&mut self, mut callback: TickCallback) -> TickHandle {
        if let Some(previous) = self.active.as_ref().map(|(handle, _)| *handle) {
            self.disarm(previous);
        }

        self.next_id += 1;
        let handle = TickHandle::new(self.next_id);
        let period = self.period;
        let task = self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                callback();
            }
        });
        tracing::trace!(
            handle = handle.id(),
            period_ms = period.as_millis() as u64,
            "tick source armed"
        );
        self.active = Some((handle, task));
        handle
    }

    fn disarm(&mut self, handle: TickHandle) {
        match &self.active {
            Some((current, _)) if *current == handle => {
                if let Some((_, task)) = self.active.take() {
                    task.abort();
                }
                tracing::trace!(handle = handle.id(), "tick source disarmed");
            }
            _ => {}
        }
    }

    fn is_armed(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        if let Some((_, task)) = self.active.take() {
            task.abort();
        }
    }
}
