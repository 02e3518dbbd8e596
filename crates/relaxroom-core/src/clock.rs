//! Time sources for the session engine.
//!
//! All session arithmetic happens in milliseconds since the Unix epoch.
//! [`SystemClock`] anchors a monotonic [`Instant`] to the wall clock once, so
//! the countdown cannot jump when the system clock is adjusted while the
//! timestamps it produces still line up with real time. [`ManualClock`] is
//! advanced by hand and is what tests and simulations use.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeZone, Utc};

/// A source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync + 'static {
    fn now_ms(&self) -> u64;

    fn now_utc(&self) -> DateTime<Utc> {
        epoch_ms_to_utc(self.now_ms())
    }
}

/// Monotonic wall-clock aligned time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    anchor: Instant,
    anchor_epoch_ms: u64,
}

impl SystemClock {
    pub fn new() -> Self {
        let anchor_epoch_ms = Utc::now().timestamp_millis().max(0) as u64;
        Self {
            anchor: Instant::now(),
            anchor_epoch_ms,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        let elapsed = self.anchor.elapsed().as_millis() as u64;
        self.anchor_epoch_ms.saturating_add(elapsed)
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

pub fn epoch_ms_to_utc(ms: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms as i64)
        .single()
        .unwrap_or_default()
}
