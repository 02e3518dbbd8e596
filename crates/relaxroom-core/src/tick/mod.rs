//! Periodic wake-up primitives.
//!
//! A tick source invokes one callback at a fixed cadence while armed and
//! nothing afterwards. It knows nothing about sessions; the controller owns
//! the only handle and decides when to arm and disarm.

mod interval;
mod manual;

pub use interval::IntervalTicker;
pub use manual::ManualTicker;

/// Default cadence, fine enough for a continuous-looking countdown.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;

pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

/// Identifies one arming of a tick source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait TickSource: Send {
    /// Start invoking `callback` periodically. Any previous arming is
    /// disarmed first, so at most one callback is ever active.
    fn arm(&mut self, callback: TickCallback) -> TickHandle;

    /// Stop future invocations. Stale or already disarmed handles are ignored.
    fn disarm(&mut self, handle: TickHandle);

    fn is_armed(&self) -> bool;
}
