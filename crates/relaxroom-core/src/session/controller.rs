//! Session controller: a [`RelaxSession`] wired to a [`TickSource`].
//!
//! Tick sources may deliver from another thread (a Tokio worker for
//! [`IntervalTicker`](crate::tick::IntervalTicker)), so the session and its
//! pending events sit behind a single mutex shared by the tick callback and
//! every user-facing operation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::warn;

use super::config::SessionConfig;
use super::engine::RelaxSession;
use super::snapshot::SessionSnapshot;
use crate::clock::Clock;
use crate::error::ValidationError;
use crate::events::{Event, RelaxEvent};
use crate::tick::{TickHandle, TickSource};

struct Shared<C: Clock> {
    session: RelaxSession<C>,
    pending: Vec<Event>,
}

impl<C: Clock> Shared<C> {
    fn push(&mut self, event: Option<Event>) {
        if let Some(event) = event {
            self.pending.push(event);
        }
    }
}

pub struct RelaxController<C: Clock, T: TickSource> {
    shared: Arc<Mutex<Shared<C>>>,
    ticker: T,
    armed: Option<TickHandle>,
}

impl<C: Clock, T: TickSource> RelaxController<C, T> {
    pub fn new(clock: C, ticker: T) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                session: RelaxSession::new(clock),
                pending: Vec::new(),
            })),
            ticker,
            armed: None,
        }
    }

    /// Start a session of `duration_ms` per token.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero duration; the controller stays as it was.
    pub fn start(&mut self, duration_ms: u64) -> Result<SessionSnapshot, ValidationError> {
        let config = SessionConfig::new(duration_ms).map_err(|e| {
            warn!(duration_ms, error = %e, "rejected session configuration");
            e
        })?;
        Ok(self.start_with(config))
    }

    pub fn start_with(&mut self, config: SessionConfig) -> SessionSnapshot {
        self.disarm();
        let snapshot = {
            let mut shared = self.lock();
            let started = shared.session.start(config);
            shared.pending.push(started);
            shared.session.snapshot()
        };
        self.arm();
        snapshot
    }

    /// Stop the session and the tick source. Harmless when already idle.
    pub fn stop(&mut self) -> SessionSnapshot {
        self.disarm();
        let mut shared = self.lock();
        let stopped = shared.session.stop();
        shared.push(stopped);
        shared.session.snapshot()
    }

    /// Spend one relax token, if the session is running and has one.
    pub fn consume(&mut self) -> Option<RelaxEvent> {
        let mut shared = self.lock();
        let relax = shared.session.consume()?;
        let balance = shared.session.balance();
        shared.pending.push(Event::Relaxed {
            relax: relax.clone(),
            balance,
        });
        Some(relax)
    }

    /// Run the tick handler inline, as the tick source would.
    pub fn tick(&self) -> Option<Event> {
        let mut shared = self.lock();
        let event = shared.session.on_tick();
        shared.push(event.clone());
        event
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().session.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.lock().session.is_running()
    }

    /// Take every event produced since the last call, oldest first.
    pub fn drain_events(&self) -> Vec<Event> {
        std::mem::take(&mut self.lock().pending)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some() && self.ticker.is_armed()
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self) {
        let weak: Weak<Mutex<Shared<C>>> = Arc::downgrade(&self.shared);
        let handle = self.ticker.arm(Box::new(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
            let event = shared.session.on_tick();
            shared.push(event);
        }));
        self.armed = Some(handle);
    }

    fn disarm(&mut self) {
        if let Some(handle) = self.armed.take() {
            self.ticker.disarm(handle);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared<C>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock, T: TickSource> Drop for RelaxController<C, T> {
    fn drop(&mut self) {
        self.disarm();
    }
}
