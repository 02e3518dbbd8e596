//! Relax token state machine.
//!
//! A wall-clock driven session: the caller (normally [`RelaxController`]
//! through its tick source) invokes `on_tick()` periodically and the engine
//! compares the clock against an absolute cycle deadline, so late or uneven
//! ticks never make the countdown drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --stop--> Idle
//!                 Running --start--> Running (fresh session)
//! ```
//!
//! While running, every cycle boundary (a token accrued by `on_tick` or
//! spent by `consume`) resets the deadline to `now + duration`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = RelaxSession::new(SystemClock::new());
//! session.start(SessionConfig::new(60_000)?);
//! // Periodically:
//! session.on_tick(); // Some(Event::TokenAccrued) when a cycle completes
//! session.consume(); // Some(RelaxEvent) while balance > 0
//! ```
//!
//! [`RelaxController`]: super::RelaxController

use tracing::{debug, info};

use super::config::SessionConfig;
use super::snapshot::{format_remaining, hint_for, prompt_for, SessionSnapshot, SessionStatus};
use crate::clock::{epoch_ms_to_utc, Clock};
use crate::events::{Event, RelaxEvent};

const INITIAL_BALANCE: u64 = 1;

#[derive(Debug, Clone)]
pub struct RelaxSession<C: Clock> {
    clock: C,
    config: SessionConfig,
    status: SessionStatus,
    balance: u64,
    /// Epoch ms at which the current cycle ends. `None` iff idle.
    cycle_deadline_ms: Option<u64>,
    remaining_ms: Option<u64>,
    total_consumed: u64,
}

impl<C: Clock> RelaxSession<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            config: SessionConfig::default(),
            status: SessionStatus::Idle,
            balance: INITIAL_BALANCE,
            cycle_deadline_ms: None,
            remaining_ms: None,
            total_consumed: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn cycle_deadline_ms(&self) -> Option<u64> {
        self.cycle_deadline_ms
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.remaining_ms
    }

    pub fn total_consumed(&self) -> u64 {
        self.total_consumed
    }

    /// The configuration of the current (or last) session.
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// 0.0 .. 100.0 progress through the current cycle. Always 0 while idle.
    pub fn progress_pct(&self) -> f64 {
        let Some(remaining) = self.remaining_ms else {
            return 0.0;
        };
        let total = self.config.duration_ms();
        let elapsed = total.saturating_sub(remaining);
        (100.0 * elapsed as f64 / total as f64).clamp(0.0, 100.0)
    }

    pub fn remaining_display(&self) -> String {
        self.remaining_ms.map(format_remaining).unwrap_or_default()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            running: self.is_running(),
            balance: self.balance,
            duration_ms: self.config.duration_ms(),
            cycle_deadline_ms: self.cycle_deadline_ms,
            remaining_ms: self.remaining_ms,
            remaining_display: self.remaining_display(),
            progress_pct: self.progress_pct(),
            total_consumed: self.total_consumed,
            can_relax: self.is_running() && self.balance > 0,
            prompt: prompt_for(self.balance).to_string(),
            hint: hint_for(self.balance).to_string(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a session. Restarts from scratch if one is already running.
    pub fn start(&mut self, config: SessionConfig) -> Event {
        if self.is_running() {
            debug!(
                balance = self.balance,
                total_consumed = self.total_consumed,
                "restarting running session"
            );
        }
        let now = self.clock.now_ms();
        self.config = config;
        self.status = SessionStatus::Running;
        self.balance = INITIAL_BALANCE;
        self.total_consumed = 0;
        let deadline = self.reset_cycle(now);
        info!(duration_ms = config.duration_ms(), deadline, "relax session started");
        Event::SessionStarted {
            duration_ms: config.duration_ms(),
            cycle_deadline_ms: deadline,
            at: epoch_ms_to_utc(now),
        }
    }

    /// Return to idle. Safe to call repeatedly; only the first call on a
    /// running session produces an event.
    pub fn stop(&mut self) -> Option<Event> {
        let was_running = self.is_running();
        let total_consumed = self.total_consumed;
        self.status = SessionStatus::Idle;
        self.balance = INITIAL_BALANCE;
        self.cycle_deadline_ms = None;
        self.remaining_ms = None;
        self.total_consumed = 0;

        if !was_running {
            return None;
        }
        info!(total_consumed, "relax session stopped");
        Some(Event::SessionStopped {
            total_consumed,
            at: self.clock.now_utc(),
        })
    }

    /// Re-evaluate the countdown. Returns `Some(Event::TokenAccrued)` when the
    /// cycle deadline has passed.
    ///
    /// A tick that arrives several cycles late still adds exactly one token.
    pub fn on_tick(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        let deadline = self.cycle_deadline_ms?;
        let now = self.clock.now_ms();
        let remaining = deadline.saturating_sub(now);

        if remaining > 0 {
            self.remaining_ms = Some(remaining);
            return None;
        }

        self.balance = self.balance.saturating_add(1);
        let next_deadline = self.reset_cycle(now);
        debug!(
            balance = self.balance,
            late_by_ms = now - deadline,
            next_deadline,
            "relax token accrued"
        );
        Some(Event::TokenAccrued {
            balance: self.balance,
            cycle_deadline_ms: next_deadline,
            at: epoch_ms_to_utc(now),
        })
    }

    /// Spend one token. Returns `None` (and changes nothing) while idle or
    /// when the balance is empty.
    pub fn consume(&mut self) -> Option<RelaxEvent> {
        if !self.is_running() {
            debug!("consume ignored: session idle");
            return None;
        }
        if self.balance == 0 {
            debug!("consume ignored: no relax tokens left");
            return None;
        }

        let now = self.clock.now_ms();
        self.balance -= 1;
        self.total_consumed += 1;
        self.reset_cycle(now);
        let relax = RelaxEvent::new(epoch_ms_to_utc(now), self.total_consumed);
        info!(
            sequence_number = relax.sequence_number,
            balance = self.balance,
            "relax token consumed"
        );
        Some(relax)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Shared by accrual and consumption: the whole cycle starts over.
    fn reset_cycle(&mut self, now: u64) -> u64 {
        let duration = self.config.duration_ms();
        let deadline = now.saturating_add(duration);
        self.cycle_deadline_ms = Some(deadline);
        self.remaining_ms = Some(duration);
        deadline
    }
}
