//! # Relaxroom Core Library
//!
//! Core logic for the Relaxroom break-reminder timer. A session hands out
//! one "relax token" per configured duration; spending a token starts the
//! countdown over. Front ends (the CLI here) stay thin and drive everything
//! through this crate.
//!
//! ## Architecture
//!
//! - **Session Engine**: a wall-clock based state machine
//!   ([`RelaxSession`]) that compares "now" against an absolute deadline on
//!   every tick, so the countdown never drifts
//! - **Tick Sources**: periodic wake-ups behind the [`TickSource`] trait
//!   (Tokio interval or hand-fired for tests)
//! - **Controller**: [`RelaxController`] owns a session and its tick source
//!   and serializes tick delivery with user calls
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`RelaxController`]: start / stop / consume / snapshot
//! - [`Clock`]: injectable time source
//! - [`Event`]: every state change, serializable for front ends
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod records;
pub mod session;
pub mod storage;
pub mod tick;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{Event, RelaxEvent};
pub use records::RelaxRecords;
pub use session::{
    DurationUnit, RelaxController, RelaxSession, SessionConfig, SessionSnapshot, SessionStatus,
};
pub use storage::Config;
pub use tick::{IntervalTicker, ManualTicker, TickHandle, TickSource};
