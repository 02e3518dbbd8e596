mod config;
mod controller;
mod engine;
mod snapshot;

pub use config::{DurationUnit, SessionConfig, DEFAULT_DURATION_MS};
pub use controller::RelaxController;
pub use engine::RelaxSession;
pub use snapshot::{format_remaining, SessionSnapshot, SessionStatus};
