use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Running,
}

/// Read-only view of a session for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub running: bool,
    pub balance: u64,
    pub duration_ms: u64,
    pub cycle_deadline_ms: Option<u64>,
    /// `None` while idle.
    pub remaining_ms: Option<u64>,
    /// `M:SS`, empty while idle.
    pub remaining_display: String,
    pub progress_pct: f64,
    pub total_consumed: u64,
    pub can_relax: bool,
    pub prompt: String,
    pub hint: String,
}

/// Format a countdown as `M:SS`, rounding seconds up.
///
/// Minutes are not folded into hours: a one hour cycle reads `60:00`.
pub fn format_remaining(remaining_ms: u64) -> String {
    let seconds = remaining_ms.div_ceil(1000);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn prompt_for(balance: u64) -> &'static str {
    if balance > 0 {
        "RELAX"
    } else {
        "DON'T DO IT"
    }
}

pub fn hint_for(balance: u64) -> &'static str {
    if balance > 0 {
        "Let's be fun"
    } else {
        "No more, You can go work"
    }
}
