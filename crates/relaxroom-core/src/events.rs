use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionSnapshot;

/// Record of one spent relax token.
///
/// Once emitted it belongs to the caller; stopping a session does not touch
/// records that were already handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaxEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Running count of relaxes in the session at the time of emission.
    pub sequence_number: u64,
}

impl RelaxEvent {
    pub fn new(timestamp: DateTime<Utc>, sequence_number: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            sequence_number,
        }
    }
}

/// Every state change in a session produces an Event.
/// Front ends poll for them with `RelaxController::drain_events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        duration_ms: u64,
        cycle_deadline_ms: u64,
        at: DateTime<Utc>,
    },
    /// A cycle ran out and one token was added.
    TokenAccrued {
        balance: u64,
        cycle_deadline_ms: u64,
        at: DateTime<Utc>,
    },
    Relaxed {
        relax: RelaxEvent,
        /// Balance left after spending the token.
        balance: u64,
    },
    SessionStopped {
        total_consumed: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot(SessionSnapshot),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::epoch_ms_to_utc;

    #[test]
    fn events_serialize_with_snake_case_type_tag() {
        let event = Event::TokenAccrued {
            balance: 2,
            cycle_deadline_ms: 2_000,
            at: epoch_ms_to_utc(1_000),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "token_accrued");
        assert_eq!(json["balance"], 2);
        assert_eq!(json["cycle_deadline_ms"], 2_000);
    }

    #[test]
    fn relaxed_event_roundtrips_through_json() {
        let event = Event::Relaxed {
            relax: RelaxEvent::new(epoch_ms_to_utc(5_000), 1),
            balance: 0,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"relaxed\""));
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn relax_event_ids_are_unique() {
        let at = epoch_ms_to_utc(0);
        assert_ne!(RelaxEvent::new(at, 1).id, RelaxEvent::new(at, 1).id);
    }
}
