//! In-memory relax history.
//!
//! The session hands each [`RelaxEvent`] to its caller; this log is where a
//! front end keeps them for display. Newest entries come first. Nothing is
//! written to disk.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

use crate::events::RelaxEvent;

#[derive(Debug, Clone, Default)]
pub struct RelaxRecords {
    entries: Vec<RelaxEvent>,
}

/// Display row for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    /// `HH:MM`
    pub time: String,
    /// `YYYY/MM/DD`
    pub date: String,
    /// `#n`
    pub label: String,
}

impl RelaxRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: RelaxEvent) {
        self.entries.insert(0, event);
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &RelaxEvent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&RelaxEvent> {
        self.entries.first()
    }

    /// Relaxes whose timestamp falls on `day` in `tz`.
    pub fn count_on<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> usize {
        self.entries
            .iter()
            .filter(|e| e.timestamp.with_timezone(tz).date_naive() == day)
            .count()
    }

    pub fn rows<Tz: TimeZone>(&self, tz: &Tz) -> Vec<RecordRow>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.entries.iter().map(|e| row_for(e, tz)).collect()
    }
}

pub fn row_for<Tz: TimeZone>(event: &RelaxEvent, tz: &Tz) -> RecordRow
where
    Tz::Offset: std::fmt::Display,
{
    let local: DateTime<Tz> = event.timestamp.with_timezone(tz);
    RecordRow {
        time: local.format("%H:%M").to_string(),
        date: local.format("%Y/%m/%d").to_string(),
        label: format!("#{}", event.sequence_number),
    }
}

/// Idle-screen line summarising the day.
pub fn daily_summary(count_today: usize) -> String {
    if count_today > 0 {
        format!("You've relaxed {count_today} times today")
    } else {
        "Start your first relax of the day".to_string()
    }
}
