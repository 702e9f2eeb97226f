//! Merged order timeline: the server's status history and the manager's
//! tracking events as one chronological feed.
//!
//! Entries are ordered by timestamp. Equal timestamps keep status entries
//! before tracking entries and keep input order within one source. Entries
//! whose date is missing or unparseable go after every dated entry.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::models::{Order, StatusChange, TrackingEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    Status,
    Tracking,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Status => "status",
            EntrySource::Tracking => "tracking",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub source: EntrySource,
    pub status: String,
    /// Parsed timestamp, `None` when the date is missing or malformed
    pub at: Option<DateTime<Utc>>,
    /// Date exactly as the server sent it
    pub date: Option<String>,
    pub location: Option<String>,
    pub note: Option<String>,
}

impl TimelineEntry {
    fn from_status(change: &StatusChange) -> Self {
        Self {
            source: EntrySource::Status,
            status: change.status.clone(),
            at: change.date.as_deref().and_then(parse_timestamp),
            date: change.date.clone(),
            location: None,
            note: None,
        }
    }

    fn from_tracking(event: &TrackingEvent) -> Self {
        Self {
            source: EntrySource::Tracking,
            status: event.status.clone(),
            at: event.date.as_deref().and_then(parse_timestamp),
            date: event.date.clone(),
            location: event.location.clone(),
            note: event.note.clone(),
        }
    }
}

/// Parse a server date: RFC 3339, or a naive datetime / date taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Merge status history and tracking events into one sorted feed
pub fn merge(history: &[StatusChange], tracking: &[TrackingEvent]) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = history
        .iter()
        .map(TimelineEntry::from_status)
        .chain(tracking.iter().map(TimelineEntry::from_tracking))
        .collect();

    // sort_by_key is stable: within one source, input order survives
    entries.sort_by_key(|entry| (entry.at.is_none(), entry.at, entry.source));
    entries
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub tracking_id: String,
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn from_order(order: &Order) -> Self {
        Self {
            tracking_id: order.tracking_id.clone(),
            entries: merge(&order.status_history, &order.tracking),
        }
    }

    /// Most recent dated entry, or the last undated one if nothing is dated
    pub fn latest(&self) -> Option<&TimelineEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.at.is_some())
            .or_else(|| self.entries.last())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
