//! Event model

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{default_true, double_option};

/// A dated federation event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    /// Free text, usually `HH:MM`
    pub event_time: Option<String>,
    pub location: Option<String>,
    pub event_type: Option<String>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

/// Filters for listing events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub include_hidden: bool,
    /// Restrict to one calendar month (`(year, month)`)
    pub month: Option<(i32, u32)>,
}

impl EventFilter {
    /// Inclusive start and exclusive end of the month filter, if any
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (year, month) = self.month?;
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = if start.month() == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some((start, end))
    }
}

/// Input for creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventInput {
    pub title: String,
    pub event_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl CreateEventInput {
    pub fn new(title: impl Into<String>, event_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            event_date,
            description: None,
            event_time: None,
            location: None,
            event_type: None,
            is_visible: true,
        }
    }
}

/// Partial update of an event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub event_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_range() {
        let filter = EventFilter {
            include_hidden: false,
            month: Some((2026, 2)),
        };
        let (start, end) = filter.date_range().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn test_december_range_wraps_year() {
        let filter = EventFilter {
            include_hidden: false,
            month: Some((2025, 12)),
        };
        let (_, end) = filter.date_range().unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn test_invalid_month_has_no_range() {
        let filter = EventFilter {
            include_hidden: false,
            month: Some((2025, 13)),
        };
        assert!(filter.date_range().is_none());
    }
}
