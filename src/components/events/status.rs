use crate::error::{invalid_date_error, AppResult};
use chrono::NaiveDate;

/// Wire and display format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where an event sits relative to the current calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    /// Falls on the current calendar day
    Today,
    /// Within the configured upcoming window, endpoint included
    Upcoming,
    /// Beyond the upcoming window
    Future,
    /// Before the current calendar day
    Past,
}

impl EventStatus {
    /// Section heading used by renderers, in display order
    pub const DISPLAY_ORDER: [EventStatus; 4] = [
        EventStatus::Today,
        EventStatus::Upcoming,
        EventStatus::Future,
        EventStatus::Past,
    ];

    pub fn heading(&self) -> &'static str {
        match self {
            EventStatus::Today => "Today",
            EventStatus::Upcoming => "Upcoming",
            EventStatus::Future => "Future",
            EventStatus::Past => "Past",
        }
    }
}

/// Parse a YYYY-MM-DD date string
///
/// This is the single gate for event dates; anything that classifies or
/// counts down goes through here first.
pub fn parse_event_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        invalid_date_error(&format!(
            "'{}' is not a valid calendar date (expected YYYY-MM-DD)",
            value.trim()
        ))
    })
}

/// Classify an event date against a reference day
///
/// Time-of-day never enters into it; only whole calendar days are compared.
pub fn classify(event_date: NaiveDate, today: NaiveDate, window_days: i64) -> EventStatus {
    let diff = (event_date - today).num_days();
    if diff == 0 {
        EventStatus::Today
    } else if diff < 0 {
        EventStatus::Past
    } else if diff <= window_days {
        EventStatus::Upcoming
    } else {
        EventStatus::Future
    }
}

/// Human-readable label for an event date relative to a reference day
pub fn relative_label(event_date: NaiveDate, today: NaiveDate, window_days: i64) -> String {
    let diff = (event_date - today).num_days();
    match diff {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        d if d < -1 => format!("{} days ago", -d),
        d if d <= window_days => format!("In {} days", d),
        _ => long_date(event_date),
    }
}

/// Long absolute form, e.g. "January 8, 2026"
pub fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
