use super::status::{parse_event_date, DATE_FORMAT};
use crate::error::AppResult;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to stored records that lost theirs
pub const UNTITLED_EVENT: &str = "Untitled event";

/// A stored reminder
///
/// Serialized with camelCase field names, matching the JSON arrays the
/// key-value store holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EventRecord {
    /// Opaque unique id, assigned at creation
    pub id: String,
    /// Display title, 3-100 characters after trimming
    pub title: String,
    /// Calendar date in YYYY-MM-DD form, canonicalized by validation
    pub date: String,
    /// Free-form description, empty when absent
    pub description: String,
    /// RFC 3339 creation timestamp, set once
    pub created_at: String,
    /// Optional category id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl EventRecord {
    /// The event date as a calendar date
    pub fn date_naive(&self) -> AppResult<NaiveDate> {
        parse_event_date(&self.date)
    }

    /// Fill in defaults for fields a stored record is missing.
    ///
    /// Running this twice changes nothing. Returns false when the record has
    /// no usable date and cannot be kept.
    pub fn repair(&mut self) -> bool {
        if self.id.trim().is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
        if self.title.trim().is_empty() {
            self.title = UNTITLED_EVENT.to_string();
        }
        if self.created_at.trim().is_empty() {
            self.created_at = Utc::now().to_rfc3339();
        }
        match parse_event_date(&self.date) {
            Ok(date) => {
                self.date = date.format(DATE_FORMAT).to_string();
                true
            }
            Err(_) => false,
        }
    }
}

/// User-supplied fields for creating or replacing an event
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub title: String,
    pub date: String,
    pub description: String,
    pub category: Option<String>,
}
