use super::model::{EventInput, EventRecord};
use super::status::{parse_event_date, DATE_FORMAT};
use crate::components::storage::{keys, StorageActorHandle};
use crate::error::{AppResult, Error, ValidationIssues};
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Title length bounds, counted in characters after trimming
pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 100;

/// In-memory collection of event records, mirrored to the key-value store
///
/// The in-memory state is authoritative; storage writes happen after every
/// mutation and a failed write only degrades persistence, never the data.
pub struct EventStore {
    events: Vec<EventRecord>,
    storage: StorageActorHandle,
}

impl EventStore {
    /// Create an empty store backed by the given storage handle
    pub fn new(storage: StorageActorHandle) -> Self {
        EventStore {
            events: Vec::new(),
            storage,
        }
    }

    /// Load the stored collection, repairing what can be repaired
    ///
    /// Unreadable or malformed payloads yield an empty store. Records missing
    /// an id, title or creation timestamp get defaults; records without a
    /// usable date are dropped. When anything changed, the repaired collection
    /// is written back so later loads see the same data.
    pub async fn load(storage: StorageActorHandle) -> Self {
        let mut store = EventStore::new(storage);
        let payload = match store.storage.get(keys::EVENTS).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("No stored events found, starting empty");
                return store;
            }
            Err(e) => {
                warn!("Could not read stored events, starting empty: {}", e);
                return store;
            }
        };

        let records: Vec<EventRecord> = match serde_json::from_str(&payload) {
            Ok(records) => records,
            Err(e) => {
                warn!("Stored events are malformed, starting empty: {}", e);
                return store;
            }
        };

        let mut repaired = Vec::with_capacity(records.len());
        for mut record in records {
            if record.repair() {
                repaired.push(record);
            } else {
                warn!("Dropping stored event with unusable date: '{}'", record.date);
            }
        }
        // Write repaired data back so generated ids survive the next load
        let changed = serde_json::to_string(&repaired).ok() != Some(payload);
        store.events = repaired;
        if changed {
            store.persist().await;
        }
        store
    }

    /// Validate user input, returning the trimmed title and canonical date
    fn validate(input: &EventInput) -> Result<(String, String), ValidationIssues> {
        let mut issues = ValidationIssues::new();

        let title = input.title.trim().to_string();
        let length = title.chars().count();
        if length < TITLE_MIN_CHARS {
            issues.push(
                "title",
                format!("must be at least {} characters", TITLE_MIN_CHARS),
            );
        } else if length > TITLE_MAX_CHARS {
            issues.push(
                "title",
                format!("must be at most {} characters", TITLE_MAX_CHARS),
            );
        }

        let date = match parse_event_date(&input.date) {
            Ok(date) => date.format(DATE_FORMAT).to_string(),
            Err(_) => {
                issues.push("date", "must be a valid calendar date (YYYY-MM-DD)");
                String::new()
            }
        };

        if issues.is_empty() {
            Ok((title, date))
        } else {
            Err(issues)
        }
    }

    /// Validate and append a new event
    pub async fn add(&mut self, input: EventInput) -> AppResult<EventRecord> {
        let (title, date) = Self::validate(&input).map_err(Error::Validation)?;
        let record = EventRecord {
            id: Uuid::new_v4().to_string(),
            title,
            date,
            description: input.description,
            created_at: Utc::now().to_rfc3339(),
            category: input.category,
        };
        self.events.push(record.clone());
        self.persist().await;
        Ok(record)
    }

    /// Replace an existing event's user-supplied fields
    ///
    /// The id and creation timestamp never change. The replacement goes
    /// through the same validation as a new event.
    pub async fn update(&mut self, id: &str, input: EventInput) -> AppResult<EventRecord> {
        let index = self
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let (title, date) = Self::validate(&input).map_err(Error::Validation)?;
        {
            let record = &mut self.events[index];
            record.title = title;
            record.date = date;
            record.description = input.description;
            record.category = input.category;
        }
        self.persist().await;
        Ok(self.events[index].clone())
    }

    /// Remove an event by id; returns whether anything was removed
    pub async fn delete(&mut self, id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        let removed = self.events.len() < before;
        if removed {
            self.persist().await;
        }
        removed
    }

    pub fn get_by_id(&self, id: &str) -> Option<&EventRecord> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Events ordered by date, earliest first
    ///
    /// Canonical YYYY-MM-DD strings order lexicographically by calendar date,
    /// and the stable sort keeps insertion order for equal dates.
    pub fn list_sorted(&self) -> Vec<EventRecord> {
        let mut sorted = self.events.clone();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));
        sorted
    }

    pub fn count(&self) -> usize {
        self.events.len()
    }

    /// Mirror the in-memory collection to storage
    ///
    /// Returns whether the write landed; failures are logged and the
    /// in-memory state stays authoritative.
    async fn persist(&self) -> bool {
        let payload = match serde_json::to_string(&self.events) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not serialize events for storage: {}", e);
                return false;
            }
        };
        match self.storage.set(keys::EVENTS, &payload).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not persist events, keeping in-memory state: {}", e);
                false
            }
        }
    }
}
