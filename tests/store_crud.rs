mod common;

use common::memory_storage;
use muistutin::components::events::store::TITLE_MAX_CHARS;
use muistutin::components::events::{EventInput, EventStore};
use muistutin::error::Error;

fn input(title: &str, date: &str) -> EventInput {
    EventInput {
        title: title.to_string(),
        date: date.to_string(),
        ..EventInput::default()
    }
}

/// Adding a valid event returns the stored record with generated fields
#[tokio::test]
async fn test_add_returns_trimmed_record() {
    let mut store = EventStore::new(memory_storage());
    let record = store
        .add(input("  Dentist appointment  ", "2026-04-01"))
        .await
        .unwrap();

    assert_eq!(record.title, "Dentist appointment");
    assert_eq!(record.date, "2026-04-01");
    assert!(!record.id.is_empty());
    assert!(!record.created_at.is_empty());
    assert_eq!(store.count(), 1);

    // The stored copy matches what was returned
    let stored = store.get_by_id(&record.id).unwrap();
    assert_eq!(stored, &record);
}

/// Titles shorter than three or longer than one hundred characters are rejected
#[tokio::test]
async fn test_title_length_bounds() {
    let mut store = EventStore::new(memory_storage());

    // Two characters is too short
    let err = store.add(input("ab", "2026-04-01")).await.unwrap_err();
    let issues = err.validation_issues().expect("validation error");
    assert_eq!(issues.for_field("title").len(), 1);
    assert_eq!(store.count(), 0);

    // Three and one hundred are accepted
    assert!(store.add(input("abc", "2026-04-01")).await.is_ok());
    let max_title = "x".repeat(TITLE_MAX_CHARS);
    assert!(store.add(input(&max_title, "2026-04-01")).await.is_ok());

    // One over the limit is rejected and the count stays unchanged
    let over = "x".repeat(TITLE_MAX_CHARS + 1);
    assert!(store.add(input(&over, "2026-04-01")).await.is_err());
    assert_eq!(store.count(), 2);
}

/// A title of only whitespace trims to nothing and is rejected
#[tokio::test]
async fn test_whitespace_title_is_rejected() {
    let mut store = EventStore::new(memory_storage());
    let err = store.add(input("   ", "2026-04-01")).await.unwrap_err();
    assert!(err.validation_issues().is_some());
    assert_eq!(store.count(), 0);
}

/// Both fields get their own issue when both are invalid
#[tokio::test]
async fn test_invalid_title_and_date_are_both_reported() {
    let mut store = EventStore::new(memory_storage());
    let err = store.add(input("ab", "not-a-date")).await.unwrap_err();
    let issues = err.validation_issues().expect("validation error");
    assert_eq!(issues.for_field("title").len(), 1);
    assert_eq!(issues.for_field("date").len(), 1);
    assert_eq!(store.count(), 0);
}

/// Dates are stored zero-padded no matter how they were typed
#[tokio::test]
async fn test_date_is_canonicalized() {
    let mut store = EventStore::new(memory_storage());
    let record = store
        .add(input("Spring cleaning", "2026-3-1"))
        .await
        .unwrap();
    assert_eq!(record.date, "2026-03-01");
}

/// Listing sorts by date and keeps insertion order for equal dates
#[tokio::test]
async fn test_listing_sorts_by_date_keeping_insertion_order_for_ties() {
    let mut store = EventStore::new(memory_storage());
    store
        .add(input("First of March", "2026-03-01"))
        .await
        .unwrap();
    store.add(input("New month", "2026-01-01")).await.unwrap();
    store
        .add(input("Also first of March", "2026-03-01"))
        .await
        .unwrap();

    let titles: Vec<String> = store.list_sorted().into_iter().map(|e| e.title).collect();
    assert_eq!(
        titles,
        vec!["New month", "First of March", "Also first of March"]
    );
}

/// Updating replaces user fields but never the id or creation timestamp
#[tokio::test]
async fn test_update_replaces_fields_but_keeps_identity() {
    let mut store = EventStore::new(memory_storage());
    let record = store.add(input("Movie night", "2026-02-14")).await.unwrap();

    let updated = store
        .update(&record.id, input("Movie marathon", "2026-02-15"))
        .await
        .unwrap();
    assert_eq!(updated.id, record.id);
    assert_eq!(updated.created_at, record.created_at);
    assert_eq!(updated.title, "Movie marathon");
    assert_eq!(updated.date, "2026-02-15");
    assert_eq!(store.count(), 1);
}

/// Updating an unknown id fails before validation runs
#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let mut store = EventStore::new(memory_storage());
    let err = store
        .update("missing", input("Valid title", "2026-02-15"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

/// A rejected update leaves the stored event untouched
#[tokio::test]
async fn test_update_validation_failure_leaves_event_unchanged() {
    let mut store = EventStore::new(memory_storage());
    let record = store.add(input("Movie night", "2026-02-14")).await.unwrap();

    let err = store
        .update(&record.id, input("ab", "2026-02-15"))
        .await
        .unwrap_err();
    assert!(err.validation_issues().is_some());

    let stored = store.get_by_id(&record.id).unwrap();
    assert_eq!(stored.title, "Movie night");
    assert_eq!(stored.date, "2026-02-14");
}

/// Deleting twice is harmless
#[tokio::test]
async fn test_delete_is_idempotent() {
    let mut store = EventStore::new(memory_storage());
    let record = store.add(input("Throwaway", "2026-02-14")).await.unwrap();

    assert!(store.delete(&record.id).await);
    assert_eq!(store.count(), 0);

    // Second delete of the same id is a no-op
    assert!(!store.delete(&record.id).await);
    assert_eq!(store.count(), 0);
}
