use super::notifier::{DispatchReport, Notifier};
use crate::components::events::status::DATE_FORMAT;
use crate::components::events::view::SharedEventStore;
use crate::components::events::EventStore;
use crate::components::storage::{keys, StorageActorHandle};
use crate::utils::time::{calculate_wait_duration, next_daily_time, now_in_tz, today_in_tz};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Storage key marking that an event's reminder went out on a given day
pub fn sent_marker_key(event_id: &str, day: NaiveDate) -> String {
    format!(
        "{}{}:{}",
        keys::REMINDER_SENT_PREFIX,
        event_id,
        day.format(DATE_FORMAT)
    )
}

/// Send reminders for every event due on `today` that has none recorded yet
///
/// The sent marker is written before the send, so a failed delivery is
/// reported but never retried automatically. Returns the number of dispatch
/// attempts made.
pub async fn run_reminder_pass(
    store: &SharedEventStore,
    storage: &StorageActorHandle,
    notifier: &Arc<dyn Notifier>,
    today: NaiveDate,
    reports: &mpsc::UnboundedSender<DispatchReport>,
) -> usize {
    let today_str = today.format(DATE_FORMAT).to_string();
    let due: Vec<_> = {
        let store = store.read().await;
        store
            .list_sorted()
            .into_iter()
            .filter(|event| event.date == today_str)
            .collect()
    };

    let mut attempted = 0;
    for event in due {
        let marker = sent_marker_key(&event.id, today);
        match storage.get(&marker).await {
            Ok(Some(_)) => {
                debug!("Reminder for '{}' already sent today", event.title);
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                // Skip rather than risk sending the same reminder twice
                warn!("Could not check reminder marker for '{}': {}", event.title, e);
                continue;
            }
        }

        // Record the attempt first so a failed send is not retried
        if let Err(e) = storage.set(&marker, "1").await {
            warn!("Could not record reminder marker for '{}': {}", event.title, e);
        }

        attempted += 1;
        let outcome = notifier.send(&event).await;
        let report = DispatchReport {
            event_id: event.id.clone(),
            title: event.title.clone(),
            outcome: outcome.map_err(|e| e.to_string()),
        };
        let _ = reports.send(report);
    }

    attempted
}

/// Refresh the shared collection from storage
///
/// One-shot commands mutate events from their own process, so the daemon
/// reloads before a scheduled pass to pick up their writes.
async fn reload_store(store: &SharedEventStore, storage: &StorageActorHandle) {
    let fresh = EventStore::load(storage.clone()).await;
    *store.write().await = fresh;
}

/// Reminder scheduler loop
///
/// Runs one pass immediately, then daily at the configured time. Mutation
/// pokes trigger an extra pass so an event added for today is picked up
/// without waiting a day.
pub async fn run_scheduler(
    cancel: CancellationToken,
    store: SharedEventStore,
    storage: StorageActorHandle,
    notifier: Arc<dyn Notifier>,
    tz: Tz,
    reminder_time: String,
    mut poke_rx: mpsc::Receiver<()>,
    reports: mpsc::UnboundedSender<DispatchReport>,
) {
    info!("Reminder scheduler started (daily at {})", reminder_time);

    // Catch up immediately in case the daily time already passed
    run_reminder_pass(&store, &storage, &notifier, today_in_tz(&tz), &reports).await;

    loop {
        let now = now_in_tz(&tz);
        let next_time = match next_daily_time(&now, &reminder_time) {
            Some(next_time) => next_time,
            None => {
                error!(
                    "Invalid reminder time '{}', expected HH:MM; retrying in an hour",
                    reminder_time
                );
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Reminder scheduler stopped");
                        break;
                    }
                    _ = sleep(Duration::from_secs(3600)) => continue,
                }
            }
        };

        info!("Next reminder pass scheduled for {}", next_time);

        let wait_seconds = match calculate_wait_duration(&now, &next_time) {
            Ok(seconds) => seconds,
            Err(e) => {
                error!("Error calculating wait duration: {}", e);
                3600 // Default to an hour if we can't calculate
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Reminder scheduler stopped");
                break;
            }
            maybe_poke = poke_rx.recv() => match maybe_poke {
                Some(()) => {
                    run_reminder_pass(&store, &storage, &notifier, today_in_tz(&tz), &reports).await;
                }
                None => {
                    debug!("Mutation channel closed, stopping reminder scheduler");
                    break;
                }
            },
            _ = sleep(Duration::from_secs(wait_seconds as u64)) => {
                reload_store(&store, &storage).await;
                run_reminder_pass(&store, &storage, &notifier, today_in_tz(&tz), &reports).await;
            }
        }
    }
}
