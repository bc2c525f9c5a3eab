use super::countdown::Countdown;
use super::model::EventRecord;
use super::status::{classify, relative_label, EventStatus, DATE_FORMAT};
use super::store::EventStore;
use crate::utils::scheduler::ScheduledTask;
use crate::utils::time::now_in_tz;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shared ownership of the event store
pub type SharedEventStore = Arc<RwLock<EventStore>>;

/// Display-ready projection of one event
#[derive(Debug, Clone, PartialEq)]
pub struct EventView {
    pub event: EventRecord,
    pub status: EventStatus,
    /// Relative wording ("Tomorrow", "In 3 days") or a long date
    pub when_label: String,
    pub countdown: Countdown,
    pub countdown_text: String,
}

/// Derived display data for the whole collection, date-ordered
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewSnapshot {
    pub views: Vec<EventView>,
    /// Calendar day (YYYY-MM-DD) the statuses were computed against
    pub computed_for: String,
}

/// Build display projections for the given events
///
/// Events whose stored date no longer parses are skipped with a warning, so
/// a view never carries an unclassifiable record.
pub fn build_views(events: &[EventRecord], now: NaiveDateTime, window_days: i64) -> Vec<EventView> {
    let today = now.date();
    events
        .iter()
        .filter_map(|event| {
            let date = match event.date_naive() {
                Ok(date) => date,
                Err(e) => {
                    warn!("Skipping event '{}': {}", event.title, e);
                    return None;
                }
            };
            let midnight = date.and_hms_opt(0, 0, 0)?;
            let countdown = Countdown::until(midnight, now);
            Some(EventView {
                status: classify(date, today, window_days),
                when_label: relative_label(date, today, window_days),
                countdown_text: countdown.format(),
                countdown,
                event: event.clone(),
            })
        })
        .collect()
}

/// Recomputes derived display data on a fixed cadence.
///
/// Statuses and labels are rebuilt when the collection changes or the
/// calendar day rolls over; between those, ticks only refresh countdowns.
pub struct ViewSynchronizer {
    store: SharedEventStore,
    tz: Tz,
    window_days: i64,
    last_seen_date: String,
    snapshot_tx: watch::Sender<ViewSnapshot>,
}

impl ViewSynchronizer {
    pub fn new(
        store: SharedEventStore,
        tz: Tz,
        window_days: i64,
    ) -> (Self, watch::Receiver<ViewSnapshot>) {
        let (snapshot_tx, snapshot_rx) = watch::channel(ViewSnapshot::default());
        (
            ViewSynchronizer {
                store,
                tz,
                window_days,
                last_seen_date: String::new(),
                snapshot_tx,
            },
            snapshot_rx,
        )
    }

    /// Recompute every event's status, label and countdown
    pub async fn rebuild(&mut self) {
        let now = now_in_tz(&self.tz).naive_local();
        self.rebuild_at(now).await;
    }

    /// Recompute against an explicit wall-clock time
    pub async fn rebuild_at(&mut self, now: NaiveDateTime) {
        let events = {
            let store = self.store.read().await;
            store.list_sorted()
        };
        let views = build_views(&events, now, self.window_days);
        self.last_seen_date = now.date().format(DATE_FORMAT).to_string();
        self.snapshot_tx.send_replace(ViewSnapshot {
            views,
            computed_for: self.last_seen_date.clone(),
        });
    }

    /// Refresh only the countdown fields of the current snapshot
    pub fn refresh_countdowns_at(&self, now: NaiveDateTime) {
        self.snapshot_tx.send_modify(|snapshot| {
            for view in &mut snapshot.views {
                if let Ok(date) = view.event.date_naive() {
                    if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                        view.countdown = Countdown::until(midnight, now);
                        view.countdown_text = view.countdown.format();
                    }
                }
            }
        });
    }

    /// True exactly when the calendar day differs from the last rebuild
    pub fn day_rolled_over(&self, today: &str) -> bool {
        self.last_seen_date != today
    }

    /// Drive ticks until cancelled
    ///
    /// Recomputes once up front so a restart never shows stale state, then
    /// refreshes countdowns every tick, rebuilding fully on day rollover and
    /// on mutation pokes.
    pub async fn run(
        mut self,
        cancel: CancellationToken,
        mut poke_rx: mpsc::Receiver<()>,
        tick: Duration,
    ) {
        info!("View synchronizer started (tick every {:?})", tick);
        self.rebuild().await;

        let mut ticker = interval(tick);
        // The first interval tick completes immediately; the initial rebuild
        // already covered it
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("View synchronizer stopped");
                    break;
                }
                maybe_poke = poke_rx.recv() => match maybe_poke {
                    Some(()) => self.rebuild().await,
                    None => {
                        debug!("Mutation channel closed, stopping view synchronizer");
                        break;
                    }
                },
                _ = ticker.tick() => {
                    let now = now_in_tz(&self.tz).naive_local();
                    let today = now.date().format(DATE_FORMAT).to_string();
                    if self.day_rolled_over(&today) {
                        info!("Calendar day changed to {}, reclassifying events", today);
                        self.rebuild_at(now).await;
                    } else {
                        self.refresh_countdowns_at(now);
                    }
                }
            }
        }
    }
}

/// Running synchronizer with its subscription and controls
pub struct SyncHandle {
    snapshot_rx: watch::Receiver<ViewSnapshot>,
    poke_tx: mpsc::Sender<()>,
    task: ScheduledTask,
}

impl SyncHandle {
    /// Start the ticker; the first snapshot is computed immediately
    pub fn start(store: SharedEventStore, tz: Tz, window_days: i64, tick: Duration) -> Self {
        let (synchronizer, snapshot_rx) = ViewSynchronizer::new(store, tz, window_days);
        let (poke_tx, poke_rx) = mpsc::channel(8);
        let task = ScheduledTask::spawn(move |cancel| synchronizer.run(cancel, poke_rx, tick));
        SyncHandle {
            snapshot_rx,
            poke_tx,
            task,
        }
    }

    /// Subscribe to display snapshots
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Request an immediate recompute after a store mutation
    ///
    /// A full poke buffer means a rebuild is already pending, which gives
    /// the same outcome.
    pub fn notify_mutation(&self) {
        let _ = self.poke_tx.try_send(());
    }

    /// Stop the ticker, e.g. while the view is not being shown
    pub fn stop(&self) {
        self.task.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_stopped()
    }

    #[allow(dead_code)]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
