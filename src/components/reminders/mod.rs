pub mod notifier;
pub mod scheduler;

pub use notifier::{DispatchReport, EmailNotifier, Notifier};

use crate::components::events::SharedEventStore;
use crate::components::storage::StorageActorHandle;
use crate::config::Config;
use crate::error::AppResult;
use crate::utils::scheduler::ScheduledTask;
use crate::utils::time::resolve_timezone;
use async_trait::async_trait;
use scheduler::run_scheduler;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::info;

/// Reminder dispatch component
///
/// Owns the daily scheduler task. Stays inert when no notifier is available,
/// so the rest of the application runs without email settings.
#[derive(Default)]
pub struct Reminders {
    notifier: RwLock<Option<Arc<dyn Notifier>>>,
    task: RwLock<Option<ScheduledTask>>,
    poke_tx: RwLock<Option<mpsc::Sender<()>>>,
    reports_rx: RwLock<Option<mpsc::UnboundedReceiver<DispatchReport>>>,
}

impl Reminders {
    /// Create a reminder component that builds its notifier from the
    /// email settings at init
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reminder component with a pre-built notifier
    #[allow(dead_code)]
    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier: RwLock::new(Some(notifier)),
            ..Self::default()
        }
    }

    /// Take the dispatch report stream; only the first caller gets it
    pub async fn take_reports(&self) -> Option<mpsc::UnboundedReceiver<DispatchReport>> {
        self.reports_rx.write().await.take()
    }

    /// Ask for an extra reminder pass after a store mutation
    #[allow(dead_code)]
    pub async fn notify_mutation(&self) {
        let poke_lock = self.poke_tx.read().await;
        if let Some(poke_tx) = &*poke_lock {
            let _ = poke_tx.try_send(());
        }
    }
}

#[async_trait]
impl super::Component for Reminders {
    fn name(&self) -> &'static str {
        "reminders"
    }

    async fn init(
        &self,
        config: Arc<RwLock<Config>>,
        storage: StorageActorHandle,
        store: SharedEventStore,
    ) -> AppResult<()> {
        let (tz, reminder_time) = {
            let config = config.read().await;
            (resolve_timezone(&config.timezone)?, config.reminder_time.clone())
        };

        let notifier = {
            let mut notifier_lock = self.notifier.write().await;
            if notifier_lock.is_none() {
                let config = config.read().await;
                match EmailNotifier::from_config(&config)? {
                    Some(email) => *notifier_lock = Some(Arc::new(email)),
                    None => {
                        info!("Email settings incomplete, reminders stay disabled");
                        return Ok(());
                    }
                }
            }
            match notifier_lock.as_ref() {
                Some(notifier) => Arc::clone(notifier),
                None => return Ok(()),
            }
        };

        let (poke_tx, poke_rx) = mpsc::channel(8);
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();

        let task = ScheduledTask::spawn(move |cancel| {
            run_scheduler(
                cancel,
                store,
                storage,
                notifier,
                tz,
                reminder_time,
                poke_rx,
                reports_tx,
            )
        });

        *self.task.write().await = Some(task);
        *self.poke_tx.write().await = Some(poke_tx);
        *self.reports_rx.write().await = Some(reports_rx);

        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        let task_lock = self.task.read().await;
        if let Some(task) = &*task_lock {
            task.stop();
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
