//! # Reminder Scheduler
//!
//! Polls the reminder store on a fixed interval and fires each due reminder
//! once per matching minute.
//!
//! - **Version**: 1.2.1
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.1: Trace every reminder a poll evaluates, not only the ones that fire
//! - 1.2.0: Prune firing keys from previous days on every poll
//! - 1.1.0: Cancellable polling through `SchedulerHandle`
//! - 1.0.0: Initial release

use dashmap::DashSet;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::alarm::AlarmPresenter;
use super::clock::{Clock, LocalMoment};
use super::model::FiringKey;
use super::store::ReminderStore;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Floor for the timer period; `tokio::time::interval` rejects zero
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a single poll tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The store could not be reached; nothing was evaluated
    Skipped,
    Checked { candidates: usize, fired: usize },
}

pub struct ReminderScheduler {
    store: Arc<dyn ReminderStore>,
    presenter: Arc<dyn AlarmPresenter>,
    clock: Arc<dyn Clock>,
    user_id: i64,
    /// Keys already shown during this scheduler's lifetime
    fired: DashSet<FiringKey>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        presenter: Arc<dyn AlarmPresenter>,
        clock: Arc<dyn Clock>,
        user_id: i64,
    ) -> Self {
        ReminderScheduler {
            store,
            presenter,
            clock,
            user_id,
            fired: DashSet::new(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// One poll tick: fetch, match against "now", fire what is due.
    ///
    /// Store errors are logged and end the tick; they never propagate.
    pub async fn poll(&self) -> PollOutcome {
        let reminders = match self.store.list(self.user_id).await {
            Ok(reminders) => reminders,
            Err(e) => {
                warn!("Reminder poll failed for user {}: {e:#}", self.user_id);
                return PollOutcome::Skipped;
            }
        };

        let now = self.clock.moment();
        self.prune_firing_record(&now);

        let mut fired = 0;
        for reminder in &reminders {
            if !reminder.is_due(&now) {
                debug!(
                    "Reminder #{} not due at {} {} (scheduled {} {})",
                    reminder.id,
                    now.date,
                    now.time,
                    reminder.scheduled_date().unwrap_or("daily"),
                    reminder.time.as_deref().unwrap_or("--:--")
                );
                continue;
            }

            let key = FiringKey::new(reminder.id, &now);
            // insert() is the check; a concurrent poll that loses the race sees false
            if !self.fired.insert(key.clone()) {
                debug!("{key} already shown");
                continue;
            }

            info!(
                "⏰ Reminder #{} due for user {}: {} at {} {}",
                reminder.id, self.user_id, reminder.medication_name, now.date, now.time
            );
            self.presenter.trigger(reminder);
            fired += 1;
        }

        debug!(
            "Poll for user {} at {} {}: {} reminders, {} fired",
            self.user_id,
            now.date,
            now.time,
            reminders.len(),
            fired
        );

        PollOutcome::Checked {
            candidates: reminders.len(),
            fired,
        }
    }

    /// Forget firings from before `now`'s date
    pub fn prune_firing_record(&self, now: &LocalMoment) {
        // ISO dates order lexicographically
        self.fired.retain(|key| key.date.as_str() >= now.date.as_str());
    }

    pub fn has_fired(&self, key: &FiringKey) -> bool {
        self.fired.contains(key)
    }

    pub fn firing_record_len(&self) -> usize {
        self.fired.len()
    }

    pub fn stop_alarm(&self) {
        self.presenter.stop();
    }

    pub fn alarm_active(&self) -> bool {
        self.presenter.is_active()
    }

    /// Start polling every `every`, first tick immediately.
    ///
    /// Each tick spawns its own poll, so a slow request can overlap the next tick.
    pub fn spawn(self: Arc<Self>, every: Duration) -> SchedulerHandle {
        let every = every.max(MIN_POLL_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let scheduler = self.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            info!(
                "Reminder polling started for user {} every {:?}",
                scheduler.user_id, every
            );
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let scheduler = scheduler.clone();
                        tokio::spawn(async move {
                            scheduler.poll().await;
                        });
                    }
                    // Fires on stop() and when the handle is dropped
                    _ = shutdown_rx.changed() => break,
                }
            }
            info!("Reminder polling stopped for user {}", scheduler.user_id);
        });

        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
            scheduler: self,
        }
    }
}

/// Owns the polling timer; dropping it also ends the timer
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    scheduler: Arc<ReminderScheduler>,
}

impl SchedulerHandle {
    pub fn scheduler(&self) -> &Arc<ReminderScheduler> {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the timer, wait for it to exit, then silence any alarm
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Reminder polling task ended abnormally: {e}");
        }
        self.scheduler.stop_alarm();
    }
}
