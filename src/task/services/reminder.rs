//! Periodic reminder sweep.
//!
//! Each eligible reminder is claimed under the store's write lock before
//! the notifier is called, so a reminder fires at most once per due date
//! even when sweeps overlap or race a due date change.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::task::{
    domain::{Task, TaskId},
    ports::{NotificationError, ReminderNotifier, TaskSnapshotRepository},
};

use super::store::{TaskStore, TaskStoreError, TaskTable};

/// Outcome of a single sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderSweepReport {
    /// Tasks whose reminder was delivered.
    pub fired: Vec<TaskId>,
    /// Tasks whose reminder was claimed but delivery failed or timed out.
    pub failed: Vec<TaskId>,
}

impl ReminderSweepReport {
    /// Returns `true` when the sweep claimed no reminder.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty() && self.failed.is_empty()
    }
}

/// Scans the store for due reminders and hands them to a notifier.
pub struct ReminderScheduler<P, N, C>
where
    P: TaskSnapshotRepository,
    N: ReminderNotifier,
    C: Clock + Send + Sync,
{
    store: Arc<TaskStore<P>>,
    notifier: Arc<N>,
    clock: Arc<C>,
    notify_timeout: Duration,
}

impl<P, N, C> ReminderScheduler<P, N, C>
where
    P: TaskSnapshotRepository,
    N: ReminderNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a scheduler over a shared store.
    #[must_use]
    pub const fn new(
        store: Arc<TaskStore<P>>,
        notifier: Arc<N>,
        clock: Arc<C>,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            notify_timeout,
        }
    }

    /// Fires every reminder due at the current clock reading.
    ///
    /// Delivery failures are logged and reported but never retried; the
    /// claimed flag stays set. The snapshot is saved best-effort afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Poisoned`] when the store lock is poisoned.
    pub async fn sweep(&self) -> Result<ReminderSweepReport, TaskStoreError> {
        let now = self.clock.utc();
        let candidates = self.store.read(|table| {
            table
                .iter()
                .filter(|task| task.should_fire_reminder(now))
                .map(|task| (task.id(), task.due_date()))
                .collect::<Vec<_>>()
        })?;

        let mut report = ReminderSweepReport::default();
        for (task_id, observed_due_date) in candidates {
            let claimed = self.store.write(|table| {
                Ok::<_, TaskStoreError>(claim(table, task_id, observed_due_date, now))
            })?;
            let Some(task) = claimed else {
                debug!(task_id = %task_id, "reminder already claimed");
                continue;
            };
            match self.deliver(&task).await {
                Ok(()) => report.fired.push(task_id),
                Err(error) => {
                    warn!(task_id = %task_id, error = %error, "reminder notification failed");
                    report.failed.push(task_id);
                }
            }
        }

        if !report.is_empty() {
            if let Err(error) = self.store.persist().await {
                warn!(error = %error, "failed to persist reminder state");
            }
            info!(
                fired = report.fired.len(),
                failed = report.failed.len(),
                "reminder sweep complete"
            );
        }
        Ok(report)
    }

    async fn deliver(&self, task: &Task) -> Result<(), NotificationError> {
        time::timeout(self.notify_timeout, self.notifier.notify(task))
            .await
            .map_err(|_| NotificationError::Timeout(self.notify_timeout))?
    }
}

impl<P, N, C> ReminderScheduler<P, N, C>
where
    P: TaskSnapshotRepository + 'static,
    N: ReminderNotifier + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Runs [`Self::sweep`] every `interval` until `cancel` fires.
    ///
    /// The first sweep runs immediately.
    #[must_use]
    pub fn spawn(self: Arc<Self>, interval: Duration, cancel: CancellationToken) -> ReminderJob {
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(error) = self.sweep().await {
                            warn!(error = %error, "reminder sweep failed");
                        }
                    }
                }
            }
            debug!("reminder sweep stopped");
        });
        ReminderJob { cancel, handle }
    }
}

/// Marks the reminder sent if the task is still in the observed state.
fn claim(
    table: &mut TaskTable,
    task_id: TaskId,
    observed_due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<Task> {
    let current = table.get(task_id)?;
    if current.reminder_sent()
        || current.due_date() != observed_due_date
        || !current.should_fire_reminder(now)
    {
        return None;
    }
    let mut claimed = current.clone();
    claimed.mark_reminder_sent();
    table.upsert(claimed.clone());
    Some(claimed)
}

/// Handle to a running reminder loop.
#[derive(Debug)]
pub struct ReminderJob {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ReminderJob {
    /// Returns `true` once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the loop and waits for the in-flight sweep to finish.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] when the loop task panicked.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.cancel.cancel();
        self.handle.await
    }
}
