//! Shared helpers for in-memory integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use taskwright::task::{
    adapters::memory::InMemoryTaskSnapshotRepository,
    services::{TaskEngineConfig, TaskLifecycleManager},
};

/// Manager type used by the in-memory integration tests.
pub type TestManager = TaskLifecycleManager<InMemoryTaskSnapshotRepository, StepClock>;

/// Clock advanced explicitly by tests.
#[derive(Debug)]
pub struct StepClock {
    now: Mutex<DateTime<Utc>>,
}

impl StepClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns a UTC instant on the hour.
#[must_use]
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid test date")
}

/// Manager, repository and clock wired together for a test.
pub struct Harness {
    /// Manager under test.
    pub manager: TestManager,
    /// Repository backing the manager's store.
    pub repo: Arc<InMemoryTaskSnapshotRepository>,
    /// Clock shared with the manager.
    pub clock: Arc<StepClock>,
}

/// Opens a manager over an empty in-memory repository at 2024-06-03 09:00.
#[fixture]
pub async fn harness() -> Harness {
    let repo = Arc::new(InMemoryTaskSnapshotRepository::new());
    let clock = Arc::new(StepClock::new(at(2024, 6, 3, 9)));
    let manager = TaskLifecycleManager::open(
        Arc::clone(&repo),
        Arc::clone(&clock),
        TaskEngineConfig::default(),
    )
    .await
    .expect("open manager");
    Harness {
        manager,
        repo,
        clock,
    }
}
