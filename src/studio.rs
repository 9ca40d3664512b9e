use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use ulid::Ulid;

use crate::directory::BookingDirectory;
use crate::model::Minute;
use crate::observability;
use crate::schedule::{ScheduleError, Scheduler};
use crate::sweeper;

/// Default period between sweeper passes.
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(30);

/// Per-studio schedulers over one shared booking directory. Each studio
/// gets its own scheduler handle and auto-cancellation sweeper, created
/// lazily on first use.
pub struct StudioManager {
    schedulers: DashMap<Ulid, Arc<Scheduler>>,
    directory: Arc<dyn BookingDirectory>,
    sweep_period: Duration,
}

impl StudioManager {
    pub fn new(directory: Arc<dyn BookingDirectory>, sweep_period: Duration) -> Self {
        Self {
            schedulers: DashMap::new(),
            directory,
            sweep_period,
        }
    }

    /// Get or lazily create the scheduler for a studio, spawning its
    /// sweeper on first creation.
    pub fn get_or_create(
        &self,
        studio_id: Ulid,
        slot_interval_min: Minute,
    ) -> Result<Arc<Scheduler>, ScheduleError> {
        if let Some(existing) = self.schedulers.get(&studio_id) {
            return Ok(existing.value().clone());
        }
        if slot_interval_min <= 0 {
            return Err(ScheduleError::NonPositiveInterval(slot_interval_min));
        }

        let scheduler = Arc::new(Scheduler::new(
            studio_id,
            self.directory.clone(),
            slot_interval_min,
        ));

        let sweep_directory = self.directory.clone();
        let period = self.sweep_period;
        tokio::spawn(async move {
            sweeper::run_sweeper(studio_id, sweep_directory, period).await;
        });

        self.schedulers.insert(studio_id, scheduler.clone());
        metrics::gauge!(observability::STUDIOS_ACTIVE).set(self.schedulers.len() as f64);
        Ok(scheduler)
    }

    pub fn get(&self, studio_id: &Ulid) -> Option<Arc<Scheduler>> {
        self.schedulers.get(studio_id).map(|e| e.value().clone())
    }

    pub fn studio_count(&self) -> usize {
        self.schedulers.len()
    }
}
