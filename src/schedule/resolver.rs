use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use ulid::Ulid;

use crate::directory::BookingDirectory;
use crate::model::*;
use crate::observability;

use super::ScheduleError;
use super::reminders::{self, ReminderItem};
use super::slots::generate_slots;

/// Gap between candidate start times unless a studio configures its own.
pub const DEFAULT_SLOT_INTERVAL_MIN: Minute = 30;

/// How far back the reminder view scans for pending-payment reservations.
pub const PENDING_SCAN_HOURS: i64 = 24;

/// Per-studio scheduling facade over a booking directory.
///
/// Slot output is advisory: the fetch-then-compute sequence is not atomic
/// against concurrent booking writes, so two simultaneous attempts can both
/// see the same slot free. The write path must re-validate the chosen window
/// under a transactional conflict check before committing.
pub struct Scheduler {
    studio_id: Ulid,
    directory: Arc<dyn BookingDirectory>,
    slot_interval_min: Minute,
}

impl Scheduler {
    pub fn new(
        studio_id: Ulid,
        directory: Arc<dyn BookingDirectory>,
        slot_interval_min: Minute,
    ) -> Self {
        debug_assert!(slot_interval_min > 0, "slot interval must be positive");
        Self {
            studio_id,
            directory,
            slot_interval_min,
        }
    }

    pub fn studio_id(&self) -> Ulid {
        self.studio_id
    }

    /// Candidate start times for a session on `facility_id` at `date`.
    ///
    /// A slot is reported available only when no non-cancelled package
    /// reservation or add-on booking on that facility and date overlaps it.
    /// `exclude_reservation` is for reschedule flows: the reservation being
    /// moved (and its add-on bookings) must not conflict with itself.
    pub async fn available_slots(
        &self,
        facility_id: Ulid,
        date: NaiveDate,
        duration_min: Minute,
        exclude_reservation: Option<Ulid>,
    ) -> Result<DaySchedule, ScheduleError> {
        if duration_min <= 0 {
            return Err(ScheduleError::NonPositiveDuration(duration_min));
        }

        let started = Instant::now();
        let result = self
            .compute_slots(facility_id, date, duration_min, exclude_reservation)
            .await;
        metrics::histogram!(observability::SLOT_QUERY_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(DaySchedule::Closed) => "closed",
            Ok(DaySchedule::Open { .. }) => "open",
            Err(_) => "error",
        };
        metrics::counter!(observability::SLOT_QUERIES_TOTAL, "result" => outcome).increment(1);
        result
    }

    async fn compute_slots(
        &self,
        facility_id: Ulid,
        date: NaiveDate,
        duration_min: Minute,
        exclude_reservation: Option<Ulid>,
    ) -> Result<DaySchedule, ScheduleError> {
        let hours = self
            .directory
            .operating_hours(self.studio_id, date)
            .await
            .map_err(|e| ScheduleError::Upstream(e.to_string()))?;
        let Some(hours) = hours else {
            return Ok(DaySchedule::Closed);
        };

        let (reservations, addons) = futures::future::try_join(
            self.directory.reservations_on(facility_id, date),
            self.directory.addon_bookings_on(facility_id, date),
        )
        .await
        .map_err(|e| ScheduleError::Upstream(e.to_string()))?;

        let occupied = collect_occupied(&reservations, &addons, exclude_reservation)?;
        let slots = generate_slots(&hours, self.slot_interval_min, duration_min, &occupied)?;
        Ok(DaySchedule::Open { slots })
    }

    /// Pending-payment reservations currently inside their reminder window,
    /// scanning bookings created within the last [`PENDING_SCAN_HOURS`].
    pub async fn active_reminders(
        &self,
        now: NaiveDateTime,
    ) -> Result<Vec<ReminderItem>, ScheduleError> {
        let since = now - Duration::hours(PENDING_SCAN_HOURS);
        let pending = self
            .directory
            .pending_payment_reservations(self.studio_id, since)
            .await
            .map_err(|e| ScheduleError::Upstream(e.to_string()))?;
        metrics::counter!(observability::REMINDER_SCANS_TOTAL).increment(1);
        Ok(reminders::active_reminders(&pending, now))
    }
}

/// Map non-cancelled bookings to occupied ranges, honoring the reschedule
/// exclusion. The directory contract already omits cancelled rows; they are
/// filtered again here so a lagging backend cannot block a freed slot.
fn collect_occupied(
    reservations: &[ReservationSnapshot],
    addons: &[AddonBooking],
    exclude: Option<Ulid>,
) -> Result<Vec<OccupiedRange>, ScheduleError> {
    let mut occupied = Vec::with_capacity(reservations.len() + addons.len());
    for r in reservations {
        if r.status == ReservationStatus::Cancelled || exclude == Some(r.id) {
            continue;
        }
        occupied.push(OccupiedRange {
            reservation_id: r.id,
            source: OccupiedSource::Package,
            range: checked_range(r.start_time, r.end_time)?,
        });
    }
    for a in addons {
        if a.status == ReservationStatus::Cancelled || exclude == Some(a.reservation_id) {
            continue;
        }
        occupied.push(OccupiedRange {
            reservation_id: a.reservation_id,
            source: OccupiedSource::Addon,
            range: checked_range(a.start_time, a.end_time)?,
        });
    }
    Ok(occupied)
}

fn checked_range(start: NaiveTime, end: NaiveTime) -> Result<TimeRange, ScheduleError> {
    if start >= end {
        return Err(ScheduleError::InvalidRange { start, end });
    }
    Ok(TimeRange::from_times(start, end))
}
