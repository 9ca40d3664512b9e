use chrono::{NaiveDate, NaiveDateTime};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::*;
use crate::schedule::DEFAULT_SLOT_INTERVAL_MIN;

/// Failure reported by a booking directory backend. Transport detail stays
/// in the message; callers only branch on success.
#[derive(Debug)]
pub struct DirectoryError(pub String);

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DirectoryError {}

/// The persistence collaborator as seen by the scheduling core.
///
/// Fetch methods return only non-cancelled rows. `cancel_reservation`
/// exists for the auto-cancellation sweeper; nothing else in the core
/// writes through this trait.
#[async_trait::async_trait]
pub trait BookingDirectory: Send + Sync {
    /// Package reservations on a facility for one date.
    async fn reservations_on(
        &self,
        facility_id: Ulid,
        date: NaiveDate,
    ) -> Result<Vec<ReservationSnapshot>, DirectoryError>;

    /// Add-on time bookings on a facility for one date.
    async fn addon_bookings_on(
        &self,
        facility_id: Ulid,
        date: NaiveDate,
    ) -> Result<Vec<AddonBooking>, DirectoryError>;

    /// Operating hours of a studio on a date; `None` means closed.
    async fn operating_hours(
        &self,
        studio_id: Ulid,
        date: NaiveDate,
    ) -> Result<Option<DayHours>, DirectoryError>;

    /// Pending reservations with pending payment created at or after `since`.
    async fn pending_payment_reservations(
        &self,
        studio_id: Ulid,
        since: NaiveDateTime,
    ) -> Result<Vec<ReservationSnapshot>, DirectoryError>;

    /// Cancel a reservation and release its add-on bookings with it.
    async fn cancel_reservation(&self, id: Ulid) -> Result<(), DirectoryError>;
}

// ── In-memory directory ──────────────────────────────────────────

/// DashMap-backed directory used by tests and the worker binary.
pub struct InMemoryDirectory {
    hours: DashMap<Ulid, WeeklyHours>,
    reservations: DashMap<Ulid, ReservationSnapshot>,
    addons: DashMap<Ulid, AddonBooking>,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            hours: DashMap::new(),
            reservations: DashMap::new(),
            addons: DashMap::new(),
        }
    }

    pub fn set_hours(&self, studio_id: Ulid, hours: WeeklyHours) {
        self.hours.insert(studio_id, hours);
    }

    pub fn upsert_reservation(&self, reservation: ReservationSnapshot) {
        self.reservations.insert(reservation.id, reservation);
    }

    pub fn insert_addon(&self, addon: AddonBooking) {
        self.addons.insert(addon.id, addon);
    }

    pub fn reservation(&self, id: &Ulid) -> Option<ReservationSnapshot> {
        self.reservations.get(id).map(|e| e.value().clone())
    }

    pub fn addon(&self, id: &Ulid) -> Option<AddonBooking> {
        self.addons.get(id).map(|e| e.value().clone())
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }

    pub fn load_seed(&self, seed: &Seed) {
        for studio in &seed.studios {
            self.set_hours(studio.id, studio.hours.clone());
        }
        for reservation in &seed.reservations {
            self.upsert_reservation(reservation.clone());
        }
        for addon in &seed.addon_bookings {
            self.insert_addon(addon.clone());
        }
    }
}

#[async_trait::async_trait]
impl BookingDirectory for InMemoryDirectory {
    async fn reservations_on(
        &self,
        facility_id: Ulid,
        date: NaiveDate,
    ) -> Result<Vec<ReservationSnapshot>, DirectoryError> {
        Ok(self
            .reservations
            .iter()
            .filter(|e| {
                let r = e.value();
                r.facility_id == facility_id
                    && r.reservation_date == date
                    && r.status != ReservationStatus::Cancelled
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn addon_bookings_on(
        &self,
        facility_id: Ulid,
        date: NaiveDate,
    ) -> Result<Vec<AddonBooking>, DirectoryError> {
        Ok(self
            .addons
            .iter()
            .filter(|e| {
                let a = e.value();
                a.facility_id == facility_id
                    && a.booking_date == date
                    && a.status != ReservationStatus::Cancelled
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn operating_hours(
        &self,
        studio_id: Ulid,
        date: NaiveDate,
    ) -> Result<Option<DayHours>, DirectoryError> {
        Ok(self
            .hours
            .get(&studio_id)
            .and_then(|h| h.value().for_date(date)))
    }

    async fn pending_payment_reservations(
        &self,
        studio_id: Ulid,
        since: NaiveDateTime,
    ) -> Result<Vec<ReservationSnapshot>, DirectoryError> {
        Ok(self
            .reservations
            .iter()
            .filter(|e| {
                let r = e.value();
                r.studio_id == studio_id
                    && r.status == ReservationStatus::Pending
                    && r.payment_status == PaymentStatus::Pending
                    && r.created_at >= since
            })
            .map(|e| e.value().clone())
            .collect())
    }

    async fn cancel_reservation(&self, id: Ulid) -> Result<(), DirectoryError> {
        {
            let Some(mut reservation) = self.reservations.get_mut(&id) else {
                return Err(DirectoryError(format!("unknown reservation: {id}")));
            };
            reservation.status = ReservationStatus::Cancelled;
        }
        // The reservation's add-on time frees up with it
        for mut entry in self.addons.iter_mut() {
            if entry.reservation_id == id {
                entry.status = ReservationStatus::Cancelled;
            }
        }
        Ok(())
    }
}

// ── Seed fixture ─────────────────────────────────────────────────

/// JSON fixture the worker binary can load into an [`InMemoryDirectory`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    pub studios: Vec<StudioSeed>,
    #[serde(default)]
    pub reservations: Vec<ReservationSnapshot>,
    #[serde(default)]
    pub addon_bookings: Vec<AddonBooking>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioSeed {
    pub id: Ulid,
    #[serde(default = "default_slot_interval")]
    pub slot_interval_min: Minute,
    pub hours: WeeklyHours,
}

fn default_slot_interval() -> Minute {
    DEFAULT_SLOT_INTERVAL_MIN
}
