use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Minute of day — the only clock unit inside the scheduler.
pub type Minute = i64;

pub fn minute_of_day(t: NaiveTime) -> Minute {
    (t.hour() * 60 + t.minute()) as Minute
}

/// Inverse of [`minute_of_day`]. `m` must lie within a single day; slot
/// arithmetic never crosses midnight because candidates past closing time
/// are not emitted.
pub fn minute_to_time(m: Minute) -> NaiveTime {
    debug_assert!((0..24 * 60).contains(&m), "minute outside day");
    NaiveTime::from_hms_opt((m / 60) as u32, (m % 60) as u32, 0)
        .expect("minute within day")
}

/// Half-open wall-clock range `[start, end)` within one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Minute,
    pub end: Minute,
}

impl TimeRange {
    pub fn new(start: Minute, end: Minute) -> Self {
        debug_assert!(start < end, "TimeRange start must be before end");
        Self { start, end }
    }

    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Self {
        Self::new(minute_of_day(start), minute_of_day(end))
    }

    pub fn duration_min(&self) -> Minute {
        self.end - self.start
    }

    /// Three-way overlap test. Back-to-back ranges do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Terminal states can no longer be rescheduled or cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Any money has been received — a DP or the full amount.
    pub fn any_received(&self) -> bool {
        matches!(self, Self::Partial | Self::Completed)
    }
}

/// What kind of booking occupies a facility range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupiedSource {
    Package,
    Addon,
}

/// An existing booking interval a candidate slot must not overlap, tagged
/// with its owning reservation so reschedule flows can exclude it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedRange {
    pub reservation_id: Ulid,
    pub source: OccupiedSource,
    pub range: TimeRange,
}

/// Read-only view of a package reservation, owned by the booking directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationSnapshot {
    pub id: Ulid,
    pub studio_id: Ulid,
    pub facility_id: Ulid,
    pub customer_name: String,
    pub customer_phone: String,
    pub reservation_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    pub created_at: NaiveDateTime,
    /// Amounts in IDR.
    pub dp_amount: i64,
    pub remaining_amount: i64,
    pub total_amount: i64,
}

/// An add-on time booking attached to a reservation. Add-ons consume the
/// same facility availability as the package session itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonBooking {
    pub id: Ulid,
    pub reservation_id: Ulid,
    pub facility_id: Ulid,
    pub addon_name: String,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
}

/// Opening hours for a single day. Closed days have no entry at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl DayHours {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        debug_assert!(open < close, "DayHours open must be before close");
        Self { open, close }
    }
}

/// Per-weekday operating hours of a studio.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub mon: Option<DayHours>,
    pub tue: Option<DayHours>,
    pub wed: Option<DayHours>,
    pub thu: Option<DayHours>,
    pub fri: Option<DayHours>,
    pub sat: Option<DayHours>,
    pub sun: Option<DayHours>,
}

impl WeeklyHours {
    pub fn for_date(&self, date: NaiveDate) -> Option<DayHours> {
        match date.weekday() {
            Weekday::Mon => self.mon,
            Weekday::Tue => self.tue,
            Weekday::Wed => self.wed,
            Weekday::Thu => self.thu,
            Weekday::Fri => self.fri,
            Weekday::Sat => self.sat,
            Weekday::Sun => self.sun,
        }
    }
}

// ── Query result types ───────────────────────────────────────────

/// A candidate start time for a session of the requested duration.
/// Computed fresh on every query, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotCandidate {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub available: bool,
}

/// Availability of one facility on one day.
///
/// `Closed` means the studio has no operating hours that day; it is a
/// successful result, distinct from a directory failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DaySchedule {
    Closed,
    Open { slots: Vec<SlotCandidate> },
}

impl DaySchedule {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn slots(&self) -> &[SlotCandidate] {
        match self {
            Self::Closed => &[],
            Self::Open { slots } => slots,
        }
    }
}
