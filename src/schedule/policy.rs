use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::{PaymentStatus, ReservationSnapshot, ReservationStatus};

// ── Policy constants ─────────────────────────────────────────────
//
// The single definition of every scheduling window. The reminder view and
// the auto-cancellation sweeper must agree on the offsets, so nothing else
// may redefine them.

/// Latest day, counted in whole days before the session, on which payment
/// completion and reschedule are still accepted (H-3).
pub const H3_CUTOFF_DAYS: i64 = 3;

/// Minutes after booking creation before an unpaid reservation is reminded.
pub const REMINDER_AFTER_MIN: i64 = 10;

/// Minutes after booking creation before an unpaid reservation is
/// auto-cancelled.
pub const AUTO_CANCEL_AFTER_MIN: i64 = 15;

/// Whole calendar days from `now`'s date to the reservation date. Negative
/// once the date has passed. Deliberately ignores time of day so deadline
/// rules cannot drift by a few hours around midnight.
pub fn days_until(reservation_date: NaiveDate, now: NaiveDateTime) -> i64 {
    (reservation_date - now.date()).num_days()
}

// ── Result types ─────────────────────────────────────────────────

/// Outcome of a gated action check. `reason` is set iff `allowed` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCheck {
    pub allowed: bool,
    pub reason: Option<&'static str>,
    pub days_remaining: i64,
}

/// What happens to the down payment when a reservation is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DpPolicy {
    Refund,
    Forfeit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancellationPolicy {
    pub can_cancel: bool,
    pub dp_policy: DpPolicy,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineInfo {
    pub days_remaining: i64,
    pub is_urgent: bool,
    pub is_past_deadline: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

/// Staff-facing triage level. Never used to gate an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingPriority {
    pub priority: Priority,
    pub label: &'static str,
}

/// When an unpaid pending reservation gets its payment reminder and when it
/// is auto-cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderWindow {
    pub remind_at: NaiveDateTime,
    pub cancel_at: NaiveDateTime,
}

pub fn reminder_window(created_at: NaiveDateTime) -> ReminderWindow {
    ReminderWindow {
        remind_at: created_at + Duration::minutes(REMINDER_AFTER_MIN),
        cancel_at: created_at + Duration::minutes(AUTO_CANCEL_AFTER_MIN),
    }
}

// ── Policy rules ─────────────────────────────────────────────────
//
// Pure functions of (reservation, now). The reservation lifecycle
// (pending → confirmed → completed, cancellable before completed) and the
// payment lifecycle are read here, never transitioned.

pub fn can_complete_payment(r: &ReservationSnapshot, now: NaiveDateTime) -> PermissionCheck {
    let days_remaining = days_until(r.reservation_date, now);
    if r.payment_status == PaymentStatus::Completed {
        return PermissionCheck {
            allowed: false,
            reason: Some("Pembayaran sudah lunas"),
            days_remaining,
        };
    }
    if days_remaining < H3_CUTOFF_DAYS {
        return PermissionCheck {
            allowed: false,
            reason: Some("Batas waktu pelunasan maksimal H-3 sebelum jadwal sudah terlewat"),
            days_remaining,
        };
    }
    if r.remaining_amount <= 0 {
        return PermissionCheck {
            allowed: false,
            reason: Some("Tidak ada sisa pembayaran yang harus dilunasi"),
            days_remaining,
        };
    }
    PermissionCheck {
        allowed: true,
        reason: None,
        days_remaining,
    }
}

pub fn can_reschedule(r: &ReservationSnapshot, now: NaiveDateTime) -> PermissionCheck {
    let days_remaining = days_until(r.reservation_date, now);
    let reason = match r.status {
        ReservationStatus::Completed => Some("Reservasi sudah selesai"),
        ReservationStatus::Cancelled => Some("Reservasi sudah dibatalkan"),
        _ if days_remaining < H3_CUTOFF_DAYS => {
            Some("Batas waktu reschedule maksimal H-3 sebelum jadwal sudah terlewat")
        }
        _ => None,
    };
    PermissionCheck {
        allowed: reason.is_none(),
        reason,
        days_remaining,
    }
}

/// Whether the reservation may be cancelled and what happens to the DP.
/// Depends only on the two statuses; the result is defined for every
/// status combination.
pub fn cancellation_policy(r: &ReservationSnapshot) -> CancellationPolicy {
    let dp_policy = if r.payment_status.any_received() {
        DpPolicy::Forfeit
    } else {
        DpPolicy::Refund
    };
    match r.status {
        ReservationStatus::Completed => CancellationPolicy {
            can_cancel: false,
            dp_policy,
            message: "Reservasi sudah selesai dan tidak dapat dibatalkan",
        },
        ReservationStatus::Cancelled => CancellationPolicy {
            can_cancel: false,
            dp_policy,
            message: "Reservasi sudah dibatalkan",
        },
        ReservationStatus::Pending | ReservationStatus::Confirmed => CancellationPolicy {
            can_cancel: true,
            dp_policy,
            message: match dp_policy {
                DpPolicy::Forfeit => "DP tidak dapat dikembalikan jika reservasi dibatalkan",
                DpPolicy::Refund => {
                    "Belum ada pembayaran yang diterima, tidak ada DP yang hangus"
                }
            },
        },
    }
}

pub fn deadline_info(r: &ReservationSnapshot, now: NaiveDateTime) -> DeadlineInfo {
    let days_remaining = days_until(r.reservation_date, now);
    let (is_urgent, message) = if days_remaining < 0 {
        (true, format!("Jadwal sudah lewat {} hari", -days_remaining))
    } else if days_remaining == 0 {
        (true, "Jadwal hari ini".to_string())
    } else if days_remaining == 1 {
        (true, "Jadwal besok".to_string())
    } else if days_remaining <= H3_CUTOFF_DAYS {
        (
            true,
            format!("{days_remaining} hari menuju jadwal, segera selesaikan pelunasan"),
        )
    } else {
        (false, format!("{days_remaining} hari menuju jadwal"))
    };
    DeadlineInfo {
        days_remaining,
        is_urgent,
        is_past_deadline: days_remaining < 0,
        message,
    }
}

pub fn booking_priority(r: &ReservationSnapshot, now: NaiveDateTime) -> BookingPriority {
    let days_remaining = days_until(r.reservation_date, now);
    let (priority, label) = if days_remaining <= 2 {
        (Priority::Urgent, "Mendesak")
    } else if days_remaining == H3_CUTOFF_DAYS && r.remaining_amount > 0 {
        (Priority::High, "Tinggi")
    } else if days_remaining <= 7 {
        (Priority::Medium, "Sedang")
    } else {
        (Priority::Low, "Rendah")
    };
    BookingPriority { priority, label }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use ulid::Ulid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        d.and_hms_opt(h, min, 0).unwrap()
    }

    fn reservation(
        reservation_date: NaiveDate,
        status: ReservationStatus,
        payment_status: PaymentStatus,
        remaining_amount: i64,
    ) -> ReservationSnapshot {
        ReservationSnapshot {
            id: Ulid::new(),
            studio_id: Ulid::new(),
            facility_id: Ulid::new(),
            customer_name: "Dewi".into(),
            customer_phone: "+62812000222".into(),
            reservation_date,
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            status,
            payment_status,
            created_at: at(date(2026, 8, 1), 9, 0),
            dp_amount: 150_000,
            remaining_amount,
            total_amount: 500_000,
        }
    }

    // ── days_until ───────────────────────────────────────

    #[test]
    fn days_until_ignores_time_of_day() {
        let event = date(2026, 8, 10);
        let today = date(2026, 8, 5);
        assert_eq!(days_until(event, at(today, 0, 1)), 5);
        assert_eq!(days_until(event, at(today, 23, 59)), 5);
    }

    #[test]
    fn days_until_decreases_by_one_per_day() {
        let event = date(2026, 8, 10);
        for offset in 0..14i64 {
            let now = at(date(2026, 8, 1), 12, 0) + Duration::days(offset);
            let next_day = now + Duration::days(1);
            assert_eq!(days_until(event, now) - 1, days_until(event, next_day));
        }
    }

    #[test]
    fn days_until_negative_for_past_dates() {
        assert_eq!(days_until(date(2026, 8, 1), at(date(2026, 8, 4), 8, 0)), -3);
    }

    // ── payment completion ───────────────────────────────

    #[test]
    fn payment_allowed_before_cutoff() {
        let r = reservation(date(2026, 8, 10), ReservationStatus::Confirmed, PaymentStatus::Partial, 350_000);
        let check = can_complete_payment(&r, at(date(2026, 8, 5), 10, 0));
        assert!(check.allowed);
        assert_eq!(check.reason, None);
        assert_eq!(check.days_remaining, 5);
    }

    #[test]
    fn payment_blocked_two_days_out() {
        // H-2: the H-3 window has already passed
        let r = reservation(date(2026, 8, 7), ReservationStatus::Pending, PaymentStatus::Pending, 500_000);
        let check = can_complete_payment(&r, at(date(2026, 8, 5), 10, 0));
        assert!(!check.allowed);
        assert_eq!(check.days_remaining, 2);
        assert!(check.reason.unwrap().contains("H-3"));
    }

    #[test]
    fn payment_allowed_exactly_at_h3() {
        let r = reservation(date(2026, 8, 8), ReservationStatus::Confirmed, PaymentStatus::Partial, 350_000);
        let check = can_complete_payment(&r, at(date(2026, 8, 5), 23, 0));
        assert!(check.allowed);
        assert_eq!(check.days_remaining, 3);
    }

    #[test]
    fn payment_blocked_when_already_settled() {
        let r = reservation(date(2026, 8, 20), ReservationStatus::Confirmed, PaymentStatus::Completed, 0);
        let check = can_complete_payment(&r, at(date(2026, 8, 5), 10, 0));
        assert!(!check.allowed);
        assert_eq!(check.reason, Some("Pembayaran sudah lunas"));
    }

    #[test]
    fn payment_blocked_when_nothing_owed() {
        let r = reservation(date(2026, 8, 20), ReservationStatus::Confirmed, PaymentStatus::Partial, 0);
        let check = can_complete_payment(&r, at(date(2026, 8, 5), 10, 0));
        assert!(!check.allowed);
        assert!(check.reason.unwrap().contains("sisa pembayaran"));
    }

    // ── reschedule ───────────────────────────────────────

    #[test]
    fn reschedule_uses_same_cutoff_as_payment() {
        let now = at(date(2026, 8, 5), 10, 0);
        for offset in -2..10i64 {
            let event = date(2026, 8, 5) + Duration::days(offset);
            let r = reservation(event, ReservationStatus::Confirmed, PaymentStatus::Partial, 100_000);
            let pay = can_complete_payment(&r, now);
            let move_it = can_reschedule(&r, now);
            assert_eq!(pay.allowed, move_it.allowed, "offset {offset}");
            assert_eq!(pay.days_remaining, move_it.days_remaining);
        }
    }

    #[test]
    fn reschedule_blocked_for_terminal_states() {
        let now = at(date(2026, 8, 5), 10, 0);
        let done = reservation(date(2026, 8, 20), ReservationStatus::Completed, PaymentStatus::Completed, 0);
        assert!(!can_reschedule(&done, now).allowed);
        let gone = reservation(date(2026, 8, 20), ReservationStatus::Cancelled, PaymentStatus::Refunded, 0);
        assert!(!can_reschedule(&gone, now).allowed);
    }

    // ── cancellation ─────────────────────────────────────

    #[test]
    fn cancellation_forfeits_dp_once_money_received() {
        let r = reservation(date(2026, 8, 20), ReservationStatus::Confirmed, PaymentStatus::Partial, 350_000);
        let policy = cancellation_policy(&r);
        assert!(policy.can_cancel);
        assert_eq!(policy.dp_policy, DpPolicy::Forfeit);
    }

    #[test]
    fn cancellation_refunds_when_nothing_paid() {
        let r = reservation(date(2026, 8, 20), ReservationStatus::Pending, PaymentStatus::Pending, 500_000);
        let policy = cancellation_policy(&r);
        assert!(policy.can_cancel);
        assert_eq!(policy.dp_policy, DpPolicy::Refund);
    }

    #[test]
    fn cancellation_defined_for_every_status_combination() {
        let statuses = [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Completed,
            ReservationStatus::Cancelled,
        ];
        let payments = [
            PaymentStatus::Pending,
            PaymentStatus::Partial,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ];
        for status in statuses {
            for payment in payments {
                let r = reservation(date(2026, 8, 20), status, payment, 1);
                let policy = cancellation_policy(&r);
                assert!(!policy.message.is_empty());
                assert_eq!(policy.can_cancel, !status.is_terminal());
                assert_eq!(
                    policy.dp_policy,
                    if payment.any_received() { DpPolicy::Forfeit } else { DpPolicy::Refund }
                );
            }
        }
    }

    // ── deadline classification ──────────────────────────

    #[test]
    fn deadline_classification_brackets() {
        let now = at(date(2026, 8, 5), 10, 0);
        let info_at = |offset: i64| {
            let r = reservation(
                date(2026, 8, 5) + Duration::days(offset),
                ReservationStatus::Confirmed,
                PaymentStatus::Partial,
                100_000,
            );
            deadline_info(&r, now)
        };

        let past = info_at(-4);
        assert!(past.is_urgent && past.is_past_deadline);
        assert!(past.message.contains("lewat 4 hari"));

        let today = info_at(0);
        assert!(today.is_urgent && !today.is_past_deadline);
        assert_eq!(today.message, "Jadwal hari ini");

        let tomorrow = info_at(1);
        assert!(tomorrow.is_urgent);
        assert_eq!(tomorrow.message, "Jadwal besok");

        for d in [2, 3] {
            let soon = info_at(d);
            assert!(soon.is_urgent, "H-{d} should be urgent");
            assert!(soon.message.contains(&format!("{d} hari")));
        }

        let week = info_at(6);
        assert!(!week.is_urgent && !week.is_past_deadline);

        let far = info_at(20);
        assert!(!far.is_urgent);
        assert_eq!(far.days_remaining, 20);
    }

    // ── priority ─────────────────────────────────────────

    #[test]
    fn priority_triage_ordering() {
        let now = at(date(2026, 8, 5), 10, 0);
        let prio = |offset: i64, remaining: i64| {
            let r = reservation(
                date(2026, 8, 5) + Duration::days(offset),
                ReservationStatus::Confirmed,
                PaymentStatus::Partial,
                remaining,
            );
            booking_priority(&r, now).priority
        };

        assert_eq!(prio(-1, 100_000), Priority::Urgent);
        assert_eq!(prio(2, 100_000), Priority::Urgent);
        assert_eq!(prio(3, 100_000), Priority::High);
        assert_eq!(prio(3, 0), Priority::Medium); // settled, H-3 pressure is off
        assert_eq!(prio(7, 100_000), Priority::Medium);
        assert_eq!(prio(8, 100_000), Priority::Low);
    }

    // ── reminder window ──────────────────────────────────

    #[test]
    fn reminder_window_offsets() {
        let created = at(date(2026, 8, 5), 9, 0);
        let window = reminder_window(created);
        assert_eq!(window.remind_at, at(date(2026, 8, 5), 9, 10));
        assert_eq!(window.cancel_at, at(date(2026, 8, 5), 9, 15));
        assert!(window.remind_at < window.cancel_at);
    }
}
