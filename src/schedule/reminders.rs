use chrono::NaiveDateTime;
use serde::Serialize;

use crate::model::{PaymentStatus, ReservationSnapshot, ReservationStatus};

use super::policy::{ReminderWindow, reminder_window};

// ── Payment reminder view ────────────────────────────────────────

/// A pending reservation inside its payment-reminder window, with enough
/// context to message the customer. This view never cancels anything; the
/// sweeper owns that, and both read the same window offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderItem {
    pub reservation: ReservationSnapshot,
    pub window: ReminderWindow,
    pub time_until_cancellation: String,
}

/// Human countdown until auto-cancellation, e.g. `"3 menit 12 detik"`.
pub fn countdown(cancel_at: NaiveDateTime, now: NaiveDateTime) -> String {
    let left = cancel_at - now;
    let secs = left.num_seconds();
    if secs <= 0 {
        return "Expired".to_string();
    }
    format!("{} menit {} detik", secs / 60, secs % 60)
}

/// Whether the reservation's reminder should be shown at `now`: at least
/// ten minutes old, not yet past the fifteen-minute cancellation mark.
pub fn should_show_reminder(r: &ReservationSnapshot, now: NaiveDateTime) -> bool {
    let window = reminder_window(r.created_at);
    window.remind_at <= now && now < window.cancel_at
}

/// Filter a batch of reservations down to the active reminders. Only
/// pending reservations with pending payment qualify; anything paid,
/// confirmed, or cancelled in the meantime drops out.
pub fn active_reminders(
    reservations: &[ReservationSnapshot],
    now: NaiveDateTime,
) -> Vec<ReminderItem> {
    reservations
        .iter()
        .filter(|r| {
            r.status == ReservationStatus::Pending
                && r.payment_status == PaymentStatus::Pending
                && should_show_reminder(r, now)
        })
        .map(|r| {
            let window = reminder_window(r.created_at);
            ReminderItem {
                reservation: r.clone(),
                window,
                time_until_cancellation: countdown(window.cancel_at, now),
            }
        })
        .collect()
}
