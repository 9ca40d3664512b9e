use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::directory::BookingDirectory;
use crate::observability;
use crate::schedule::{PENDING_SCAN_HOURS, ScheduleError, policy};

/// Background task that auto-cancels unpaid pending reservations once their
/// payment window lapses. Shares the window offsets with the reminder view,
/// so a reminder can never outlive the booking it points at.
pub async fn run_sweeper(studio_id: Ulid, directory: Arc<dyn BookingDirectory>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        let now = Local::now().naive_local();
        match sweep_once(studio_id, directory.as_ref(), now).await {
            Ok(cancelled) => {
                for id in &cancelled {
                    info!("auto-cancelled unpaid reservation {id}");
                }
            }
            Err(e) => warn!("sweep failed for studio {studio_id}: {e}"),
        }
    }
}

/// One sweep pass at `now`. Returns the ids of reservations cancelled.
pub async fn sweep_once(
    studio_id: Ulid,
    directory: &dyn BookingDirectory,
    now: NaiveDateTime,
) -> Result<Vec<Ulid>, ScheduleError> {
    let since = now - chrono::Duration::hours(PENDING_SCAN_HOURS);
    let pending = directory
        .pending_payment_reservations(studio_id, since)
        .await
        .map_err(|e| ScheduleError::Upstream(e.to_string()))?;

    let mut cancelled = Vec::new();
    let mut reminders_active = 0usize;
    for reservation in &pending {
        let window = policy::reminder_window(reservation.created_at);
        if window.cancel_at <= now {
            match directory.cancel_reservation(reservation.id).await {
                Ok(()) => {
                    metrics::counter!(observability::AUTO_CANCELLATIONS_TOTAL).increment(1);
                    cancelled.push(reservation.id);
                }
                // May already have been paid or cancelled by staff — that's fine
                Err(e) => debug!("sweep skip {}: {e}", reservation.id),
            }
        } else if window.remind_at <= now {
            reminders_active += 1;
        }
    }
    metrics::gauge!(observability::REMINDERS_ACTIVE).set(reminders_active as f64);
    Ok(cancelled)
}
