use chrono::NaiveTime;

use crate::model::Minute;

#[derive(Debug)]
pub enum ScheduleError {
    /// A stored booking range with `start >= end` — bad data upstream.
    InvalidRange { start: NaiveTime, end: NaiveTime },
    NonPositiveDuration(Minute),
    NonPositiveInterval(Minute),
    /// The booking directory failed to answer; distinct from "no slots".
    Upstream(String),
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::InvalidRange { start, end } => {
                write!(f, "invalid booking range: [{start}, {end})")
            }
            ScheduleError::NonPositiveDuration(d) => {
                write!(f, "duration must be positive, got {d}")
            }
            ScheduleError::NonPositiveInterval(i) => {
                write!(f, "slot interval must be positive, got {i}")
            }
            ScheduleError::Upstream(e) => write!(f, "booking directory error: {e}"),
        }
    }
}

impl std::error::Error for ScheduleError {}
