//! Scheduling core of a multi-studio photo-session booking platform.
//!
//! The heart of the crate is pure: slot generation over half-open time
//! ranges ([`schedule::generate_slots`]), date-relative booking policy
//! ([`schedule::policy`]) and the payment-reminder view
//! ([`schedule::reminders`]). I/O happens only at the edges, through the
//! [`directory::BookingDirectory`] trait, and `now` is threaded in as an
//! argument everywhere below the worker loop.

pub mod directory;
pub mod model;
pub mod observability;
pub mod schedule;
pub mod studio;
pub mod sweeper;
