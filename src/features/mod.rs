//! # Features Layer

pub mod reminders;

pub use reminders::{ReminderScheduler, ReminderStore};
