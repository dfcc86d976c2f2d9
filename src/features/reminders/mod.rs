//! # Reminders Feature
//!
//! Medication reminders: remote store, fixed-offset clock, polling scheduler
//! and the alarm shown when a reminder comes due.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Scheduler owns its firing record; clock and store are injected
//! - 1.0.0: Initial release

pub mod alarm;
pub mod clock;
pub mod format;
pub mod model;
pub mod scheduler;
pub mod store;

pub use alarm::{AlarmPresenter, AlarmTone, TerminalAlarm};
pub use clock::{Clock, FixedClock, LocalMoment, SystemClock, IST_OFFSET_MINUTES};
pub use format::format_time;
pub use model::{FiringKey, Frequency, NewReminder, Reminder};
pub use scheduler::{PollOutcome, ReminderScheduler, SchedulerHandle, DEFAULT_POLL_INTERVAL};
pub use store::{HttpReminderStore, InMemoryReminderStore, ReminderStore};
