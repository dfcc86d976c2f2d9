// Core layer - config, session, user-facing messages
pub mod core;

// Features layer
pub mod features;

// Application layer - CLI command handlers
pub mod commands;

pub use crate::core::Config;
pub use features::reminders::{
    AlarmPresenter, Clock, HttpReminderStore, PollOutcome, Reminder, ReminderScheduler,
    ReminderStore, SchedulerHandle, SystemClock, TerminalAlarm,
};
