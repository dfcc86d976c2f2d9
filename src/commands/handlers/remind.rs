//! Reminder command handlers
//!
//! Handles: watch, list, add, delete
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Terminal commands over the reminder store
//! - 1.0.0: Initial release

use anyhow::{Context, Result};
use log::{info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::commands::args::AddArgs;
use crate::commands::context::CommandContext;
use crate::core::notify_success;
use crate::features::reminders::format::{capitalize, format_time};
use crate::features::reminders::{
    NewReminder, Reminder, ReminderScheduler, SystemClock, TerminalAlarm,
};

/// Handler for reminder-related commands
pub struct RemindHandler;

impl RemindHandler {
    /// Handle `watch` - poll until Ctrl-C; Enter acknowledges a ringing alarm
    pub async fn handle_watch(&self, ctx: &CommandContext, interval: Option<u64>) -> Result<()> {
        let every = interval
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(ctx.config.poll_interval);

        let clock = SystemClock::new(ctx.config.utc_offset_minutes)?;
        let scheduler = Arc::new(ReminderScheduler::new(
            ctx.store.clone(),
            Arc::new(TerminalAlarm::default()),
            Arc::new(clock),
            ctx.user_id(),
        ));
        let handle = scheduler.clone().spawn(every);

        let name = match ctx.session.first_name() {
            "" => "you".to_string(),
            first => first.to_string(),
        };
        println!("👀 Watching reminders for {name}. Press Ctrl-C to quit.");

        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {e}");
            }
        };
        let stdin = BufReader::new(tokio::io::stdin());
        acknowledge_until(ctrl_c, stdin, || scheduler.stop_alarm()).await;

        handle.stop().await;
        info!("Stopped watching reminders for user {}", ctx.user_id());
        Ok(())
    }

    /// Handle `list` - print the user's reminders
    pub async fn handle_list(&self, ctx: &CommandContext) -> Result<()> {
        let reminders = ctx
            .store
            .list(ctx.user_id())
            .await
            .context("Could not load reminders")?;
        println!("{}", render_reminder_list(&reminders));
        Ok(())
    }

    /// Handle `add` - create a reminder on the server
    pub async fn handle_add(&self, ctx: &CommandContext, args: AddArgs) -> Result<Reminder> {
        let new_reminder = build_new_reminder(ctx.user_id(), args);
        new_reminder.validate()?;

        let created = ctx
            .store
            .create(&new_reminder)
            .await
            .context("Failed to add reminder")?;

        info!(
            "Created reminder {} for user {} ({})",
            created.id,
            ctx.user_id(),
            created.medication_name
        );
        notify_success(&format!(
            "Reminder added successfully! #{} {} at {}",
            created.id,
            created.medication_name,
            format_time(created.time.as_deref().unwrap_or(""))
        ));
        Ok(created)
    }

    /// Handle `delete` - remove a reminder; nothing changes locally unless the server agrees
    pub async fn handle_delete(&self, ctx: &CommandContext, id: i64) -> Result<()> {
        ctx.store
            .delete(id)
            .await
            .with_context(|| format!("Failed to delete reminder #{id}"))?;

        info!("Deleted reminder {id} for user {}", ctx.user_id());
        notify_success("Reminder deleted successfully!");
        Ok(())
    }
}

/// Call `on_enter` for every line read from `input` until `shutdown`
/// resolves. Input reaching EOF leaves only `shutdown` to wait on. Returns
/// how many lines were read.
async fn acknowledge_until<S, R, F>(shutdown: S, input: R, on_enter: F) -> usize
where
    S: Future<Output = ()>,
    R: AsyncBufRead + Unpin,
    F: Fn(),
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();
    let mut input_open = true;
    let mut acknowledged = 0;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line(), if input_open => match line {
                Ok(Some(_)) => {
                    on_enter();
                    acknowledged += 1;
                }
                Ok(None) => input_open = false,
                Err(e) => {
                    warn!("Failed to read stdin: {e}");
                    input_open = false;
                }
            },
        }
    }

    acknowledged
}

fn build_new_reminder(user_id: i64, args: AddArgs) -> NewReminder {
    NewReminder {
        user_id,
        medication_name: args.medication.trim().to_string(),
        date: args
            .date
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        time: args.time.trim().to_string(),
        frequency: args.frequency,
        notes: args.notes,
    }
}

/// One line per reminder: id, time, badge, medication, schedule, notes
pub fn render_reminder_line(reminder: &Reminder) -> String {
    let time = match reminder.time.as_deref() {
        Some(t) => format_time(t),
        None => "--:--".to_string(),
    };
    let schedule = match reminder.scheduled_date() {
        Some(date) => format!("on {date}"),
        None => "every day".to_string(),
    };

    let mut line = format!(
        "#{} {} [{}] {} ({})",
        reminder.id,
        time,
        capitalize(&reminder.frequency.to_string()),
        reminder.medication_name,
        schedule
    );
    if !reminder.notes.trim().is_empty() {
        line.push_str(&format!("\n> {}", reminder.notes.trim()));
    }
    line
}

pub fn render_reminder_list(reminders: &[Reminder]) -> String {
    if reminders.is_empty() {
        return "📋 You don't have any reminders.\n\nUse `medalarm add --medication <name> --time <HH:MM>` to create one!"
            .to_string();
    }

    let mut out = String::from("📋 Your Reminders:\n\n");
    for reminder in reminders {
        out.push_str(&render_reminder_line(reminder));
        out.push_str("\n\n");
    }
    out.push_str("Use `medalarm delete <id>` to remove a reminder.");
    out
}
