//! # Command System
//!
//! Terminal subcommands for the signed-in patient.
//!
//! - **Version**: 3.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.1.0: `--dry-run` swaps in an in-memory store
//! - 3.0.0: clap subcommands over the reminder store
//! - 2.0.0: Handler/context split
//! - 1.0.0: Initial release

pub mod args;
pub mod context;
pub mod handlers;

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::core::Config;
use crate::features::reminders::{HttpReminderStore, InMemoryReminderStore, ReminderStore};

pub use args::{AddArgs, Cli, Commands};
pub use context::CommandContext;
pub use handlers::RemindHandler;

/// Route a parsed subcommand to its handler
pub async fn dispatch(ctx: &CommandContext, command: Commands) -> Result<()> {
    let handler = RemindHandler;
    match command {
        Commands::Watch { interval } => handler.handle_watch(ctx, interval).await,
        Commands::List => handler.handle_list(ctx).await,
        Commands::Add(args) => handler.handle_add(ctx, args).await.map(|_| ()),
        Commands::Delete { id } => handler.handle_delete(ctx, id).await,
    }
}

/// The store commands run against: the HTTP API, or an empty in-memory
/// store when `dry_run` is set
pub fn build_store(config: &Config, dry_run: bool) -> Result<Arc<dyn ReminderStore>> {
    if dry_run {
        info!("Dry run: reminders are kept in memory and {} is never contacted", config.api_url);
        return Ok(Arc::new(InMemoryReminderStore::new()));
    }
    Ok(Arc::new(HttpReminderStore::new(&config.api_url, config.http_timeout)?))
}
