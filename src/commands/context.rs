//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::sync::Arc;

use crate::core::{Config, Session};
use crate::features::reminders::ReminderStore;

/// Everything a command needs: the store, who is signed in, and settings
#[derive(Clone)]
pub struct CommandContext {
    pub store: Arc<dyn ReminderStore>,
    pub session: Session,
    pub config: Config,
}

impl CommandContext {
    pub fn new(store: Arc<dyn ReminderStore>, session: Session, config: Config) -> Self {
        CommandContext {
            store,
            session,
            config,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.session.id
    }
}
