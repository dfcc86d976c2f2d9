//! # Core Module
//!
//! Configuration, the signed-in session, and user-facing status lines.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add session gate and notify helpers
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod notify;
pub mod session;

pub use config::Config;
pub use notify::{notify_failure, notify_success};
pub use session::{Role, Session};
