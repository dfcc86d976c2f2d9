//! Environment-driven configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::features::reminders::{DEFAULT_POLL_INTERVAL, IST_OFFSET_MINUTES};

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_SESSION_PATH: &str = "session.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the medication API (no trailing `/api`)
    pub api_url: String,
    /// Stored `userData` JSON for the signed-in user
    pub session_path: PathBuf,
    pub poll_interval: Duration,
    /// Offset used for "local" reminder time, in minutes east of UTC
    pub utc_offset_minutes: i32,
    pub http_timeout: Duration,
    pub log_level: String,
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("MEDALARM_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let session_path = lookup("MEDALARM_SESSION_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_PATH.to_string())
            .into();

        let poll_secs = parse_var(
            &lookup,
            "MEDALARM_POLL_SECS",
            DEFAULT_POLL_INTERVAL.as_secs(),
        )?;
        if poll_secs == 0 {
            return Err(anyhow!("MEDALARM_POLL_SECS must be greater than zero"));
        }

        let utc_offset_minutes =
            parse_var(&lookup, "MEDALARM_UTC_OFFSET_MINUTES", IST_OFFSET_MINUTES)?;
        // FixedOffset only accepts offsets strictly inside +/-24h
        if utc_offset_minutes.abs() >= 24 * 60 {
            return Err(anyhow!(
                "MEDALARM_UTC_OFFSET_MINUTES out of range: {}",
                utc_offset_minutes
            ));
        }

        let http_timeout_secs = parse_var(
            &lookup,
            "MEDALARM_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Config {
            api_url,
            session_path,
            poll_interval: Duration::from_secs(poll_secs),
            utc_offset_minutes,
            http_timeout: Duration::from_secs(http_timeout_secs),
            log_level,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        _ => Ok(default),
    }
}
