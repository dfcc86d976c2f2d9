//! Wall-clock source for reminder matching
//!
//! Reminder "local" time is a fixed UTC offset (+05:30 unless configured
//! otherwise). The host's timezone is never consulted.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use std::sync::Mutex;

/// India Standard Time, in minutes east of UTC
pub const IST_OFFSET_MINUTES: i32 = 330;

/// Minute-granular view of "now" used for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMoment {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    pub time: String,
}

impl LocalMoment {
    pub fn from_datetime(dt: &DateTime<FixedOffset>) -> Self {
        LocalMoment {
            date: dt.format("%Y-%m-%d").to_string(),
            time: dt.format("%H:%M").to_string(),
        }
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn moment(&self) -> LocalMoment {
        LocalMoment::from_datetime(&self.now())
    }
}

/// Host clock shifted into a fixed offset
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset_minutes: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or_else(|| anyhow!("Invalid UTC offset: {} minutes", offset_minutes))?;
        Ok(SystemClock { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        let offset = FixedOffset::east_opt(IST_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix());
        SystemClock { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    /// Parse an RFC 3339 timestamp such as `2024-05-01T09:30:00+05:30`
    pub fn at(rfc3339: &str) -> Result<Self> {
        Ok(Self::new(DateTime::parse_from_rfc3339(rfc3339)?))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
