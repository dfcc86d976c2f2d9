//! Reminder records as served by the medication API

use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize};

use super::clock::LocalMoment;
use super::format::{parse_date, parse_time};

/// How often a reminder recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Custom,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "custom" => Ok(Frequency::Custom),
            _ => Err(anyhow!("Invalid frequency: {}", s)),
        }
    }
}

/// A medication reminder owned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: i64,

    #[serde(default, alias = "medication_name", deserialize_with = "string_or_null")]
    pub medication_name: String,

    /// `YYYY-MM-DD`; `None` recurs every day
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date: Option<String>,

    /// `HH:MM`, 24-hour
    #[serde(default, deserialize_with = "blank_as_none")]
    pub time: Option<String>,

    #[serde(default, deserialize_with = "lenient_frequency")]
    pub frequency: Frequency,

    #[serde(default, deserialize_with = "string_or_null")]
    pub notes: String,
}

impl Reminder {
    pub fn scheduled_date(&self) -> Option<&str> {
        self.date.as_deref().filter(|d| !d.is_empty())
    }

    /// True when the reminder's time and (optional) date match `now`.
    /// Matching compares the raw 24-hour strings.
    pub fn is_due(&self, now: &LocalMoment) -> bool {
        let time_match = self.time.as_deref() == Some(now.time.as_str());
        let date_match = match self.scheduled_date() {
            None => true,
            Some(date) => date == now.date,
        };
        time_match && date_match
    }
}

/// Marks one firing of one reminder in one minute
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FiringKey {
    pub reminder_id: i64,
    pub date: String,
    pub time: String,
}

impl FiringKey {
    /// Dateless reminders take the current date, so they get one key per day
    pub fn new(reminder_id: i64, now: &LocalMoment) -> Self {
        FiringKey {
            reminder_id,
            date: now.date.clone(),
            time: now.time.clone(),
        }
    }
}

impl std::fmt::Display for FiringKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "reminder_shown_{}_{}_{}",
            self.reminder_id, self.date, self.time
        )
    }
}

/// Body of `POST /api/reminders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub user_id: i64,
    pub medication_name: String,
    pub date: Option<String>,
    pub time: String,
    pub frequency: Frequency,
    pub notes: String,
}

impl NewReminder {
    pub fn validate(&self) -> Result<()> {
        if self.medication_name.trim().is_empty() {
            return Err(anyhow!("Medication name is required"));
        }
        parse_time(&self.time)?;
        if let Some(date) = self.date.as_deref() {
            parse_date(date)?;
        }
        Ok(())
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn string_or_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

// Unknown or missing frequencies fall back to daily; frequency never affects firing.
fn lenient_frequency<'de, D>(deserializer: D) -> std::result::Result<Frequency, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
}
