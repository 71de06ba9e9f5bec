//! Runtime configuration for the kitchen system.
//!
//! Defaults suit a single restaurant in Japan. Every field can be overridden
//! from the environment:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `KITCHEN_TICK_MS` | `tick_period` | 1000 |
//! | `KITCHEN_URGENT_AFTER_SECS` | `urgency_threshold` | 600 |
//! | `KITCHEN_HISTORY_PAGE_SIZE` | `history_page_size` | 4 |
//! | `KITCHEN_UTC_OFFSET_MINUTES` | `display_offset_minutes` | 540 |
//! | `KITCHEN_CHANNEL_BUFFER` | `channel_buffer` | 32 |

use crate::aggregate::DEFAULT_HISTORY_PAGE_SIZE;
use crate::urgency::{DEFAULT_TICK_PERIOD, DEFAULT_URGENCY_THRESHOLD};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_TICK_MS: &str = "KITCHEN_TICK_MS";
pub const ENV_URGENT_AFTER_SECS: &str = "KITCHEN_URGENT_AFTER_SECS";
pub const ENV_HISTORY_PAGE_SIZE: &str = "KITCHEN_HISTORY_PAGE_SIZE";
pub const ENV_UTC_OFFSET_MINUTES: &str = "KITCHEN_UTC_OFFSET_MINUTES";
pub const ENV_CHANNEL_BUFFER: &str = "KITCHEN_CHANNEL_BUFFER";

/// Japan Standard Time, UTC+9.
pub const DEFAULT_OFFSET_MINUTES: i32 = 9 * 60;

const MAX_OFFSET_MINUTES: i32 = 24 * 60;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} is not a valid value: {reason}")]
    Unparsable { name: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenConfig {
    pub tick_period: Duration,
    pub urgency_threshold: Duration,
    pub history_page_size: usize,
    /// Display timezone as minutes east of UTC.
    pub display_offset_minutes: i32,
    pub channel_buffer: usize,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            urgency_threshold: DEFAULT_URGENCY_THRESHOLD,
            history_page_size: DEFAULT_HISTORY_PAGE_SIZE,
            display_offset_minutes: DEFAULT_OFFSET_MINUTES,
            channel_buffer: 32,
        }
    }
}

impl KitchenConfig {
    /// Defaults overridden by whatever `KITCHEN_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(ms) = env_parse::<u64>(&lookup, ENV_TICK_MS)? {
            config.tick_period = Duration::from_millis(ms);
        }
        if let Some(secs) = env_parse::<u64>(&lookup, ENV_URGENT_AFTER_SECS)? {
            config.urgency_threshold = Duration::from_secs(secs);
        }
        if let Some(size) = env_parse::<usize>(&lookup, ENV_HISTORY_PAGE_SIZE)? {
            config.history_page_size = size;
        }
        if let Some(minutes) = env_parse::<i32>(&lookup, ENV_UTC_OFFSET_MINUTES)? {
            config.display_offset_minutes = minutes;
        }
        if let Some(buffer) = env_parse::<usize>(&lookup, ENV_CHANNEL_BUFFER)? {
            config.channel_buffer = buffer;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period.is_zero() {
            return Err(ConfigError::Invalid("tick period must be positive".into()));
        }
        if self.history_page_size == 0 {
            return Err(ConfigError::Invalid("history page size must be positive".into()));
        }
        if self.channel_buffer == 0 {
            return Err(ConfigError::Invalid("channel buffer must be positive".into()));
        }
        self.display_offset()?;
        Ok(())
    }

    /// The display timezone. Fails for offsets of a day or more.
    pub fn display_offset(&self) -> Result<FixedOffset, ConfigError> {
        if self.display_offset_minutes.abs() >= MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "UTC offset of {} minutes is out of range",
                self.display_offset_minutes
            )));
        }
        FixedOffset::east_opt(self.display_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "UTC offset of {} minutes is out of range",
                self.display_offset_minutes
            ))
        })
    }
}

fn env_string(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(v) = env_string(lookup, name) else {
        return Ok(None);
    };
    v.parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::Unparsable {
            name,
            reason: e.to_string(),
        })
}
