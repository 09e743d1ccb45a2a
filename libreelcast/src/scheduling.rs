//! Scheduling and time parsing utilities
//!
//! Parses human-readable time formats for scheduling posts and computes
//! evenly spaced auto-schedule slots.

use crate::{ReelcastError, Result};
use chrono::{DateTime, Duration, Timelike, Utc};
use std::str::FromStr;

/// Parse a schedule string into a DateTime
///
/// Supports multiple formats:
/// - Relative durations: "1h", "30m", "2d"
/// - Natural language: "tomorrow", "next monday 10am"
/// - Absolute times: "2026-11-20 15:00"
///
/// # Errors
///
/// Returns an error if the time format is invalid or cannot be parsed.
pub fn parse_schedule(input: &str) -> Result<DateTime<Utc>> {
    if input.is_empty() {
        return Err(ReelcastError::InvalidInput(
            "Schedule string cannot be empty".to_string(),
        ));
    }

    if let Ok(duration) = parse_duration(input) {
        return Ok(Utc::now() + duration);
    }

    if let Ok(dt) = parse_natural_language(input) {
        return Ok(dt);
    }

    Err(ReelcastError::InvalidInput(format!(
        "Could not parse schedule string: {}",
        input
    )))
}

/// Reject a scheduled time that is not strictly in the future
pub fn ensure_future(when: DateTime<Utc>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if when <= now {
        return Err(ReelcastError::InvalidInput(format!(
            "Scheduled time must be in the future (got {})",
            when.to_rfc3339()
        )));
    }
    Ok(when)
}

/// Parse a duration string into a chrono::Duration
fn parse_duration(input: &str) -> Result<Duration> {
    if let Ok(std_duration) = humantime::parse_duration(input) {
        let seconds = std_duration.as_secs() as i64;
        return Duration::try_seconds(seconds)
            .ok_or_else(|| ReelcastError::InvalidInput("Duration out of range".to_string()));
    }

    Err(ReelcastError::InvalidInput(format!(
        "Could not parse duration: {}",
        input
    )))
}

/// Parse natural language time expression
fn parse_natural_language(input: &str) -> Result<DateTime<Utc>> {
    chrono_english::parse_date_string(input, Utc::now(), chrono_english::Dialect::Us)
        .map_err(|e| ReelcastError::InvalidInput(format!("Could not parse time: {}", e)))
}

/// How often auto-scheduled posts should go out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingFrequency {
    Daily,
    TwiceDaily,
    ThriceDaily,
}

impl PostingFrequency {
    /// Hours between consecutive slots
    pub fn interval_hours(&self) -> i64 {
        match self {
            Self::Daily => 24,
            Self::TwiceDaily => 12,
            Self::ThriceDaily => 8,
        }
    }
}

impl FromStr for PostingFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "twice-daily" => Ok(Self::TwiceDaily),
            "thrice-daily" => Ok(Self::ThriceDaily),
            _ => Err(format!(
                "Invalid frequency: '{}'. Valid options: daily, twice-daily, thrice-daily",
                s
            )),
        }
    }
}

impl std::fmt::Display for PostingFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::TwiceDaily => write!(f, "twice-daily"),
            Self::ThriceDaily => write!(f, "thrice-daily"),
        }
    }
}

/// Compute evenly spaced schedule slots for `count` posts.
///
/// The first slot is the next occurrence of `anchor_hour` (UTC) strictly
/// after `now`; subsequent slots follow at the frequency's interval. All
/// returned times are strictly in the future.
pub fn auto_schedule_times(
    count: usize,
    frequency: PostingFrequency,
    anchor_hour: u32,
    now: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>> {
    if anchor_hour > 23 {
        return Err(ReelcastError::InvalidInput(format!(
            "Anchor hour must be 0-23 (got {})",
            anchor_hour
        )));
    }

    let mut base = now
        .with_hour(anchor_hour)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .ok_or_else(|| {
            ReelcastError::InvalidInput(format!("Invalid anchor hour: {}", anchor_hour))
        })?;
    if base <= now {
        base += Duration::days(1);
    }

    Ok((0..count)
        .map(|i| base + Duration::hours(frequency.interval_hours() * i as i64))
        .collect())
}
