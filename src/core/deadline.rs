//! Deadline countdown: remaining time, urgency tier and display label.
//!
//! Everything here is a pure function of `(deadline, now)`. Callers read the
//! clock once per render tick and pass the instant in; nothing is cached and
//! nothing is mutated.

use crate::utils::error::DeadlineError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Whole days below which a deadline is urgent.
pub const URGENT_BELOW_DAYS: i64 = 2;
/// Whole days below which a deadline is a warning.
pub const WARNING_BELOW_DAYS: i64 = 5;

pub const EXPIRED_LABEL: &str = "Expired";

/// Urgency of a deadline. Declaration order is the order a fixed deadline
/// moves through as time passes, so `Ord` can be used to check that a
/// sequence of evaluations never goes backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Normal,
    Warning,
    Urgent,
    Expired,
}

impl Tier {
    /// Classifies a non-negative remaining duration by its truncated day count.
    pub fn from_days(days: i64) -> Self {
        if days < URGENT_BELOW_DAYS {
            Tier::Urgent
        } else if days < WARNING_BELOW_DAYS {
            Tier::Warning
        } else {
            Tier::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Normal => "normal",
            Tier::Warning => "warning",
            Tier::Urgent => "urgent",
            Tier::Expired => "expired",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-negative duration broken into whole units, each unit taken from
/// what is left after the larger ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeParts {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeParts {
    /// `None` for negative durations; there is nothing to count down.
    pub fn from_millis(millis: i64) -> Option<Self> {
        if millis < 0 {
            return None;
        }

        Some(Self {
            days: millis / MILLIS_PER_DAY,
            hours: (millis % MILLIS_PER_DAY) / MILLIS_PER_HOUR,
            minutes: (millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE,
            seconds: (millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND,
        })
    }

    /// Two most significant units: `3d 4h`, `2h 5m` or `42m`. Seconds are dropped.
    pub fn compact(&self) -> String {
        if self.days > 0 {
            format!("{}d {}h", self.days, self.hours)
        } else if self.hours > 0 {
            format!("{}h {}m", self.hours, self.minutes)
        } else {
            format!("{}m", self.minutes)
        }
    }

    /// Fixed-width clock face: `3:04:10:05` (days unpadded).
    pub fn digital(&self) -> String {
        format!(
            "{}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub remaining_millis: i64,
    pub tier: Tier,
    pub label: String,
}

impl Countdown {
    pub fn is_expired(&self) -> bool {
        self.tier == Tier::Expired
    }

    pub fn parts(&self) -> Option<TimeParts> {
        TimeParts::from_millis(self.remaining_millis)
    }

    /// Label for the seconds-resolution display.
    pub fn digital_label(&self) -> String {
        self.parts()
            .map(|parts| parts.digital())
            .unwrap_or_else(|| EXPIRED_LABEL.to_string())
    }
}

/// Parses a stored deadline into an absolute instant.
///
/// Accepted forms:
/// - RFC 3339 (`2025-03-01T17:00:00+02:00`, `2025-03-01T15:00:00.250Z`)
/// - Postgres text output (`2025-03-01 15:00:00+00`, `2025-03-01 15:00:00.5+05:30`)
/// - offset-less date-time from a `datetime-local` field (`2025-03-01T15:00`), read as UTC
/// - a bare date (`2025-03-01`), read as UTC midnight
pub fn parse_deadline(input: &str) -> Result<DateTime<Utc>, DeadlineError> {
    let trimmed = input.trim();
    let invalid = || DeadlineError::InvalidDeadline {
        input: input.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(invalid())
}

/// Canonical timestamp form written to the store: `2025-03-01T12:00:00.000Z`.
pub fn format_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Countdown for an already-parsed deadline.
pub fn evaluate_at(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Countdown {
    let remaining = deadline - now;
    let remaining_millis = remaining.num_milliseconds();

    // Expiry uses the full-precision delta: any time past the deadline is
    // expired, even when it truncates to 0 ms.
    let parts = if remaining < TimeDelta::zero() {
        None
    } else {
        TimeParts::from_millis(remaining_millis)
    };

    match parts {
        None => Countdown {
            remaining_millis: remaining_millis.min(-1),
            tier: Tier::Expired,
            label: EXPIRED_LABEL.to_string(),
        },
        Some(parts) => Countdown {
            remaining_millis,
            tier: Tier::from_days(parts.days),
            label: parts.compact(),
        },
    }
}

/// Countdown for a stored deadline string. An unparseable deadline is an
/// error, never a tier.
pub fn evaluate(deadline: &str, now: DateTime<Utc>) -> Result<Countdown, DeadlineError> {
    let deadline = parse_deadline(deadline)?;
    Ok(evaluate_at(deadline, now))
}
