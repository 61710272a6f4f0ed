//! Row time keys.
//!
//! A dataset is keyed either by absolute timestamps or by elapsed simulation
//! time. The two never mix within one table, and the writer picks its numeric
//! time base from the kind of key it sees.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use core::fmt;

use crate::{CoreError, CoreResult, Real};

/// Which representation a time column uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TimeKind {
    /// Calendar timestamps, e.g. `2013-11-08 12:00:00`.
    #[default]
    Timestamp,
    /// Elapsed time since simulation start.
    Elapsed,
}

impl fmt::Display for TimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeKind::Timestamp => write!(f, "timestamp"),
            TimeKind::Elapsed => write!(f, "elapsed"),
        }
    }
}

/// Time label of one dataset row.
///
/// Ordering across kinds is only defined so the type can be `Ord`; tables
/// reject mixed keys before any comparison matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeKey {
    Timestamp(NaiveDateTime),
    Elapsed(TimeDelta),
}

impl TimeKey {
    pub fn kind(&self) -> TimeKind {
        match self {
            TimeKey::Timestamp(_) => TimeKind::Timestamp,
            TimeKey::Elapsed(_) => TimeKind::Elapsed,
        }
    }

    /// Parse a label of the given kind.
    pub fn parse(text: &str, kind: TimeKind) -> CoreResult<Self> {
        match kind {
            TimeKind::Timestamp => parse_datetime(text).map(TimeKey::Timestamp),
            TimeKind::Elapsed => parse_elapsed(text).map(TimeKey::Elapsed),
        }
    }

    /// Build an elapsed key from seconds.
    pub fn from_seconds(secs: Real) -> CoreResult<Self> {
        seconds_to_delta(secs).map(TimeKey::Elapsed)
    }

    /// Total seconds of an elapsed key; `None` for timestamps.
    pub fn elapsed_seconds(&self) -> Option<Real> {
        match self {
            TimeKey::Elapsed(d) => Some(delta_seconds(*d)),
            TimeKey::Timestamp(_) => None,
        }
    }

    /// Seconds since `reference` for a timestamp key; `None` for elapsed keys.
    pub fn seconds_since(&self, reference: NaiveDateTime) -> Option<Real> {
        match self {
            TimeKey::Timestamp(ts) => Some(delta_seconds(*ts - reference)),
            TimeKey::Elapsed(_) => None,
        }
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeKey::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            TimeKey::Elapsed(d) => write!(f, "{}s", delta_seconds(*d)),
        }
    }
}

/// A time delta expressed in seconds.
pub fn delta_seconds(delta: TimeDelta) -> Real {
    delta.num_seconds() as Real + Real::from(delta.subsec_nanos()) * 1e-9
}

fn seconds_to_delta(secs: Real) -> CoreResult<TimeDelta> {
    let nanos = (secs * 1e9).round();
    if !nanos.is_finite() || nanos.abs() >= i64::MAX as Real {
        return Err(CoreError::NonFinite {
            what: "elapsed seconds",
            value: secs,
        });
    }
    Ok(TimeDelta::nanoseconds(nanos as i64))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// Parse a calendar timestamp. A bare date means midnight; a trailing `Z`
/// is accepted and ignored.
pub fn parse_datetime(text: &str) -> CoreResult<NaiveDateTime> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        && let Some(dt) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(dt);
    }

    Err(CoreError::InvalidTime {
        value: text.to_string(),
        kind: TimeKind::Timestamp,
    })
}

/// Parse an elapsed time: plain seconds (`3600`, `-1.5`) or `[-]HH:MM:SS[.f]`.
pub fn parse_elapsed(text: &str) -> CoreResult<TimeDelta> {
    let invalid = || CoreError::InvalidTime {
        value: text.to_string(),
        kind: TimeKind::Elapsed,
    };
    let trimmed = text.trim();

    if !trimmed.contains(':') {
        let secs: Real = trimmed.parse().map_err(|_| invalid())?;
        return seconds_to_delta(secs).map_err(|_| invalid());
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }
    let hours: u32 = parts[0].parse().map_err(|_| invalid())?;
    let minutes: u32 = parts[1].parse().map_err(|_| invalid())?;
    let seconds: Real = parts[2].parse().map_err(|_| invalid())?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }

    let total = Real::from(hours) * 3600.0 + Real::from(minutes) * 60.0 + seconds;
    seconds_to_delta(if negative { -total } else { total }).map_err(|_| invalid())
}
