//! Wall-clock timestamps for last-write-wins comparison.
//!
//! Records carry their modification time as an ISO-8601 string. For
//! comparison the string is reduced to milliseconds since the Unix epoch.
//! Anything that cannot be parsed collapses to the epoch, so a malformed
//! timestamp always loses to a valid one.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Offset-less layouts accepted after any trailing `Z` has been removed.
/// These are read as UTC.
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A point in time, in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The Unix epoch; the value every unparsable timestamp maps to.
    pub const EPOCH: Self = Self(0);

    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Parses an ISO-8601 timestamp.
    ///
    /// Accepts RFC 3339 date-times with any offset, offset-less date-times
    /// (read as UTC, optionally suffixed with `Z`), and bare dates, which
    /// mean midnight UTC.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Err(Error::InvalidTimestamp(input.to_string()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.timestamp_millis()));
        }

        let naive = s
            .strip_suffix('Z')
            .or_else(|| s.strip_suffix('z'))
            .unwrap_or(s);

        for format in NAIVE_DATE_TIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
                return Ok(Self(dt.and_utc().timestamp_millis()));
            }
        }

        NaiveDate::parse_from_str(naive, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| Self(dt.and_utc().timestamp_millis()))
            .ok_or_else(|| Error::InvalidTimestamp(input.to_string()))
    }

    /// Parses a timestamp, mapping anything unparsable to [`Timestamp::EPOCH`].
    #[must_use]
    pub fn parse_or_epoch(input: &str) -> Self {
        Self::parse(input).unwrap_or(Self::EPOCH)
    }

    /// Formats as `YYYY-MM-DDTHH:MM:SS.sssZ`.
    #[must_use]
    pub fn to_iso_string(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.0)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
