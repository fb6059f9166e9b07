//! Time intervals and ISO-8601 formatting

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{CzmlError, Result};

/// Format an instant the way the document expects it (UTC, millisecond precision)
pub fn iso8601(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Elapsed seconds from `from` to `to` (negative when `to` is earlier)
pub fn seconds_between(from: &DateTime<Utc>, to: &DateTime<Utc>) -> f64 {
    let delta = *to - *from;
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 * 1e-9,
        None => delta.num_milliseconds() as f64 * 1e-3,
    }
}

/// Shift an instant by a (possibly fractional) number of seconds
pub fn offset_seconds(instant: &DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    *instant + chrono::Duration::nanoseconds((seconds * 1e9).round() as i64)
}

/// Closed interval `[start, stop]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
}

impl TimeInterval {
    /// Create an interval; `stop` may equal `start` for single-instant data
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Result<Self> {
        if stop < start {
            return Err(CzmlError::InvalidSamples(format!(
                "interval stop {} is before start {}",
                iso8601(&stop),
                iso8601(&start)
            )));
        }
        Ok(Self { start, stop })
    }

    /// Interval spanning the first and last instant of an ordered list
    pub fn spanning(instants: &[DateTime<Utc>]) -> Result<Self> {
        match (instants.first(), instants.last()) {
            (Some(first), Some(last)) => Self::new(*first, *last),
            _ => Err(CzmlError::InvalidSamples("no instants".into())),
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        seconds_between(&self.start, &self.stop)
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.stop
    }

    /// Intersection with another interval, if they overlap
    pub fn intersect(&self, other: &TimeInterval) -> Option<TimeInterval> {
        let start = self.start.max(other.start);
        let stop = self.stop.min(other.stop);
        (stop >= start).then_some(TimeInterval { start, stop })
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", iso8601(&self.start), iso8601(&self.stop))
    }
}
