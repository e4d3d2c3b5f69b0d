//! Core data model: data points, query windows, and result records

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::series::SeriesKey;

/// Timestamp wire format used by the service for both query ranges and
/// response rows, e.g. `20240101T000203.004000`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.f";

/// Render a timestamp in the service's wire format with microsecond
/// precision, matching what the query API accepts in `range` bounds.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%S%.6f").to_string()
}

/// Parse a wire-format timestamp. Accepts any fractional precision the
/// service emits, including none.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}

/// One generated data point. Immutable once generated; the oracle consumes
/// these read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub series: SeriesKey,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// A query time range. `begin` and `end` may be given in either order;
/// `begin > end` means the query reads backward. Direction affects only
/// emission order — the set of timestamps in range is always
/// `[min(begin, end), max(begin, end))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { begin, end }
    }

    pub fn is_backward(&self) -> bool {
        self.begin > self.end
    }

    /// Inclusive lower edge of the range.
    pub fn lower(&self) -> DateTime<Utc> {
        self.begin.min(self.end)
    }

    /// Exclusive upper edge of the range.
    pub fn upper(&self) -> DateTime<Utc> {
        self.begin.max(self.end)
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.lower() && ts < self.upper()
    }

    /// The same range read in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            begin: self.end,
            end: self.begin,
        }
    }
}

/// A single numeric response field. `Absent` is a value explicitly known to
/// be missing (e.g. no contribution from one join side) and is distinct
/// from zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Present(f64),
    Absent,
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Present(v) => Some(*v),
            FieldValue::Absent => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Present(v) => write!(f, "{v}"),
            FieldValue::Absent => Ok(()),
        }
    }
}

/// The comparable unit produced by both the response parser and the oracle.
///
/// `timestamp` is `None` for plain (filter/join) rows, where the second
/// response field is not part of the verification contract, and `Some` for
/// group-aggregate rows, where it names the bucket. `raw` keeps the
/// verbatim response line for failure reporting and does not take part in
/// equality.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub series: SeriesKey,
    pub timestamp: Option<DateTime<Utc>>,
    pub fields: Vec<FieldValue>,
    pub raw: Option<String>,
}

impl ResultRecord {
    pub fn new(series: SeriesKey, timestamp: Option<DateTime<Utc>>, fields: Vec<FieldValue>) -> Self {
        Self {
            series,
            timestamp,
            fields,
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}

impl PartialEq for ResultRecord {
    fn eq(&self, other: &Self) -> bool {
        self.series == other.series
            && self.timestamp == other.timestamp
            && self.fields == other.fields
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(raw) = &self.raw {
            return write!(f, "{raw}");
        }
        write!(f, "{}", self.series)?;
        if let Some(ts) = self.timestamp {
            write!(f, ", {}", format_timestamp(ts))?;
        }
        for field in &self.fields {
            write!(f, ", {field}")?;
        }
        Ok(())
    }
}

/// One strictly exclusive numeric range rule: a value qualifies iff
/// `gt < v < lt`. The bounds themselves never qualify.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeRule {
    pub gt: f64,
    pub lt: f64,
}

impl RangeRule {
    pub fn new(gt: f64, lt: f64) -> Self {
        Self { gt, lt }
    }

    pub fn contains(&self, value: f64) -> bool {
        value > self.gt && value < self.lt
    }
}
