//! Series identity model
//!
//! A series is a metric name plus an ordered set of tag key/value pairs.
//! The canonical string form (`metric tag1=v1 tag2=v2 ...`) must match what
//! the service emits for the same logical series byte for byte, because it
//! is the join/grouping identity used by the comparator. Join results carry
//! a compound metric part with the column names joined by `|`
//! (`col1|col2 tag1=A tag2=B`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{VerifyError, VerifyResult};

/// Canonical rendered series identity. Equality is byte equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey(String);

impl SeriesKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured form of a series identity: one metric (or several, for join
/// results) plus tags in their declared order.
///
/// Tag order is part of the identity contract of the system under test; it
/// is carried through verbatim, never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesName {
    pub metrics: Vec<String>,
    pub tags: Vec<(String, String)>,
}

impl SeriesName {
    pub fn new(metric: impl Into<String>, tags: Vec<(String, String)>) -> Self {
        Self {
            metrics: vec![metric.into()],
            tags,
        }
    }

    pub fn joined(metrics: Vec<String>, tags: Vec<(String, String)>) -> Self {
        Self { metrics, tags }
    }

    /// Render the canonical key. Pure and deterministic: the same metric
    /// and tag sequence always produces an identical key.
    pub fn key(&self) -> SeriesKey {
        let mut out = self.metrics.join("|");
        for (k, v) in &self.tags {
            out.push(' ');
            out.push_str(k);
            out.push('=');
            out.push_str(v);
        }
        SeriesKey(out)
    }

    /// Parse a rendered series name back into its structured form.
    ///
    /// Exact left inverse of [`SeriesName::key`] for any well-formed input;
    /// anything else fails with `MalformedSeries`.
    pub fn parse(text: &str) -> VerifyResult<Self> {
        let malformed = || VerifyError::MalformedSeries {
            text: text.to_string(),
        };

        let mut parts = text.split_whitespace();
        let metric_part = parts.next().ok_or_else(malformed)?;
        let metrics: Vec<String> = metric_part.split('|').map(str::to_string).collect();
        if metrics.iter().any(String::is_empty) {
            return Err(malformed());
        }

        let mut tags = Vec::new();
        for pair in parts {
            let (key, value) = pair.split_once('=').ok_or_else(malformed)?;
            if key.is_empty() || value.is_empty() || value.contains('=') {
                return Err(malformed());
            }
            if tags.iter().any(|(k, _)| k == key) {
                return Err(malformed());
            }
            tags.push((key.to_string(), value.to_string()));
        }

        Ok(Self { metrics, tags })
    }
}

impl fmt::Display for SeriesName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for SeriesName {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeriesName::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_and_parse_are_inverses() {
        let name = SeriesName::new(
            "col1",
            vec![
                ("tag1".to_string(), "A".to_string()),
                ("tag2".to_string(), "B".to_string()),
            ],
        );
        let key = name.key();
        assert_eq!(key.as_str(), "col1 tag1=A tag2=B");

        let parsed = SeriesName::parse(key.as_str()).unwrap();
        assert_eq!(parsed, name);
        assert_eq!(parsed.key(), key);
    }

    #[test]
    fn join_series_uses_pipe_separated_metrics() {
        let name = SeriesName::joined(
            vec!["col1".to_string(), "col2".to_string()],
            vec![
                ("tag1".to_string(), "A".to_string()),
                ("tag2".to_string(), "D".to_string()),
            ],
        );
        assert_eq!(name.key().as_str(), "col1|col2 tag1=A tag2=D");

        let parsed = SeriesName::parse("col1|col2 tag1=A tag2=D").unwrap();
        assert_eq!(parsed.metrics, vec!["col1", "col2"]);
    }

    #[test]
    fn tag_order_is_preserved_not_sorted() {
        let parsed = SeriesName::parse("m tag2=X tag1=Y").unwrap();
        assert_eq!(parsed.tags[0], ("tag2".to_string(), "X".to_string()));
        assert_eq!(parsed.key().as_str(), "m tag2=X tag1=Y");
    }

    #[test]
    fn identical_tag_sets_render_identical_keys() {
        let a = SeriesName::new(
            "cpu",
            vec![
                ("host".to_string(), "h1".to_string()),
                ("region".to_string(), "eu".to_string()),
            ],
        );
        let b = SeriesName::new(
            "cpu",
            vec![
                ("host".to_string(), "h1".to_string()),
                ("region".to_string(), "eu".to_string()),
            ],
        );
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for text in ["", "  ", "m tag1", "m =v", "m tag1=", "m tag1=A tag1=B", "m| tag1=A", "m tag1=A=B"] {
            let err = SeriesName::parse(text).unwrap_err();
            assert!(
                matches!(err, VerifyError::MalformedSeries { .. }),
                "expected MalformedSeries for '{text}', got {err:?}"
            );
        }
    }
}
