//! Fixture Configuration
//!
//! Describes the synthetic dataset the harness generates, ingests, and
//! computes expectations from.

pub mod builder;

// Re-export main types
pub use builder::FixtureConfigBuilder;

use chrono::{DateTime, TimeZone, Utc};

/// Shape of the synthetic dataset.
///
/// Every metric column receives the same layout: `points` data points at
/// `spacing_ms` intervals from `start`, with tag combinations assigned
/// round-robin in declared-dimension order and values cycling through
/// `values`.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub start: DateTime<Utc>,
    pub spacing_ms: i64,
    pub points: usize,
    pub columns: Vec<String>,
    pub tag_dimensions: Vec<(String, Vec<String>)>,
    pub values: Vec<f64>,
}

impl FixtureConfig {
    pub fn builder() -> FixtureConfigBuilder {
        FixtureConfigBuilder::new()
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            spacing_ms: 1,
            points: 100_000,
            columns: vec!["col1".to_string(), "col2".to_string()],
            tag_dimensions: vec![
                ("tag1".to_string(), vec!["A".to_string()]),
                (
                    "tag2".to_string(),
                    vec!["B".to_string(), "C".to_string(), "D".to_string()],
                ),
            ],
            values: (-100..100).map(f64::from).collect(),
        }
    }
}
