//! Fixture Configuration Builder
//!
//! Provides a flexible builder pattern for constructing fixture configurations

use super::FixtureConfig;
use chrono::{DateTime, Utc};

pub struct FixtureConfigBuilder {
    config: FixtureConfig,
}

impl FixtureConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: FixtureConfig::default(),
        }
    }

    /// Set the timestamp of the first data point
    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.config.start = start;
        self
    }

    /// Set the spacing between consecutive data points, in milliseconds
    pub fn spacing_ms(mut self, spacing_ms: i64) -> Self {
        self.config.spacing_ms = spacing_ms;
        self
    }

    /// Set the number of data points generated per metric column
    pub fn points(mut self, points: usize) -> Self {
        self.config.points = points;
        self
    }

    /// Set the metric column names
    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.config.columns = columns;
        self
    }

    /// Replace the tag dimensions (declared order is the canonical order)
    pub fn tag_dimensions(mut self, dimensions: Vec<(String, Vec<String>)>) -> Self {
        self.config.tag_dimensions = dimensions;
        self
    }

    /// Add one tag dimension with its value set
    pub fn tag<S: Into<String>>(mut self, key: S, values: Vec<S>) -> Self {
        self.config
            .tag_dimensions
            .push((key.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Set the value cycle explicitly
    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.config.values = values;
        self
    }

    /// Set the value cycle to the integers `lo..hi`
    pub fn value_range(mut self, lo: i32, hi: i32) -> Self {
        self.config.values = (lo..hi).map(f64::from).collect();
        self
    }

    /// Build the configuration
    pub fn build(self) -> FixtureConfig {
        self.config
    }
}

impl Default for FixtureConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
