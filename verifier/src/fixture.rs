//! Synthetic dataset generation
//!
//! The fixture is the ground truth everything else is checked against: it is
//! generated deterministically from a [`FixtureConfig`], shipped to the
//! service once, and then consumed read-only by the oracle.
//!
//! Layout per metric column: point `i` lands at `start + i * spacing`, its
//! tag combination is `combos[i % combos.len()]` (combinations enumerated
//! with the first declared dimension first), and its value is
//! `values[i % values.len()]`. Every column shares this layout, which is what
//! makes join queries line up timestamp for timestamp.

use chrono::Duration;

use shared::{DataPoint, QueryWindow, SeriesKey, SeriesName, VerifyError, VerifyResult};

use crate::config::FixtureConfig;

#[derive(Debug, Clone)]
pub struct Fixture {
    config: FixtureConfig,
    combos: Vec<Vec<(String, String)>>,
    columns: Vec<(String, Vec<DataPoint>)>,
}

impl Fixture {
    /// Generate the dataset. Deterministic: the same configuration always
    /// yields an identical fixture.
    pub fn generate(config: FixtureConfig) -> VerifyResult<Self> {
        if config.columns.is_empty() {
            return Err(VerifyError::configuration("fixture needs at least one metric column"));
        }
        if config.values.is_empty() {
            return Err(VerifyError::configuration("fixture needs a non-empty value cycle"));
        }
        if config.points == 0 {
            return Err(VerifyError::configuration("fixture needs at least one data point"));
        }
        if config.spacing_ms <= 0 {
            return Err(VerifyError::configuration("fixture spacing must be positive"));
        }
        if config
            .tag_dimensions
            .iter()
            .any(|(_, values)| values.is_empty())
        {
            return Err(VerifyError::configuration("every tag dimension needs at least one value"));
        }

        let combos = tag_combinations(&config.tag_dimensions);

        let mut columns = Vec::with_capacity(config.columns.len());
        for column in &config.columns {
            let keys: Vec<SeriesKey> = combos
                .iter()
                .map(|combo| SeriesName::new(column.clone(), combo.clone()).key())
                .collect();

            let mut points = Vec::with_capacity(config.points);
            for i in 0..config.points {
                points.push(DataPoint {
                    series: keys[i % keys.len()].clone(),
                    timestamp: config.start + Duration::milliseconds(config.spacing_ms * i as i64),
                    value: config.values[i % config.values.len()],
                });
            }
            columns.push((column.clone(), points));
        }

        Ok(Self {
            config,
            combos,
            columns,
        })
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Tag combinations in canonical order.
    pub fn tag_combos(&self) -> &[Vec<(String, String)>] {
        &self.combos
    }

    /// All data points of one metric column, in generation (time) order.
    pub fn points(&self, column: &str) -> VerifyResult<&[DataPoint]> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, points)| points.as_slice())
            .ok_or_else(|| {
                VerifyError::configuration(format!("unknown fixture column '{column}'"))
            })
    }

    /// Data points of one column together with their tag-combination index.
    pub fn points_with_combo(
        &self,
        column: &str,
    ) -> VerifyResult<impl Iterator<Item = (usize, &DataPoint)>> {
        let ncombos = self.combos.len();
        Ok(self
            .points(column)?
            .iter()
            .enumerate()
            .map(move |(i, p)| (i % ncombos, p)))
    }

    /// The series identities a query on `column` may legally return.
    pub fn series_keys(&self, column: &str) -> Vec<SeriesKey> {
        self.combos
            .iter()
            .map(|combo| SeriesName::new(column.to_string(), combo.clone()).key())
            .collect()
    }

    /// The series identities a join over `columns` may legally return.
    pub fn join_series_keys(&self, columns: &[String]) -> Vec<SeriesKey> {
        self.combos
            .iter()
            .map(|combo| SeriesName::joined(columns.to_vec(), combo.clone()).key())
            .collect()
    }

    /// Metric column names, in declared order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Forward window covering every generated point, with headroom past the
    /// final timestamp so the last point stays inside the exclusive upper
    /// edge.
    pub fn full_window(&self) -> QueryWindow {
        let end = self.config.start
            + Duration::milliseconds(self.config.spacing_ms * (self.config.points as i64 + 1));
        QueryWindow::new(self.config.start, end)
    }
}

fn tag_combinations(dimensions: &[(String, Vec<String>)]) -> Vec<Vec<(String, String)>> {
    let mut combos: Vec<Vec<(String, String)>> = vec![Vec::new()];
    for (key, values) in dimensions {
        let mut next = Vec::with_capacity(combos.len() * values.len());
        for combo in &combos {
            for value in values {
                let mut extended = combo.clone();
                extended.push((key.clone(), value.clone()));
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
}
