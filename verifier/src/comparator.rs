//! Actual-vs-expected comparison
//!
//! Streams received records against the oracle's expected records and
//! raises a descriptive failure on the first divergence. Two modes:
//! positional when the query fixed an explicit ordering, multiset when the
//! service is free to interleave series.
//!
//! Identity and range violations fail fast, mid-stream, so the offending
//! input stays visible; count verdicts wait for the stream to finish.

use futures_util::{Stream, StreamExt};

use shared::{RangeRule, ResultRecord, SeriesKey, VerifyError, VerifyResult};

/// How received records are matched against expected ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Explicit ordering was requested: records must match pairwise in
    /// emitted order.
    Positional,
    /// No ordering fixed: equal length plus multiset membership.
    Unordered,
}

/// Everything the comparator knows in advance about a query's legal
/// output: the exact expected records, the fixture's known series
/// identities, and (when one exists) the union of plausible value ranges.
#[derive(Debug, Clone)]
pub struct Expectation {
    pub records: Vec<ResultRecord>,
    pub known_series: Vec<SeriesKey>,
    pub value_bounds: Option<RangeRule>,
}

impl Expectation {
    pub fn new(records: Vec<ResultRecord>, known_series: Vec<SeriesKey>) -> Self {
        Self {
            records,
            known_series,
            value_bounds: None,
        }
    }

    /// Constrain every present field of every received record to
    /// `gt < v < lt`; anything outside is an immediate `UnexpectedRecord`.
    pub fn with_value_bounds(mut self, bounds: RangeRule) -> Self {
        self.value_bounds = Some(bounds);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Compare the received stream against the expectation. Returns the number
/// of records received on success.
///
/// The stream is consumed exactly once. Parse and transport failures
/// surfaced by the stream propagate as-is.
pub async fn compare<S>(
    expectation: &Expectation,
    mut actual: S,
    mode: CompareMode,
) -> VerifyResult<usize>
where
    S: Stream<Item = VerifyResult<ResultRecord>> + Unpin,
{
    let expected = &expectation.records;
    let mut matched = vec![false; expected.len()];
    let mut received = 0usize;

    while let Some(item) = actual.next().await {
        let record = item?;
        received += 1;

        if !expectation.known_series.contains(&record.series) {
            return Err(unexpected(
                received,
                &record,
                format!("series '{}' is not a known fixture identity", record.series),
            ));
        }
        if let Some(bounds) = &expectation.value_bounds {
            for field in &record.fields {
                if let Some(value) = field.as_f64() {
                    if !bounds.contains(value) {
                        return Err(unexpected(
                            received,
                            &record,
                            format!(
                                "value {value} outside the expected range ({}, {})",
                                bounds.gt, bounds.lt
                            ),
                        ));
                    }
                }
            }
        }

        match mode {
            CompareMode::Positional => {
                let index = received - 1;
                match expected.get(index) {
                    Some(exp) if *exp == record => {}
                    Some(exp) => {
                        return Err(VerifyError::PositionalMismatch {
                            index,
                            expected: exp.to_string(),
                            actual: record.to_string(),
                        });
                    }
                    None => {
                        // Drain so the count verdict reflects the full stream.
                        let mut total = received;
                        while let Some(item) = actual.next().await {
                            item?;
                            total += 1;
                        }
                        return Err(VerifyError::CountMismatch {
                            expected: expected.len(),
                            actual: total,
                        });
                    }
                }
            }
            CompareMode::Unordered => {
                let slot = expected
                    .iter()
                    .enumerate()
                    .position(|(i, exp)| !matched[i] && *exp == record);
                match slot {
                    Some(i) => matched[i] = true,
                    None => {
                        return Err(unexpected(
                            received,
                            &record,
                            "no matching expected record".to_string(),
                        ));
                    }
                }
            }
        }
    }

    if received == 0 && !expected.is_empty() {
        return Err(VerifyError::NoDataReceived {
            expected: expected.len(),
        });
    }
    if received != expected.len() {
        return Err(VerifyError::CountMismatch {
            expected: expected.len(),
            actual: received,
        });
    }
    Ok(received)
}

fn unexpected(row: usize, record: &ResultRecord, reason: String) -> VerifyError {
    VerifyError::UnexpectedRecord {
        row,
        record: record.to_string(),
        reason,
    }
}
