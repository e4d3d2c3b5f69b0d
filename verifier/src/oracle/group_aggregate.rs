//! Grouped-aggregate oracle
//!
//! Buckets raw points per series, applies the declared aggregate functions
//! per bucket, and only then evaluates the filter predicate against the
//! resulting aggregate tuples — never against raw input points.

use std::collections::BTreeMap;

use chrono::Duration;

use shared::{FieldValue, QueryWindow, ResultRecord, VerifyError, VerifyResult};

use crate::fixture::Fixture;
use crate::query::{AggregateFilter, AggregateFunc, Require};

#[derive(Debug, Clone, Copy)]
struct BucketAcc {
    min: f64,
    max: f64,
    count: u64,
    sum: f64,
}

impl BucketAcc {
    fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            count: 1,
            sum: value,
        }
    }

    fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
        self.sum += value;
    }

    fn get(&self, func: AggregateFunc) -> f64 {
        match func {
            AggregateFunc::Min => self.min,
            AggregateFunc::Max => self.max,
            AggregateFunc::Count => self.count as f64,
            AggregateFunc::Sum => self.sum,
        }
    }
}

/// Unfiltered grouped aggregate: one record per `(series, bucket)` pair
/// that holds at least one point, with bucket `n` covering
/// `[lower + n*step, lower + (n+1)*step)` where `lower` is the lower window
/// edge. The record timestamp is the bucket start; fields follow the
/// declared function order.
pub fn group_aggregate(
    fixture: &Fixture,
    column: &str,
    window: &QueryWindow,
    funcs: &[AggregateFunc],
    step_ms: i64,
) -> VerifyResult<Vec<ResultRecord>> {
    if funcs.is_empty() {
        return Err(VerifyError::configuration(
            "group-aggregate needs at least one aggregate function",
        ));
    }
    if step_ms <= 0 {
        return Err(VerifyError::configuration("group-aggregate step must be positive"));
    }

    let lower = window.lower();
    let mut buckets: BTreeMap<(usize, i64), BucketAcc> = BTreeMap::new();
    for (combo, point) in fixture.points_with_combo(column)? {
        if !window.contains(point.timestamp) {
            continue;
        }
        let n = (point.timestamp - lower).num_milliseconds() / step_ms;
        buckets
            .entry((combo, n))
            .and_modify(|acc| acc.push(point.value))
            .or_insert_with(|| BucketAcc::new(point.value));
    }

    let keys = fixture.series_keys(column);
    let mut rows: Vec<((usize, i64), BucketAcc)> = buckets.into_iter().collect();
    if window.is_backward() {
        rows.sort_by_key(|((combo, n), _)| (*combo, std::cmp::Reverse(*n)));
    }

    Ok(rows
        .into_iter()
        .map(|((combo, n), acc)| {
            let bucket_start = lower + Duration::milliseconds(n * step_ms);
            let fields = funcs
                .iter()
                .map(|f| FieldValue::Present(acc.get(*f)))
                .collect();
            ResultRecord::new(keys[combo].clone(), Some(bucket_start), fields)
        })
        .collect())
}

/// Grouped aggregate with the filter applied to the aggregate tuples.
///
/// Each rule names one declared aggregate field and holds iff
/// `gt < value < lt`; rules combine as a conjunction (`all`) or disjunction
/// (`any`) per the filter's require mode. Referencing an aggregate outside
/// the declared function list is a configuration error.
pub fn filtered_group_aggregate(
    fixture: &Fixture,
    column: &str,
    window: &QueryWindow,
    funcs: &[AggregateFunc],
    step_ms: i64,
    filter: &AggregateFilter,
) -> VerifyResult<Vec<ResultRecord>> {
    let rule_indices: Vec<(usize, shared::RangeRule)> = filter
        .rules
        .iter()
        .map(|(func, rule)| {
            funcs
                .iter()
                .position(|f| f == func)
                .map(|ix| (ix, *rule))
                .ok_or_else(|| {
                    VerifyError::configuration(format!(
                        "filter references aggregate '{func}' outside the declared function list"
                    ))
                })
        })
        .collect::<VerifyResult<_>>()?;

    let unfiltered = group_aggregate(fixture, column, window, funcs, step_ms)?;
    Ok(unfiltered
        .into_iter()
        .filter(|record| {
            let holds = |&(ix, rule): &(usize, shared::RangeRule)| match record.fields[ix] {
                FieldValue::Present(value) => rule.contains(value),
                FieldValue::Absent => false,
            };
            match filter.require {
                Require::All => rule_indices.iter().all(holds),
                Require::Any => rule_indices.iter().any(holds),
            }
        })
        .collect())
}
