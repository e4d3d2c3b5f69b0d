//! Two-or-more-column join range-filter oracle

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use shared::{FieldValue, QueryWindow, RangeRule, ResultRecord, VerifyError, VerifyResult};

use crate::fixture::Fixture;
use crate::query::OrderBy;

/// Expected result of a join query with one independent range rule per
/// column.
///
/// A row exists for a `(series, timestamp)` wherever at least one column
/// contributed a qualifying value; a column that did not qualify (or has no
/// point at that timestamp for that series) is explicitly absent, never
/// zero. Each column's value is checked only against that column's own
/// rule.
pub fn join_filter(
    fixture: &Fixture,
    columns: &[String],
    window: &QueryWindow,
    rules: &[RangeRule],
    order_by: Option<OrderBy>,
) -> VerifyResult<Vec<ResultRecord>> {
    if columns.len() < 2 {
        return Err(VerifyError::configuration("join queries need at least two columns"));
    }
    if columns.len() != rules.len() {
        return Err(VerifyError::configuration(format!(
            "join over {} columns got {} filter rules",
            columns.len(),
            rules.len()
        )));
    }

    // One slot per (series combo, timestamp) that has a qualifying
    // contribution; untouched columns stay absent.
    let mut slots: BTreeMap<(usize, DateTime<Utc>), Vec<FieldValue>> = BTreeMap::new();
    for (cix, column) in columns.iter().enumerate() {
        for (combo, point) in fixture.points_with_combo(column)? {
            if !window.contains(point.timestamp) || !rules[cix].contains(point.value) {
                continue;
            }
            let slot = slots
                .entry((combo, point.timestamp))
                .or_insert_with(|| vec![FieldValue::Absent; columns.len()]);
            slot[cix] = FieldValue::Present(point.value);
        }
    }

    let keys = fixture.join_series_keys(columns);
    let mut rows: Vec<((usize, DateTime<Utc>), Vec<FieldValue>)> = slots.into_iter().collect();
    match order_by {
        Some(OrderBy::Time) => {
            rows.sort_by_key(|((combo, ts), _)| (*ts, *combo));
            if window.is_backward() {
                rows.reverse();
            }
        }
        _ => {
            // BTreeMap order is already (combo, ts) ascending, i.e.
            // series-major forward; flip time order per series when reading
            // backward.
            if window.is_backward() {
                rows.sort_by_key(|((combo, ts), _)| (*combo, std::cmp::Reverse(*ts)));
            }
        }
    }

    Ok(rows
        .into_iter()
        .map(|((combo, _), fields)| ResultRecord::new(keys[combo].clone(), None, fields))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixtureConfig;

    fn fixture() -> Fixture {
        Fixture::generate(FixtureConfig::builder().points(600).build()).unwrap()
    }

    fn columns() -> Vec<String> {
        vec!["col1".to_string(), "col2".to_string()]
    }

    #[test]
    fn rows_exist_where_either_column_qualifies() {
        let fixture = fixture();
        let window = fixture.full_window();
        let rules = vec![RangeRule::new(-20.0, 20.0), RangeRule::new(40.0, 60.0)];
        let rows = join_filter(&fixture, &columns(), &window, &rules, None).unwrap();

        assert!(!rows.is_empty());
        for row in &rows {
            assert_eq!(row.fields.len(), 2);
            assert!(
                row.fields.iter().any(|f| !f.is_absent()),
                "row with no qualifying column: {row}"
            );
            if let Some(v) = row.fields[0].as_f64() {
                assert!(v > -20.0 && v < 20.0);
            }
            if let Some(v) = row.fields[1].as_f64() {
                assert!(v > 40.0 && v < 60.0);
            }
        }
    }

    #[test]
    fn non_qualifying_side_is_absent_not_zero() {
        let fixture = fixture();
        let window = fixture.full_window();
        // Both columns carry the same values at the same timestamps, so a
        // value inside exactly one range leaves the other side absent.
        let rules = vec![RangeRule::new(-20.0, 20.0), RangeRule::new(40.0, 60.0)];
        let rows = join_filter(&fixture, &columns(), &window, &rules, None).unwrap();

        // The two ranges are disjoint, so exactly one side qualifies per row.
        for row in &rows {
            match (&row.fields[0], &row.fields[1]) {
                (FieldValue::Present(_), FieldValue::Absent) => {}
                (FieldValue::Absent, FieldValue::Present(_)) => {}
                other => panic!("expected exactly one qualifying side, got {other:?}"),
            }
        }
    }

    #[test]
    fn join_membership_is_direction_invariant() {
        let fixture = fixture();
        let forward = fixture.full_window();
        let rules = vec![RangeRule::new(-20.0, 20.0), RangeRule::new(40.0, 60.0)];

        let fwd = join_filter(&fixture, &columns(), &forward, &rules, None).unwrap();
        let bwd = join_filter(&fixture, &columns(), &forward.reversed(), &rules, None).unwrap();
        assert_eq!(fwd.len(), bwd.len());
        for row in &bwd {
            assert!(fwd.contains(row));
        }
    }

    #[test]
    fn mismatched_rule_count_is_a_configuration_error() {
        let fixture = fixture();
        let window = fixture.full_window();
        let err =
            join_filter(&fixture, &columns(), &window, &[RangeRule::new(0.0, 1.0)], None)
                .unwrap_err();
        assert!(matches!(err, VerifyError::Configuration { .. }));
    }
}
