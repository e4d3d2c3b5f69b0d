//! Oracle properties over the reference dataset
//!
//! The canonical fixture cycles values -100..100 at 1ms spacing across the
//! tag combinations {A,B}, {A,C}, {A,D}; these tests pin the oracle's
//! expected sets against hand-derived ground truth.


use std::collections::BTreeSet;

use fixtures::small_fixture;
use shared::RangeRule;
use verifier::query::{AggregateFilter, AggregateFunc, OrderBy, Require};
use verifier::{Fixture, FixtureConfig, oracle};

const FUNCS: [AggregateFunc; 4] = [
    AggregateFunc::Min,
    AggregateFunc::Max,
    AggregateFunc::Count,
    AggregateFunc::Sum,
];

#[test]
fn filter_expects_exactly_the_strictly_interior_values() {
    let fixture = small_fixture();
    let window = fixture.full_window();
    let rule = RangeRule::new(-20.0, 20.0);

    let expected = oracle::range_filter(&fixture, "col1", &window, &rule, None).unwrap();

    // Strictly between -20 and 20: the 39 integers -19..=19, each present
    // once per tag combination.
    let values: BTreeSet<i64> = expected
        .iter()
        .map(|r| r.fields[0].as_f64().unwrap() as i64)
        .collect();
    assert_eq!(values, (-19..=19).collect::<BTreeSet<i64>>());

    let series: BTreeSet<&str> = expected.iter().map(|r| r.series.as_str()).collect();
    assert_eq!(
        series,
        BTreeSet::from([
            "col1 tag1=A tag2=B",
            "col1 tag1=A tag2=C",
            "col1 tag1=A tag2=D",
        ])
    );

    assert_eq!(expected.len(), 39 * 3);
}

#[test]
fn disjoint_filter_expects_nothing() {
    let fixture = small_fixture();
    let window = fixture.full_window();
    let rule = RangeRule::new(-2000.0, -1000.0);

    let expected = oracle::range_filter(&fixture, "col1", &window, &rule, None).unwrap();
    assert!(expected.is_empty());
}

#[test]
fn by_time_ordering_only_permutes_the_membership() {
    let fixture = small_fixture();
    let window = fixture.full_window();
    let rule = RangeRule::new(-20.0, 20.0);

    let default_order = oracle::range_filter(&fixture, "col1", &window, &rule, None).unwrap();
    let by_time =
        oracle::range_filter(&fixture, "col1", &window, &rule, Some(OrderBy::Time)).unwrap();

    assert_eq!(default_order.len(), by_time.len());
    for record in &by_time {
        assert!(default_order.contains(record));
    }
}

#[test]
fn oracle_output_is_byte_identical_across_invocations() {
    let fixture = small_fixture();
    let window = fixture.full_window();
    let rule = RangeRule::new(-20.0, 20.0);
    let columns = vec!["col1".to_string(), "col2".to_string()];
    let rules = vec![RangeRule::new(-20.0, 20.0), RangeRule::new(40.0, 60.0)];

    let render = |records: Vec<shared::ResultRecord>| {
        records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    };

    let filter_a = render(oracle::range_filter(&fixture, "col1", &window, &rule, None).unwrap());
    let filter_b = render(oracle::range_filter(&fixture, "col1", &window, &rule, None).unwrap());
    assert_eq!(filter_a, filter_b);

    let join_a = render(oracle::join_filter(&fixture, &columns, &window, &rules, None).unwrap());
    let join_b = render(oracle::join_filter(&fixture, &columns, &window, &rules, None).unwrap());
    assert_eq!(join_a, join_b);
}

#[test]
fn join_checks_each_column_against_its_own_range() {
    let fixture = small_fixture();
    let window = fixture.full_window();
    let columns = vec!["col1".to_string(), "col2".to_string()];
    let rules = vec![RangeRule::new(-20.0, 20.0), RangeRule::new(40.0, 60.0)];

    let rows = oracle::join_filter(&fixture, &columns, &window, &rules, None).unwrap();
    assert!(!rows.is_empty());
    for row in &rows {
        if let Some(v) = row.fields[0].as_f64() {
            assert!(rules[0].contains(v), "col1 value {v} violates its range");
        }
        if let Some(v) = row.fields[1].as_f64() {
            assert!(rules[1].contains(v), "col2 value {v} violates its range");
        }
    }
}

#[test]
fn group_aggregate_counts_match_the_enumerate_then_filter_equivalent() {
    // A window that splits into exactly 8 buckets of 75ms.
    let fixture = Fixture::generate(FixtureConfig::builder().points(600).build()).unwrap();
    let window = fixture.full_window();
    let span_ms = (window.upper() - window.lower()).num_milliseconds();
    let nsteps = 8;
    let step_ms = span_ms / nsteps;

    let unfiltered =
        oracle::group_aggregate(&fixture, "col1", &window, &FUNCS, step_ms).unwrap();
    let nseries = fixture.series_keys("col1").len();
    assert_eq!(unfiltered.len(), nsteps as usize * nseries);

    for require in [Require::All, Require::Any] {
        let filter = AggregateFilter::new(require)
            .rule(AggregateFunc::Min, -80.0, 0.0)
            .rule(AggregateFunc::Max, -20.0, 40.0);
        let filtered = oracle::filtered_group_aggregate(
            &fixture, "col1", &window, &FUNCS, step_ms, &filter,
        )
        .unwrap();

        let by_hand = unfiltered
            .iter()
            .filter(|r| {
                let min = r.fields[0].as_f64().unwrap();
                let max = r.fields[1].as_f64().unwrap();
                let min_ok = min > -80.0 && min < 0.0;
                let max_ok = max > -20.0 && max < 40.0;
                match require {
                    Require::All => min_ok && max_ok,
                    Require::Any => min_ok || max_ok,
                }
            })
            .count();
        assert_eq!(filtered.len(), by_hand, "require={require}");
    }
}
