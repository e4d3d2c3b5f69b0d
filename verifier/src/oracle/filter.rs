//! Single-column range-filter oracle

use shared::{FieldValue, QueryWindow, RangeRule, ResultRecord, VerifyResult};

use crate::fixture::Fixture;
use crate::query::OrderBy;

/// Expected result of a range-filter query: every fixture point for
/// `column` whose timestamp is in the window and whose value satisfies the
/// strictly exclusive `rule`.
///
/// Emission order: with `OrderBy::Time`, strictly by timestamp (ascending
/// forward, descending backward); otherwise series-major in the fixture's
/// canonical series order, each series in time order.
pub fn range_filter(
    fixture: &Fixture,
    column: &str,
    window: &QueryWindow,
    rule: &RangeRule,
    order_by: Option<OrderBy>,
) -> VerifyResult<Vec<ResultRecord>> {
    let qualifying: Vec<_> = fixture
        .points(column)?
        .iter()
        .filter(|p| window.contains(p.timestamp) && rule.contains(p.value))
        .collect();

    let mut ordered = Vec::with_capacity(qualifying.len());
    match order_by {
        Some(OrderBy::Time) => {
            // Points are generated in ascending time order already.
            ordered.extend(qualifying);
            if window.is_backward() {
                ordered.reverse();
            }
        }
        _ => {
            // Series-major; canonical series order either way, time order
            // flipped per series for backward reads.
            for key in fixture.series_keys(column) {
                let mut run: Vec<_> = qualifying.iter().copied().filter(|p| p.series == key).collect();
                if window.is_backward() {
                    run.reverse();
                }
                ordered.extend(run);
            }
        }
    }

    Ok(ordered
        .into_iter()
        .map(|p| {
            ResultRecord::new(p.series.clone(), None, vec![FieldValue::Present(p.value)])
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixtureConfig;

    fn fixture() -> Fixture {
        Fixture::generate(FixtureConfig::builder().points(600).build()).unwrap()
    }

    #[test]
    fn bounds_are_strictly_exclusive() {
        let fixture = fixture();
        let window = fixture.full_window();
        let rule = RangeRule::new(-20.0, 20.0);
        let expected = range_filter(&fixture, "col1", &window, &rule, None).unwrap();

        assert!(!expected.is_empty());
        for record in &expected {
            let value = record.fields[0].as_f64().unwrap();
            assert!(value > -20.0 && value < 20.0, "value {value} escaped the filter");
        }
        assert!(
            !expected
                .iter()
                .any(|r| r.fields[0] == FieldValue::Present(-20.0)
                    || r.fields[0] == FieldValue::Present(20.0))
        );
    }

    #[test]
    fn membership_is_direction_invariant() {
        let fixture = fixture();
        let forward = fixture.full_window();
        let backward = forward.reversed();
        let rule = RangeRule::new(-20.0, 20.0);

        let mut fwd = range_filter(&fixture, "col1", &forward, &rule, None).unwrap();
        let mut bwd = range_filter(&fixture, "col1", &backward, &rule, None).unwrap();
        assert_eq!(fwd.len(), bwd.len());

        // Same membership, different emission order.
        let sort = |records: &mut Vec<ResultRecord>| {
            records.sort_by(|a, b| {
                (a.series.as_str(), a.fields[0].as_f64().unwrap())
                    .partial_cmp(&(b.series.as_str(), b.fields[0].as_f64().unwrap()))
                    .unwrap()
            })
        };
        sort(&mut fwd);
        sort(&mut bwd);
        assert_eq!(fwd, bwd);
    }

    #[test]
    fn time_order_is_reversed_for_backward_windows() {
        let fixture = fixture();
        let backward = fixture.full_window().reversed();
        let rule = RangeRule::new(-100.5, 100.5);
        let expected =
            range_filter(&fixture, "col1", &backward, &rule, Some(OrderBy::Time)).unwrap();

        // First emitted record is the newest point, i.e. the last generated.
        let points = fixture.points("col1").unwrap();
        let newest = points.last().unwrap();
        assert_eq!(expected[0].fields[0], FieldValue::Present(newest.value));
        assert_eq!(expected.len(), points.len());
    }

    #[test]
    fn disjoint_filter_expects_zero_rows() {
        let fixture = fixture();
        let window = fixture.full_window();
        let rule = RangeRule::new(-2000.0, -1000.0);
        let expected = range_filter(&fixture, "col1", &window, &rule, None).unwrap();
        assert!(expected.is_empty());
    }
}
