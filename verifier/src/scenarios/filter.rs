//! Range-filter scenarios
//!
//! Forward/backward and default/by-time ordering variants of the
//! single-column range-filter query, plus the disjoint-filter case that
//! must legitimately return zero rows.

use shared::{QueryWindow, RangeRule, VerifyError, VerifyResult};

use crate::comparator::{CompareMode, Expectation, compare};
use crate::fixture::Fixture;
use crate::oracle;
use crate::parser::{ResponseStream, RowShape};
use crate::query::{OrderBy, SelectQuery};
use crate::runtime::QueryTransport;

const COLUMN: &str = "col1";

fn thresholds() -> RangeRule {
    RangeRule::new(-20.0, 20.0)
}

async fn run_query<T: QueryTransport>(
    transport: &T,
    fixture: &Fixture,
    window: QueryWindow,
    rule: RangeRule,
    order_by: Option<OrderBy>,
) -> VerifyResult<usize> {
    let mut query = SelectQuery::new(COLUMN, &window, rule);
    if let Some(order) = order_by {
        query = query.order_by(order);
    }
    let body = serde_json::to_value(&query)
        .map_err(|e| VerifyError::configuration(format!("unserializable query: {e}")))?;

    let stream = transport.send_query(body).await?;
    let records = ResponseStream::new(RowShape::Plain, stream);

    let expected = oracle::range_filter(fixture, COLUMN, &window, &rule, order_by)?;
    let expectation =
        Expectation::new(expected, fixture.series_keys(COLUMN)).with_value_bounds(rule);
    let mode = if order_by == Some(OrderBy::Time) {
        CompareMode::Positional
    } else {
        CompareMode::Unordered
    };

    compare(&expectation, records, mode).await
}

/// Read data in forward direction
pub async fn forward<T: QueryTransport>(transport: &T, fixture: &Fixture) -> VerifyResult<()> {
    tracing::info!("🧪 Filter query, forward");
    let received = run_query(transport, fixture, fixture.full_window(), thresholds(), None).await?;
    tracing::info!(received, "✅ Filter forward: PASSED");
    Ok(())
}

/// Read data in backward direction
pub async fn backward<T: QueryTransport>(transport: &T, fixture: &Fixture) -> VerifyResult<()> {
    tracing::info!("🧪 Filter query, backward");
    let window = fixture.full_window().reversed();
    let received = run_query(transport, fixture, window, thresholds(), None).await?;
    tracing::info!(received, "✅ Filter backward: PASSED");
    Ok(())
}

/// Read data in forward direction, order by time
pub async fn forward_by_time<T: QueryTransport>(
    transport: &T,
    fixture: &Fixture,
) -> VerifyResult<()> {
    tracing::info!("🧪 Filter query, forward, order by time");
    let received = run_query(
        transport,
        fixture,
        fixture.full_window(),
        thresholds(),
        Some(OrderBy::Time),
    )
    .await?;
    tracing::info!(received, "✅ Filter forward by time: PASSED");
    Ok(())
}

/// Read data in backward direction, order by time
pub async fn backward_by_time<T: QueryTransport>(
    transport: &T,
    fixture: &Fixture,
) -> VerifyResult<()> {
    tracing::info!("🧪 Filter query, backward, order by time");
    let window = fixture.full_window().reversed();
    let received = run_query(transport, fixture, window, thresholds(), Some(OrderBy::Time)).await?;
    tracing::info!(received, "✅ Filter backward by time: PASSED");
    Ok(())
}

/// A filter disjoint from every generated value: zero rows expected, and an
/// empty stream passes. Any received row is an immediate failure.
pub async fn empty<T: QueryTransport>(transport: &T, fixture: &Fixture) -> VerifyResult<()> {
    tracing::info!("🧪 Filter query, disjoint range, no results");
    let rule = RangeRule::new(-2000.0, -1000.0);
    run_query(transport, fixture, fixture.full_window(), rule, None).await?;
    tracing::info!("✅ Filter empty: PASSED");
    Ok(())
}
