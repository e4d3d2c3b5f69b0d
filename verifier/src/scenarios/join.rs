//! Join scenarios
//!
//! Two-column join with one independent range rule per column, in
//! forward/backward and default/by-time ordering variants.

use shared::{QueryWindow, RangeRule, VerifyError, VerifyResult};

use crate::comparator::{CompareMode, Expectation, compare};
use crate::fixture::Fixture;
use crate::oracle;
use crate::parser::{ResponseStream, RowShape};
use crate::query::{JoinQuery, OrderBy};
use crate::runtime::QueryTransport;

fn thresholds() -> Vec<RangeRule> {
    vec![RangeRule::new(-20.0, 20.0), RangeRule::new(40.0, 60.0)]
}

fn join_columns(fixture: &Fixture) -> VerifyResult<Vec<String>> {
    let columns: Vec<String> = fixture.column_names().take(2).map(str::to_string).collect();
    if columns.len() < 2 {
        return Err(VerifyError::configuration(
            "join scenarios need a fixture with at least two metric columns",
        ));
    }
    Ok(columns)
}

async fn run_query<T: QueryTransport>(
    transport: &T,
    fixture: &Fixture,
    window: QueryWindow,
    order_by: Option<OrderBy>,
) -> VerifyResult<usize> {
    let columns = join_columns(fixture)?;
    let rules = thresholds();

    let mut query = JoinQuery::new(columns.clone(), &window, rules.clone());
    if let Some(order) = order_by {
        query = query.order_by(order);
    }
    let body = serde_json::to_value(&query)
        .map_err(|e| VerifyError::configuration(format!("unserializable query: {e}")))?;

    let stream = transport.send_query(body).await?;
    let records = ResponseStream::new(RowShape::Plain, stream);

    let expected = oracle::join_filter(fixture, &columns, &window, &rules, order_by)?;

    // Any received value must land inside the union of the per-column
    // ranges; per-column membership is enforced by the expected records.
    let union = RangeRule::new(
        rules.iter().map(|r| r.gt).fold(f64::INFINITY, f64::min),
        rules.iter().map(|r| r.lt).fold(f64::NEG_INFINITY, f64::max),
    );
    let expectation = Expectation::new(expected, fixture.join_series_keys(&columns))
        .with_value_bounds(union);
    let mode = if order_by == Some(OrderBy::Time) {
        CompareMode::Positional
    } else {
        CompareMode::Unordered
    };

    compare(&expectation, records, mode).await
}

/// Read data in forward direction
pub async fn forward<T: QueryTransport>(transport: &T, fixture: &Fixture) -> VerifyResult<()> {
    tracing::info!("🧪 Join query, forward");
    let received = run_query(transport, fixture, fixture.full_window(), None).await?;
    tracing::info!(received, "✅ Join forward: PASSED");
    Ok(())
}

/// Read data in backward direction
pub async fn backward<T: QueryTransport>(transport: &T, fixture: &Fixture) -> VerifyResult<()> {
    tracing::info!("🧪 Join query, backward");
    let window = fixture.full_window().reversed();
    let received = run_query(transport, fixture, window, None).await?;
    tracing::info!(received, "✅ Join backward: PASSED");
    Ok(())
}

/// Read data in forward direction, order by time
pub async fn forward_by_time<T: QueryTransport>(
    transport: &T,
    fixture: &Fixture,
) -> VerifyResult<()> {
    tracing::info!("🧪 Join query, forward, order by time");
    let received =
        run_query(transport, fixture, fixture.full_window(), Some(OrderBy::Time)).await?;
    tracing::info!(received, "✅ Join forward by time: PASSED");
    Ok(())
}

/// Read data in backward direction, order by time
pub async fn backward_by_time<T: QueryTransport>(
    transport: &T,
    fixture: &Fixture,
) -> VerifyResult<()> {
    tracing::info!("🧪 Join query, backward, order by time");
    let window = fixture.full_window().reversed();
    let received = run_query(transport, fixture, window, Some(OrderBy::Time)).await?;
    tracing::info!(received, "✅ Join backward by time: PASSED");
    Ok(())
}
