//! Group-aggregate scenarios
//!
//! Bucketed min/max/count/sum over the full window with a filter applied
//! to the aggregate tuples, for both `all` and `any` require modes.

use shared::{VerifyError, VerifyResult};

use crate::comparator::{CompareMode, Expectation, compare};
use crate::fixture::Fixture;
use crate::oracle;
use crate::parser::{ResponseStream, RowShape};
use crate::query::{AggregateFilter, AggregateFunc, GroupAggregateQuery, Require};
use crate::runtime::QueryTransport;

const COLUMN: &str = "col1";

const FUNCS: [AggregateFunc; 4] = [
    AggregateFunc::Min,
    AggregateFunc::Max,
    AggregateFunc::Count,
    AggregateFunc::Sum,
];

fn filter_rules(require: Require) -> AggregateFilter {
    AggregateFilter::new(require)
        .rule(AggregateFunc::Min, -80.0, 0.0)
        .rule(AggregateFunc::Max, -20.0, 40.0)
}

/// Aggregate the full window into `nsteps` buckets, filter the aggregate
/// tuples with the given require mode, and check the service agrees.
pub async fn all_data<T: QueryTransport>(
    transport: &T,
    fixture: &Fixture,
    nsteps: i64,
    require: Require,
) -> VerifyResult<()> {
    tracing::info!(nsteps, require = %require, "🧪 Group-aggregate query with filter");

    let window = fixture.full_window();
    let span_ms = (window.upper() - window.lower()).num_milliseconds();
    let step_ms = span_ms / nsteps;
    if step_ms <= 0 {
        return Err(VerifyError::configuration(format!(
            "window of {span_ms}ms cannot be split into {nsteps} steps"
        )));
    }

    let filter = filter_rules(require);
    let query = GroupAggregateQuery::new(COLUMN, &window, FUNCS.to_vec(), step_ms)
        .filter(filter.clone());
    let body = serde_json::to_value(&query)
        .map_err(|e| VerifyError::configuration(format!("unserializable query: {e}")))?;

    let stream = transport.send_query(body).await?;
    let records = ResponseStream::new(RowShape::GroupAggregate, stream);

    let expected =
        oracle::filtered_group_aggregate(fixture, COLUMN, &window, &FUNCS, step_ms, &filter)?;
    let expectation = Expectation::new(expected, fixture.series_keys(COLUMN));

    let received = compare(&expectation, records, CompareMode::Unordered).await?;
    tracing::info!(received, nsteps, require = %require, "✅ Group-aggregate: PASSED");
    Ok(())
}
