//! Query request construction
//!
//! Typed builders for the three query shapes the harness issues, serialized
//! to the JSON bodies the service's `/api/query` endpoint expects. Only the
//! delimited-text output format is ever requested; field positions in the
//! response are fixed by the query kind.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer, ser::SerializeMap};

use shared::{QueryWindow, RangeRule, VerifyError, format_timestamp};

/// `range` clause. Direction is encoded by the order of `from` and `to`,
/// exactly as given in the window.
#[derive(Debug, Clone, Serialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl TimeRange {
    pub fn from_window(window: &QueryWindow) -> Self {
        Self {
            from: format_timestamp(window.begin),
            to: format_timestamp(window.end),
        }
    }
}

/// `output` clause. The harness only consumes delimited text.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Output {
    pub format: &'static str,
}

impl Output {
    pub fn csv() -> Self {
        Self { format: "csv" }
    }
}

/// Explicit result ordering. Without it the service interleaves series in
/// an order the oracle does not fix, and comparison falls back to multiset
/// semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    Time,
    Series,
}

/// Combinator for multi-rule aggregate filters: `all` rules must hold, or
/// `any` one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Require {
    All,
    Any,
}

impl Require {
    pub fn as_str(&self) -> &'static str {
        match self {
            Require::All => "all",
            Require::Any => "any",
        }
    }
}

impl fmt::Display for Require {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Require {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Require::All),
            "any" => Ok(Require::Any),
            other => Err(VerifyError::configuration(format!(
                "unknown 'require' mode '{other}' (expected 'all' or 'any')"
            ))),
        }
    }
}

impl Serialize for Require {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Aggregate functions understood by the group-aggregate query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Min,
    Max,
    Count,
    Sum,
}

impl AggregateFunc {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunc::Min => "min",
            AggregateFunc::Max => "max",
            AggregateFunc::Count => "count",
            AggregateFunc::Sum => "sum",
        }
    }
}

impl fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AggregateFunc {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(AggregateFunc::Min),
            "max" => Ok(AggregateFunc::Max),
            "count" => Ok(AggregateFunc::Count),
            "sum" => Ok(AggregateFunc::Sum),
            other => Err(VerifyError::configuration(format!(
                "unknown aggregate function '{other}'"
            ))),
        }
    }
}

impl Serialize for AggregateFunc {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Filter over computed aggregate tuples: one inequality rule per named
/// aggregate field, combined with an explicit [`Require`] mode.
///
/// Rules are an ordered list rather than a mapping so the harness evaluates
/// them in a fixed, reproducible order.
#[derive(Debug, Clone)]
pub struct AggregateFilter {
    pub rules: Vec<(AggregateFunc, RangeRule)>,
    pub require: Require,
}

impl AggregateFilter {
    pub fn new(require: Require) -> Self {
        Self {
            rules: Vec::new(),
            require,
        }
    }

    pub fn rule(mut self, func: AggregateFunc, gt: f64, lt: f64) -> Self {
        self.rules.push((func, RangeRule::new(gt, lt)));
        self
    }
}

impl Serialize for AggregateFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct RequireClause {
            require: Require,
        }

        let mut map = serializer.serialize_map(Some(self.rules.len() + 1))?;
        for (func, rule) in &self.rules {
            map.serialize_entry(func.as_str(), rule)?;
        }
        map.serialize_entry(
            "=",
            &RequireClause {
                require: self.require,
            },
        )?;
        map.end()
    }
}

/// Single-column range-filter query.
#[derive(Debug, Clone, Serialize)]
pub struct SelectQuery {
    pub select: String,
    pub range: TimeRange,
    pub filter: RangeRule,
    pub output: Output,
    #[serde(rename = "order-by", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
}

impl SelectQuery {
    pub fn new(metric: impl Into<String>, window: &QueryWindow, filter: RangeRule) -> Self {
        Self {
            select: metric.into(),
            range: TimeRange::from_window(window),
            filter,
            output: Output::csv(),
            order_by: None,
        }
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }
}

/// Multi-column join query with one independent range rule per column.
#[derive(Debug, Clone, Serialize)]
pub struct JoinQuery {
    pub join: Vec<String>,
    pub range: TimeRange,
    #[serde(serialize_with = "serialize_column_rules")]
    pub filter: Vec<(String, RangeRule)>,
    pub output: Output,
    #[serde(rename = "order-by", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
}

impl JoinQuery {
    pub fn new(columns: Vec<String>, window: &QueryWindow, rules: Vec<RangeRule>) -> Self {
        let filter = columns.iter().cloned().zip(rules).collect();
        Self {
            join: columns,
            range: TimeRange::from_window(window),
            filter,
            output: Output::csv(),
            order_by: None,
        }
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }
}

fn serialize_column_rules<S: Serializer>(
    rules: &[(String, RangeRule)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(rules.len()))?;
    for (column, rule) in rules {
        map.serialize_entry(column, rule)?;
    }
    map.end()
}

/// `group-aggregate` clause: metric, bucket width, and the aggregate
/// functions in the order their values appear in response rows.
#[derive(Debug, Clone, Serialize)]
pub struct GroupAggregateSpec {
    pub metric: String,
    pub step: String,
    pub func: Vec<AggregateFunc>,
}

/// Grouped-aggregate query with an optional filter over aggregate tuples.
#[derive(Debug, Clone, Serialize)]
pub struct GroupAggregateQuery {
    #[serde(rename = "group-aggregate")]
    pub group_aggregate: GroupAggregateSpec,
    pub range: TimeRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<AggregateFilter>,
    pub output: Output,
    #[serde(rename = "order-by", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
}

impl GroupAggregateQuery {
    pub fn new(
        metric: impl Into<String>,
        window: &QueryWindow,
        funcs: Vec<AggregateFunc>,
        step_ms: i64,
    ) -> Self {
        Self {
            group_aggregate: GroupAggregateSpec {
                metric: metric.into(),
                step: format!("{step_ms}ms"),
                func: funcs,
            },
            range: TimeRange::from_window(window),
            filter: None,
            output: Output::csv(),
            order_by: None,
        }
    }

    pub fn filter(mut self, filter: AggregateFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn window() -> QueryWindow {
        QueryWindow::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap(),
        )
    }

    #[test]
    fn select_query_body() {
        let query = SelectQuery::new("col1", &window(), RangeRule::new(-20.0, 20.0))
            .order_by(OrderBy::Time);
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body,
            json!({
                "select": "col1",
                "range": {
                    "from": "20240101T000000.000000",
                    "to": "20240101T000100.000000"
                },
                "filter": {"gt": -20.0, "lt": 20.0},
                "output": {"format": "csv"},
                "order-by": "time"
            })
        );
    }

    #[test]
    fn order_by_is_omitted_by_default() {
        let query = SelectQuery::new("col1", &window(), RangeRule::new(0.0, 1.0));
        let body = serde_json::to_value(&query).unwrap();
        assert!(body.get("order-by").is_none());
    }

    #[test]
    fn join_query_body_has_per_column_rules() {
        let query = JoinQuery::new(
            vec!["col1".to_string(), "col2".to_string()],
            &window(),
            vec![RangeRule::new(-20.0, 20.0), RangeRule::new(40.0, 60.0)],
        );
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(body["join"], json!(["col1", "col2"]));
        assert_eq!(body["filter"]["col1"], json!({"gt": -20.0, "lt": 20.0}));
        assert_eq!(body["filter"]["col2"], json!({"gt": 40.0, "lt": 60.0}));
    }

    #[test]
    fn group_aggregate_query_body() {
        let filter = AggregateFilter::new(Require::All)
            .rule(AggregateFunc::Min, -80.0, 0.0)
            .rule(AggregateFunc::Max, -20.0, 40.0);
        let query = GroupAggregateQuery::new(
            "col1",
            &window(),
            vec![
                AggregateFunc::Min,
                AggregateFunc::Max,
                AggregateFunc::Count,
                AggregateFunc::Sum,
            ],
            5000,
        )
        .filter(filter);
        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body["group-aggregate"],
            json!({"metric": "col1", "step": "5000ms", "func": ["min", "max", "count", "sum"]})
        );
        assert_eq!(body["filter"]["min"], json!({"gt": -80.0, "lt": 0.0}));
        assert_eq!(body["filter"]["="], json!({"require": "all"}));
    }

    #[test]
    fn require_mode_outside_all_any_is_a_configuration_error() {
        let err = "most".parse::<Require>().unwrap_err();
        assert!(matches!(err, VerifyError::Configuration { .. }));
    }
}
