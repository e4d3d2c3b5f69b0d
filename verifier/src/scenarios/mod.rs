//! Verification Scenarios
//!
//! One scenario per query shape and ordering variant, each run strictly in
//! sequence: build the query, stream the response, recompute the expected
//! answer, compare. The first failure aborts the scenario and surfaces with
//! full context; run-level policy (halt vs. record) belongs to the caller.

pub mod filter;
pub mod group_aggregate;
pub mod join;

use shared::{VerifyError, VerifyResult};

use crate::fixture::Fixture;
use crate::query::Require;
use crate::runtime::QueryTransport;

pub struct Scenarios<T> {
    transport: T,
    fixture: Fixture,
}

impl<T: QueryTransport> Scenarios<T> {
    pub fn new(transport: T, fixture: Fixture) -> Self {
        Self { transport, fixture }
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    /// Run a specific scenario by name
    pub async fn run(&self, name: &str) -> VerifyResult<()> {
        let t = &self.transport;
        let f = &self.fixture;

        match name {
            // Range-filter scenarios
            "filter-forward" => filter::forward(t, f).await,
            "filter-backward" => filter::backward(t, f).await,
            "filter-forward-by-time" => filter::forward_by_time(t, f).await,
            "filter-backward-by-time" => filter::backward_by_time(t, f).await,
            "filter-empty" => filter::empty(t, f).await,

            // Join scenarios
            "join-forward" => join::forward(t, f).await,
            "join-backward" => join::backward(t, f).await,
            "join-forward-by-time" => join::forward_by_time(t, f).await,
            "join-backward-by-time" => join::backward_by_time(t, f).await,

            // Group-aggregate scenarios across step counts
            "group-aggregate-all" => self.group_aggregate(Require::All).await,
            "group-aggregate-any" => self.group_aggregate(Require::Any).await,

            // Suites
            "filter" => {
                filter::forward(t, f).await?;
                filter::backward(t, f).await?;
                filter::forward_by_time(t, f).await?;
                filter::backward_by_time(t, f).await?;
                filter::empty(t, f).await
            }
            "join" => {
                join::forward(t, f).await?;
                join::backward(t, f).await?;
                join::forward_by_time(t, f).await?;
                join::backward_by_time(t, f).await
            }
            "group-aggregate" => {
                self.group_aggregate(Require::All).await?;
                self.group_aggregate(Require::Any).await
            }

            // Complete verification run
            "all" => {
                tracing::info!("🧪 Running FULL verification suite");

                filter::forward(t, f).await?;
                filter::backward(t, f).await?;
                filter::forward_by_time(t, f).await?;
                filter::backward_by_time(t, f).await?;
                filter::empty(t, f).await?;

                join::forward(t, f).await?;
                join::backward(t, f).await?;
                join::forward_by_time(t, f).await?;
                join::backward_by_time(t, f).await?;

                self.group_aggregate(Require::All).await?;
                self.group_aggregate(Require::Any).await?;

                tracing::info!("🏆 ALL scenarios PASSED");
                Ok(())
            }

            _ => Err(VerifyError::configuration(format!(
                "unknown scenario '{}'. Available: {}",
                name,
                Self::available_scenarios().join(", ")
            ))),
        }
    }

    /// Group-aggregate runs at decreasing bucket resolution, mirroring a
    /// full verification pass: one fifth, one tenth, and one twentieth of
    /// the point count.
    async fn group_aggregate(&self, require: Require) -> VerifyResult<()> {
        let points = self.fixture.config().points as i64;
        for divisor in [5, 10, 20] {
            let nsteps = (points / divisor).max(1);
            group_aggregate::all_data(&self.transport, &self.fixture, nsteps, require).await?;
        }
        Ok(())
    }

    /// Get list of available scenarios
    pub fn available_scenarios() -> Vec<&'static str> {
        vec![
            // Individual scenarios
            "filter-forward",
            "filter-backward",
            "filter-forward-by-time",
            "filter-backward-by-time",
            "filter-empty",
            "join-forward",
            "join-backward",
            "join-forward-by-time",
            "join-backward-by-time",
            "group-aggregate-all",
            "group-aggregate-any",
            // Suites
            "filter",
            "join",
            "group-aggregate",
            "all",
        ]
    }
}
