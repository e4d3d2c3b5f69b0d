//! Correctness-verification harness for a time-series query service
//!
//! The harness seeds a running service with a known synthetic dataset,
//! issues range-filter, join, and grouped-aggregate queries over its HTTP
//! API, independently recomputes the expected answer from the same dataset,
//! and compares the streamed response against it record by record.
//!
//! ## Main interface
//!
//! [`Scenarios`] sequences the verification scenarios; each one builds a
//! query, streams the response through the [`parser`], computes the ground
//! truth with the [`oracle`], and hands both to the [`comparator`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use verifier::*;
//!
//! # async fn run() -> shared::VerifyResult<()> {
//! let fixture = Fixture::generate(FixtureConfig::builder().points(600).build())?;
//! let client = QueryClient::new("127.0.0.1:8181")?;
//!
//! let scenarios = Scenarios::new(client, fixture);
//! scenarios.run("filter-forward").await?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod comparator;
pub mod config;
pub mod fixture;
pub mod oracle;
pub mod parser;
pub mod query;
pub mod runtime;
pub mod scenarios;

// Main interfaces - re-exported at crate root for convenience
pub use comparator::{CompareMode, Expectation, compare};
pub use config::{FixtureConfig, FixtureConfigBuilder};
pub use fixture::Fixture;
pub use parser::{ResponseStream, RowShape};
pub use query::{
    AggregateFilter, AggregateFunc, GroupAggregateQuery, JoinQuery, OrderBy, Require, SelectQuery,
};
pub use runtime::{IngestClient, QueryClient, QueryTransport};
pub use scenarios::Scenarios;
