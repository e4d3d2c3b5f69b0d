//! Shared types for the time-series query verification harness
//!
//! Contains the vocabulary every part of the harness speaks: series
//! identities, data points, query windows, result records, and the typed
//! failure surface. Harness-internal machinery (transport, oracle,
//! comparator) lives in the verifier crate.

pub mod errors;
pub mod logging;
pub mod series;
pub mod types;

pub use errors::*;
pub use series::*;
pub use types::*;
