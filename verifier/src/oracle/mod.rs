//! Query Oracle
//!
//! Independently recomputes the exact result set the service must return
//! for each query shape, from the fixture dataset plus the query
//! parameters. Pure functions, no I/O: invoking an oracle twice with
//! identical inputs yields identical expected sequences.
//!
//! Window membership is always `[min(begin, end), max(begin, end))`;
//! direction (begin vs. end order) affects only the order records are
//! emitted in, never which records exist.

pub mod filter;
pub mod group_aggregate;
pub mod join;

// Re-export main operations
pub use filter::range_filter;
pub use group_aggregate::{filtered_group_aggregate, group_aggregate};
pub use join::join_filter;
