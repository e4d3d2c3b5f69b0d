//! Runtime Management
//!
//! This module handles the wire-facing side of the harness: submitting
//! queries over HTTP and seeding the fixture over the service's TCP
//! ingestion protocol.

pub mod client;
pub mod ingest;

// Re-export main types
pub use client::{ByteStream, QueryClient, QueryTransport};
pub use ingest::IngestClient;
