//! Fixture ingestion over the service's TCP line protocol
//!
//! Thin boundary: ships the generated dataset into the service before any
//! query runs (series line, timestamp line, value line per point) and
//! nothing more. The harness requires ingestion to have completed and
//! settled before querying; it does not verify it.

use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use shared::{VerifyError, VerifyResult, format_timestamp};

use crate::fixture::Fixture;

pub struct IngestClient {
    writer: BufWriter<TcpStream>,
    peer: String,
}

impl IngestClient {
    pub async fn connect(addr: &str) -> VerifyResult<Self> {
        let stream = TcpStream::connect(addr).await.map_err(|e| {
            VerifyError::transport(format!("failed to connect to ingestion port {addr}: {e}"))
        })?;
        Ok(Self {
            writer: BufWriter::new(stream),
            peer: addr.to_string(),
        })
    }

    /// Write every fixture point, column by column, in generation order.
    /// In-order delivery per series is the transport's contract; this
    /// writer never reorders.
    pub async fn send_fixture(&mut self, fixture: &Fixture) -> VerifyResult<()> {
        let peer = self.peer.clone();
        let write_error =
            |e: std::io::Error| VerifyError::transport(format!("ingestion write to {peer} failed: {e}"));

        let mut sent = 0usize;
        for column in fixture.column_names().map(str::to_string).collect::<Vec<_>>() {
            for point in fixture.points(&column)? {
                let message = format!(
                    "+{}\r\n+{}\r\n+{}\r\n",
                    point.series,
                    format_timestamp(point.timestamp),
                    point.value
                );
                self.writer
                    .write_all(message.as_bytes())
                    .await
                    .map_err(write_error)?;
                sent += 1;
            }
        }
        self.writer.flush().await.map_err(write_error)?;
        tracing::info!(points = sent, peer = %self.peer, "fixture ingested");
        Ok(())
    }

    pub async fn shutdown(mut self) -> VerifyResult<()> {
        self.writer
            .shutdown()
            .await
            .map_err(|e| VerifyError::transport(format!("ingestion shutdown failed: {e}")))
    }
}
