//! HTTP client for the service's query API
//!
//! Provides the single "send query, get byte stream back" capability the
//! rest of the harness depends on, plus a readiness probe used before the
//! first scenario runs.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use url::Url;

use shared::{VerifyError, VerifyResult};

/// Chunked response body. Consumed exactly once, in a single forward pass.
pub type ByteStream = Pin<Box<dyn Stream<Item = VerifyResult<Vec<u8>>> + Send>>;

/// Abstract query submission: everything downstream of this trait is
/// independent of the HTTP stack.
#[async_trait]
pub trait QueryTransport {
    async fn send_query(&self, body: serde_json::Value) -> VerifyResult<ByteStream>;
}

/// REST client for the query endpoint of the service under test.
#[derive(Clone)]
pub struct QueryClient {
    base_url: Url,
    client: reqwest::Client,
}

impl QueryClient {
    pub fn new(service_addr: &str) -> VerifyResult<Self> {
        let base = if service_addr.starts_with("http") {
            service_addr.to_string()
        } else {
            format!("http://{service_addr}")
        };
        let base_url = Url::parse(&base).map_err(|e| {
            VerifyError::configuration(format!("invalid service address '{service_addr}': {e}"))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| VerifyError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> VerifyResult<Url> {
        self.base_url.join(path).map_err(|e| {
            VerifyError::configuration(format!("invalid endpoint path '{path}': {e}"))
        })
    }

    /// Check if the service is responsive
    pub async fn health_check(&self) -> bool {
        let Ok(url) = self.endpoint("/api/stats") else {
            return false;
        };
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Wait for the service to answer its stats endpoint, polling every
    /// 500ms until `deadline` elapses.
    pub async fn wait_for_ready(&self, deadline: Duration) -> VerifyResult<()> {
        let start = std::time::Instant::now();
        while start.elapsed() < deadline {
            if self.health_check().await {
                tracing::info!("service is ready and responding");
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        Err(VerifyError::timeout(format!(
            "service at {} did not become ready within {deadline:?}",
            self.base_url
        )))
    }
}

#[async_trait]
impl QueryTransport for QueryClient {
    async fn send_query(&self, body: serde_json::Value) -> VerifyResult<ByteStream> {
        let url = self.endpoint("/api/query")?;
        tracing::debug!(%url, "submitting query");

        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VerifyError::timeout(format!("query submission to {url} timed out: {e}"))
                } else {
                    VerifyError::transport(format!("query submission to {url} failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(VerifyError::transport(format!(
                "query endpoint returned {status}: {}",
                detail.trim()
            )));
        }

        let stream = response.bytes_stream().map(|chunk| match chunk {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(e) if e.is_timeout() => Err(VerifyError::timeout(format!(
                "response stream timed out: {e}"
            ))),
            Err(e) => Err(VerifyError::transport(format!(
                "response stream failed: {e}"
            ))),
        });
        Ok(Box::pin(stream))
    }
}
