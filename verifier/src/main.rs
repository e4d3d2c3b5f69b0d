//! Verification harness runner
//!
//! Sequences a verification run against a live service:
//! - generates the synthetic fixture and ships it over the ingestion port
//! - waits for the service to settle
//! - runs the selected scenario (or the full suite) with a run timeout
//! - reports the first failure with full context

use chrono::{Timelike, Utc};
use clap::Parser;
use std::time::Duration;
use tokio::time::timeout;

use shared::{VerifyError, logging};
use verifier::{Fixture, FixtureConfig, IngestClient, QueryClient, Scenarios};

#[derive(Parser)]
#[command(name = "verifier")]
#[command(about = "Correctness verification harness for a time-series query service")]
struct Args {
    /// Scenario to run
    #[arg(long, default_value = "all")]
    scenario: String,

    /// Service host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// HTTP query API port
    #[arg(long, default_value = "8181")]
    http_port: u16,

    /// TCP ingestion port
    #[arg(long, default_value = "8282")]
    tcp_port: u16,

    /// Data points generated per metric column
    #[arg(long, default_value = "100000")]
    points: usize,

    /// Run timeout in seconds
    #[arg(long, default_value = "300")]
    timeout_secs: u64,

    /// Seconds to let ingested data settle before querying
    #[arg(long, default_value = "5")]
    settle_secs: u64,

    /// Skip fixture ingestion (data already present in the service)
    #[arg(long)]
    skip_ingest: bool,

    /// Enable verbose tracing output
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logging::init_tracing(args.verbose);

    tracing::info!("🧪 Starting query verification harness");
    tracing::info!(
        "Scenario: {}, service: {}:{}, {} points per column",
        args.scenario,
        args.host,
        args.http_port,
        args.points
    );

    // Align the fixture to a whole minute so ingested timestamps are easy
    // to eyeball in service logs.
    let now = Utc::now();
    let start = now
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    let config = FixtureConfig::builder()
        .start(start)
        .points(args.points)
        .build();
    let fixture = Fixture::generate(config)?;

    let client = QueryClient::new(&format!("{}:{}", args.host, args.http_port))?;
    client.wait_for_ready(Duration::from_secs(30)).await?;

    if args.skip_ingest {
        tracing::info!("⏭️  Skipping ingestion (--skip-ingest)");
    } else {
        let ingest_addr = format!("{}:{}", args.host, args.tcp_port);
        tracing::info!("📡 Ingesting fixture via {}", ingest_addr);
        let mut ingest = IngestClient::connect(&ingest_addr).await?;
        ingest.send_fixture(&fixture).await?;
        ingest.shutdown().await?;
        tokio::time::sleep(Duration::from_secs(args.settle_secs)).await;
    }

    let scenarios = Scenarios::new(client, fixture);
    let result = timeout(
        Duration::from_secs(args.timeout_secs),
        scenarios.run(&args.scenario),
    )
    .await;

    match result {
        Ok(Ok(())) => {
            tracing::info!("✅ Scenario '{}' completed successfully", args.scenario);
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!("❌ Scenario '{}' failed: {}", args.scenario, e);
            Err(e.into())
        }
        Err(_) => {
            tracing::error!(
                "⏰ Scenario '{}' timed out after {}s",
                args.scenario,
                args.timeout_secs
            );
            Err(VerifyError::timeout(format!(
                "scenario '{}' exceeded {}s",
                args.scenario, args.timeout_secs
            ))
            .into())
        }
    }
}
