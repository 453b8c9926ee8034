//! Cinescope Token Sweeper
//!
//! Removes expired activation tokens on a fixed schedule:
//! 1. Waits one full interval after startup
//! 2. Deletes every token whose expiry is in the past
//! 3. Logs the report and updates the purge counter
//!
//! A failed sweep is logged and the schedule keeps running; the failed
//! batch was rolled back by the database.

mod sweep;

use cinescope_common::{config::AppConfig, db::DbPool, db::Repository, metrics, VERSION};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::time::{interval_at, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing with the configured level and sink shape
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.observability.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Starting Cinescope Token Sweeper v{}", VERSION);

    // Initialize metrics
    metrics::register_metrics();

    if config.observability.metrics_port > 0 {
        PrometheusBuilder::new()
            .with_http_listener(SocketAddr::from((
                [0, 0, 0, 0],
                config.observability.metrics_port,
            )))
            .install()?;
        info!(
            port = config.observability.metrics_port,
            "Prometheus exporter listening"
        );
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    let repo = Repository::new(db);

    let period = config.sweep_interval();
    info!(interval_secs = period.as_secs(), "Token sweeper ready");

    // First sweep lands one full interval after startup
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                match sweep::sweep_expired_tokens(&repo).await {
                    Ok(report) => {
                        info!(%report, "Token sweep finished");
                    }
                    Err(e) => {
                        error!(error = %e, "Token sweep failed");
                    }
                }
            }
        }
    }

    info!("Token sweeper shutting down");
    Ok(())
}
