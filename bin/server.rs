// World GPA - Web Server
// REST API with Axum over the cached grading tables

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use world_gpa::{api, Config, GradingService, RateGate, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    world_gpa::init_tracing();

    let config = Config::from_env().context("Failed to read configuration")?;
    let source = config.build_source()?;

    let service = GradingService::with_parts(
        source,
        SystemClock,
        chrono::Duration::seconds(config.cache_secs),
        RateGate::per_second(config.rate_per_sec),
    );

    let app = api::router(Arc::new(service));

    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.addr))?;

    info!(addr = %config.addr, "🚀 Server running");
    info!("   API: http://{}/api/countries", config.addr);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
