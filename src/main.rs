use anyhow::Context;
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ai_llm_service::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine: the environment may be set by the host.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", log_level()))
        .with(telemetry::layer())
        .try_init()
        .context("installing the tracing subscriber")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => warn!("no .env file found; using process environment"),
        Err(e) => return Err(e).context("reading .env"),
    }

    api::start().await.context("api server failed")?;
    Ok(())
}

/// Workspace log level from `LOG_LEVEL` (default: debug for the pipeline crates).
fn log_level() -> Level {
    std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Level::DEBUG)
}
