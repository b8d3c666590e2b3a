//! Live cricket score service: binary entrypoint.
//! Loads settings, installs logging and metrics, then serves the axum router.

use anyhow::Context;
use live_score::{app, metrics::Metrics, Settings};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines when LOG_FORMAT=json.
/// The runtime may already have a subscriber; ours is then skipped.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("live_score=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // .env is optional; missing file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let settings = Settings::load().context("loading settings")?;
    tracing::info!(
        ttl_secs = settings.cache_ttl_secs,
        timeout_secs = settings.fetch_timeout_secs,
        sources = ?settings.sources.iter().map(|s| s.kind.as_str()).collect::<Vec<_>>(),
        "live score service starting"
    );

    let metrics = Metrics::init(settings.cache_ttl_secs)?;
    let router = app(&settings)?.merge(metrics.router());

    Ok(router.into())
}
