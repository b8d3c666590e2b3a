use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram, gauge, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and publish the cache TTL gauge.
    /// Fails if a recorder is already installed in this process.
    pub fn init(cache_ttl_secs: u64) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!(
            "live_score_cache_total",
            "Cache lookups by result (hit/miss)"
        );
        describe_counter!(
            "live_score_source_failures_total",
            "Failed fetch/parse attempts per source"
        );
        describe_counter!(
            "live_score_parse_skipped_total",
            "Upstream items dropped because teams could not be parsed"
        );
        describe_histogram!(
            "live_score_fetch_ms",
            Unit::Milliseconds,
            "Upstream fetch latency"
        );
        describe_histogram!(
            "live_score_parse_ms",
            Unit::Milliseconds,
            "Extraction time per source"
        );

        // absolute TTL, no sliding refresh
        gauge!("live_score_cache_ttl_seconds").set(cache_ttl_secs as f64);

        Ok(Self { handle })
    }

    /// `/metrics` in the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
