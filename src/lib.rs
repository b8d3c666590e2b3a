// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod metrics;
pub mod selector;
pub mod service;

pub use crate::api::{router, AppState};
pub use crate::config::Settings;
pub use crate::service::LiveScores;

/// Router over real upstream sources described by `settings`.
/// `/metrics` is not included; the binary mounts it separately.
pub fn app(settings: &Settings) -> anyhow::Result<axum::Router> {
    let scores = LiveScores::from_settings(settings)?;
    Ok(router(AppState::new(scores)))
}
