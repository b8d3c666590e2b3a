// src/fetch.rs
use async_trait::async_trait;
use metrics::histogram;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::time::Duration;

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub body: String,
    pub content_type: Option<String>,
}

/// One GET per call, bounded by `timeout`. Retries belong to the caller.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Fetched, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
    allowed_hosts: Vec<String>,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, allowed_hosts: Vec<String>) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            allowed_hosts: allowed_hosts
                .into_iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        })
    }

    /// Absolute http(s) URL whose host is on the allow-list.
    pub fn check_url(&self, url: &str) -> Result<Url, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::Rejected(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::Rejected(format!("{url}: unsupported scheme")));
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::Rejected(format!("{url}: missing host")))?
            .to_ascii_lowercase();
        if !self.allowed_hosts.iter().any(|h| *h == host) {
            return Err(FetchError::Rejected(format!("{host} is not an approved upstream")));
        }
        Ok(parsed)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Fetched, FetchError> {
        let target = self.check_url(url)?;
        let t0 = std::time::Instant::now();

        let resp = self.client.get(target).timeout(timeout).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("live_score_fetch_ms").record(ms);
        tracing::debug!(%url, bytes = body.len(), ms, "fetched upstream");

        Ok(Fetched { body, content_type })
    }
}

/// Hosts of the given URLs, for the fetcher allow-list.
pub fn hosts_of<'a>(urls: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut hosts: Vec<String> = urls
        .into_iter()
        .filter_map(|u| Url::parse(u).ok())
        .filter_map(|u| u.host_str().map(str::to_ascii_lowercase))
        .collect();
    hosts.sort();
    hosts.dedup();
    hosts
}
