// tests/common/mod.rs
//
// Shared helpers: a scripted upstream that counts requests, and settings that
// point the fallback chain at fake hosts.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use live_score::config::{Settings, SourceSettings};
use live_score::error::FetchError;
use live_score::fetch::{Fetch, Fetched};
use live_score::ingest::types::SourceTag;

pub const RSS_URL: &str = "https://feed.test/rss/livescores.xml";
pub const RSS_MIRROR_URL: &str = "https://mirror.test/rss/livescores.xml";
pub const DESKTOP_URL: &str = "https://desktop.test/ci/engine/match/scores/desktop.html";
pub const ESPN_URL: &str = "https://espn.test/cricket/scores";

pub const RSS_FIXTURE: &str = include_str!("../fixtures/cricinfo_rss.xml");
pub const ESPN_FIXTURE: &str = include_str!("../fixtures/espn_scores.html");

/// Upstream double: each URL answers with a scripted body or error.
/// Unscripted URLs fail with a connection error.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Result<String, FetchError>>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, url: &str, body: &str) -> Self {
        self.set(url, Ok(body.to_string()));
        self
    }

    pub fn fail(self, url: &str, err: FetchError) -> Self {
        self.set(url, Err(err));
        self
    }

    /// Change a scripted answer after the chain is built.
    pub fn set(&self, url: &str, answer: Result<String, FetchError>) {
        self.responses.lock().unwrap().insert(url.to_string(), answer);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for MockFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<Fetched, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(url.to_string());
        let answer = self
            .responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Connection(format!("no route to {url}"))));
        answer.map(|body| Fetched {
            body,
            content_type: None,
        })
    }
}

/// Three-source chain on fake hosts; the feed has a mirror.
pub fn test_settings() -> Settings {
    Settings {
        sources: vec![
            SourceSettings {
                kind: SourceTag::CricinfoRss,
                urls: vec![RSS_URL.into(), RSS_MIRROR_URL.into()],
            },
            SourceSettings {
                kind: SourceTag::CricinfoDesktop,
                urls: vec![DESKTOP_URL.into()],
            },
            SourceSettings {
                kind: SourceTag::EspnScores,
                urls: vec![ESPN_URL.into()],
            },
        ],
        ..Settings::default()
    }
    .sanitize()
    .expect("test settings are valid")
}

pub fn shared(fetcher: MockFetcher) -> Arc<MockFetcher> {
    Arc::new(fetcher)
}
