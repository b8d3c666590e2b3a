// src/service.rs
use std::sync::Arc;

use crate::cache::{CacheStatus, Cached, TtlCache};
use crate::config::Settings;
use crate::error::{AllSourcesFailed, LookupError};
use crate::fetch::{hosts_of, Fetch, HttpFetcher};
use crate::ingest::types::MatchRecord;
use crate::selector::SourceChain;

pub type MatchList = Arc<Vec<MatchRecord>>;

/// The only cache key. Single-match lookups filter this list instead of
/// caching per id.
const ALL_MATCHES: &str = "all";

/// Cache in front of the fallback chain. One instance per process.
pub struct LiveScores {
    chain: SourceChain,
    cache: TtlCache<&'static str, MatchList>,
}

impl LiveScores {
    pub fn new(chain: SourceChain, cache: TtlCache<&'static str, MatchList>) -> Self {
        Self { chain, cache }
    }

    /// Real HTTP fetcher limited to the configured upstream hosts.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(&settings.user_agent, hosts_of(settings.all_urls()))?;
        Ok(Self::with_fetcher(Arc::new(fetcher), settings))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetch>, settings: &Settings) -> Self {
        Self::new(
            SourceChain::from_settings(fetcher, settings),
            TtlCache::new(settings.cache_ttl()),
        )
    }

    pub fn cache_ttl_secs(&self) -> u64 {
        self.cache.ttl().as_secs()
    }

    /// All current matches, served from cache while fresh.
    pub async fn get_matches(&self) -> Result<Cached<MatchList>, AllSourcesFailed> {
        self.cache
            .get_or_compute(ALL_MATCHES, || async {
                self.chain.get_matches().await.map(Arc::new)
            })
            .await
            .inspect_err(|e| {
                tracing::warn!(attempts = ?e.attempts, "all upstream sources failed");
            })
    }

    /// One match from the cached full list; no extra upstream request.
    pub async fn get_match(&self, match_id: &str) -> Result<(MatchRecord, CacheStatus), LookupError> {
        let all = self.get_matches().await?;
        all.value
            .iter()
            .find(|m| m.match_id == match_id)
            .cloned()
            .map(|m| (m, all.status))
            .ok_or(LookupError::NotFound)
    }
}
