// src/selector.rs
//! Fallback chain over upstream sources. The first source (and mirror) whose
//! page fetches and parses into at least one record wins; nothing is merged.

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{AllSourcesFailed, Attempt, AttemptFailure};
use crate::fetch::Fetch;
use crate::ingest::providers::extractor_for;
use crate::ingest::types::{Extractor, MatchRecord, SourceTag};

pub struct Source {
    pub tag: SourceTag,
    pub urls: Vec<String>,
    pub extractor: Box<dyn Extractor>,
}

impl Source {
    /// Source with the built-in extractor for `tag`.
    pub fn new(tag: SourceTag, urls: Vec<String>) -> Self {
        Self {
            tag,
            urls,
            extractor: extractor_for(tag),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }
}

pub struct SourceChain {
    fetcher: Arc<dyn Fetch>,
    sources: Vec<Source>,
    timeout: Duration,
}

impl SourceChain {
    pub fn new(fetcher: Arc<dyn Fetch>, sources: Vec<Source>, timeout: Duration) -> Self {
        Self {
            fetcher,
            sources,
            timeout,
        }
    }

    pub fn from_settings(fetcher: Arc<dyn Fetch>, settings: &Settings) -> Self {
        let sources = settings
            .sources
            .iter()
            .map(|s| Source::new(s.kind, s.urls.clone()))
            .collect();
        Self::new(fetcher, sources, settings.fetch_timeout())
    }

    pub fn sources(&self) -> impl Iterator<Item = SourceTag> + '_ {
        self.sources.iter().map(|s| s.tag)
    }

    async fn attempt(&self, source: &Source, url: &str) -> Result<Vec<MatchRecord>, AttemptFailure> {
        let fetched = self
            .fetcher
            .fetch(url, self.timeout)
            .await
            .map_err(AttemptFailure::Fetch)?;
        let extraction = source
            .extractor
            .extract(&fetched.body)
            .map_err(AttemptFailure::Parse)?;
        if extraction.records.is_empty() {
            return Err(AttemptFailure::Empty);
        }
        Ok(extraction.records)
    }

    /// Records from the first source that yields any, ordered LIVE, UPCOMING,
    /// COMPLETED, UNKNOWN.
    pub async fn get_matches(&self) -> Result<Vec<MatchRecord>, AllSourcesFailed> {
        let mut attempts = Vec::new();

        for source in &self.sources {
            for url in &source.urls {
                match self.attempt(source, url).await {
                    Ok(mut records) => {
                        records.sort_by_key(|r| r.status.rank());
                        info!(
                            source = %source.tag,
                            %url,
                            records = records.len(),
                            failed_attempts = attempts.len(),
                            "source served matches"
                        );
                        return Ok(records);
                    }
                    Err(failure) => {
                        warn!(source = %source.tag, %url, %failure, "source attempt failed");
                        counter!("live_score_source_failures_total", "source" => source.tag.as_str())
                            .increment(1);
                        attempts.push(Attempt {
                            source: source.tag,
                            url: url.clone(),
                            failure,
                        });
                    }
                }
            }
        }

        Err(AllSourcesFailed { attempts })
    }
}
