// src/ingest/providers/mod.rs
pub mod cricinfo_desktop;
pub mod cricinfo_rss;
pub mod espn_scores;
pub mod scoreboard;

use crate::ingest::types::{Extractor, SourceTag};

/// Built-in extractor for a source tag.
pub fn extractor_for(tag: SourceTag) -> Box<dyn Extractor> {
    match tag {
        SourceTag::CricinfoRss => Box::new(cricinfo_rss::CricinfoRssExtractor::new()),
        SourceTag::CricinfoDesktop => Box::new(cricinfo_desktop::extractor()),
        SourceTag::EspnScores => Box::new(espn_scores::extractor()),
    }
}

pub fn default_urls(tag: SourceTag) -> &'static [&'static str] {
    match tag {
        SourceTag::CricinfoRss => cricinfo_rss::DEFAULT_URLS,
        SourceTag::CricinfoDesktop => cricinfo_desktop::DEFAULT_URLS,
        SourceTag::EspnScores => espn_scores::DEFAULT_URLS,
    }
}
