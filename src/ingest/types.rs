// src/ingest/types.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    Live,
    Upcoming,
    Completed,
    #[default]
    Unknown,
}

impl MatchStatus {
    /// Position in list responses: live first, unknown last.
    pub fn rank(self) -> u8 {
        match self {
            MatchStatus::Live => 0,
            MatchStatus::Upcoming => 1,
            MatchStatus::Completed => 2,
            MatchStatus::Unknown => 3,
        }
    }
}

/// Which upstream produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    CricinfoRss,
    CricinfoDesktop,
    EspnScores,
}

impl SourceTag {
    pub const ALL: [SourceTag; 3] = [
        SourceTag::CricinfoRss,
        SourceTag::CricinfoDesktop,
        SourceTag::EspnScores,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::CricinfoRss => "cricinfo_rss",
            SourceTag::CricinfoDesktop => "cricinfo_desktop",
            SourceTag::EspnScores => "espn_scores",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRecord {
    pub match_id: String,
    pub teams: [String; 2],
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub summary: String,
    pub source: SourceTag,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<u64>, // unix seconds
}

/// Output of one extractor run. `skipped` is diagnostics only.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<MatchRecord>,
    pub skipped: usize,
}

/// Turns one raw upstream document into match records.
pub trait Extractor: Send + Sync {
    fn extract(&self, raw: &str) -> Result<Extraction, ParseError>;
    fn source(&self) -> SourceTag;
}
