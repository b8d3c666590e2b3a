// src/ingest/providers/cricinfo_desktop.rs
use crate::ingest::providers::scoreboard::{CardLayout, ScoreboardExtractor};
use crate::ingest::types::SourceTag;

pub const DEFAULT_URLS: &[&str] = &["https://www.espncricinfo.com/ci/engine/match/scores/desktop.html"];

/// Classic cricinfo desktop scores page: `default-match-block` sections with
/// `innings-info-1/2` rows and a `match-status` line.
pub fn layout() -> CardLayout {
    CardLayout {
        source: SourceTag::CricinfoDesktop,
        base_url: "https://www.espncricinfo.com",
        link_selector: r#"a[href*="/ci/engine/match/"]"#,
        href_contains: &[".html"],
        href_excludes: &["/scores/"],
        team_selector: Some(".innings-info-1, .innings-info-2"),
        summary_selector: Some(".match-status"),
        card_text: 40..=600,
        max_depth: 6,
    }
}

pub fn extractor() -> ScoreboardExtractor {
    ScoreboardExtractor::new(layout())
}
