// src/ingest/providers/espn_scores.rs
use crate::ingest::providers::scoreboard::{CardLayout, ScoreboardExtractor};
use crate::ingest::types::SourceTag;

pub const DEFAULT_URLS: &[&str] = &[
    "https://www.espn.com/cricket/scores",
    "https://www.espn.in/cricket/scores",
    "https://www.espn.co.uk/cricket/scores",
];

/// ESPN scoreboard: one `ScoreboardScoreCell` per match, game links under
/// `/cricket/series/<id>/game/<id>/`.
pub fn layout() -> CardLayout {
    CardLayout {
        source: SourceTag::EspnScores,
        base_url: "https://www.espn.com",
        link_selector: "a[href]",
        href_contains: &["/cricket/series/", "/game/"],
        href_excludes: &[],
        team_selector: Some(".ScoreCell__TeamName"),
        summary_selector: Some(".ScoreboardScoreCell__Note"),
        card_text: 60..=900,
        max_depth: 7,
    }
}

pub fn extractor() -> ScoreboardExtractor {
    ScoreboardExtractor::new(layout())
}
