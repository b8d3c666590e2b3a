// src/ingest/mod.rs
pub mod classify;
pub mod providers;
pub mod types;

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::ingest::types::{MatchRecord, SourceTag};

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = RE_TAGS.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes, dashes to '-'
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{2013}', '\u{2014}'], "-");

    // 4) Collapse whitespace (nbsp included)
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\u{00a0}]+").unwrap());
    out = RE_WS.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 500 chars
    if out.chars().count() > 500 {
        out = out.chars().take(500).collect();
    }

    out
}

static RE_VS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+(?:vs?\.?)\s+").unwrap());
static RE_LIVE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^live\s*[:\-]\s*").unwrap());

/// Split a headline like "India vs Australia - Live: India need 50 runs"
/// into the fixture part and the optional status part.
pub fn split_headline(title: &str) -> (&str, Option<&str>) {
    match title.split_once(" - ") {
        Some((fixture, rest)) => {
            let rest = rest.trim();
            (fixture.trim(), (!rest.is_empty()).then_some(rest))
        }
        None => (title.trim(), None),
    }
}

/// Drop a leading "Live:" marker from a status line.
pub fn strip_live_prefix(s: &str) -> String {
    RE_LIVE_PREFIX.replace(s.trim(), "").trim().to_string()
}

/// Team name without trailing score tokens: "India 250/6 *" -> "India".
pub fn clean_team_name(raw: &str) -> String {
    let name = raw
        .split_whitespace()
        .take_while(|tok| {
            tok.chars()
                .next()
                .is_some_and(|c| !c.is_ascii_digit() && !matches!(c, '*' | '(' | '&' | '/' | '['))
        })
        .collect::<Vec<_>>()
        .join(" ");
    name.trim_matches(|c: char| matches!(c, ',' | ':' | '-' | '.' | ' '))
        .to_string()
}

/// Exactly two sides separated by `v`/`vs`, both non-empty after cleanup.
pub fn split_teams(fixture: &str) -> Option<[String; 2]> {
    let parts: Vec<&str> = RE_VS.split(fixture.trim()).collect();
    if parts.len() != 2 {
        return None;
    }
    let home = clean_team_name(parts[0]);
    let away = clean_team_name(parts[1]);
    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some([home, away])
}

/// Pull a numeric match id out of cricinfo / ESPN style URLs.
pub fn match_id_from_url(url: &str) -> Option<String> {
    static PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
        [
            // classic: /ci/engine/match/1455614.html
            Regex::new(r"/match/(\d+)\.html").unwrap(),
            // ESPN: /game/1455614/
            Regex::new(r"/game/(\d+)(?:/|$)").unwrap(),
            // new cricinfo: ...-1455614 or /full-scorecard-1455614
            Regex::new(r"[-/](\d{6,10})(?:[/?]|$)").unwrap(),
        ]
    });
    PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .map(|c| c[1].to_string())
}

pub(crate) fn short_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Opaque id for a record: numeric upstream id when the key is a match URL,
/// the key itself when it is already a short token, else a digest.
pub fn derive_match_id(source: SourceTag, key: &str) -> String {
    let key = key.trim();
    if let Some(id) = match_id_from_url(key) {
        return id;
    }
    let is_token = !key.is_empty()
        && key.len() <= 32
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if is_token {
        return key.to_string();
    }
    short_hash(&format!("{source}|{key}"))
}

/// Keep the first record per match id. Returns how many were dropped.
pub fn dedup_by_id(records: &mut Vec<MatchRecord>) -> usize {
    let before = records.len();
    let mut seen: HashSet<String> = HashSet::new();
    records.retain(|r| seen.insert(r.match_id.clone()));
    before - records.len()
}

pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_decodes_and_collapses() {
        let s = "  <b>India</b>&nbsp;&nbsp;250/6 &amp; more\n ";
        assert_eq!(normalize_text(s), "India 250/6 & more");
    }

    #[test]
    fn headline_split_and_live_prefix() {
        let (fixture, rest) = split_headline("India vs Australia - Live: India need 50 runs");
        assert_eq!(fixture, "India vs Australia");
        assert_eq!(rest, Some("Live: India need 50 runs"));
        assert_eq!(strip_live_prefix(rest.unwrap()), "India need 50 runs");

        assert_eq!(split_headline("India v Australia"), ("India v Australia", None));
    }

    #[test]
    fn team_names_lose_score_tokens() {
        assert_eq!(
            split_teams("India 250/6 * v Australia 180 & 22/1 (8 ov)"),
            Some(["India".to_string(), "Australia".to_string()])
        );
        assert_eq!(
            split_teams("South Africa Women vs. New Zealand Women"),
            Some([
                "South Africa Women".to_string(),
                "New Zealand Women".to_string()
            ])
        );
        assert_eq!(split_teams("Series preview"), None);
        assert_eq!(split_teams("A v B v C"), None);
        assert_eq!(split_teams("250/6 v Australia"), None);
    }

    #[test]
    fn ids_from_known_url_shapes() {
        assert_eq!(
            match_id_from_url("http://www.cricinfo.com/ci/engine/match/1455614.html").as_deref(),
            Some("1455614")
        );
        assert_eq!(
            match_id_from_url("https://www.espn.com/cricket/series/8048/game/1455615/aus-v-eng").as_deref(),
            Some("1455615")
        );
        assert_eq!(
            match_id_from_url("https://www.espncricinfo.com/series/x/aus-vs-ind-1st-test-1455616/live").as_deref(),
            Some("1455616")
        );
        assert_eq!(match_id_from_url("https://example.com/news"), None);
    }

    #[test]
    fn derived_ids_are_non_empty_and_stable() {
        assert_eq!(derive_match_id(SourceTag::CricinfoRss, " abc-12 "), "abc-12");
        let a = derive_match_id(SourceTag::CricinfoRss, "https://example.com/some page");
        let b = derive_match_id(SourceTag::CricinfoRss, "https://example.com/some page");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(a, derive_match_id(SourceTag::EspnScores, "https://example.com/some page"));
    }
}
