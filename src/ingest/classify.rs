// src/ingest/classify.rs
//! Status classification as an ordered cue table, plus best-effort date parsing.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ingest::types::MatchStatus;

/// A textual hint. Phrases are matched against the lowercased text.
pub enum Cue {
    Phrase(&'static str),
    Pattern(Regex),
}

impl Cue {
    fn matches(&self, raw: &str, lower: &str) -> bool {
        match self {
            Cue::Phrase(p) => lower.contains(p),
            Cue::Pattern(re) => re.is_match(raw),
        }
    }
}

pub struct Rule {
    pub cue: Cue,
    pub status: MatchStatus,
}

fn phrase(p: &'static str, status: MatchStatus) -> Rule {
    Rule {
        cue: Cue::Phrase(p),
        status,
    }
}

fn pattern(re: &str, status: MatchStatus) -> Rule {
    Rule {
        cue: Cue::Pattern(Regex::new(re).expect("status cue regex")),
        status,
    }
}

/// First matching row wins, so finished-match phrases shadow live markers
/// ("Live: India won by 5 wickets" is COMPLETED).
pub static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    use MatchStatus::*;
    vec![
        phrase("won by", Completed),
        pattern(r"(?i)\bdrawn\b", Completed),
        phrase("match ended", Completed),
        phrase("abandoned", Completed),
        phrase("no result", Completed),
        phrase("match tied", Completed),
        phrase("starts at", Upcoming),
        phrase("match yet to start", Upcoming),
        phrase("yet to begin", Upcoming),
        pattern(r"(?i)\bstart\w*\b.*\blocal time\b", Upcoming),
        pattern(r"(?i)\blive\b", Live),
        phrase("*", Live),
        pattern(r"(?i)\b(?:needs?|requires?)\b", Live),
        phrase("trail by", Live),
        phrase("lead by", Live),
        phrase("stumps", Live),
        phrase("innings break", Live),
        pattern(r"(?i)\b(?:tea|lunch)\b", Live),
        pattern(r"(?i)\bday\s+\d+\b", Live),
        pattern(r"(?i)\(\d+(?:\.\d+)?(?:/\d+)?\s*ov", Live),
        pattern(r"\b\d+/\d+\b", Live),
        pattern(r"\b\d+\s*&\s*\d+\b", Live),
    ]
});

/// Classify a match from its text block. A start date after `today` marks an
/// otherwise unclassified match as UPCOMING.
pub fn classify(text: &str, start_date: Option<NaiveDate>, today: NaiveDate) -> MatchStatus {
    let lower = text.to_lowercase();
    if let Some(rule) = RULES.iter().find(|r| r.cue.matches(text, &lower)) {
        return rule.status;
    }
    match start_date {
        Some(d) if d > today => MatchStatus::Upcoming,
        _ => MatchStatus::Unknown,
    }
}

fn month_from_abbrev(s: &str) -> Option<u32> {
    let m = match s.get(..3)?.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(m)
}

static RE_SHORT_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][a-z]{2})\s+(\d{1,2})(?:-(\d{1,2}))?,?\s+(\d{4})\b").expect("date regex")
});
static RE_LONG_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][a-z]+)\s+(\d{1,2}),\s+(\d{4})\b").expect("date regex"));

/// Parse "Dec 27 2025", "Dec 26-30 2025", "Dec 26-27, 2025" or
/// "December 27, 2025" into (start, end). Best-effort.
pub fn parse_date_range(text: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let text = text.replace('\u{00a0}', " ");

    if let Some(c) = RE_SHORT_RANGE.captures(&text) {
        let parsed = (|| {
            let mon = month_from_abbrev(&c[1])?;
            let year: i32 = c[4].parse().ok()?;
            let d1: u32 = c[2].parse().ok()?;
            let start = NaiveDate::from_ymd_opt(year, mon, d1)?;
            let end = match c.get(3) {
                Some(d2) => NaiveDate::from_ymd_opt(year, mon, d2.as_str().parse().ok()?)?,
                None => start,
            };
            Some((start, end))
        })();
        return match parsed {
            Some((s, e)) => (Some(s), Some(e)),
            None => (None, None),
        };
    }

    if let Some(c) = RE_LONG_DATE.captures(&text) {
        let day = month_from_abbrev(&c[1]).and_then(|mon| {
            let year: i32 = c[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, mon, c[2].parse().ok()?)
        });
        if let Some(d) = day {
            return (Some(d), Some(d));
        }
    }

    (None, None)
}
