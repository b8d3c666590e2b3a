// src/ingest/providers/scoreboard.rs
//! Generic HTML scoreboard scraper. Each site contributes a `CardLayout`
//! describing where its match links, team names and status notes live.

use chrono::NaiveDate;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::error::ParseError;
use crate::ingest::classify::{classify, parse_date_range};
use crate::ingest::types::{Extraction, Extractor, MatchRecord, SourceTag};
use crate::ingest::{clean_team_name, derive_match_id, normalize_text, split_teams};

#[derive(Debug, Clone)]
pub struct CardLayout {
    pub source: SourceTag,
    /// Used to absolutize relative hrefs.
    pub base_url: &'static str,
    pub link_selector: &'static str,
    pub href_contains: &'static [&'static str],
    pub href_excludes: &'static [&'static str],
    pub team_selector: Option<&'static str>,
    pub summary_selector: Option<&'static str>,
    /// Accepted text length (chars) for the enclosing match card.
    pub card_text: RangeInclusive<usize>,
    /// How many ancestors to climb from the link looking for the card.
    pub max_depth: usize,
}

pub struct ScoreboardExtractor {
    layout: CardLayout,
    link_sel: Selector,
    team_sel: Option<Selector>,
    summary_sel: Option<Selector>,
    today: Option<NaiveDate>,
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static scoreboard selector")
}

static RE_WON_BY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][\w.'-]*(?:\s+[A-Z][\w.'-]*)*\s+won by\s+(?:an innings and\s+)?\d+\s+(?:runs?|wkts?|wickets?)(?:\s*\([^)]*\))?)")
        .unwrap()
});
static RE_SCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+/\d+(?:\s*\(\s*[\d.]+(?:/\d+)?\s*ov\))?").unwrap()
});

impl ScoreboardExtractor {
    pub fn new(layout: CardLayout) -> Self {
        Self {
            link_sel: selector(layout.link_selector),
            team_sel: layout.team_selector.map(selector),
            summary_sel: layout.summary_selector.map(selector),
            layout,
            today: None,
        }
    }

    /// Pin "today" for date-based classification.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn layout(&self) -> &CardLayout {
        &self.layout
    }

    fn is_match_href(&self, href: &str) -> bool {
        self.layout.href_contains.iter().all(|p| href.contains(p))
            && !self.layout.href_excludes.iter().any(|p| href.contains(p))
    }

    fn absolutize(&self, href: &str) -> Option<String> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Some(href.to_string());
        }
        let base = Url::parse(self.layout.base_url).ok()?;
        base.join(href).ok().map(String::from)
    }

    /// Closest ancestor (or the link itself) that looks like one match card:
    /// text length inside the layout window and, when a team selector is
    /// configured, exactly two team names. Falls back to the link's parent.
    fn find_card<'a>(&self, link: ElementRef<'a>) -> ElementRef<'a> {
        let chain: Vec<ElementRef<'a>> = std::iter::once(link)
            .chain(link.ancestors().filter_map(ElementRef::wrap))
            .take(self.layout.max_depth + 1)
            .collect();

        let sized = |el: ElementRef<'a>| {
            self.layout
                .card_text
                .contains(&element_text(el).chars().count())
        };
        let has_teams = |el: ElementRef<'a>| match &self.team_sel {
            Some(sel) => el.select(sel).count() == 2,
            None => true,
        };

        chain
            .iter()
            .find(|el| sized(**el) && has_teams(**el))
            .or_else(|| chain.get(1))
            .copied()
            .unwrap_or(link)
    }

    fn teams_in(&self, card: ElementRef<'_>, link: ElementRef<'_>) -> Option<[String; 2]> {
        if let Some(sel) = &self.team_sel {
            let names: Vec<String> = card
                .select(sel)
                .map(|el| clean_team_name(&element_text(el)))
                .filter(|n| !n.is_empty())
                .take(2)
                .collect();
            if let [home, away] = names.as_slice() {
                return Some([home.clone(), away.clone()]);
            }
        }
        split_teams(&element_text(link)).or_else(|| split_teams(&element_text(card)))
    }

    fn summary_in(&self, card: ElementRef<'_>, card_text: &str) -> String {
        let from_selector = self.summary_sel.as_ref().and_then(|sel| {
            card.select(sel)
                .map(element_text)
                .find(|t| !t.is_empty())
        });
        from_selector
            .or_else(|| RE_WON_BY.captures(card_text).map(|c| c[1].to_string()))
            .or_else(|| RE_SCORE.find(card_text).map(|m| m.as_str().to_string()))
            .unwrap_or_default()
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<Vec<_>>().join(" "))
}

impl Extractor for ScoreboardExtractor {
    fn extract(&self, raw: &str) -> Result<Extraction, ParseError> {
        let t0 = std::time::Instant::now();
        let source = self.layout.source;
        if raw.trim().is_empty() {
            return Err(ParseError::MalformedInput("empty document".into()));
        }

        let doc = Html::parse_document(raw);
        let links: Vec<(ElementRef<'_>, String)> = doc
            .select(&self.link_sel)
            .filter_map(|a| {
                let href = a.value().attr("href")?;
                self.is_match_href(href)
                    .then(|| self.absolutize(href))
                    .flatten()
                    .map(|url| (a, url))
            })
            .collect();
        if links.is_empty() {
            return Err(ParseError::SchemaMismatch(format!(
                "no match links for `{}`",
                self.layout.link_selector
            )));
        }

        let today = self.today.unwrap_or_else(crate::ingest::today);
        let mut out = Extraction::default();
        // Several links (nav, scorecard, commentary, ...) usually point at one
        // match; an id is done once any of its links yields a card with teams.
        let mut resolved: HashSet<String> = HashSet::new();
        let mut unresolved: HashSet<String> = HashSet::new();

        for (link, url) in links {
            let match_id = derive_match_id(source, &url);
            if resolved.contains(&match_id) {
                continue;
            }

            let card = self.find_card(link);
            let Some(teams) = self.teams_in(card, link) else {
                unresolved.insert(match_id);
                continue;
            };
            resolved.insert(match_id.clone());

            let card_text = element_text(card);
            let (start_date, end_date) = parse_date_range(&card_text);
            let status = classify(&card_text, start_date, today);
            let summary = self.summary_in(card, &card_text);

            out.records.push(MatchRecord {
                match_id,
                teams,
                status,
                summary,
                source,
                url: Some(url),
                title: None,
                start_date,
                end_date,
                published_at: None,
            });
        }

        out.skipped = unresolved.difference(&resolved).count();

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("live_score_parse_ms", "source" => source.as_str()).record(ms);
        if out.skipped > 0 {
            tracing::debug!(skipped = out.skipped, %source, "scoreboard cards skipped");
            counter!("live_score_parse_skipped_total", "source" => source.as_str())
                .increment(out.skipped as u64);
        }

        if out.records.is_empty() {
            return Err(ParseError::NoMatchesFound);
        }
        Ok(out)
    }

    fn source(&self) -> SourceTag {
        self.layout.source
    }
}
