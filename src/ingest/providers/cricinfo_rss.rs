// src/ingest/providers/cricinfo_rss.rs
use chrono::NaiveDate;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::{Captures, Regex};
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::error::ParseError;
use crate::ingest::classify::{classify, parse_date_range};
use crate::ingest::types::{Extraction, Extractor, MatchRecord, SourceTag};
use crate::ingest::{
    dedup_by_id, derive_match_id, normalize_text, split_headline, split_teams, strip_live_prefix,
};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    guid: Option<Guid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

// <guid isPermaLink="false">...</guid>
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: String,
}

pub const DEFAULT_URLS: &[&str] = &[
    "https://www.espncricinfo.com/rss/livescores.xml",
    "https://static.cricinfo.com/rss/livescores.xml",
];

fn parse_rfc2822_to_unix(ts: &str) -> Option<u64> {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
}

/// Live scores RSS feed: one `<item>` per match, teams and state packed into
/// the title ("India 250/6 * v Australia", "India vs Australia - Live: ...").
#[derive(Debug, Default)]
pub struct CricinfoRssExtractor {
    today: Option<NaiveDate>,
}

impl CricinfoRssExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin "today" for date-based classification.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn record_from_item(&self, it: Item, today: NaiveDate) -> Option<MatchRecord> {
        let title = normalize_text(it.title.as_deref().unwrap_or_default());
        let desc = normalize_text(it.description.as_deref().unwrap_or_default());
        let link = it.link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
        let guid = it
            .guid
            .map(|g| g.value.trim().to_string())
            .filter(|g| !g.is_empty());

        let key = guid.as_deref().or(link.as_deref())?;
        let match_id = derive_match_id(SourceTag::CricinfoRss, key);

        let (fixture, status_part) = split_headline(&title);
        let teams = split_teams(fixture).or_else(|| split_teams(split_headline(&desc).0))?;

        let summary = status_part
            .map(strip_live_prefix)
            .filter(|s| !s.is_empty())
            .or_else(|| (!desc.is_empty()).then(|| desc.clone()))
            .unwrap_or_else(|| title.clone());

        let block = format!("{title} {desc}");
        let (start_date, end_date) = parse_date_range(&block);
        let status = classify(&block, start_date, today);

        Some(MatchRecord {
            match_id,
            teams,
            status,
            summary,
            source: SourceTag::CricinfoRss,
            url: link,
            title: (!title.is_empty()).then_some(title),
            start_date,
            end_date,
            published_at: it.pub_date.as_deref().and_then(parse_rfc2822_to_unix),
        })
    }
}

impl Extractor for CricinfoRssExtractor {
    fn extract(&self, raw: &str) -> Result<Extraction, ParseError> {
        let t0 = std::time::Instant::now();
        if raw.trim().is_empty() {
            return Err(ParseError::MalformedInput("empty feed body".into()));
        }
        if !raw.contains("<channel") {
            return Err(ParseError::SchemaMismatch("no <channel> element".into()));
        }

        let xml_clean = scrub_html_entities_for_xml(raw);
        let rss: Rss =
            from_str(&xml_clean).map_err(|e| ParseError::MalformedInput(e.to_string()))?;
        if rss.channel.item.is_empty() {
            return Err(ParseError::NoMatchesFound);
        }

        let today = self.today.unwrap_or_else(crate::ingest::today);
        let mut out = Extraction::default();
        for it in rss.channel.item {
            match self.record_from_item(it, today) {
                Some(rec) => out.records.push(rec),
                None => out.skipped += 1,
            }
        }
        dedup_by_id(&mut out.records);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("live_score_parse_ms", "source" => "cricinfo_rss").record(ms);

        if out.skipped > 0 {
            tracing::debug!(skipped = out.skipped, source = "cricinfo_rss", "feed items skipped");
            counter!("live_score_parse_skipped_total", "source" => "cricinfo_rss")
                .increment(out.skipped as u64);
        }
        if out.records.is_empty() {
            return Err(ParseError::NoMatchesFound);
        }
        Ok(out)
    }

    fn source(&self) -> SourceTag {
        SourceTag::CricinfoRss
    }
}

/// Feed descriptions carry HTML named entities (`&hellip;`, `&eacute;`, ...)
/// that XML does not define. Decode those to text; the five XML entities and
/// numeric references pass through. Unknown names become literal text.
fn scrub_html_entities_for_xml(s: &str) -> String {
    static RE_NAMED_ENTITY: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("entity regex"));

    RE_NAMED_ENTITY
        .replace_all(s, |c: &Captures<'_>| {
            let name = &c[1];
            if matches!(name, "amp" | "lt" | "gt" | "quot" | "apos") {
                return c[0].to_string();
            }
            let decoded = html_escape::decode_html_entities(&c[0]);
            // re-escape in case the entity decodes to `&`, `<` or `>`
            html_escape::encode_text(&decoded).into_owned()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::MatchStatus;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 27).unwrap()
    }

    fn feed(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Live scores</title>{items}</channel></rss>"#
        )
    }

    #[test]
    fn live_item_maps_to_record() {
        let xml = feed(
            r#"<item>
                 <title>India vs Australia - Live: India need 50 runs</title>
                 <link>http://www.cricinfo.com/ci/engine/match/1455614.html</link>
                 <guid isPermaLink="false">ind-aus-3</guid>
                 <pubDate>Sat, 27 Dec 2025 10:15:00 +0000</pubDate>
               </item>"#,
        );
        let out = CricinfoRssExtractor::new()
            .with_today(today())
            .extract(&xml)
            .unwrap();
        assert_eq!(out.skipped, 0);
        let rec = &out.records[0];
        assert_eq!(rec.match_id, "ind-aus-3");
        assert_eq!(rec.teams, ["India".to_string(), "Australia".to_string()]);
        assert_eq!(rec.status, MatchStatus::Live);
        assert_eq!(rec.summary, "India need 50 runs");
        assert_eq!(rec.published_at, Some(1_766_830_500));
        assert_eq!(
            rec.url.as_deref(),
            Some("http://www.cricinfo.com/ci/engine/match/1455614.html")
        );
    }

    #[test]
    fn id_falls_back_to_link_and_score_title_becomes_summary() {
        let xml = feed(
            r#"<item>
                 <title>England 172 &amp; 164 v Australia 132 &amp; 205/2 *</title>
                 <link>http://www.cricinfo.com/ci/engine/match/1455600.html</link>
               </item>"#,
        );
        let out = CricinfoRssExtractor::new()
            .with_today(today())
            .extract(&xml)
            .unwrap();
        let rec = &out.records[0];
        assert_eq!(rec.match_id, "1455600");
        assert_eq!(rec.teams, ["England".to_string(), "Australia".to_string()]);
        assert_eq!(rec.summary, "England 172 & 164 v Australia 132 & 205/2 *");
        assert_eq!(rec.status, MatchStatus::Live);
    }

    #[test]
    fn unparsable_items_are_skipped_not_fatal() {
        let xml = feed(
            r#"<item><title>Series preview&nbsp;special</title><link>http://x.test/a</link></item>
               <item><title>No link v Nobody</title></item>
               <item>
                 <title>Pakistan v South Africa - Pakistan won by 6 wickets</title>
                 <guid>http://www.cricinfo.com/ci/engine/match/1455700.html</guid>
               </item>"#,
        );
        let out = CricinfoRssExtractor::new()
            .with_today(today())
            .extract(&xml)
            .unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.skipped, 2);
        assert_eq!(out.records[0].status, MatchStatus::Completed);
        assert_eq!(out.records[0].match_id, "1455700");
    }

    #[test]
    fn html_entities_in_one_item_do_not_sink_the_feed() {
        let xml = feed(
            r#"<item>
                 <title>India vs Australia - Live: India need 50 runs</title>
                 <guid>http://www.cricinfo.com/ci/engine/match/1455614.html</guid>
               </item>
               <item>
                 <title>Sri Lanka v Pakistan - Match yet to start</title>
                 <description>Preview&hellip; Colombo &eacute;dition, tickets &pound;10 &amp; up &bogus;</description>
                 <guid>http://www.cricinfo.com/ci/engine/match/1455615.html</guid>
               </item>"#,
        );
        let out = CricinfoRssExtractor::new()
            .with_today(today())
            .extract(&xml)
            .unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].match_id, "1455614");
        assert_eq!(out.records[0].status, MatchStatus::Live);
        assert_eq!(out.records[1].status, MatchStatus::Upcoming);
    }

    #[test]
    fn entity_scrub_keeps_xml_entities() {
        assert_eq!(
            scrub_html_entities_for_xml("a&hellip; &amp; &lt;b&gt; &#8230; &AMP; &nope;"),
            "a\u{2026} &amp; &lt;b&gt; &#8230; &amp; &amp;nope;"
        );
    }

    #[test]
    fn error_kinds() {
        let x = CricinfoRssExtractor::new();
        assert!(matches!(x.extract("   "), Err(ParseError::MalformedInput(_))));
        assert!(matches!(
            x.extract("<html><body>maintenance</body></html>"),
            Err(ParseError::SchemaMismatch(_))
        ));
        assert!(matches!(
            x.extract(&feed("")),
            Err(ParseError::NoMatchesFound)
        ));
        assert!(matches!(
            x.extract("<rss><channel><item><title>x</title></channel>"),
            Err(ParseError::MalformedInput(_))
        ));
    }
}
