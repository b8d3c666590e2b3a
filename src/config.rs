// src/config.rs
//! Service settings: built-in defaults, optional TOML file, then `APP_*` env
//! overrides.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::providers::default_urls;
use crate::ingest::types::SourceTag;

pub const ENV_CONFIG_PATH: &str = "LIVE_SCORE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/live_score.toml";

pub const DEFAULT_CACHE_TTL_SECS: u64 = 20;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub kind: SourceTag,
    /// Mirrors tried in order. Empty means the built-in URLs for `kind`.
    #[serde(default)]
    pub urls: Vec<String>,
}

impl SourceSettings {
    pub fn builtin(kind: SourceTag) -> Self {
        Self {
            kind,
            urls: default_urls(kind).iter().map(|u| u.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cache_ttl_secs: u64,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Priority order of the fallback chain.
    pub sources: Vec<SourceSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sources: SourceTag::ALL.into_iter().map(SourceSettings::builtin).collect(),
        }
    }
}

impl Settings {
    /// Defaults <- config file <- process env, then sanitized.
    /// 1) $LIVE_SCORE_CONFIG_PATH (must exist when set)
    /// 2) config/live_score.toml (if present)
    pub fn load() -> Result<Self> {
        let mut settings = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    bail!("{ENV_CONFIG_PATH} points to non-existent path");
                }
                Self::from_file(&pb)?
            }
            Err(_) => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_env(|k| std::env::var(k).ok())?;
        settings.sanitize()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Apply `APP_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("APP_CACHE_TTL_SECONDS") {
            self.cache_ttl_secs = parse_secs("APP_CACHE_TTL_SECONDS", &v)?;
        }
        if let Some(v) = lookup("APP_FETCH_TIMEOUT_SECONDS") {
            self.fetch_timeout_secs = parse_secs("APP_FETCH_TIMEOUT_SECONDS", &v)?;
        }
        if let Some(v) = lookup("APP_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            self.user_agent = v.trim().to_string();
        }

        if let Some(v) = lookup("APP_SOURCES") {
            let mut ordered = Vec::new();
            for name in split_list(&v) {
                let kind = SourceTag::parse(&name)
                    .ok_or_else(|| anyhow!("APP_SOURCES: unknown source '{name}'"))?;
                let existing = self.sources.iter().find(|s| s.kind == kind).cloned();
                ordered.push(existing.unwrap_or_else(|| SourceSettings {
                    kind,
                    urls: Vec::new(),
                }));
            }
            self.sources = ordered;
        }

        for src in &mut self.sources {
            let var = format!("APP_{}_URLS", src.kind.as_str().to_ascii_uppercase());
            if let Some(v) = lookup(&var) {
                src.urls = split_list(&v);
            }
        }
        Ok(())
    }

    /// Clamp numbers, drop duplicate sources, fill empty URL lists, validate URLs.
    pub fn sanitize(mut self) -> Result<Self> {
        self.cache_ttl_secs = self.cache_ttl_secs.clamp(1, 3600);
        self.fetch_timeout_secs = self.fetch_timeout_secs.clamp(1, 30);
        if self.user_agent.trim().is_empty() {
            self.user_agent = DEFAULT_USER_AGENT.to_string();
        }

        let mut seen = Vec::new();
        self.sources.retain(|s| {
            if seen.contains(&s.kind) {
                false
            } else {
                seen.push(s.kind);
                true
            }
        });
        if self.sources.is_empty() {
            bail!("at least one source must be configured");
        }

        for src in &mut self.sources {
            if src.urls.is_empty() {
                src.urls = SourceSettings::builtin(src.kind).urls;
            }
            for u in &src.urls {
                let parsed = Url::parse(u).with_context(|| format!("{}: bad url '{u}'", src.kind))?;
                if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                    bail!("{}: url '{u}' must be absolute http(s)", src.kind);
                }
            }
        }
        Ok(self)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn all_urls(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .flat_map(|s| s.urls.iter().map(String::as_str))
    }
}

fn parse_secs(var: &str, v: &str) -> Result<u64> {
    v.trim()
        .parse::<u64>()
        .with_context(|| format!("{var} must be a whole number of seconds, got '{v}'"))
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_are_sane() {
        let s = Settings::default().sanitize().unwrap();
        assert_eq!(s.cache_ttl(), Duration::from_secs(20));
        assert_eq!(s.fetch_timeout(), Duration::from_secs(8));
        let kinds: Vec<_> = s.sources.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SourceTag::ALL.to_vec());
        assert_eq!(s.sources[0].urls.len(), 2);
    }

    #[test]
    fn toml_file_with_partial_fields() {
        let s = Settings::from_toml_str(
            r#"
cache_ttl_secs = 45

[[sources]]
kind = "espn_scores"
urls = ["https://www.espn.in/cricket/scores"]

[[sources]]
kind = "cricinfo_rss"
"#,
        )
        .unwrap()
        .sanitize()
        .unwrap();
        assert_eq!(s.cache_ttl_secs, 45);
        assert_eq!(s.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
        assert_eq!(s.sources[0].kind, SourceTag::EspnScores);
        assert_eq!(s.sources[0].urls, vec!["https://www.espn.in/cricket/scores"]);
        assert_eq!(s.sources[1].urls.len(), 2, "empty urls fall back to built-ins");
    }

    #[test]
    fn env_overrides_order_urls_and_numbers() {
        let mut s = Settings::default();
        s.apply_env(env_of(&[
            ("APP_CACHE_TTL_SECONDS", "5000"),
            ("APP_FETCH_TIMEOUT_SECONDS", " 3 "),
            ("APP_SOURCES", "espn_scores, cricinfo_rss"),
            ("APP_CRICINFO_RSS_URLS", "https://static.cricinfo.com/rss/livescores.xml"),
        ]))
        .unwrap();
        let s = s.sanitize().unwrap();
        assert_eq!(s.cache_ttl_secs, 3600, "ttl is clamped");
        assert_eq!(s.fetch_timeout_secs, 3);
        assert_eq!(s.sources.len(), 2);
        assert_eq!(s.sources[0].kind, SourceTag::EspnScores);
        assert_eq!(
            s.sources[1].urls,
            vec!["https://static.cricinfo.com/rss/livescores.xml"]
        );
    }

    #[test]
    fn invalid_values_are_errors() {
        let mut s = Settings::default();
        assert!(s.apply_env(env_of(&[("APP_SOURCES", "bbc")])).is_err());
        assert!(s
            .apply_env(env_of(&[("APP_CACHE_TTL_SECONDS", "soon")]))
            .is_err());

        let mut s = Settings::default();
        s.apply_env(env_of(&[("APP_ESPN_SCORES_URLS", "/relative/path")]))
            .unwrap();
        assert!(s.sanitize().is_err());

        let empty = Settings {
            sources: Vec::new(),
            ..Settings::default()
        };
        assert!(empty.sanitize().is_err());
    }

    #[serial_test::serial]
    #[test]
    fn load_uses_env_path_then_fallbacks() {
        // Isolate CWD so the repo's own config/ does not interfere
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);

        let s = Settings::load().unwrap();
        assert_eq!(s.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);

        let p = tmp.path().join("custom.toml");
        fs::write(&p, "cache_ttl_secs = 7\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        assert_eq!(Settings::load().unwrap().cache_ttl_secs, 7);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(Settings::load().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::set_current_dir(&old).unwrap();
    }
}
