// src/providers/ner.rs
//! Organization/person extraction and the organization-vs-sender-domain check.
//!
//! Built-in heuristics look for capitalized names ending in a corporate word
//! ("Acme Corporation", "Blue Sky Technologies") and for persons introduced by
//! a title or "my name is". Extra organization patterns can be dropped into
//! `config/entities/*.json` (or the dir in `ENTITY_CONFIG_DIR`), each file a
//! list of `{ regex, keyword }`; a match adds `keyword` as an organization.
//!
//! Notes:
//! - Regexes must be compatible with the `regex` crate (no lookarounds).
//! - Case-insensitive can be specified using `(?i)` in patterns.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::extract::email_domain;
use super::EntityExtractor;

pub const ENV_ENTITY_CONFIG_DIR: &str = "ENTITY_CONFIG_DIR";

static RE_ORG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b((?:[A-Z][A-Za-z0-9&'-]*\s+){1,3}(?:Inc|Corp|Corporation|LLC|Ltd|Limited|Group|Technologies|Solutions|Holdings|Labs|Systems|Partners|Consulting|Enterprises|Company|Co)\b\.?)",
    )
    .expect("org regex")
});

static RE_PERSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\b(?:Mr|Mrs|Ms|Dr)\.?\s+|\b[Mm]y name is\s+)([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)",
    )
    .expect("person regex")
});

/// Leading words that start a sentence rather than a name.
const LEADING_STOPWORDS: &[&str] = &[
    "The", "At", "From", "Join", "Dear", "Welcome", "With", "For", "Hi", "Hello", "Regards",
    "Sincerely", "Thanks",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub organizations: Vec<String>,
    pub persons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Pattern {
    regex: String,
    keyword: String,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    patterns: Vec<Pattern>,
}

#[derive(Debug, Default)]
pub struct RegexEntityExtractor {
    extra: Vec<(Regex, String)>,
}

impl RegexEntityExtractor {
    /// Load extra patterns from `ENTITY_CONFIG_DIR` or `<cwd>/config/entities`.
    /// Missing dir or unreadable files just mean no extra patterns.
    pub fn from_env() -> Self {
        let dir = std::env::var(ENV_ENTITY_CONFIG_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config").join("entities"));
        Self::from_dir(&dir)
    }

    pub fn from_dir(dir: &Path) -> Self {
        let mut extra = Vec::new();
        let Ok(read_dir) = fs::read_dir(dir) else {
            return Self { extra };
        };

        let mut paths: Vec<PathBuf> = read_dir.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let Ok(cfg) = serde_json::from_str::<ConfigFile>(&content) else {
                tracing::warn!(path = %path.display(), "skipping malformed entity pattern file");
                continue;
            };
            for pat in cfg.patterns {
                match Regex::new(&pat.regex) {
                    Ok(re) => extra.push((re, pat.keyword)),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping bad entity regex")
                    }
                }
            }
        }
        Self { extra }
    }

    pub fn extract(&self, text: &str) -> Entities {
        let mut orgs: Vec<String> = RE_ORG
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| clean_org(m.as_str()))
            .filter(|o| !o.is_empty())
            .collect();
        for (re, keyword) in &self.extra {
            if re.is_match(text) {
                orgs.push(keyword.clone());
            }
        }

        let persons = RE_PERSON
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect();

        Entities {
            organizations: distinct_ci(orgs),
            persons: distinct_ci(persons),
        }
    }
}

#[async_trait]
impl EntityExtractor for RegexEntityExtractor {
    async fn extract_entities(&self, text: &str) -> anyhow::Result<Entities> {
        Ok(self.extract(text))
    }
}

/// Organizations whose lowercased, comma-stripped name is a substring of no
/// sender domain. Only evaluated when at least one email address is present;
/// person names are not checked.
pub fn find_mismatches(organizations: &[String], emails: &[String]) -> Vec<String> {
    if emails.is_empty() {
        return Vec::new();
    }
    let domains: Vec<String> = emails.iter().filter_map(|e| email_domain(e)).collect();
    organizations
        .iter()
        .filter(|org| {
            let key = org_key(org);
            !key.is_empty() && !domains.iter().any(|d| d.contains(&key))
        })
        .cloned()
        .collect()
}

fn org_key(org: &str) -> String {
    org.trim().to_lowercase().replace(',', "")
}

fn clean_org(raw: &str) -> String {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    while words.len() > 1 && LEADING_STOPWORDS.contains(&words[0]) {
        words.remove(0);
    }
    words.join(" ").trim_end_matches('.').to_string()
}

fn distinct_ci(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|i| seen.insert(i.to_lowercase()))
        .collect()
}
