//! Red-flag rule table.
//!
//! Each rule is a named, case-insensitive regex scanned over the whole text.
//! The built-in table can be replaced by `config/red_flags.json`
//! (or the file named by `RED_FLAGS_PATH`):
//!
//! ```json
//! { "rules": [ { "name": "Urgency", "pattern": "urgent|asap" } ] }
//! ```
//!
//! A rule fires at most once per scan, so repeating a phrase never adds flags.

use anyhow::Context;
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::collections::HashSet;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::RedFlagMatcher;
use crate::evidence::{Highlight, RedFlagHits};

pub const DEFAULT_RED_FLAGS_PATH: &str = "config/red_flags.json";
pub const ENV_RED_FLAGS_PATH: &str = "RED_FLAGS_PATH";

const BUILTIN_RULES: &[(&str, &str)] = &[
    ("Urgency", r"urgent|immediately|asap|24 hours|limited time"),
    (
        "Request for Sensitive Info",
        r"bank account|passport|driver'?s license|id card|social security",
    ),
    (
        "Unusual Payment",
        r"bitcoin|gift card|crypto|western union|moneygram",
    ),
    ("Unprofessional Email", r"@gmail\.com|@yahoo\.com|@hotmail\.com"),
    (
        "Upfront Payment Promise",
        r"initial payment|payment upfront|advance payment",
    ),
    (
        "Too Good To Be True",
        r"no experience (required|needed)|earn \$?\d[\d,]*k? (per|a|every) (day|week)|guaranteed income",
    ),
    (
        "Off-Platform Contact",
        r"\btelegram\b|\bwhatsapp\b|signal app|google hangouts",
    ),
    (
        "Equipment Purchase",
        r"purchase (your own )?equipment|send you a check|cash the check|deposit the check",
    ),
];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuleSet {
    pub rules: Vec<RuleDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleDef {
    pub name: String,
    pub pattern: String,
}

#[derive(Debug)]
struct CompiledRule {
    name: String,
    re: Regex,
}

/// Compiled red-flag table. Immutable once built.
#[derive(Debug)]
pub struct RedFlagTable {
    rules: Vec<CompiledRule>,
}

impl RedFlagTable {
    pub fn builtin() -> Self {
        let set = RuleSet {
            rules: BUILTIN_RULES
                .iter()
                .map(|(name, pattern)| RuleDef {
                    name: name.to_string(),
                    pattern: pattern.to_string(),
                })
                .collect(),
        };
        // The built-in patterns are fixed and known to compile.
        Self::compile(&set).unwrap_or(Self { rules: Vec::new() })
    }

    /// `RED_FLAGS_PATH` or `config/red_flags.json` when present, else the
    /// built-in table. A present file with a bad pattern is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_RED_FLAGS_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RED_FLAGS_PATH));
        if !path.exists() {
            return Ok(Self::builtin());
        }
        let set = load_rules_file(&path)
            .with_context(|| format!("Failed to read red-flag rules at {}", path.display()))?;
        Self::compile(&set)
    }

    pub fn compile(set: &RuleSet) -> anyhow::Result<Self> {
        let rules = set
            .rules
            .iter()
            .map(|r| {
                let re = RegexBuilder::new(&r.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| anyhow::anyhow!("rule `{}` regex error: {}", r.name, e))?;
                Ok(CompiledRule {
                    name: r.name.clone(),
                    re,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Synchronous scan used by the async trait impl.
    pub fn scan(&self, text: &str) -> RedFlagHits {
        let mut seen = HashSet::new();
        let mut hits = RedFlagHits::default();

        for rule in &self.rules {
            let mut matched = false;
            for m in rule.re.find_iter(text) {
                if m.start() == m.end() {
                    continue;
                }
                matched = true;
                hits.highlights.push(Highlight {
                    start: m.start(),
                    end: m.end(),
                    rule: rule.name.clone(),
                });
            }
            if matched && seen.insert(rule.name.as_str()) {
                hits.rules.push(rule.name.clone());
            }
        }

        hits.highlights
            .sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
        hits
    }
}

#[async_trait]
impl RedFlagMatcher for RedFlagTable {
    async fn match_red_flags(&self, text: &str) -> anyhow::Result<RedFlagHits> {
        Ok(self.scan(text))
    }
}

pub fn load_rules_file(path: &Path) -> io::Result<RuleSet> {
    let bytes = fs::read(path)?;
    let rules: RuleSet = serde_json::from_slice(&bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(rules)
}
