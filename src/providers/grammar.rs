//! Writing-quality checkers.
//!
//! Quality = `max(0, 100 - issues / words * 100)`, rounded to two decimals.
//! Blank text scores 100 (no evidence of bad writing).

use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

use super::GrammarChecker;
use crate::evidence::GrammarReport;

static RE_STRIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"https?://\S+|[A-Za-z0-9_.+-]+@[A-Za-z0-9.-]+|\b[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.(?:com|org|net|io|co|info|biz)\b",
    )
    .expect("strip regex")
});
static RE_SENTENCE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+([a-z])").expect("sentence regex"));
static RE_REPEAT_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[!?]{2,}").expect("punct regex"));
static RE_MISSING_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][.,;][A-Za-z]{2,}").expect("spacing regex"));

/// All-caps words that are names or acronyms, not shouting.
const ACRONYMS: &[&str] = &[
    "AJAX", "ASAP", "CCNA", "CISSP", "GDPR", "HIPAA", "HTML", "HTTP", "HTTPS", "IEEE", "JSON",
    "NASA", "NATO", "REST", "SAAS", "SOAP", "UNICEF", "UNIX", "YAML",
];

pub fn quality_score(issues: usize, words: usize) -> f32 {
    if words == 0 {
        return 100.0;
    }
    let raw = (100.0 - (issues as f32 / words as f32) * 100.0).max(0.0);
    (raw * 100.0).round() / 100.0
}

/// Offline rule-of-thumb checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicGrammar;

impl HeuristicGrammar {
    pub fn check(&self, text: &str) -> GrammarReport {
        // Addresses and links are not prose.
        let prose = RE_STRIP.replace_all(text, " ");
        let words: Vec<&str> = prose.split_whitespace().collect();
        if words.is_empty() {
            return GrammarReport::default();
        }

        let mut issues = Vec::new();

        for w in &words {
            let bare = w.trim_matches(|c: char| !c.is_alphanumeric());
            if bare == "i" {
                issues.push("Lowercase pronoun \"i\"".to_string());
            } else if bare.len() >= 4
                && bare.chars().all(|c| c.is_ascii_uppercase())
                && !ACRONYMS.contains(&bare)
            {
                issues.push(format!("Shouting: \"{bare}\""));
            }
        }

        for pair in words.windows(2) {
            let a = pair[0].trim_matches(|c: char| !c.is_alphanumeric());
            let b = pair[1].trim_matches(|c: char| !c.is_alphanumeric());
            if !a.is_empty() && a.eq_ignore_ascii_case(b) && pair[0].ends_with(char::is_alphanumeric) {
                issues.push(format!("Repeated word: \"{a}\""));
            }
        }

        if let Some(first) = prose.trim_start().chars().next() {
            if first.is_ascii_lowercase() {
                issues.push("Text starts with a lowercase letter".to_string());
            }
        }
        for c in RE_SENTENCE_START.captures_iter(&prose) {
            if let Some(m) = c.get(1) {
                issues.push(format!("Sentence starts with lowercase \"{}\"", m.as_str()));
            }
        }
        for m in RE_REPEAT_PUNCT.find_iter(&prose) {
            issues.push(format!("Repeated punctuation \"{}\"", m.as_str()));
        }
        for m in RE_MISSING_SPACE.find_iter(&prose) {
            issues.push(format!("Missing space in \"{}\"", m.as_str()));
        }

        GrammarReport {
            quality: quality_score(issues.len(), words.len()),
            issues,
        }
    }
}

#[async_trait]
impl GrammarChecker for HeuristicGrammar {
    async fn grammar_quality(&self, text: &str) -> anyhow::Result<GrammarReport> {
        Ok(self.check(text))
    }
}

/// LanguageTool HTTP API (`/v2/check`).
pub struct LanguageToolGrammar {
    http: reqwest::Client,
    url: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct LtResp {
    #[serde(default)]
    matches: Vec<LtMatch>,
}

#[derive(Debug, Deserialize)]
struct LtMatch {
    message: String,
    #[serde(default)]
    rule: Option<LtRule>,
}

#[derive(Debug, Deserialize)]
struct LtRule {
    #[serde(rename = "issueType", default)]
    issue_type: Option<String>,
}

impl LanguageToolGrammar {
    pub fn new(endpoint: &str, language: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("job-scam-detector/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building languagetool http client")?;
        Ok(Self {
            http,
            url: format!("{}/v2/check", endpoint.trim_end_matches('/')),
            language: language.to_string(),
        })
    }
}

fn report_from_languagetool(body: &str, words: usize) -> anyhow::Result<GrammarReport> {
    let resp: LtResp = serde_json::from_str(body).context("unparseable languagetool response")?;
    let issues: Vec<String> = resp
        .matches
        .into_iter()
        .map(|m| match m.rule.and_then(|r| r.issue_type) {
            Some(kind) => format!("{kind}: {}", m.message),
            None => m.message,
        })
        .collect();
    Ok(GrammarReport {
        quality: quality_score(issues.len(), words),
        issues,
    })
}

#[async_trait]
impl GrammarChecker for LanguageToolGrammar {
    async fn grammar_quality(&self, text: &str) -> anyhow::Result<GrammarReport> {
        let words = text.split_whitespace().count();
        if words == 0 {
            return Ok(GrammarReport::default());
        }
        let resp = self
            .http
            .post(&self.url)
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await
            .context("languagetool request failed")?
            .error_for_status()?;
        let body = resp.text().await?;
        report_from_languagetool(&body, words)
    }
}
