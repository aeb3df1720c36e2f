//! Email and URL extraction. Pure functions of the text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+\.[A-Za-z0-9.-]+").expect("email regex")
});

static RE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("url regex"));

/// Distinct email addresses in first-occurrence order. Comparison ignores case.
pub fn extract_emails(text: &str) -> Vec<String> {
    let found = RE_EMAIL
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', '-']).to_string())
        .filter(|e| e.contains('@'));
    distinct_by(found, |e| e.to_ascii_lowercase())
}

/// Distinct http(s) URLs in first-occurrence order, trailing punctuation removed.
pub fn extract_urls(text: &str) -> Vec<String> {
    let found = RE_URL.find_iter(text).map(|m| {
        m.as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']', '>', '"', '\''])
            .to_string()
    });
    distinct_by(found, |u| u.clone())
}

/// Domain part of an email address, lowercased.
pub fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.rsplit_once('@')?;
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() || !domain.contains('.') {
        return None;
    }
    Some(domain)
}

fn distinct_by<I, F>(items: I, key: F) -> Vec<String>
where
    I: Iterator<Item = String>,
    F: Fn(&String) -> String,
{
    let mut seen = HashSet::new();
    items.filter(|i| seen.insert(key(i))).collect()
}
