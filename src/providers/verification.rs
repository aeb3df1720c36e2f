//! Email domain and link trust checks.

use async_trait::async_trait;
use serde::Serialize;

use super::extract::email_domain;
use super::DomainChecker;

const FREE_EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "aol.com",
    "protonmail.com",
    "icloud.com",
    "gmx.com",
];

const SUSPICIOUS_LINK_KEYWORDS: &[&str] = &["bit.ly", "tinyurl", "free", "bonus", "giveaway", "prize"];

/// Result of a single email/link check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TrustCheck {
    Trusted,
    /// Not trusted; counts as a warning.
    Flagged(String),
    /// Could not be verified (e.g. lookup unreachable). Neutral.
    Unverified(String),
}

impl TrustCheck {
    pub fn is_flagged(&self) -> bool {
        matches!(self, TrustCheck::Flagged(_))
    }

    pub fn flag_reason(&self) -> Option<&str> {
        match self {
            TrustCheck::Flagged(r) => Some(r),
            _ => None,
        }
    }
}

/// Offline checker: free-provider domains and keyword/format checks on links.
#[derive(Debug, Clone)]
pub struct HeuristicDomainChecker {
    free_domains: Vec<String>,
    link_keywords: Vec<String>,
}

impl Default for HeuristicDomainChecker {
    fn default() -> Self {
        Self {
            free_domains: FREE_EMAIL_DOMAINS.iter().map(|s| s.to_string()).collect(),
            link_keywords: SUSPICIOUS_LINK_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl HeuristicDomainChecker {
    pub fn email(&self, email: &str) -> TrustCheck {
        match email_domain(email) {
            Some(domain) if self.free_domains.iter().any(|d| *d == domain) => {
                TrustCheck::Flagged(format!("Email uses free domain: {domain}"))
            }
            Some(_) => TrustCheck::Trusted,
            None => TrustCheck::Flagged("Could not extract domain from email.".to_string()),
        }
    }

    pub fn link(&self, url: &str) -> TrustCheck {
        let lower = url.to_ascii_lowercase();
        if let Some(kw) = self.link_keywords.iter().find(|k| lower.contains(k.as_str())) {
            return TrustCheck::Flagged(format!("Suspicious keyword in link: {kw}"));
        }
        match reqwest::Url::parse(url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => {
                TrustCheck::Trusted
            }
            _ => TrustCheck::Flagged("Link does not appear valid.".to_string()),
        }
    }
}

#[async_trait]
impl DomainChecker for HeuristicDomainChecker {
    async fn check_email(&self, email: &str) -> anyhow::Result<TrustCheck> {
        Ok(self.email(email))
    }

    async fn check_link(&self, url: &str) -> anyhow::Result<TrustCheck> {
        Ok(self.link(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_domain_flagged() {
        let c = HeuristicDomainChecker::default();
        assert_eq!(
            c.email("recruiter@Gmail.com"),
            TrustCheck::Flagged("Email uses free domain: gmail.com".into())
        );
        assert_eq!(c.email("hr@acme-corp.com"), TrustCheck::Trusted);
    }

    #[test]
    fn email_without_domain_flagged() {
        let c = HeuristicDomainChecker::default();
        assert!(c.email("broken@").is_flagged());
    }

    #[test]
    fn shortener_flagged() {
        let c = HeuristicDomainChecker::default();
        assert_eq!(
            c.link("https://bit.ly/abc").flag_reason(),
            Some("Suspicious keyword in link: bit.ly")
        );
        assert_eq!(c.link("https://careers.acme.com/apply"), TrustCheck::Trusted);
    }

    #[test]
    fn malformed_link_flagged() {
        let c = HeuristicDomainChecker::default();
        assert!(c.link("https://").is_flagged());
        assert!(c.link("ftp://acme.com").is_flagged());
    }

    #[test]
    fn unverified_is_not_a_flag() {
        assert!(!TrustCheck::Unverified("dns unreachable".into()).is_flagged());
    }
}
