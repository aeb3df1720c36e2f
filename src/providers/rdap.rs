//! Domain-age checks over RDAP, layered on the offline heuristics.
//!
//! A domain registered less than `min_age_days` ago is flagged. A lookup that
//! cannot be completed leaves the item unverified, which scores nothing.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::extract::email_domain;
use super::verification::{HeuristicDomainChecker, TrustCheck};
use super::DomainChecker;
use crate::config::providers::DomainsConfig;

pub struct RdapDomainChecker {
    heuristic: HeuristicDomainChecker,
    http: reqwest::Client,
    base: String,
    min_age_days: i64,
}

#[derive(Debug, Deserialize)]
struct RdapDomain {
    #[serde(default)]
    events: Vec<RdapEvent>,
}

#[derive(Debug, Deserialize)]
struct RdapEvent {
    #[serde(rename = "eventAction")]
    action: String,
    #[serde(rename = "eventDate", default)]
    date: Option<String>,
}

impl RdapDomainChecker {
    pub fn new(cfg: &DomainsConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let http = reqwest::Client::builder()
            .user_agent("job-scam-detector/0.1")
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("building rdap http client")?;
        Ok(Self {
            heuristic: HeuristicDomainChecker::default(),
            http,
            base: cfg.endpoint.trim_end_matches('/').to_string(),
            min_age_days: i64::from(cfg.min_age_days),
        })
    }

    /// Days since registration, or why it could not be determined.
    async fn age_days(&self, domain: &str) -> Result<i64, String> {
        let resp = self
            .http
            .get(format!("{}/domain/{domain}", self.base))
            .header(reqwest::header::ACCEPT, "application/rdap+json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("Domain age lookup failed for {domain}: {e}"))?;
        let body = resp
            .text()
            .await
            .map_err(|e| format!("Domain age lookup failed for {domain}: {e}"))?;
        let registered = registered_at(&body)
            .map_err(|e| format!("Domain age unknown for {domain}: {e:#}"))?;
        Ok(age_in_days(registered, Utc::now()))
    }

    async fn check_domain(&self, domain: &str, flag: impl FnOnce(i64) -> String) -> TrustCheck {
        match self.age_days(domain).await {
            Ok(days) if days < self.min_age_days => TrustCheck::Flagged(flag(days)),
            Ok(_) => TrustCheck::Trusted,
            Err(note) => {
                tracing::debug!(%domain, %note, "domain age unverified");
                TrustCheck::Unverified(note)
            }
        }
    }
}

#[async_trait]
impl DomainChecker for RdapDomainChecker {
    async fn check_email(&self, email: &str) -> anyhow::Result<TrustCheck> {
        let first = self.heuristic.email(email);
        if first.is_flagged() {
            return Ok(first);
        }
        let Some(domain) = email_domain(email).map(|d| registered_domain(&d)) else {
            return Ok(first);
        };
        Ok(self
            .check_domain(&domain, |days| {
                format!("Email domain {domain} is less than 2 years old ({days} days).")
            })
            .await)
    }

    async fn check_link(&self, url: &str) -> anyhow::Result<TrustCheck> {
        let first = self.heuristic.link(url);
        if first.is_flagged() {
            return Ok(first);
        }
        let host = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.domain().map(str::to_ascii_lowercase));
        let Some(domain) = host.map(|h| registered_domain(&h)) else {
            return Ok(first);
        };
        Ok(self
            .check_domain(&domain, |days| {
                format!("Link points to a very new domain: {domain} ({days} days).")
            })
            .await)
    }
}

/// Registration timestamp from an RDAP domain object.
fn registered_at(body: &str) -> anyhow::Result<DateTime<Utc>> {
    let doc: RdapDomain = serde_json::from_str(body).context("unparseable rdap response")?;
    let date = doc
        .events
        .into_iter()
        .find(|e| e.action.eq_ignore_ascii_case("registration"))
        .and_then(|e| e.date)
        .context("no registration event")?;
    let at = DateTime::parse_from_rfc3339(&date)
        .with_context(|| format!("bad registration date {date:?}"))?;
    Ok(at.with_timezone(&Utc))
}

fn age_in_days(registered: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - registered).num_days().max(0)
}

/// Registry-level name for a host: the last two labels, or three under a
/// two-letter country code with a generic second level (`acme.co.uk`).
fn registered_domain(host: &str) -> String {
    let host = host.trim_end_matches('.');
    let labels: Vec<&str> = host.split('.').collect();
    let keep = match labels.as_slice() {
        [.., sld, tld]
            if labels.len() >= 3
                && tld.len() == 2
                && matches!(*sld, "co" | "com" | "org" | "net" | "ac" | "gov" | "edu") =>
        {
            3
        }
        _ => 2,
    };
    labels[labels.len().saturating_sub(keep)..].join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn unreachable() -> RdapDomainChecker {
        RdapDomainChecker::new(&DomainsConfig {
            backend: "rdap".into(),
            endpoint: "http://127.0.0.1:9".into(),
            timeout_ms: 500,
            min_age_days: 730,
        })
        .unwrap()
    }

    #[test]
    fn registration_event_is_read() {
        let body = r#"{
            "objectClassName": "domain",
            "ldhName": "ACME-CORP.COM",
            "events": [
                {"eventAction": "last changed", "eventDate": "2024-02-01T00:00:00Z"},
                {"eventAction": "registration", "eventDate": "2023-11-05T10:00:00Z"}
            ]
        }"#;
        let at = registered_at(body).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2023, 11, 5, 10, 0, 0).unwrap());

        let now = Utc.with_ymd_and_hms(2024, 11, 5, 10, 0, 0).unwrap();
        assert_eq!(age_in_days(at, now), 366);
    }

    #[test]
    fn reply_without_registration_is_an_error() {
        assert!(registered_at(r#"{"events":[]}"#).is_err());
        assert!(registered_at(r#"{"events":[{"eventAction":"registration"}]}"#).is_err());
        assert!(registered_at("<html>rate limited</html>").is_err());
    }

    #[test]
    fn subdomains_collapse_to_registered_name() {
        assert_eq!(registered_domain("careers.acme.com"), "acme.com");
        assert_eq!(registered_domain("jobs.acme.co.uk"), "acme.co.uk");
        assert_eq!(registered_domain("acme.io."), "acme.io");
    }

    #[tokio::test]
    async fn unreachable_lookup_is_unverified() {
        let c = unreachable();
        let email = c.check_email("hr@acme-corp.com").await.unwrap();
        assert!(matches!(email, TrustCheck::Unverified(ref n) if n.contains("acme-corp.com")), "{email:?}");
        let link = c.check_link("https://careers.acme-corp.com/apply").await.unwrap();
        assert!(matches!(link, TrustCheck::Unverified(_)), "{link:?}");
        assert_eq!(link.flag_reason(), None);
    }

    #[tokio::test]
    async fn heuristic_flags_skip_the_lookup() {
        let c = unreachable();
        assert_eq!(
            c.check_email("recruiter@gmail.com").await.unwrap(),
            TrustCheck::Flagged("Email uses free domain: gmail.com".into())
        );
        assert!(c.check_link("https://bit.ly/x").await.unwrap().is_flagged());
    }
}
