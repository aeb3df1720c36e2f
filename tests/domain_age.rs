// tests/domain_age.rs
//! RDAP-backed domain checks against a local RDAP stand-in:
//!   - young sender and link domains become warnings
//!   - established domains stay clean
//!   - an unreachable registry leaves the email and link signals neutral

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use shuttle_axum::axum::{extract::Path, http::StatusCode, routing::get, Json, Router};

use job_scam_detector::config::DomainsConfig;
use job_scam_detector::providers::{Providers, RdapDomainChecker};
use job_scam_detector::{Analyzer, ProviderId, ScoringConfig};

/// `fresh*` domains were registered last month, `old*` ones ten years ago,
/// anything else is unknown to the registry.
async fn rdap_domain(Path(name): Path<String>) -> Result<Json<serde_json::Value>, StatusCode> {
    let age = if name.starts_with("fresh") {
        Duration::days(30)
    } else if name.starts_with("old") {
        Duration::days(3650)
    } else {
        return Err(StatusCode::NOT_FOUND);
    };
    let registered = (Utc::now() - age).to_rfc3339();
    Ok(Json(json!({
        "objectClassName": "domain",
        "ldhName": name,
        "events": [
            { "eventAction": "registration", "eventDate": registered },
            { "eventAction": "expiration", "eventDate": "2099-01-01T00:00:00Z" }
        ]
    })))
}

async fn spawn_registry() -> String {
    let app = Router::new().route("/domain/{name}", get(rdap_domain));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        shuttle_axum::axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn analyzer(endpoint: &str) -> Analyzer {
    let cfg = DomainsConfig {
        backend: "rdap".into(),
        endpoint: endpoint.into(),
        timeout_ms: 1000,
        min_age_days: 730,
    };
    let mut providers = Providers::offline();
    providers.domains = Arc::new(RdapDomainChecker::new(&cfg).unwrap());
    Analyzer::new(providers, ScoringConfig::default()).unwrap()
}

fn points(a: &job_scam_detector::Analysis, id: ProviderId) -> u32 {
    a.breakdown
        .iter()
        .find(|c| c.provider == id)
        .map(|c| c.points)
        .unwrap_or(0)
}

#[tokio::test]
async fn young_domains_are_warnings() {
    let a = analyzer(&spawn_registry().await);
    let out = a
        .analyze("Please reply to hr@fresh-hiring.com and apply at https://jobs.fresh-hiring.com/form")
        .await;

    let emails: Vec<&str> = out.reasons_from(ProviderId::Email).collect();
    assert_eq!(emails.len(), 1, "{emails:?}");
    assert!(emails[0].contains("less than 2 years old"), "{emails:?}");
    let links: Vec<&str> = out.reasons_from(ProviderId::Link).collect();
    assert_eq!(links.len(), 1, "{links:?}");
    assert!(links[0].contains("very new domain: fresh-hiring.com"), "{links:?}");
    assert_eq!(points(&out, ProviderId::Email), 5);
    assert_eq!(points(&out, ProviderId::Link), 5);
}

#[tokio::test]
async fn established_domains_stay_clean() {
    let a = analyzer(&spawn_registry().await);
    let out = a
        .analyze("Please reply to hr@oldcorp.com or see https://careers.oldcorp.com/openings")
        .await;
    assert_eq!(out.reasons_from(ProviderId::Email).count(), 0);
    assert_eq!(out.reasons_from(ProviderId::Link).count(), 0);
}

#[tokio::test]
async fn unknown_or_unreachable_registry_is_neutral() {
    let text = "Please reply to hr@acme-corp.com or see https://careers.acme-corp.com/openings";

    // 404 from the registry
    let out = analyzer(&spawn_registry().await).analyze(text).await;
    assert_eq!(points(&out, ProviderId::Email), 0);
    assert_eq!(points(&out, ProviderId::Link), 0);

    // nothing listening
    let out = analyzer("http://127.0.0.1:9").analyze(text).await;
    assert_eq!(points(&out, ProviderId::Email), 0);
    assert_eq!(points(&out, ProviderId::Link), 0);
    assert!(
        out.unavailable
            .iter()
            .all(|(p, _)| !matches!(p, ProviderId::Email | ProviderId::Link)),
        "{:?}",
        out.unavailable
    );
}
