//! End-to-end analyzer tests with stub providers:
//!   - every signal firing, reasons in provider order
//!   - failing / panicking / hanging providers degrade to neutral
//!   - blank input
//!   - classifier alone cannot push past Suspicious with the default table

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use job_scam_detector::evidence::{
    GrammarReport, LabelDistribution, RedFlagHits, SimilarityReport,
};
use job_scam_detector::providers::{
    DomainChecker, Entities, EntityExtractor, GrammarChecker, LabelClassifier, MockClassifier,
    Providers, RedFlagMatcher, SimilarityEstimator, TrustCheck,
};
use job_scam_detector::{Analyzer, ProviderId, ScoringConfig, Verdict};

struct StubFlags(Vec<&'static str>);

#[async_trait]
impl RedFlagMatcher for StubFlags {
    async fn match_red_flags(&self, _text: &str) -> Result<RedFlagHits> {
        Ok(RedFlagHits {
            rules: self.0.iter().map(|s| s.to_string()).collect(),
            highlights: Vec::new(),
        })
    }
}

/// Flags gmail senders and bit.ly links.
struct StubDomains;

#[async_trait]
impl DomainChecker for StubDomains {
    async fn check_email(&self, email: &str) -> Result<TrustCheck> {
        Ok(if email.ends_with("@gmail.com") {
            TrustCheck::Flagged("free domain".into())
        } else {
            TrustCheck::Trusted
        })
    }
    async fn check_link(&self, url: &str) -> Result<TrustCheck> {
        Ok(if url.contains("bit.ly") {
            TrustCheck::Flagged("shortener".into())
        } else {
            TrustCheck::Trusted
        })
    }
}

struct StubEntities(Vec<&'static str>);

#[async_trait]
impl EntityExtractor for StubEntities {
    async fn extract_entities(&self, _text: &str) -> Result<Entities> {
        Ok(Entities {
            organizations: self.0.iter().map(|s| s.to_string()).collect(),
            persons: Vec::new(),
        })
    }
}

struct StubGrammar(f32);

#[async_trait]
impl GrammarChecker for StubGrammar {
    async fn grammar_quality(&self, _text: &str) -> Result<GrammarReport> {
        Ok(GrammarReport {
            quality: self.0,
            issues: vec!["issue".into()],
        })
    }
}

struct StubSimilarity(f32);

#[async_trait]
impl SimilarityEstimator for StubSimilarity {
    async fn similarity(&self, _text: &str) -> Result<SimilarityReport> {
        Ok(SimilarityReport {
            percent: self.0,
            matched_templates: Vec::new(),
        })
    }
}

struct FailingClassifier;

#[async_trait]
impl LabelClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<LabelDistribution> {
        bail!("upstream 503")
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

struct PanickingGrammar;

#[async_trait]
impl GrammarChecker for PanickingGrammar {
    async fn grammar_quality(&self, text: &str) -> Result<GrammarReport> {
        if !text.is_empty() {
            panic!("grammar backend exploded");
        }
        Ok(GrammarReport::default())
    }
}

struct HangingSimilarity;

#[async_trait]
impl SimilarityEstimator for HangingSimilarity {
    async fn similarity(&self, _text: &str) -> Result<SimilarityReport> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(SimilarityReport::default())
    }
}

const TEXT: &str = "Acme Corp is hiring! Reply to hr@gmail.com or apply at http://bit.ly/acme-job today.";

fn firing_providers() -> Providers {
    Providers {
        red_flags: Arc::new(StubFlags(vec!["Urgency", "Unusual Payment", "Urgency"])),
        domains: Arc::new(StubDomains),
        entities: Arc::new(StubEntities(vec!["Acme Corp"])),
        classifier: Arc::new(MockClassifier::new(LabelDistribution::new(0.2, 0.5, 0.1))),
        grammar: Arc::new(StubGrammar(40.0)),
        similarity: Arc::new(StubSimilarity(10.0)),
    }
}

fn short_timeout() -> ScoringConfig {
    let mut cfg = ScoringConfig::default();
    cfg.runtime.provider_timeout_ms = 100;
    cfg
}

#[tokio::test]
async fn all_signals_fire_in_provider_order() {
    let analyzer = Analyzer::new(firing_providers(), ScoringConfig::default()).unwrap();
    let a = analyzer.analyze(TEXT).await;

    // 10 (two distinct flags) + 5 + 5 + 5 + 30 + 5 + 10
    assert_eq!(a.final_score, 70);
    assert_eq!(a.verdict, Verdict::LikelyScam);

    let providers: Vec<ProviderId> = a.reasons.iter().map(|r| r.provider).collect();
    assert_eq!(
        providers,
        vec![
            ProviderId::RedFlags,
            ProviderId::RedFlags,
            ProviderId::Email,
            ProviderId::Link,
            ProviderId::Entity,
            ProviderId::Classifier,
            ProviderId::Grammar,
            ProviderId::Similarity,
        ]
    );
    assert_eq!(
        a.reasons_from(ProviderId::RedFlags).collect::<Vec<_>>(),
        vec!["Red flag: Urgency", "Red flag: Unusual Payment"]
    );
    assert_eq!(
        a.reasons_from(ProviderId::Email).collect::<Vec<_>>(),
        vec!["Email warning: hr@gmail.com - free domain"]
    );
    assert_eq!(
        a.reasons_from(ProviderId::Link).collect::<Vec<_>>(),
        vec!["Link warning: http://bit.ly/acme-job - shortener"]
    );
    assert!(a.unavailable.is_empty());
    assert_eq!(a.details.emails, vec!["hr@gmail.com"]);
    assert_eq!(a.details.links, vec!["http://bit.ly/acme-job"]);
    assert_eq!(a.breakdown.len(), ProviderId::ALL.len());
}

#[tokio::test]
async fn failing_panicking_and_hanging_providers_are_neutral() {
    let providers = firing_providers()
        .with_classifier(Arc::new(FailingClassifier));
    let providers = Providers {
        grammar: Arc::new(PanickingGrammar),
        similarity: Arc::new(HangingSimilarity),
        ..providers
    };
    let analyzer = Analyzer::new(providers, short_timeout()).unwrap();

    let a = analyzer.analyze(TEXT).await;

    // Only red flags, email, link and entity remain: 10 + 5 + 5 + 5.
    assert_eq!(a.final_score, 25);
    assert_eq!(a.verdict, Verdict::LikelyLegitimate);
    assert_eq!(a.reasons_from(ProviderId::Classifier).count(), 0);
    assert_eq!(a.reasons_from(ProviderId::Grammar).count(), 0);
    assert_eq!(a.reasons_from(ProviderId::Similarity).count(), 0);

    let down: Vec<ProviderId> = a.unavailable.iter().map(|(p, _)| *p).collect();
    assert_eq!(
        down,
        vec![
            ProviderId::Classifier,
            ProviderId::Grammar,
            ProviderId::Similarity
        ]
    );
    assert!(a.details.classifier.is_none());
    assert!(a.details.grammar.is_none());
}

#[tokio::test]
async fn unavailable_equals_absent_evidence() {
    let healthy = Analyzer::new(
        Providers {
            grammar: Arc::new(StubGrammar(100.0)),
            ..firing_providers()
        },
        short_timeout(),
    )
    .unwrap();
    let broken = Analyzer::new(
        Providers {
            grammar: Arc::new(PanickingGrammar),
            ..firing_providers()
        },
        short_timeout(),
    )
    .unwrap();

    let a = healthy.analyze(TEXT).await;
    let b = broken.analyze(TEXT).await;
    assert_eq!(a.final_score, b.final_score);
    assert_eq!(a.reasons, b.reasons);
}

#[tokio::test]
async fn blank_text_is_neutral() {
    let analyzer = Analyzer::new(firing_providers(), ScoringConfig::default()).unwrap();
    for text in ["", "   ", "\n\t"] {
        let a = analyzer.analyze(text).await;
        assert_eq!(a.final_score, 0);
        assert_eq!(a.verdict, Verdict::LikelyLegitimate);
        assert!(a.reasons.is_empty());
    }
}

#[tokio::test]
async fn entity_check_skipped_without_emails() {
    let analyzer = Analyzer::new(firing_providers(), ScoringConfig::default()).unwrap();
    let a = analyzer
        .analyze("Acme Corp offers you a job, visit http://bit.ly/x now")
        .await;
    assert_eq!(a.reasons_from(ProviderId::Entity).count(), 0);
    assert_eq!(a.reasons_from(ProviderId::Email).count(), 0);
}

#[tokio::test]
async fn classifier_alone_is_only_suspicious() {
    let providers = Providers {
        red_flags: Arc::new(StubFlags(vec![])),
        domains: Arc::new(StubDomains),
        entities: Arc::new(StubEntities(vec![])),
        classifier: Arc::new(MockClassifier::new(LabelDistribution::new(0.0, 1.0, 0.0))),
        grammar: Arc::new(StubGrammar(95.0)),
        similarity: Arc::new(StubSimilarity(80.0)),
    };
    let analyzer = Analyzer::new(providers, ScoringConfig::default()).unwrap();
    let a = analyzer.analyze("Hello, we reviewed your application.").await;
    assert_eq!(a.final_score, 60);
    assert_eq!(a.verdict, Verdict::Suspicious);
    assert_eq!(
        a.reasons_from(ProviderId::Classifier).collect::<Vec<_>>(),
        vec!["AI classifier: Phishing/Scam Email probability 100.0%"]
    );
}

#[tokio::test]
async fn offline_providers_score_a_classic_scam() {
    let analyzer = Analyzer::new(Providers::offline(), ScoringConfig::default()).unwrap();
    let a = analyzer
        .analyze(
            "URGENT: no experience required! Send your bank account details and pay the \
             initial payment in bitcoin. Contact recruiter.jobs@gmail.com on telegram.",
        )
        .await;
    assert!(a.final_score >= 20, "score {}", a.final_score);
    assert!(a.reasons_from(ProviderId::RedFlags).count() >= 4);
    assert_eq!(
        a.reasons_from(ProviderId::Email).collect::<Vec<_>>(),
        vec!["Email warning: recruiter.jobs@gmail.com - Email uses free domain: gmail.com"]
    );
    // The classifier is disabled offline.
    assert!(a
        .unavailable
        .iter()
        .any(|(p, _)| *p == ProviderId::Classifier));
}
