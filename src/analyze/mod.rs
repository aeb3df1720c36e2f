// src/analyze/mod.rs
//! Analysis pipeline entry: runs the providers, normalizes their evidence,
//! aggregates the score and assembles the explanation.
//! Order:
//! 1) red flags → email → link → entity → classifier → grammar → similarity
//! 2) normalize each signal into a capped sub-score
//! 3) clamp the sum, map it to a verdict, collect reasons in provider order

pub mod aggregate;
pub mod explain;
pub mod normalize;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::{ProvidersConfig, ScoringConfig};
use crate::decision::{
    Analysis, ClassifierDetails, Details, GrammarDetails, RedFlagDetails, SimilarityDetails,
    WritingGrade,
};
use crate::evidence::{EntityMismatch, EvidenceSet, Flagged, ProviderId, Signal};
use crate::providers::extract::{extract_emails, extract_urls};
use crate::providers::ner::find_mismatches;
use crate::providers::Providers;

pub use aggregate::Aggregator;
pub use explain::Explanation;
pub use normalize::SubScore;

/// Shared, read-only analysis engine. Cheap to clone.
#[derive(Clone)]
pub struct Analyzer {
    providers: Providers,
    aggregator: Aggregator,
    timeout: Duration,
}

impl Analyzer {
    /// Validates the scoring table; an invalid table never accepts requests.
    pub fn new(providers: Providers, scoring: ScoringConfig) -> anyhow::Result<Self> {
        let timeout = scoring.provider_timeout();
        let aggregator = Aggregator::new(scoring)?;
        Ok(Self {
            providers,
            aggregator,
            timeout,
        })
    }

    /// Build from `config/scoring.toml`, `config/providers.json` and env overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        let scoring = ScoringConfig::from_env()?;
        let providers_cfg = ProvidersConfig::from_env()?;
        let providers = Providers::from_config(&providers_cfg)?;
        info!(
            classifier = providers.classifier.name(),
            grammar = %providers_cfg.grammar.backend,
            domains = %providers_cfg.domains.backend,
            suspicious = scoring.verdict.suspicious,
            scam = scoring.verdict.scam,
            "analyzer configured"
        );
        Self::new(providers, scoring)
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Score a complete analysis of `text`. Never fails: provider problems
    /// degrade to neutral signals, blank text is neutral.
    pub async fn analyze(&self, text: &str) -> Analysis {
        if text.trim().is_empty() {
            return Analysis::neutral();
        }
        let started = Instant::now();
        let id = anon_hash(text);

        let emails = extract_emails(text);
        let links = extract_urls(text);
        let evidence = self.collect_evidence(text, &emails, &links).await;
        let explanation = self.score_evidence(&evidence);
        let unavailable = evidence.unavailable();

        for (provider, note) in &unavailable {
            crate::metrics::record_unavailable(*provider);
            warn!(target: "analysis", %id, provider = %provider, note = %note, "signal unavailable");
        }
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        crate::metrics::record_analysis(explanation.verdict, explanation.final_score, elapsed_ms);
        info!(
            target: "analysis",
            %id,
            score = explanation.final_score,
            verdict = explanation.verdict.as_str(),
            reasons = explanation.reasons.len(),
            unavailable = unavailable.len(),
            elapsed_ms,
            "analysis finished"
        );

        Analysis {
            final_score: explanation.final_score,
            verdict: explanation.verdict,
            reasons: explanation.reasons,
            breakdown: explanation.breakdown,
            details: details(&evidence, emails, links),
            unavailable,
        }
    }

    /// The pure core: normalized, aggregated and explained evidence.
    pub fn score_evidence(&self, evidence: &EvidenceSet) -> Explanation {
        let subs = normalize::normalize(evidence, self.aggregator.config());
        explain::build(&subs, &self.aggregator)
    }

    /// Invoke every provider in evaluation order, each on its own task bounded
    /// by the provider timeout.
    pub async fn collect_evidence(
        &self,
        text: &str,
        emails: &[String],
        links: &[String],
    ) -> EvidenceSet {
        let text: Arc<str> = Arc::from(text);
        let limit = self.timeout;
        let p = &self.providers;

        let red_flags = {
            let (m, t) = (p.red_flags.clone(), text.clone());
            guarded(ProviderId::RedFlags, limit, async move {
                m.match_red_flags(&t).await
            })
            .await
        };

        let email = {
            let (d, list) = (p.domains.clone(), emails.to_vec());
            guarded(ProviderId::Email, limit, async move {
                let mut out = Vec::new();
                for e in list {
                    match d.check_email(&e).await {
                        Ok(check) => {
                            if let Some(r) = check.flag_reason() {
                                out.push(Flagged {
                                    reason: r.to_string(),
                                    item: e,
                                });
                            }
                        }
                        Err(err) => tracing::debug!(error = %err, "email could not be verified"),
                    }
                }
                Ok(out)
            })
            .await
        };

        let link = {
            let (d, list) = (p.domains.clone(), links.to_vec());
            guarded(ProviderId::Link, limit, async move {
                let mut out = Vec::new();
                for u in list {
                    match d.check_link(&u).await {
                        Ok(check) => {
                            if let Some(r) = check.flag_reason() {
                                out.push(Flagged {
                                    reason: r.to_string(),
                                    item: u,
                                });
                            }
                        }
                        Err(err) => tracing::debug!(error = %err, "link could not be verified"),
                    }
                }
                Ok(out)
            })
            .await
        };

        let entity = if emails.is_empty() {
            Signal::Available(EntityMismatch::default())
        } else {
            let (x, t, list) = (p.entities.clone(), text.clone(), emails.to_vec());
            guarded(ProviderId::Entity, limit, async move {
                let entities = x.extract_entities(&t).await?;
                Ok::<_, anyhow::Error>(EntityMismatch {
                    organizations: find_mismatches(&entities.organizations, &list),
                })
            })
            .await
        };

        let classifier = {
            let (c, t) = (p.classifier.clone(), text.clone());
            guarded(ProviderId::Classifier, limit, async move { c.classify(&t).await }).await
        };

        let grammar = {
            let (g, t) = (p.grammar.clone(), text.clone());
            guarded(ProviderId::Grammar, limit, async move {
                g.grammar_quality(&t).await
            })
            .await
        };

        let similarity = {
            let (s, t) = (p.similarity.clone(), text.clone());
            guarded(ProviderId::Similarity, limit, async move { s.similarity(&t).await }).await
        };

        EvidenceSet {
            red_flags,
            email,
            link,
            entity,
            classifier,
            grammar,
            similarity,
        }
    }
}

/// Run one provider call on its own task. Errors, panics and timeouts all
/// come back as `Signal::Unavailable`.
async fn guarded<T, F>(provider: ProviderId, limit: Duration, fut: F) -> Signal<T>
where
    F: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(fut);
    let abort = handle.abort_handle();
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(Ok(v))) => Signal::Available(v),
        Ok(Ok(Err(e))) => Signal::Unavailable(format!("{provider} failed: {e:#}")),
        Ok(Err(join)) if join.is_panic() => Signal::Unavailable(format!("{provider} panicked")),
        Ok(Err(join)) => Signal::Unavailable(format!("{provider} cancelled: {join}")),
        Err(_) => {
            abort.abort();
            Signal::Unavailable(format!(
                "{provider} timed out after {} ms",
                limit.as_millis()
            ))
        }
    }
}

fn details(evidence: &EvidenceSet, emails: Vec<String>, links: Vec<String>) -> Details {
    let red_flags = evidence
        .red_flags
        .available()
        .map(|h| RedFlagDetails {
            rules: h.rules.clone(),
            highlights: h.highlights.clone(),
        })
        .unwrap_or_default();

    let classifier = evidence.classifier.available().map(|d| {
        let (top_label, top_probability) = d.top();
        ClassifierDetails {
            top_label,
            top_probability,
            distribution: *d,
        }
    });

    let grammar = evidence.grammar.available().map(|g| GrammarDetails {
        quality: g.quality,
        grade: WritingGrade::from_quality(g.quality),
        issue_count: g.issues.len(),
        issues: g.issues.clone(),
    });

    let similarity = evidence.similarity.available().map(|s| SimilarityDetails {
        percent: s.percent,
        matched_templates: s.matched_templates.clone(),
    });

    Details {
        red_flags,
        emails,
        links,
        classifier,
        grammar,
        similarity,
    }
}

/// Short anonymized id for log lines; raw text is never logged.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
