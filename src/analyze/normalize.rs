//! Signal normalizer: evidence → bounded sub-score + reasons.
//!
//! Every sub-score lies in `[0, cap]` and is non-decreasing in the badness of
//! its evidence. Counted signals are counted per distinct item. An unavailable
//! signal is neutral (0 points, no reasons).

use std::collections::HashSet;

use crate::config::ScoringConfig;
use crate::evidence::{
    EntityMismatch, EvidenceSet, Flagged, GrammarReport, LabelDistribution, ProviderId,
    RedFlagHits, Signal, SimilarityReport,
};

/// One provider's normalized contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubScore {
    pub provider: ProviderId,
    pub points: u32,
    pub cap: u32,
    pub reasons: Vec<String>,
    pub available: bool,
}

impl SubScore {
    fn neutral(provider: ProviderId, cap: u32, available: bool) -> Self {
        Self {
            provider,
            points: 0,
            cap,
            reasons: Vec::new(),
            available,
        }
    }
}

/// Normalize all evidence; the result is in evaluation order.
pub fn normalize(evidence: &EvidenceSet, cfg: &ScoringConfig) -> Vec<SubScore> {
    vec![
        apply(ProviderId::RedFlags, &evidence.red_flags, cfg, red_flags),
        apply(ProviderId::Email, &evidence.email, cfg, |w, c| {
            warnings(ProviderId::Email, w, c, "Email warning")
        }),
        apply(ProviderId::Link, &evidence.link, cfg, |w, c| {
            warnings(ProviderId::Link, w, c, "Link warning")
        }),
        apply(ProviderId::Entity, &evidence.entity, cfg, entity),
        apply(ProviderId::Classifier, &evidence.classifier, cfg, classifier),
        apply(ProviderId::Grammar, &evidence.grammar, cfg, grammar),
        apply(ProviderId::Similarity, &evidence.similarity, cfg, similarity),
    ]
}

fn apply<T, F>(provider: ProviderId, signal: &Signal<T>, cfg: &ScoringConfig, f: F) -> SubScore
where
    F: FnOnce(&T, &ScoringConfig) -> SubScore,
{
    match signal {
        Signal::Available(v) => {
            let mut s = f(v, cfg);
            s.points = s.points.min(s.cap);
            if s.points == 0 {
                s.reasons.clear();
            }
            s
        }
        Signal::Unavailable(_) => SubScore::neutral(provider, cfg.caps.for_provider(provider), false),
    }
}

pub fn red_flags(hits: &RedFlagHits, cfg: &ScoringConfig) -> SubScore {
    let rules = distinct(hits.rules.iter().map(String::as_str), |r| r.to_string());
    let cap = cfg.caps.red_flags;
    SubScore {
        provider: ProviderId::RedFlags,
        points: per_item(rules.len(), cfg.weights.per_flag, cap),
        cap,
        reasons: rules.iter().map(|r| format!("Red flag: {r}")).collect(),
        available: true,
    }
}

fn warnings(provider: ProviderId, items: &[Flagged], cfg: &ScoringConfig, label: &str) -> SubScore {
    let items = distinct(items.iter(), |f| f.item.to_ascii_lowercase());
    let cap = cfg.caps.for_provider(provider);
    SubScore {
        provider,
        points: per_item(items.len(), cfg.weights.per_warning, cap),
        cap,
        reasons: items
            .iter()
            .map(|f| format!("{label}: {} - {}", f.item, f.reason))
            .collect(),
        available: true,
    }
}

pub fn entity(m: &EntityMismatch, cfg: &ScoringConfig) -> SubScore {
    let orgs = distinct(m.organizations.iter().map(String::as_str), |o| o.to_lowercase());
    let cap = cfg.caps.entity_mismatch;
    SubScore {
        provider: ProviderId::Entity,
        points: if orgs.is_empty() { 0 } else { cap },
        cap,
        reasons: orgs
            .iter()
            .map(|o| {
                format!(
                    "Entity mismatch: Organization {o} is mentioned, but sender's email domain doesn't match {o}."
                )
            })
            .collect(),
        available: true,
    }
}

pub fn classifier(d: &LabelDistribution, cfg: &ScoringConfig) -> SubScore {
    let cap = cfg.caps.classifier;
    let p = d.scam.clamp(0.0, 1.0);
    let points = (p * cap as f32).round() as u32;
    SubScore {
        provider: ProviderId::Classifier,
        points,
        cap,
        reasons: vec![format!(
            "AI classifier: Phishing/Scam Email probability {:.1}%",
            p * 100.0
        )],
        available: true,
    }
}

pub fn grammar(r: &GrammarReport, cfg: &ScoringConfig) -> SubScore {
    let cap = cfg.caps.grammar;
    let threshold = cfg.thresholds.grammar_quality;
    let fired = r.quality < threshold;
    SubScore {
        provider: ProviderId::Grammar,
        points: if fired { cap } else { 0 },
        cap,
        reasons: vec![format!(
            "Writing quality: grammar score {:.0}/100 is below {threshold:.0} ({} issue(s))",
            r.quality,
            r.issues.len()
        )],
        available: true,
    }
}

pub fn similarity(r: &SimilarityReport, cfg: &ScoringConfig) -> SubScore {
    let cap = cfg.caps.low_similarity;
    let threshold = cfg.thresholds.similarity;
    let fired = r.percent < threshold;
    SubScore {
        provider: ProviderId::Similarity,
        points: if fired { cap } else { 0 },
        cap,
        reasons: vec![format!(
            "Low similarity: {:.0}% resemblance to typical job offers (below {threshold:.0}%)",
            r.percent
        )],
        available: true,
    }
}

fn per_item(count: usize, weight: u32, cap: u32) -> u32 {
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    weight.saturating_mul(count).min(cap)
}

/// Keep the first occurrence of each key, preserving order.
fn distinct<T, I, K>(items: I, key: K) -> Vec<T>
where
    I: Iterator<Item = T>,
    K: Fn(&T) -> String,
{
    let mut seen = HashSet::new();
    items.filter(|i| seen.insert(key(i))).collect()
}
