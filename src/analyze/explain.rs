//! Explanation builder.
//!
//! Collects the reasons of every provider with a nonzero sub-score in
//! evaluation order. Reasons are not reordered, deduplicated across providers,
//! or truncated, even when the score itself was clamped.

use super::aggregate::Aggregator;
use super::normalize::SubScore;
use crate::decision::{Contribution, Reason, Verdict};

#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub final_score: u8,
    pub verdict: Verdict,
    pub reasons: Vec<Reason>,
    pub breakdown: Vec<Contribution>,
}

pub fn build(subs: &[SubScore], aggregator: &Aggregator) -> Explanation {
    let (final_score, verdict) = aggregator.aggregate(subs);

    let mut ordered: Vec<&SubScore> = subs.iter().collect();
    // Stable: keeps a provider's own reason order.
    ordered.sort_by_key(|s| s.provider);

    let reasons = ordered
        .iter()
        .filter(|s| s.points > 0)
        .flat_map(|s| s.reasons.iter().map(|m| Reason::new(s.provider, m.clone())))
        .collect();

    let breakdown = ordered
        .iter()
        .map(|s| Contribution {
            provider: s.provider,
            points: s.points.min(s.cap),
            cap: s.cap,
            available: s.available,
        })
        .collect();

    Explanation {
        final_score,
        verdict,
        reasons,
        breakdown,
    }
}
