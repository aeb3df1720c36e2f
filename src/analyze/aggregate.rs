//! Risk aggregator: sum, clamp, classify.

use std::sync::Arc;

use super::normalize::SubScore;
use crate::config::ScoringConfig;
use crate::decision::Verdict;
use crate::evidence::ProviderId;

pub const MAX_SCORE: u32 = 100;

/// Holds the validated scoring table. Construction is the only place a bad
/// table can be rejected.
#[derive(Debug, Clone)]
pub struct Aggregator {
    cfg: Arc<ScoringConfig>,
}

impl Aggregator {
    pub fn new(cfg: ScoringConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.cfg
    }

    /// `clamp(sum(points), 0, 100)`.
    pub fn final_score(&self, subs: &[SubScore]) -> u8 {
        let sum = subs
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.points.min(s.cap)));
        // Clamped to 0..=100 so the narrowing cannot fail.
        u8::try_from(sum.min(MAX_SCORE)).unwrap_or(u8::MAX)
    }

    /// `score >= scam` ⇒ Likely Scam; `score >= suspicious` ⇒ Suspicious.
    pub fn verdict_for(&self, score: u8) -> Verdict {
        let score = u32::from(score);
        let v = self.cfg.verdict;
        if score >= v.scam {
            Verdict::LikelyScam
        } else if score >= v.suspicious {
            Verdict::Suspicious
        } else {
            Verdict::LikelyLegitimate
        }
    }

    /// Score plus verdict. With `require_corroboration`, a Likely Scam score
    /// carried by the classifier alone is reported as Suspicious.
    pub fn aggregate(&self, subs: &[SubScore]) -> (u8, Verdict) {
        let score = self.final_score(subs);
        let verdict = match self.verdict_for(score) {
            Verdict::LikelyScam if self.cfg.verdict.require_corroboration && !corroborated(subs) => {
                Verdict::Suspicious
            }
            v => v,
        };
        (score, verdict)
    }
}

/// Some signal other than the classifier added points.
fn corroborated(subs: &[SubScore]) -> bool {
    subs.iter()
        .any(|s| s.provider != ProviderId::Classifier && s.points.min(s.cap) > 0)
}

impl Default for Aggregator {
    fn default() -> Self {
        Self {
            cfg: Arc::new(ScoringConfig::default()),
        }
    }
}
