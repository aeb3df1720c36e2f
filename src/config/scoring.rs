// src/config/scoring.rs
//! Scoring table loaded from `config/scoring.toml`.
//!
//! The table is immutable after startup: it is validated once by
//! [`ScoringConfig::validate`] and then shared read-only by the aggregator.
//! The file is required: a missing or empty file, a missing `[caps]` or
//! `[verdict]` section, or an unknown key is a startup error.
//! `[weights]`, `[thresholds]` and `[runtime]` fall back to defaults.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::evidence::ProviderId;

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const ENV_SCORING_CONFIG_PATH: &str = "SCORING_CONFIG_PATH";

/// Upper bound of every sub-score. For entity, grammar and similarity the cap
/// is also the fixed penalty applied when the signal fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Caps {
    pub red_flags: u32,
    pub email: u32,
    pub link: u32,
    pub entity_mismatch: u32,
    pub classifier: u32,
    pub grammar: u32,
    pub low_similarity: u32,
}

impl Default for Caps {
    fn default() -> Self {
        Self {
            red_flags: 15,
            email: 10,
            link: 10,
            entity_mismatch: 5,
            classifier: 60,
            grammar: 5,
            low_similarity: 10,
        }
    }
}

impl Caps {
    pub fn for_provider(&self, id: ProviderId) -> u32 {
        match id {
            ProviderId::RedFlags => self.red_flags,
            ProviderId::Email => self.email,
            ProviderId::Link => self.link,
            ProviderId::Entity => self.entity_mismatch,
            ProviderId::Classifier => self.classifier,
            ProviderId::Grammar => self.grammar,
            ProviderId::Similarity => self.low_similarity,
        }
    }
}

/// Points per distinct item before capping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ItemWeights {
    pub per_flag: u32,
    pub per_warning: u32,
}

impl Default for ItemWeights {
    fn default() -> Self {
        Self {
            per_flag: 5,
            per_warning: 5,
        }
    }
}

/// Quality cut-offs (both on a 0–100 scale, strict `<`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalThresholds {
    pub grammar_quality: f32,
    pub similarity: f32,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            grammar_quality: 60.0,
            similarity: 20.0,
        }
    }
}

/// Verdict floors: `score >= scam` is Likely Scam, `score >= suspicious` is Suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerdictThresholds {
    pub suspicious: u32,
    pub scam: u32,
    /// Likely Scam needs at least one nonzero signal besides the classifier.
    #[serde(default = "default_true")]
    pub require_corroboration: bool,
}

fn default_true() -> bool {
    true
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            suspicious: 40,
            scam: 60,
            require_corroboration: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeCfg {
    pub provider_timeout_ms: u64,
}

impl Default for RuntimeCfg {
    fn default() -> Self {
        Self {
            provider_timeout_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    pub caps: Caps,
    #[serde(default)]
    pub weights: ItemWeights,
    #[serde(default)]
    pub thresholds: SignalThresholds,
    pub verdict: VerdictThresholds,
    #[serde(default)]
    pub runtime: RuntimeCfg,
}

impl ScoringConfig {
    /// Resolve the path from `SCORING_CONFIG_PATH` (or the default) and load it.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_SCORING_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCORING_CONFIG_PATH));
        Self::load(&path)
    }

    /// Load and validate. The file must exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring config at {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid scoring config at {}", path.display()))
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        if toml_str.trim().is_empty() {
            bail!("scoring table is empty");
        }
        let cfg: ScoringConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject tables that would break the verdict ordering or scale.
    pub fn validate(&self) -> anyhow::Result<()> {
        let v = self.verdict;
        if v.suspicious == 0 {
            bail!("verdict.suspicious must be > 0");
        }
        if v.suspicious >= v.scam {
            bail!(
                "verdict.suspicious ({}) must be below verdict.scam ({})",
                v.suspicious,
                v.scam
            );
        }
        if v.scam > 100 {
            bail!("verdict.scam ({}) must be <= 100", v.scam);
        }

        for (name, t) in [
            ("thresholds.grammar_quality", self.thresholds.grammar_quality),
            ("thresholds.similarity", self.thresholds.similarity),
        ] {
            if !t.is_finite() || !(0.0..=100.0).contains(&t) {
                bail!("{name} must be within 0..=100, got {t}");
            }
        }

        if self.runtime.provider_timeout_ms == 0 {
            bail!("runtime.provider_timeout_ms must be > 0");
        }
        Ok(())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.runtime.provider_timeout_ms)
    }
}
