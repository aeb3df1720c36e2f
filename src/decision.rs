//! decision.rs: verdict, explainability and the per-analysis result shape.
//!
//! Everything here is created inside one `analyze()` call and handed to the
//! caller; nothing is kept afterwards.

use serde::{Deserialize, Serialize};

use crate::evidence::{Highlight, Label, LabelDistribution, ProviderId};

/// Three ordered risk tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Likely Legitimate")]
    LikelyLegitimate,
    #[serde(rename = "Suspicious")]
    Suspicious,
    #[serde(rename = "Likely Scam")]
    LikelyScam,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::LikelyLegitimate => "Likely Legitimate",
            Verdict::Suspicious => "Suspicious",
            Verdict::LikelyScam => "Likely Scam",
        }
    }
}

/// One explanation line, attributable to exactly one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub provider: ProviderId,
    pub message: String,
}

impl Reason {
    pub fn new(provider: ProviderId, message: impl Into<String>) -> Self {
        Self {
            provider,
            message: message.into(),
        }
    }
}

/// Points a provider added to the final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub provider: ProviderId,
    pub points: u32,
    pub cap: u32,
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WritingGrade {
    Good,
    Fair,
    Poor,
}

impl WritingGrade {
    pub fn from_quality(q: f32) -> Self {
        if q > 80.0 {
            WritingGrade::Good
        } else if q > 50.0 {
            WritingGrade::Fair
        } else {
            WritingGrade::Poor
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedFlagDetails {
    pub rules: Vec<String>,
    pub highlights: Vec<Highlight>,
}

/// Raw classifier view. Informational only; the verdict comes from the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierDetails {
    pub top_label: Label,
    pub top_probability: f32,
    pub distribution: LabelDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarDetails {
    pub quality: f32,
    pub grade: WritingGrade,
    pub issue_count: usize,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityDetails {
    pub percent: f32,
    pub matched_templates: Vec<String>,
}

/// Per-provider data for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub red_flags: RedFlagDetails,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<ClassifierDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<GrammarDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<SimilarityDetails>,
}

/// The single authoritative answer of `analyze()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Clamped risk score in [0,100].
    pub final_score: u8,
    pub verdict: Verdict,
    /// All reasons of providers that fired, in evaluation order.
    pub reasons: Vec<Reason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<Contribution>,
    #[serde(default)]
    pub details: Details,
    /// Internal notes about providers that could not deliver. Not part of the
    /// response contract.
    #[serde(skip)]
    pub unavailable: Vec<(ProviderId, String)>,
}

impl Analysis {
    /// Result for blank input: score 0, no reasons.
    pub fn neutral() -> Self {
        Self {
            final_score: 0,
            verdict: Verdict::LikelyLegitimate,
            reasons: Vec::new(),
            breakdown: Vec::new(),
            details: Details::default(),
            unavailable: Vec::new(),
        }
    }

    /// Reasons contributed by a single provider, in order.
    pub fn reasons_from(&self, provider: ProviderId) -> impl Iterator<Item = &str> {
        self.reasons
            .iter()
            .filter(move |r| r.provider == provider)
            .map(|r| r.message.as_str())
    }
}
