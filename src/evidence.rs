//! Evidence records handed from providers to the normalizer.
//!
//! Every provider kind has its own fixed-shape record; `EvidenceSet` holds one
//! slot per provider so the normalizer is checked exhaustively at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider identity. Declaration order is the evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    RedFlags,
    Email,
    Link,
    Entity,
    Classifier,
    Grammar,
    Similarity,
}

impl ProviderId {
    /// All providers in evaluation order.
    pub const ALL: [ProviderId; 7] = [
        ProviderId::RedFlags,
        ProviderId::Email,
        ProviderId::Link,
        ProviderId::Entity,
        ProviderId::Classifier,
        ProviderId::Grammar,
        ProviderId::Similarity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::RedFlags => "red_flags",
            ProviderId::Email => "email",
            ProviderId::Link => "link",
            ProviderId::Entity => "entity",
            ProviderId::Classifier => "classifier",
            ProviderId::Grammar => "grammar",
            ProviderId::Similarity => "similarity",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed label set of the zero-shot classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Legitimate Job Offer")]
    LegitimateJobOffer,
    #[serde(rename = "Phishing/Scam Email")]
    PhishingScam,
    #[serde(rename = "Spam/Promotional Content")]
    SpamPromotional,
}

impl Label {
    pub const ALL: [Label; 3] = [
        Label::LegitimateJobOffer,
        Label::PhishingScam,
        Label::SpamPromotional,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::LegitimateJobOffer => "Legitimate Job Offer",
            Label::PhishingScam => "Phishing/Scam Email",
            Label::SpamPromotional => "Spam/Promotional Content",
        }
    }

    /// Exact (case-insensitive) match against the canonical label text.
    pub fn parse(raw: &str) -> Option<Label> {
        let raw = raw.trim();
        Label::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(raw))
    }
}

/// Multi-label probabilities; they need not sum to 1. A label never reported
/// by the classifier stays at 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelDistribution {
    pub legitimate: f32,
    pub scam: f32,
    pub spam: f32,
}

impl LabelDistribution {
    pub fn new(legitimate: f32, scam: f32, spam: f32) -> Self {
        Self {
            legitimate: prob(legitimate),
            scam: prob(scam),
            spam: prob(spam),
        }
    }

    /// Build from raw `(label, score)` pairs. Unknown labels are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut out = Self::default();
        for (label, score) in pairs {
            if let Some(l) = Label::parse(label) {
                out.set(l, score);
            }
        }
        out
    }

    pub fn get(&self, label: Label) -> f32 {
        match label {
            Label::LegitimateJobOffer => self.legitimate,
            Label::PhishingScam => self.scam,
            Label::SpamPromotional => self.spam,
        }
    }

    pub fn set(&mut self, label: Label, p: f32) {
        let p = prob(p);
        match label {
            Label::LegitimateJobOffer => self.legitimate = p,
            Label::PhishingScam => self.scam = p,
            Label::SpamPromotional => self.spam = p,
        }
    }

    /// Highest-probability label; ties resolve in `Label::ALL` order.
    pub fn top(&self) -> (Label, f32) {
        let mut best = (Label::LegitimateJobOffer, self.legitimate);
        for l in [Label::PhishingScam, Label::SpamPromotional] {
            if self.get(l) > best.1 {
                best = (l, self.get(l));
            }
        }
        best
    }
}

/// Clamp into [0,1]; NaN counts as no evidence.
fn prob(p: f32) -> f32 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// A byte span of a red-flag match in the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub rule: String,
}

/// Red-flag matcher output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedFlagHits {
    /// Matched rule names in table order.
    pub rules: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

/// An email address or URL the domain checker did not trust.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flagged {
    pub item: String,
    pub reason: String,
}

/// Organizations named in the text with no matching sender domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMismatch {
    pub organizations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarReport {
    /// Writing quality in [0,100], higher is better.
    pub quality: f32,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl Default for GrammarReport {
    fn default() -> Self {
        Self {
            quality: 100.0,
            issues: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    /// Resemblance to the reference templates in [0,100].
    pub percent: f32,
    #[serde(default)]
    pub matched_templates: Vec<String>,
}

impl Default for SimilarityReport {
    fn default() -> Self {
        Self {
            percent: 100.0,
            matched_templates: Vec::new(),
        }
    }
}

/// Outcome of one provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal<T> {
    Available(T),
    /// The provider failed, timed out or was disabled; the note says why.
    Unavailable(String),
}

impl<T> Signal<T> {
    pub fn available(&self) -> Option<&T> {
        match self {
            Signal::Available(v) => Some(v),
            Signal::Unavailable(_) => None,
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Signal::Available(_) => None,
            Signal::Unavailable(n) => Some(n),
        }
    }
}

impl<T: Default> Default for Signal<T> {
    fn default() -> Self {
        Signal::Available(T::default())
    }
}

/// All evidence for one analysis. `Default` is the neutral set (nothing fired).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceSet {
    pub red_flags: Signal<RedFlagHits>,
    pub email: Signal<Vec<Flagged>>,
    pub link: Signal<Vec<Flagged>>,
    pub entity: Signal<EntityMismatch>,
    pub classifier: Signal<LabelDistribution>,
    pub grammar: Signal<GrammarReport>,
    pub similarity: Signal<SimilarityReport>,
}

impl EvidenceSet {
    /// Providers that could not deliver, with their notes, in evaluation order.
    pub fn unavailable(&self) -> Vec<(ProviderId, String)> {
        let notes = [
            (ProviderId::RedFlags, self.red_flags.note()),
            (ProviderId::Email, self.email.note()),
            (ProviderId::Link, self.link.note()),
            (ProviderId::Entity, self.entity.note()),
            (ProviderId::Classifier, self.classifier.note()),
            (ProviderId::Grammar, self.grammar.note()),
            (ProviderId::Similarity, self.similarity.note()),
        ];
        notes
            .into_iter()
            .filter_map(|(id, n)| n.map(|n| (id, n.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_order_matches_declaration() {
        let mut sorted = ProviderId::ALL;
        sorted.sort();
        assert_eq!(sorted, ProviderId::ALL);
    }

    #[test]
    fn distribution_ignores_unknown_and_clamps() {
        let d = LabelDistribution::from_pairs([
            ("phishing/scam email", 1.4),
            ("Legitimate Job Offer", -0.2),
            ("Weather report", 0.9),
        ]);
        assert_eq!(d.scam, 1.0);
        assert_eq!(d.legitimate, 0.0);
        assert_eq!(d.spam, 0.0);
    }

    #[test]
    fn nan_probability_is_zero() {
        let d = LabelDistribution::new(f32::NAN, 0.3, 0.0);
        assert_eq!(d.legitimate, 0.0);
        assert_eq!(d.top(), (Label::PhishingScam, 0.3));
    }

    #[test]
    fn label_serializes_as_display_text() {
        let v = serde_json::to_value(Label::SpamPromotional).unwrap();
        assert_eq!(v, serde_json::json!("Spam/Promotional Content"));
    }

    #[test]
    fn neutral_set_has_no_unavailable_notes() {
        let mut e = EvidenceSet::default();
        assert!(e.unavailable().is_empty());
        e.grammar = Signal::Unavailable("timed out".into());
        assert_eq!(
            e.unavailable(),
            vec![(ProviderId::Grammar, "timed out".to_string())]
        );
    }
}
