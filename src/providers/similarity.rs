//! Structural similarity against reference job-offer templates.
//!
//! Similarity per template is the Sørensen–Dice coefficient over character
//! bigrams of the normalized texts; the reported percentage is the average
//! across templates. Matched templates are those with the maximal score.

use async_trait::async_trait;

use super::SimilarityEstimator;
use crate::evidence::SimilarityReport;

const JOB_TEMPLATES: &[&str] = &[
    "We are hiring for a remote data entry position. No experience required.",
    "Congratulations! You've been selected for a customer support role.",
    "Dear Applicant, we would like to offer you a position at our company.",
    "Thank you for interviewing with us. We are pleased to offer you the role, please find the offer letter with salary and start date attached.",
    "We reviewed your application and would like to invite you to an interview for the software engineer position on our team.",
];

#[derive(Debug, Clone)]
pub struct TemplateSimilarity {
    templates: Vec<String>,
    normalized: Vec<String>,
}

impl Default for TemplateSimilarity {
    fn default() -> Self {
        Self::new(JOB_TEMPLATES.iter().map(|s| s.to_string()).collect())
    }
}

impl TemplateSimilarity {
    pub fn new(templates: Vec<String>) -> Self {
        let normalized = templates.iter().map(|t| normalize(t)).collect();
        Self {
            templates,
            normalized,
        }
    }

    pub fn compare(&self, text: &str) -> SimilarityReport {
        let input = normalize(text);
        if input.is_empty() || self.templates.is_empty() {
            return SimilarityReport::default();
        }

        let scores: Vec<f64> = self
            .normalized
            .iter()
            .map(|t| strsim::sorensen_dice(&input, t))
            .collect();
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        let best = scores.iter().cloned().fold(0.0_f64, f64::max);

        let matched_templates = if best > 0.0 {
            self.templates
                .iter()
                .zip(&scores)
                .filter(|(_, s)| (**s - best).abs() < f64::EPSILON)
                .map(|(t, _)| t.clone())
                .collect()
        } else {
            Vec::new()
        };

        SimilarityReport {
            percent: round2((avg * 100.0) as f32),
            matched_templates,
        }
    }
}

#[async_trait]
impl SimilarityEstimator for TemplateSimilarity {
    async fn similarity(&self, text: &str) -> anyhow::Result<SimilarityReport> {
        Ok(self.compare(text))
    }
}

/// Lowercase, letters/digits only, single spaces.
fn normalize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_text_matches_itself_best() {
        let s = TemplateSimilarity::default();
        let r = s.compare("Dear Applicant, we would like to offer you a position at our company.");
        assert_eq!(r.matched_templates, vec![JOB_TEMPLATES[2].to_string()]);
        assert!(r.percent > 20.0, "percent {}", r.percent);
    }

    #[test]
    fn unrelated_text_is_dissimilar() {
        let s = TemplateSimilarity::default();
        let r = s.compare("zzz qqq 12345");
        assert!(r.percent < 20.0, "percent {}", r.percent);
    }

    #[test]
    fn blank_is_neutral() {
        let r = TemplateSimilarity::default().compare("  ...  ");
        assert_eq!(r, SimilarityReport::default());
    }

    #[test]
    fn percent_is_bounded() {
        let s = TemplateSimilarity::new(vec!["same text".into()]);
        let r = s.compare("Same text!");
        assert!((r.percent - 100.0).abs() < 1e-3);
    }
}
