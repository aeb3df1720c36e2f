//! Zero-shot label classifier: provider abstraction + Hugging Face backend.
//!
//! The classifier scores the text against the fixed label set
//! (`Label::ALL`) in multi-label mode. Any failure (missing token, HTTP error,
//! unparseable body) is an `Err`; the analyzer degrades it to a neutral signal.

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::LabelClassifier;
use crate::config::ClassifierConfig;
use crate::evidence::{Label, LabelDistribution};

/// Convenient alias used by callers.
pub type DynClassifier = Arc<dyn LabelClassifier>;

/// Factory: build a classifier according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock classifier.
/// * Else `backend` decides: "huggingface" | "mock" | anything else disabled.
pub fn build_classifier(config: &ClassifierConfig) -> anyhow::Result<DynClassifier> {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Ok(Arc::new(MockClassifier::neutral()));
    }

    match config.backend.as_str() {
        "huggingface" => Ok(Arc::new(ZeroShotClassifier::new(config)?)),
        "mock" => Ok(Arc::new(MockClassifier::neutral())),
        _ => Ok(Arc::new(DisabledClassifier)),
    }
}

/// Always unavailable; used when no classifier is configured.
pub struct DisabledClassifier;

#[async_trait]
impl LabelClassifier for DisabledClassifier {
    async fn classify(&self, _text: &str) -> anyhow::Result<LabelDistribution> {
        bail!("classifier disabled")
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed distribution for tests/local runs.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    pub fixed: LabelDistribution,
}

impl MockClassifier {
    pub fn new(fixed: LabelDistribution) -> Self {
        Self { fixed }
    }

    /// Mostly-legitimate distribution with a small scam share.
    pub fn neutral() -> Self {
        Self::new(LabelDistribution::new(0.80, 0.10, 0.10))
    }
}

#[async_trait]
impl LabelClassifier for MockClassifier {
    async fn classify(&self, _text: &str) -> anyhow::Result<LabelDistribution> {
        Ok(self.fixed)
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Hugging Face Inference API, zero-shot classification pipeline.
pub struct ZeroShotClassifier {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl ZeroShotClassifier {
    pub fn new(config: &ClassifierConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("job-scam-detector/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .context("building classifier http client")?;
        let url = format!(
            "{}/{}",
            config.endpoint.trim_end_matches('/'),
            config.model.trim_start_matches('/')
        );
        Ok(Self {
            http,
            url,
            api_key: config.api_key.clone(),
        })
    }
}

#[derive(Serialize)]
struct Req<'a> {
    inputs: &'a str,
    parameters: Params,
}

#[derive(Serialize)]
struct Params {
    candidate_labels: Vec<&'static str>,
    multi_label: bool,
}

/// The API has answered both as parallel arrays and as a list of pairs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Resp {
    Parallel { labels: Vec<String>, scores: Vec<f32> },
    Pairs(Vec<LabelScore>),
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

fn parse_response(body: &str) -> anyhow::Result<LabelDistribution> {
    let resp: Resp = serde_json::from_str(body).context("unparseable classifier response")?;
    let dist = match resp {
        Resp::Parallel { labels, scores } => {
            if labels.len() != scores.len() {
                bail!(
                    "classifier returned {} labels but {} scores",
                    labels.len(),
                    scores.len()
                );
            }
            LabelDistribution::from_pairs(labels.iter().map(String::as_str).zip(scores))
        }
        Resp::Pairs(pairs) => {
            LabelDistribution::from_pairs(pairs.iter().map(|p| (p.label.as_str(), p.score)))
        }
    };
    Ok(dist)
}

#[async_trait]
impl LabelClassifier for ZeroShotClassifier {
    async fn classify(&self, text: &str) -> anyhow::Result<LabelDistribution> {
        if self.api_key.is_empty() {
            bail!("missing classifier api key");
        }
        let req = Req {
            inputs: text,
            parameters: Params {
                candidate_labels: Label::ALL.iter().map(|l| l.as_str()).collect(),
                multi_label: true,
            },
        };

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("classifier request failed")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("classifier returned HTTP {status}"));
        }
        let body = resp.text().await.context("reading classifier body")?;
        parse_response(&body)
    }
    fn name(&self) -> &'static str {
        "huggingface"
    }
}
