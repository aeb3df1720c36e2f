// src/providers/mod.rs
//! Signal providers: the collaborators the scoring core consumes.
//!
//! Each trait returns `anyhow::Result`; the orchestration in `analyze` turns
//! any error, timeout or panic into an unavailable signal, so implementations
//! may simply propagate with `?`.

pub mod classifier;
pub mod extract;
pub mod grammar;
pub mod ner;
pub mod rdap;
pub mod rules;
pub mod similarity;
pub mod verification;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ProvidersConfig;
use crate::evidence::{GrammarReport, LabelDistribution, RedFlagHits, SimilarityReport};

pub use classifier::{build_classifier, DisabledClassifier, MockClassifier, ZeroShotClassifier};
pub use grammar::{HeuristicGrammar, LanguageToolGrammar};
pub use ner::{Entities, RegexEntityExtractor};
pub use rdap::RdapDomainChecker;
pub use rules::RedFlagTable;
pub use similarity::TemplateSimilarity;
pub use verification::{HeuristicDomainChecker, TrustCheck};

#[async_trait]
pub trait RedFlagMatcher: Send + Sync {
    /// Distinct rule names matching `text`, in table order.
    async fn match_red_flags(&self, text: &str) -> Result<RedFlagHits>;
}

#[async_trait]
pub trait DomainChecker: Send + Sync {
    async fn check_email(&self, email: &str) -> Result<TrustCheck>;
    async fn check_link(&self, url: &str) -> Result<TrustCheck>;
}

#[async_trait]
pub trait EntityExtractor: Send + Sync {
    async fn extract_entities(&self, text: &str) -> Result<Entities>;
}

#[async_trait]
pub trait LabelClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<LabelDistribution>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait GrammarChecker: Send + Sync {
    async fn grammar_quality(&self, text: &str) -> Result<GrammarReport>;
}

#[async_trait]
pub trait SimilarityEstimator: Send + Sync {
    async fn similarity(&self, text: &str) -> Result<SimilarityReport>;
}

/// One shared, read-only instance of every provider.
#[derive(Clone)]
pub struct Providers {
    pub red_flags: Arc<dyn RedFlagMatcher>,
    pub domains: Arc<dyn DomainChecker>,
    pub entities: Arc<dyn EntityExtractor>,
    pub classifier: Arc<dyn LabelClassifier>,
    pub grammar: Arc<dyn GrammarChecker>,
    pub similarity: Arc<dyn SimilarityEstimator>,
}

impl Providers {
    /// Local providers only; the classifier is disabled.
    pub fn offline() -> Self {
        Self {
            red_flags: Arc::new(RedFlagTable::builtin()),
            domains: Arc::new(HeuristicDomainChecker::default()),
            entities: Arc::new(RegexEntityExtractor::default()),
            classifier: Arc::new(DisabledClassifier),
            grammar: Arc::new(HeuristicGrammar),
            similarity: Arc::new(TemplateSimilarity::default()),
        }
    }

    /// Build according to config files and environment (red-flag table and
    /// entity patterns may come from disk).
    pub fn from_config(cfg: &ProvidersConfig) -> Result<Self> {
        let grammar: Arc<dyn GrammarChecker> = match cfg.grammar.backend.as_str() {
            "languagetool" => Arc::new(LanguageToolGrammar::new(
                &cfg.grammar.endpoint,
                &cfg.grammar.language,
            )?),
            _ => Arc::new(HeuristicGrammar),
        };
        let domains: Arc<dyn DomainChecker> = match cfg.domains.backend.as_str() {
            "rdap" => Arc::new(RdapDomainChecker::new(&cfg.domains)?),
            _ => Arc::new(HeuristicDomainChecker::default()),
        };
        Ok(Self {
            red_flags: Arc::new(RedFlagTable::from_env()?),
            domains,
            entities: Arc::new(RegexEntityExtractor::from_env()),
            classifier: build_classifier(&cfg.classifier)?,
            grammar,
            similarity: Arc::new(TemplateSimilarity::default()),
        })
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn LabelClassifier>) -> Self {
        self.classifier = classifier;
        self
    }
}
