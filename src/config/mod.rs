pub mod providers;
pub mod scoring;

pub use providers::{ClassifierConfig, DomainsConfig, GrammarConfig, ProvidersConfig};
pub use scoring::ScoringConfig;
