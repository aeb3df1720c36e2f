// src/config/providers.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const DEFAULT_PROVIDERS_CONFIG_PATH: &str = "config/providers.json";
pub const ENV_PROVIDERS_CONFIG_PATH: &str = "PROVIDERS_CONFIG_PATH";

fn default_model() -> String {
    "facebook/bart-large-mnli".to_string()
}
fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}
fn default_languagetool() -> String {
    "https://api.languagetool.org".to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}
fn default_rdap() -> String {
    "https://rdap.org".to_string()
}
fn default_rdap_timeout_ms() -> u64 {
    3000
}
fn default_min_age_days() -> u32 {
    730
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// "disabled" | "mock" | "huggingface" (case-insensitive)
    pub backend: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// "ENV" means: read from HF_API_TOKEN
    #[serde(default)]
    pub api_key: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: "disabled".to_string(),
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarConfig {
    /// "heuristic" | "languagetool"
    pub backend: String,
    #[serde(default = "default_languagetool")]
    pub endpoint: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            backend: "heuristic".to_string(),
            endpoint: default_languagetool(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainsConfig {
    /// "heuristic" | "rdap"
    pub backend: String,
    /// RDAP base URL; lookups go to `{endpoint}/domain/{name}`.
    #[serde(default = "default_rdap")]
    pub endpoint: String,
    #[serde(default = "default_rdap_timeout_ms")]
    pub timeout_ms: u64,
    /// Domains registered more recently than this are flagged.
    #[serde(default = "default_min_age_days")]
    pub min_age_days: u32,
}

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            backend: "heuristic".to_string(),
            endpoint: default_rdap(),
            timeout_ms: default_rdap_timeout_ms(),
            min_age_days: default_min_age_days(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub grammar: GrammarConfig,
    #[serde(default)]
    pub domains: DomainsConfig,
}

impl ProvidersConfig {
    /// `PROVIDERS_CONFIG_PATH` or `config/providers.json`; missing file ⇒ defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = env::var(ENV_PROVIDERS_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROVIDERS_CONFIG_PATH));
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: ProvidersConfig = serde_json::from_str(data)?;

        // Normalize backends
        cfg.classifier.backend = cfg.classifier.backend.trim().to_lowercase();
        cfg.grammar.backend = cfg.grammar.backend.trim().to_lowercase();
        cfg.domains.backend = cfg.domains.backend.trim().to_lowercase();

        match cfg.classifier.backend.as_str() {
            "disabled" | "mock" | "huggingface" => {}
            other => anyhow::bail!("Unsupported classifier backend in config: {other}"),
        }
        match cfg.grammar.backend.as_str() {
            "heuristic" | "languagetool" => {}
            other => anyhow::bail!("Unsupported grammar backend in config: {other}"),
        }
        match cfg.domains.backend.as_str() {
            "heuristic" | "rdap" => {}
            other => anyhow::bail!("Unsupported domains backend in config: {other}"),
        }
        if cfg.domains.timeout_ms == 0 {
            anyhow::bail!("domains.timeout_ms must be > 0");
        }

        // Resolve api key if "ENV"
        if cfg.classifier.backend == "huggingface"
            && cfg.classifier.api_key.trim().eq_ignore_ascii_case("env")
        {
            cfg.classifier.api_key = env::var("HF_API_TOKEN")
                .map_err(|_| anyhow::anyhow!("Missing HF_API_TOKEN env var"))?;
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_sections_missing() {
        let cfg = ProvidersConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg.classifier.backend, "disabled");
        assert_eq!(cfg.grammar.backend, "heuristic");
        assert_eq!(cfg.classifier.model, "facebook/bart-large-mnli");
        assert_eq!(cfg.domains.backend, "heuristic");
        assert_eq!(cfg.domains.min_age_days, 730);
    }

    #[test]
    fn rdap_backend_selectable() {
        let cfg = ProvidersConfig::from_json_str(
            r#"{"domains":{"backend":"RDAP","endpoint":"http://127.0.0.1:9","timeout_ms":250}}"#,
        )
        .unwrap();
        assert_eq!(cfg.domains.backend, "rdap");
        assert_eq!(cfg.domains.endpoint, "http://127.0.0.1:9");
        assert_eq!(cfg.domains.timeout_ms, 250);
        assert_eq!(cfg.domains.min_age_days, 730);
    }

    #[test]
    fn unknown_domains_backend_rejected() {
        let err = ProvidersConfig::from_json_str(r#"{"domains":{"backend":"whois"}}"#).unwrap_err();
        assert!(err.to_string().contains("whois"));
    }

    #[test]
    fn backend_is_case_insensitive() {
        let cfg = ProvidersConfig::from_json_str(
            r#"{"classifier":{"backend":"Mock"},"grammar":{"backend":"LanguageTool"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.classifier.backend, "mock");
        assert_eq!(cfg.grammar.backend, "languagetool");
    }

    #[test]
    fn unknown_backend_rejected() {
        let err = ProvidersConfig::from_json_str(r#"{"classifier":{"backend":"oracle"}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("oracle"));
    }
}
