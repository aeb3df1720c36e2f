// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod decision;
pub mod evidence;
pub mod metrics;
pub mod providers;

// ---- Re-exports for stable public API ----
pub use crate::analyze::Analyzer;
pub use crate::api::{router, AppState};
pub use crate::config::{ProvidersConfig, ScoringConfig};
pub use crate::decision::{Analysis, Reason, Verdict};
pub use crate::evidence::{EvidenceSet, ProviderId, Signal};

/// Build the full application router from `config/` and environment.
///
/// A malformed scoring table or providers file is an error here, so the
/// service refuses to start rather than scoring with a broken table.
pub async fn app() -> anyhow::Result<axum::Router> {
    let state = AppState::from_env()?;
    Ok(router(state))
}
