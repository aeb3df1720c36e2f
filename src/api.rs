use std::sync::Arc;

use shuttle_axum::axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::analyze::Analyzer;
use crate::decision::Analysis;
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }

    /// Analyzer configured from `config/` and environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(Analyzer::from_env()?))
    }
}

/// Router with the public routes and `/metrics`.
pub fn router(state: AppState) -> Router {
    let metrics = Metrics::init();

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
        .merge(metrics.router())
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    text: String,
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeReq>) -> Json<Analysis> {
    Json(state.analyzer.analyze(&body.text).await)
}
