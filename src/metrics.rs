//! Prometheus metrics for the analysis service.
//!
//! The recorder is installed once per process; later calls share the handle.

use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::decision::Verdict;
use crate::evidence::ProviderId;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (first call) and describe our series.
    pub fn init() -> Self {
        let handle = HANDLE
            .get_or_init(|| {
                let builder = PrometheusBuilder::new();
                let handle = match builder.install_recorder() {
                    Ok(h) => h,
                    Err(e) => {
                        // Another recorder owns the process; render an empty one.
                        tracing::warn!(error = %e, "prometheus recorder not installed");
                        PrometheusBuilder::new().build_recorder().handle()
                    }
                };
                describe();
                handle
            })
            .clone();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("scam_analyses_total", "Analyses completed, by verdict.");
    describe_counter!(
        "scam_provider_unavailable_total",
        "Provider calls that failed, timed out or were disabled."
    );
    describe_histogram!("scam_final_score", "Final risk score per analysis.");
    describe_histogram!(
        "scam_analysis_duration_ms",
        "Wall time of one analysis in milliseconds."
    );
}

pub fn record_analysis(verdict: Verdict, score: u8, elapsed_ms: f64) {
    counter!("scam_analyses_total", "verdict" => verdict.as_str()).increment(1);
    histogram!("scam_final_score").record(f64::from(score));
    histogram!("scam_analysis_duration_ms").record(elapsed_ms);
}

pub fn record_unavailable(provider: ProviderId) {
    counter!("scam_provider_unavailable_total", "provider" => provider.as_str()).increment(1);
}
