//! HTTP adapters - REST API implementations.
//!
//! Each domain module has its own HTTP adapter for endpoint exposure;
//! [`api_router`] merges them with the health endpoint.

pub mod divergence;
pub mod error;
pub mod survey;

use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

pub use divergence::{divergence_routes, DivergenceAppState};
pub use error::{ApiError, ErrorResponse};
pub use survey::{survey_routes, SurveyAppState};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Creates the full API router.
pub fn api_router(divergence: DivergenceAppState, survey: SurveyAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(divergence_routes(divergence))
        .merge(survey_routes(survey))
}
