//! HTTP routes for divergence endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    get_divergence_summary, list_divergence_alerts, recalculate_divergences,
    resolve_divergence_alert, DivergenceAppState,
};

/// Creates the divergence router with all routes.
pub fn divergence_routes(state: DivergenceAppState) -> Router {
    Router::new()
        // POST /api/campaigns/:campaign_id/divergences/recalculate
        .route(
            "/api/campaigns/:campaign_id/divergences/recalculate",
            post(recalculate_divergences),
        )
        // GET /api/campaigns/:campaign_id/divergences/summary
        .route(
            "/api/campaigns/:campaign_id/divergences/summary",
            get(get_divergence_summary),
        )
        // GET /api/campaigns/:campaign_id/divergences
        .route(
            "/api/campaigns/:campaign_id/divergences",
            get(list_divergence_alerts),
        )
        // POST /api/divergences/:alert_id/resolve
        .route(
            "/api/divergences/:alert_id/resolve",
            post(resolve_divergence_alert),
        )
        .with_state(state)
}
