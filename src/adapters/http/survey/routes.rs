//! HTTP routes for survey endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{submit_answers, SurveyAppState};

/// Creates the survey router with all routes.
pub fn survey_routes(state: SurveyAppState) -> Router {
    Router::new()
        // POST /api/campaigns/:campaign_id/respondents/:respondent_id/answers
        .route(
            "/api/campaigns/:campaign_id/respondents/:respondent_id/answers",
            post(submit_answers),
        )
        .with_state(state)
}
