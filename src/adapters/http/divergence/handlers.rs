//! HTTP handlers for divergence endpoints.
//!
//! These handlers connect Axum routes to application layer handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{FromRequestParts, Json, Path, Query, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::{
    GetDivergenceSummaryHandler, GetDivergenceSummaryQuery, ListDivergenceAlertsHandler,
    ListDivergenceAlertsQuery, RecalculateDivergencesCommand, RecalculateDivergencesHandler,
    ResolveDivergenceAlertCommand, ResolveDivergenceAlertHandler,
};
use crate::domain::divergence::DivergenceSummary;
use crate::domain::foundation::{AdminId, AlertId, CampaignId};
use crate::ports::{CampaignResponseReader, DivergenceAlertRepository, EventPublisher};

use super::super::error::{ApiError, ErrorResponse};
use super::dto::{DivergenceAlertView, ListAlertsParams, RecalculateResponse, ResolveAlertRequest};

/// Header carrying the acting administrator.
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing divergence dependencies.
#[derive(Clone)]
pub struct DivergenceAppState {
    pub reader: Arc<dyn CampaignResponseReader>,
    pub alert_repository: Arc<dyn DivergenceAlertRepository>,
    pub event_publisher: Arc<dyn EventPublisher>,
}

impl DivergenceAppState {
    pub fn new(
        reader: Arc<dyn CampaignResponseReader>,
        alert_repository: Arc<dyn DivergenceAlertRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            reader,
            alert_repository,
            event_publisher,
        }
    }

    pub fn recalculate_handler(&self) -> RecalculateDivergencesHandler {
        RecalculateDivergencesHandler::new(
            self.reader.clone(),
            self.alert_repository.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn resolve_handler(&self) -> ResolveDivergenceAlertHandler {
        ResolveDivergenceAlertHandler::new(
            self.alert_repository.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn summary_handler(&self) -> GetDivergenceSummaryHandler {
        GetDivergenceSummaryHandler::new(self.alert_repository.clone())
    }

    pub fn list_handler(&self) -> ListDivergenceAlertsHandler {
        ListDivergenceAlertsHandler::new(self.alert_repository.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Administrator Context
// ════════════════════════════════════════════════════════════════════════════════

/// Administrator identity taken from the `X-Admin-Id` header.
///
/// Stands in for real authentication, which lives outside this service.
#[derive(Debug, Clone, Copy)]
pub struct AdminIdentity {
    pub admin_id: AdminId,
}

/// Rejection type for AdminIdentity extraction.
pub struct AdminIdentityRequired;

impl IntoResponse for AdminIdentityRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::unauthorized("A valid X-Admin-Id header is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
{
    type Rejection = AdminIdentityRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin_id = parts
            .headers
            .get(ADMIN_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<AdminId>().ok())
            .ok_or(AdminIdentityRequired)?;

        Ok(AdminIdentity { admin_id })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

fn parse_resolve_request(body: &[u8]) -> Result<ResolveAlertRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResolveAlertRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

fn parse_campaign_id(raw: &str) -> Result<CampaignId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid campaign ID format".to_string()))
}

/// POST /api/campaigns/:campaign_id/divergences/recalculate
pub async fn recalculate_divergences(
    State(state): State<DivergenceAppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<RecalculateResponse>, ApiError> {
    let campaign_id = parse_campaign_id(&campaign_id)?;

    let outcome = state
        .recalculate_handler()
        .handle(RecalculateDivergencesCommand { campaign_id })
        .await?;
    let summary = state
        .summary_handler()
        .handle(GetDivergenceSummaryQuery { campaign_id })
        .await?;

    Ok(Json(RecalculateResponse::new(&outcome, summary)))
}

/// GET /api/campaigns/:campaign_id/divergences/summary
pub async fn get_divergence_summary(
    State(state): State<DivergenceAppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<DivergenceSummary>, ApiError> {
    let campaign_id = parse_campaign_id(&campaign_id)?;

    let summary = state
        .summary_handler()
        .handle(GetDivergenceSummaryQuery { campaign_id })
        .await?;

    Ok(Json(summary))
}

/// GET /api/campaigns/:campaign_id/divergences?unresolved_only=true
pub async fn list_divergence_alerts(
    State(state): State<DivergenceAppState>,
    Path(campaign_id): Path<String>,
    Query(params): Query<ListAlertsParams>,
) -> Result<Json<Vec<DivergenceAlertView>>, ApiError> {
    let campaign_id = parse_campaign_id(&campaign_id)?;

    let alerts = state
        .list_handler()
        .handle(ListDivergenceAlertsQuery {
            campaign_id,
            unresolved_only: params.unresolved_only,
        })
        .await?;

    Ok(Json(alerts.into_iter().map(DivergenceAlertView::from).collect()))
}

/// POST /api/divergences/:alert_id/resolve
///
/// The body is optional. When present it must be a valid
/// `ResolveAlertRequest`, since a resolution cannot be redone.
pub async fn resolve_divergence_alert(
    State(state): State<DivergenceAppState>,
    Path(alert_id): Path<String>,
    admin: AdminIdentity,
    body: Bytes,
) -> Result<Json<DivergenceAlertView>, ApiError> {
    let alert_id: AlertId = alert_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid alert ID format".to_string()))?;
    let request = parse_resolve_request(&body)?;

    let alert = state
        .resolve_handler()
        .handle(ResolveDivergenceAlertCommand {
            alert_id,
            resolved_by: admin.admin_id,
            resolution_notes: request.resolution_notes,
        })
        .await?;

    Ok(Json(DivergenceAlertView::from(alert)))
}
