//! Request and response bodies for the divergence endpoints.

use serde::{Deserialize, Serialize};

use crate::application::RecalculationOutcome;
use crate::domain::divergence::{AlertSeverity, DivergenceAlert, DivergenceSummary, ResponseSnapshot};
use crate::domain::foundation::{AdminId, AlertId, CampaignId, QuestionId, Timestamp};

/// Response of `POST /api/campaigns/:campaign_id/divergences/recalculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecalculateResponse {
    /// Alerts raised or refreshed by this run.
    pub alerts_touched: usize,
    pub created: usize,
    pub updated: usize,
    /// Campaign-wide counts after the run.
    pub summary: DivergenceSummary,
}

impl RecalculateResponse {
    pub fn new(outcome: &RecalculationOutcome, summary: DivergenceSummary) -> Self {
        Self {
            alerts_touched: outcome.alerts.len(),
            created: outcome.created,
            updated: outcome.updated,
            summary,
        }
    }
}

/// One alert as returned by the list and resolve endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceAlertView {
    pub id: AlertId,
    pub campaign_id: CampaignId,
    pub question_id: QuestionId,
    pub severity: AlertSeverity,
    pub dispersion: Option<f64>,
    pub responses: Vec<ResponseSnapshot>,
    pub is_resolved: bool,
    pub resolved_at: Option<Timestamp>,
    pub resolved_by: Option<AdminId>,
    pub resolution_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<DivergenceAlert> for DivergenceAlertView {
    fn from(alert: DivergenceAlert) -> Self {
        Self {
            id: alert.id,
            campaign_id: alert.campaign_id,
            question_id: alert.question_id,
            severity: alert.severity,
            dispersion: alert.dispersion,
            responses: alert.responses,
            is_resolved: alert.is_resolved,
            resolved_at: alert.resolved_at,
            resolved_by: alert.resolved_by,
            resolution_notes: alert.resolution_notes,
            created_at: alert.created_at,
            updated_at: alert.updated_at,
        }
    }
}

/// Body of `POST /api/divergences/:alert_id/resolve`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveAlertRequest {
    #[serde(default)]
    pub resolution_notes: Option<String>,
}

/// Query parameters of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAlertsParams {
    #[serde(default)]
    pub unresolved_only: bool,
}
