//! Survey domain events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, CampaignId, EventId, RespondentId, Timestamp};

/// Event type published when a respondent has answered every assignment.
pub const RESPONDENT_COMPLETED_EVENT: &str = "survey.respondent_completed.v1";

/// Published when every assignment of a respondent in a campaign has an answer.
///
/// Divergence recalculation subscribes to this event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondentCompleted {
    pub event_id: EventId,
    pub campaign_id: CampaignId,
    pub respondent_id: RespondentId,
    pub completed_at: Timestamp,
}

domain_event!(
    RespondentCompleted,
    event_type = "survey.respondent_completed.v1",
    aggregate_id = campaign_id,
    aggregate_type = "Campaign",
    occurred_at = completed_at,
    event_id = event_id
);
