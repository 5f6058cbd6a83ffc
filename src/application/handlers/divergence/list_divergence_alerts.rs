//! ListDivergenceAlertsHandler - Query handler for the alerts of a campaign.

use std::sync::Arc;

use crate::domain::divergence::DivergenceAlert;
use crate::domain::foundation::{CampaignId, DomainError};
use crate::ports::DivergenceAlertRepository;

/// Query for the alerts of a campaign.
#[derive(Debug, Clone)]
pub struct ListDivergenceAlertsQuery {
    pub campaign_id: CampaignId,
    /// Leave out alerts that have been resolved.
    pub unresolved_only: bool,
}

/// Handler for listing divergence alerts, oldest first.
pub struct ListDivergenceAlertsHandler {
    repository: Arc<dyn DivergenceAlertRepository>,
}

impl ListDivergenceAlertsHandler {
    pub fn new(repository: Arc<dyn DivergenceAlertRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: ListDivergenceAlertsQuery,
    ) -> Result<Vec<DivergenceAlert>, DomainError> {
        let mut alerts = self.repository.list_by_campaign(&query.campaign_id).await?;
        if query.unresolved_only {
            alerts.retain(|a| !a.is_resolved);
        }
        alerts.sort_by_key(|a| a.created_at);
        Ok(alerts)
    }
}
