//! GetDivergenceSummaryHandler - Query handler for per-campaign alert counts.

use std::sync::Arc;

use crate::domain::divergence::DivergenceSummary;
use crate::domain::foundation::{CampaignId, DomainError};
use crate::ports::DivergenceAlertRepository;

/// Query for the divergence summary of a campaign.
#[derive(Debug, Clone)]
pub struct GetDivergenceSummaryQuery {
    pub campaign_id: CampaignId,
}

/// Handler for retrieving divergence summaries. Read-only.
pub struct GetDivergenceSummaryHandler {
    repository: Arc<dyn DivergenceAlertRepository>,
}

impl GetDivergenceSummaryHandler {
    pub fn new(repository: Arc<dyn DivergenceAlertRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        query: GetDivergenceSummaryQuery,
    ) -> Result<DivergenceSummary, DomainError> {
        let alerts = self.repository.list_by_campaign(&query.campaign_id).await?;
        Ok(DivergenceSummary::from_alerts(&alerts))
    }
}
