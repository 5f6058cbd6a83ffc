//! Campaign response reader port (read side).
//!
//! Supplies the answered assignments of a campaign joined with the question
//! definition and the respondent's display data. Only assignments that carry
//! an answer are returned.

use async_trait::async_trait;

use crate::domain::divergence::AnsweredAssignmentRow;
use crate::domain::foundation::{CampaignId, DomainError};

/// Reader port for the answers divergence analysis works on.
#[async_trait]
pub trait CampaignResponseReader: Send + Sync {
    /// Every answered assignment of the campaign.
    ///
    /// Rows of the same question come back in a stable order; an unknown
    /// campaign yields an empty list.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on read failure
    async fn fetch_answered(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<AnsweredAssignmentRow>, DomainError>;
}
