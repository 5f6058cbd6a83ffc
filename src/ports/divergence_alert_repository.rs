//! Divergence alert repository port.
//!
//! # Design
//!
//! - **Check-then-act**: callers read with `find_unresolved`, decide in the
//!   domain, then hand every resulting write to `apply` in one call
//! - **Atomic batches**: `apply` stores all writes or none of them
//! - **No deletes**: alerts are only created, refreshed and resolved
//! - **Resolution is final**: an update never lands on a stored alert that is
//!   already resolved, so a stale candidate cannot reopen it

use async_trait::async_trait;

use crate::domain::divergence::{AlertWrite, DivergenceAlert};
use crate::domain::foundation::{AlertId, CampaignId, DomainError, QuestionId};

/// Repository port for DivergenceAlert persistence.
#[async_trait]
pub trait DivergenceAlertRepository: Send + Sync {
    /// The open alert for a question, if any.
    async fn find_unresolved(
        &self,
        campaign_id: &CampaignId,
        question_id: &QuestionId,
    ) -> Result<Option<DivergenceAlert>, DomainError>;

    /// Find an alert by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &AlertId) -> Result<Option<DivergenceAlert>, DomainError>;

    /// All alerts of a campaign, resolved or not, oldest first.
    async fn list_by_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<DivergenceAlert>, DomainError>;

    /// Apply a batch of creates and updates in one transaction.
    ///
    /// # Errors
    ///
    /// - `AlertNotFound` if an update targets a missing alert
    /// - `AlertAlreadyResolved` if an update targets an alert resolved since
    ///   it was read
    /// - `DatabaseError` on persistence failure
    ///
    /// Nothing is stored when an error is returned.
    async fn apply(&self, writes: &[AlertWrite]) -> Result<(), DomainError>;

    /// Update an existing alert.
    ///
    /// # Errors
    ///
    /// - `AlertNotFound` if the alert doesn't exist
    /// - `AlertAlreadyResolved` if the stored alert is already resolved
    /// - `DatabaseError` on persistence failure
    async fn update(&self, alert: &DivergenceAlert) -> Result<(), DomainError>;
}
