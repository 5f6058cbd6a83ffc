//! Survey answer repository port.
//!
//! Covers the write path of a respondent submitting answers: resolving an
//! assignment, storing the scored answer, and checking completion.

use async_trait::async_trait;

use crate::domain::foundation::{AssignmentId, CampaignId, DomainError, RespondentId};
use crate::domain::survey::{AnswerRecord, AssignmentContext};

/// Repository port for answers to survey assignments.
#[async_trait]
pub trait SurveyAnswerRepository: Send + Sync {
    /// Load an assignment with its question definition.
    ///
    /// Returns `None` if not found.
    async fn find_assignment(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<AssignmentContext>, DomainError>;

    /// Store the answer of an assignment.
    ///
    /// # Errors
    ///
    /// - `AssignmentNotFound` if the assignment doesn't exist
    /// - `AnswerAlreadySubmitted` if the assignment already has an answer
    /// - `DatabaseError` on persistence failure
    async fn record_answer(&self, answer: &AnswerRecord) -> Result<(), DomainError>;

    /// Number of the respondent's assignments in the campaign still without an answer.
    async fn count_unanswered(
        &self,
        campaign_id: &CampaignId,
        respondent_id: &RespondentId,
    ) -> Result<u64, DomainError>;
}
