//! SubmitAnswersHandler - Command handler for a respondent's answers.
//!
//! Each answer is validated against its assignment, scored, and stored on
//! its own; a rejected answer does not stop the rest of the batch. When the
//! respondent has no unanswered assignment left in the campaign, a
//! `RespondentCompleted` event is published so divergences get recalculated.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::domain::foundation::{
    AssignmentId, CampaignId, DomainError, ErrorCode, EventId, RespondentId,
    SerializableDomainEvent, Timestamp,
};
use crate::domain::survey::{AnswerRecord, RespondentCompleted, ScoreCalculator};
use crate::ports::{EventPublisher, SurveyAnswerRepository};

/// One answer as submitted by a respondent.
#[derive(Debug, Clone)]
pub struct SubmittedAnswer {
    pub assignment_id: AssignmentId,
    pub answer: JsonValue,
    pub time_spent_seconds: Option<u32>,
}

/// Command to submit a batch of answers.
#[derive(Debug, Clone)]
pub struct SubmitAnswersCommand {
    pub respondent_id: RespondentId,
    pub campaign_id: CampaignId,
    pub answers: Vec<SubmittedAnswer>,
}

/// An answer that was not stored, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedAnswer {
    pub assignment_id: AssignmentId,
    pub code: ErrorCode,
    pub message: String,
}

/// Result of a submission.
#[derive(Debug, Clone)]
pub struct SubmitAnswersResult {
    pub saved: usize,
    pub errors: Vec<RejectedAnswer>,
    /// Every assignment of the respondent in the campaign has an answer.
    pub completed: bool,
}

/// Handler for submitting answers.
pub struct SubmitAnswersHandler {
    repository: Arc<dyn SurveyAnswerRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl SubmitAnswersHandler {
    pub fn new(
        repository: Arc<dyn SurveyAnswerRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(&self, cmd: SubmitAnswersCommand) -> Result<SubmitAnswersResult, DomainError> {
        let mut saved = 0;
        let mut errors = Vec::new();

        for submitted in cmd.answers {
            let assignment_id = submitted.assignment_id;
            match self
                .save_answer(&cmd.campaign_id, &cmd.respondent_id, submitted)
                .await
            {
                Ok(()) => saved += 1,
                Err(e) if is_item_error(&e) => errors.push(RejectedAnswer {
                    assignment_id,
                    code: e.code,
                    message: e.message,
                }),
                Err(e) => return Err(e),
            }
        }

        let unanswered = self
            .repository
            .count_unanswered(&cmd.campaign_id, &cmd.respondent_id)
            .await?;
        let completed = unanswered == 0;

        info!(
            campaign_id = %cmd.campaign_id,
            respondent_id = %cmd.respondent_id,
            saved,
            rejected = errors.len(),
            completed,
            "Answers submitted"
        );

        if completed && saved > 0 {
            self.announce_completion(cmd.campaign_id, cmd.respondent_id).await;
        }

        Ok(SubmitAnswersResult {
            saved,
            errors,
            completed,
        })
    }

    async fn save_answer(
        &self,
        campaign_id: &CampaignId,
        respondent_id: &RespondentId,
        submitted: SubmittedAnswer,
    ) -> Result<(), DomainError> {
        let not_valid = || {
            DomainError::new(
                ErrorCode::AssignmentNotFound,
                format!("Assignment {} is not valid", submitted.assignment_id),
            )
        };

        let context = self
            .repository
            .find_assignment(&submitted.assignment_id)
            .await?
            .ok_or_else(not_valid)?;

        // Assignments of other respondents are reported like unknown ones.
        if &context.campaign_id != campaign_id || &context.respondent_id != respondent_id {
            return Err(not_valid());
        }

        if context.answered {
            return Err(DomainError::new(
                ErrorCode::AnswerAlreadySubmitted,
                format!("Assignment {} has already been answered", submitted.assignment_id),
            ));
        }

        let score = ScoreCalculator::score(&context.question, &submitted.answer);
        let record = AnswerRecord {
            assignment_id: submitted.assignment_id,
            answer: submitted.answer,
            score: Some(score),
            answered_at: Timestamp::now(),
            time_spent_seconds: submitted.time_spent_seconds,
        };

        self.repository.record_answer(&record).await
    }

    async fn announce_completion(&self, campaign_id: CampaignId, respondent_id: RespondentId) {
        let event = RespondentCompleted {
            event_id: EventId::new(),
            campaign_id,
            respondent_id,
            completed_at: Timestamp::now(),
        };

        if let Err(e) = self.event_publisher.publish(event.to_envelope()).await {
            warn!(
                campaign_id = %campaign_id,
                respondent_id = %respondent_id,
                error = %e,
                "Failed to publish respondent completion"
            );
        }
    }
}

fn is_item_error(err: &DomainError) -> bool {
    matches!(
        err.code,
        ErrorCode::AssignmentNotFound | ErrorCode::AnswerAlreadySubmitted | ErrorCode::ValidationFailed
    )
}
