//! HTTP handlers for survey endpoints.

use std::sync::Arc;

use axum::extract::{Json, Path, State};

use crate::application::{SubmitAnswersCommand, SubmitAnswersHandler};
use crate::domain::foundation::{CampaignId, RespondentId};
use crate::ports::{EventPublisher, SurveyAnswerRepository};

use super::super::error::ApiError;
use super::dto::{SubmitAnswersRequest, SubmitAnswersResponse};

/// Shared application state containing survey dependencies.
#[derive(Clone)]
pub struct SurveyAppState {
    pub answer_repository: Arc<dyn SurveyAnswerRepository>,
    pub event_publisher: Arc<dyn EventPublisher>,
}

impl SurveyAppState {
    pub fn new(
        answer_repository: Arc<dyn SurveyAnswerRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            answer_repository,
            event_publisher,
        }
    }

    pub fn submit_answers_handler(&self) -> SubmitAnswersHandler {
        SubmitAnswersHandler::new(self.answer_repository.clone(), self.event_publisher.clone())
    }
}

/// POST /api/campaigns/:campaign_id/respondents/:respondent_id/answers
///
/// Rejected answers are listed in the body; the request itself only fails
/// when nothing could be processed at all.
pub async fn submit_answers(
    State(state): State<SurveyAppState>,
    Path((campaign_id, respondent_id)): Path<(String, String)>,
    Json(request): Json<SubmitAnswersRequest>,
) -> Result<Json<SubmitAnswersResponse>, ApiError> {
    let campaign_id: CampaignId = campaign_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid campaign ID format".to_string()))?;
    let respondent_id: RespondentId = respondent_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid respondent ID format".to_string()))?;

    if request.answers.is_empty() {
        return Err(ApiError::BadRequest("No answers submitted".to_string()));
    }

    let result = state
        .submit_answers_handler()
        .handle(SubmitAnswersCommand {
            respondent_id,
            campaign_id,
            answers: request.answers.into_iter().map(Into::into).collect(),
        })
        .await?;

    Ok(Json(SubmitAnswersResponse::from(result)))
}
