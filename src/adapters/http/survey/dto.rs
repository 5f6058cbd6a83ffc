//! Request and response bodies for the survey endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::application::{RejectedAnswer, SubmitAnswersResult, SubmittedAnswer};
use crate::domain::foundation::AssignmentId;

/// Body of `POST /api/campaigns/:campaign_id/respondents/:respondent_id/answers`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerInput {
    pub assignment_id: AssignmentId,
    #[serde(default)]
    pub answer: JsonValue,
    #[serde(default)]
    pub time_spent_seconds: Option<u32>,
}

impl From<AnswerInput> for SubmittedAnswer {
    fn from(input: AnswerInput) -> Self {
        Self {
            assignment_id: input.assignment_id,
            answer: input.answer,
            time_spent_seconds: input.time_spent_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedAnswerView {
    pub assignment_id: AssignmentId,
    pub code: String,
    pub message: String,
}

impl From<RejectedAnswer> for RejectedAnswerView {
    fn from(rejected: RejectedAnswer) -> Self {
        Self {
            assignment_id: rejected.assignment_id,
            code: rejected.code.to_string(),
            message: rejected.message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswersResponse {
    pub saved: usize,
    pub errors: Vec<RejectedAnswerView>,
    pub completed: bool,
}

impl From<SubmitAnswersResult> for SubmitAnswersResponse {
    fn from(result: SubmitAnswersResult) -> Self {
        Self {
            saved: result.saved,
            errors: result.errors.into_iter().map(RejectedAnswerView::from).collect(),
            completed: result.completed,
        }
    }
}
