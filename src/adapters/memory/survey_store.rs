//! In-memory survey store.
//!
//! Holds respondents, questions, assignments and answers in one place and
//! implements both the answer read port and the answer write port over them.
//! Seeding happens through the inherent methods; there is no campaign
//! management beyond what the ports need.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::divergence::AnsweredAssignmentRow;
use crate::domain::foundation::{
    AssignmentId, CampaignId, DomainError, ErrorCode, QuestionId, RespondentId,
};
use crate::domain::survey::{AnswerRecord, AssignmentContext, QuestionDefinition};
use crate::ports::{CampaignResponseReader, SurveyAnswerRepository};

use super::poisoned;

#[derive(Debug, Clone)]
struct Respondent {
    name: String,
    group_name: String,
}

#[derive(Debug, Clone, Copy)]
struct Assignment {
    id: AssignmentId,
    campaign_id: CampaignId,
    question_id: QuestionId,
    respondent_id: RespondentId,
}

#[derive(Default)]
struct SurveyState {
    respondents: HashMap<RespondentId, Respondent>,
    questions: HashMap<QuestionId, QuestionDefinition>,
    /// Insertion order.
    assignments: Vec<Assignment>,
    answers: HashMap<AssignmentId, AnswerRecord>,
}

impl SurveyState {
    fn context(&self, assignment: &Assignment) -> Result<AssignmentContext, DomainError> {
        let question = self.questions.get(&assignment.question_id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Question {} is not registered", assignment.question_id),
            )
        })?;

        Ok(AssignmentContext {
            assignment_id: assignment.id,
            campaign_id: assignment.campaign_id,
            respondent_id: assignment.respondent_id,
            question: question.clone(),
            answered: self.answers.contains_key(&assignment.id),
        })
    }
}

/// In-memory implementation of `CampaignResponseReader` and `SurveyAnswerRepository`.
#[derive(Default)]
pub struct InMemorySurveyStore {
    state: RwLock<SurveyState>,
}

impl InMemorySurveyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a respondent and returns its id.
    pub fn add_respondent(
        &self,
        name: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Result<RespondentId, DomainError> {
        let id = RespondentId::new();
        let mut state = self.state.write().map_err(|_| poisoned("survey store"))?;
        state.respondents.insert(
            id,
            Respondent {
                name: name.into(),
                group_name: group_name.into(),
            },
        );
        Ok(id)
    }

    /// Registers (or replaces) a question definition.
    pub fn add_question(&self, question: QuestionDefinition) -> Result<QuestionId, DomainError> {
        let id = question.id;
        let mut state = self.state.write().map_err(|_| poisoned("survey store"))?;
        state.questions.insert(id, question);
        Ok(id)
    }

    /// Assigns a registered question to a registered respondent in a campaign.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if the question or the respondent is unknown.
    pub fn assign(
        &self,
        campaign_id: CampaignId,
        question_id: QuestionId,
        respondent_id: RespondentId,
    ) -> Result<AssignmentId, DomainError> {
        let mut state = self.state.write().map_err(|_| poisoned("survey store"))?;
        if !state.questions.contains_key(&question_id) {
            return Err(DomainError::validation("question_id", "Unknown question"));
        }
        if !state.respondents.contains_key(&respondent_id) {
            return Err(DomainError::validation("respondent_id", "Unknown respondent"));
        }

        let id = AssignmentId::new();
        state.assignments.push(Assignment {
            id,
            campaign_id,
            question_id,
            respondent_id,
        });
        Ok(id)
    }

    /// Number of stored answers.
    pub fn answer_count(&self) -> usize {
        self.state.read().map(|s| s.answers.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CampaignResponseReader for InMemorySurveyStore {
    async fn fetch_answered(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<AnsweredAssignmentRow>, DomainError> {
        let state = self.state.read().map_err(|_| poisoned("survey store"))?;

        let mut answered: Vec<(&Assignment, &AnswerRecord)> = state
            .assignments
            .iter()
            .filter(|a| &a.campaign_id == campaign_id)
            .filter_map(|a| state.answers.get(&a.id).map(|answer| (a, answer)))
            .collect();
        answered.sort_by_key(|(_, answer)| answer.answered_at);

        answered
            .into_iter()
            .map(|(assignment, answer)| {
                let question = state.questions.get(&assignment.question_id);
                let respondent = state.respondents.get(&assignment.respondent_id);
                match (question, respondent) {
                    (Some(question), Some(respondent)) => Ok(AnsweredAssignmentRow {
                        question_id: assignment.question_id,
                        respondent_id: assignment.respondent_id,
                        respondent_name: respondent.name.clone(),
                        group_name: respondent.group_name.clone(),
                        answer: answer.answer.clone(),
                        score: answer.score,
                        answer_type: question.answer_type,
                        options: question.options.clone(),
                    }),
                    _ => Err(DomainError::new(
                        ErrorCode::InternalError,
                        format!("Assignment {} references unknown data", assignment.id),
                    )),
                }
            })
            .collect()
    }
}

#[async_trait]
impl SurveyAnswerRepository for InMemorySurveyStore {
    async fn find_assignment(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<AssignmentContext>, DomainError> {
        let state = self.state.read().map_err(|_| poisoned("survey store"))?;
        state
            .assignments
            .iter()
            .find(|a| &a.id == id)
            .map(|a| state.context(a))
            .transpose()
    }

    async fn record_answer(&self, answer: &AnswerRecord) -> Result<(), DomainError> {
        let mut state = self.state.write().map_err(|_| poisoned("survey store"))?;

        if !state.assignments.iter().any(|a| a.id == answer.assignment_id) {
            return Err(DomainError::new(
                ErrorCode::AssignmentNotFound,
                format!("Assignment {} is not valid", answer.assignment_id),
            ));
        }
        if state.answers.contains_key(&answer.assignment_id) {
            return Err(DomainError::new(
                ErrorCode::AnswerAlreadySubmitted,
                format!("Assignment {} has already been answered", answer.assignment_id),
            ));
        }

        state.answers.insert(answer.assignment_id, answer.clone());
        Ok(())
    }

    async fn count_unanswered(
        &self,
        campaign_id: &CampaignId,
        respondent_id: &RespondentId,
    ) -> Result<u64, DomainError> {
        let state = self.state.read().map_err(|_| poisoned("survey store"))?;
        let count = state
            .assignments
            .iter()
            .filter(|a| &a.campaign_id == campaign_id && &a.respondent_id == respondent_id)
            .filter(|a| !state.answers.contains_key(&a.id))
            .count();
        Ok(count as u64)
    }
}
