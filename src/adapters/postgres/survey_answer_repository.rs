//! PostgreSQL implementation of SurveyAnswerRepository.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    AssignmentId, CampaignId, DomainError, ErrorCode, QuestionId, RespondentId,
};
use crate::domain::survey::{AnswerRecord, AssignmentContext, QuestionDefinition, QuestionOption};
use crate::ports::SurveyAnswerRepository;

use super::parse_answer_type;

/// PostgreSQL implementation of the SurveyAnswerRepository port.
pub struct PostgresSurveyAnswerRepository {
    pool: PgPool,
}

impl PostgresSurveyAnswerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    assignment_id: Uuid,
    campaign_id: Uuid,
    respondent_id: Uuid,
    question_id: Uuid,
    answer_type: String,
    options: Json<Vec<QuestionOption>>,
    max_score: f64,
    answered: bool,
}

impl TryFrom<AssignmentRow> for AssignmentContext {
    type Error = DomainError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let question = QuestionDefinition::new(
            QuestionId::from_uuid(row.question_id),
            parse_answer_type(&row.answer_type)?,
        )
        .with_options(row.options.0)
        .with_max_score(row.max_score);

        Ok(AssignmentContext {
            assignment_id: AssignmentId::from_uuid(row.assignment_id),
            campaign_id: CampaignId::from_uuid(row.campaign_id),
            respondent_id: RespondentId::from_uuid(row.respondent_id),
            question,
            answered: row.answered,
        })
    }
}

#[async_trait]
impl SurveyAnswerRepository for PostgresSurveyAnswerRepository {
    async fn find_assignment(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<AssignmentContext>, DomainError> {
        let row: Option<AssignmentRow> = sqlx::query_as(
            r#"
            SELECT
                a.id AS assignment_id,
                a.campaign_id,
                a.respondent_id,
                q.id AS question_id,
                q.answer_type,
                q.options,
                q.max_score,
                EXISTS (SELECT 1 FROM answers ans WHERE ans.assignment_id = a.id) AS answered
            FROM assignments a
            JOIN questions q ON q.id = a.question_id
            WHERE a.id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch assignment", e))?;

        row.map(AssignmentContext::try_from).transpose()
    }

    async fn record_answer(&self, answer: &AnswerRecord) -> Result<(), DomainError> {
        let time_spent = answer.time_spent_seconds.map(|s| i32::try_from(s).unwrap_or(i32::MAX));

        sqlx::query(
            r#"
            INSERT INTO answers (assignment_id, answer, score, answered_at, time_spent_seconds)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(answer.assignment_id.as_uuid())
        .bind(&answer.answer)
        .bind(answer.score)
        .bind(answer.answered_at.as_datetime())
        .bind(time_spent)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                match db_err.constraint() {
                    Some("answers_pkey") => {
                        return DomainError::new(
                            ErrorCode::AnswerAlreadySubmitted,
                            format!("Assignment {} has already been answered", answer.assignment_id),
                        );
                    }
                    Some("answers_assignment_id_fkey") => {
                        return DomainError::new(
                            ErrorCode::AssignmentNotFound,
                            format!("Assignment {} is not valid", answer.assignment_id),
                        );
                    }
                    _ => {}
                }
            }
            DomainError::database("Failed to record answer", e)
        })?;

        Ok(())
    }

    async fn count_unanswered(
        &self,
        campaign_id: &CampaignId,
        respondent_id: &RespondentId,
    ) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM assignments a
            LEFT JOIN answers ans ON ans.assignment_id = a.id
            WHERE a.campaign_id = $1
              AND a.respondent_id = $2
              AND ans.assignment_id IS NULL
            "#,
        )
        .bind(campaign_id.as_uuid())
        .bind(respondent_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to count unanswered assignments", e))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}
