//! PostgreSQL implementation of CampaignResponseReader.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::divergence::AnsweredAssignmentRow;
use crate::domain::foundation::{CampaignId, DomainError, QuestionId, RespondentId};
use crate::domain::survey::QuestionOption;
use crate::ports::CampaignResponseReader;

use super::parse_answer_type;

/// Reads answered assignments joined with question and respondent data.
pub struct PostgresCampaignResponseReader {
    pool: PgPool,
}

impl PostgresCampaignResponseReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AnsweredRow {
    question_id: Uuid,
    respondent_id: Uuid,
    respondent_name: String,
    group_name: String,
    answer: serde_json::Value,
    score: Option<f64>,
    answer_type: String,
    options: Json<Vec<QuestionOption>>,
}

impl TryFrom<AnsweredRow> for AnsweredAssignmentRow {
    type Error = DomainError;

    fn try_from(row: AnsweredRow) -> Result<Self, Self::Error> {
        Ok(AnsweredAssignmentRow {
            question_id: QuestionId::from_uuid(row.question_id),
            respondent_id: RespondentId::from_uuid(row.respondent_id),
            respondent_name: row.respondent_name,
            group_name: row.group_name,
            answer: row.answer,
            score: row.score,
            answer_type: parse_answer_type(&row.answer_type)?,
            options: row.options.0,
        })
    }
}

#[async_trait]
impl CampaignResponseReader for PostgresCampaignResponseReader {
    async fn fetch_answered(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<AnsweredAssignmentRow>, DomainError> {
        let rows: Vec<AnsweredRow> = sqlx::query_as(
            r#"
            SELECT
                a.question_id,
                a.respondent_id,
                r.full_name AS respondent_name,
                COALESCE(g.name, 'Unassigned') AS group_name,
                ans.answer,
                ans.score,
                q.answer_type,
                q.options
            FROM assignments a
            JOIN answers ans ON ans.assignment_id = a.id
            JOIN questions q ON q.id = a.question_id
            JOIN respondents r ON r.id = a.respondent_id
            LEFT JOIN respondent_groups g ON g.id = r.group_id
            WHERE a.campaign_id = $1
            ORDER BY a.question_id, ans.answered_at, a.id
            "#,
        )
        .bind(campaign_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch campaign answers", e))?;

        rows.into_iter().map(AnsweredAssignmentRow::try_from).collect()
    }
}
