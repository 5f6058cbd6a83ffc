//! PostgreSQL implementation of DivergenceAlertRepository.
//!
//! Answer snapshots live in the `responses_data` JSONB column. A partial
//! unique index backs the one-open-alert-per-question rule.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::divergence::{AlertSeverity, AlertWrite, DivergenceAlert, ResponseSnapshot};
use crate::domain::foundation::{
    AdminId, AlertId, CampaignId, DomainError, ErrorCode, QuestionId, Timestamp,
};
use crate::ports::DivergenceAlertRepository;

const ALERT_COLUMNS: &str = r#"
    id, campaign_id, question_id, severity, dispersion, responses_data,
    is_resolved, resolved_at, resolved_by, resolution_notes, created_at, updated_at
"#;

/// PostgreSQL implementation of the DivergenceAlertRepository port.
pub struct PostgresDivergenceAlertRepository {
    pool: PgPool,
}

impl PostgresDivergenceAlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a divergence alert.
#[derive(Debug, sqlx::FromRow)]
struct DivergenceAlertRow {
    id: Uuid,
    campaign_id: Uuid,
    question_id: Uuid,
    severity: String,
    dispersion: Option<f64>,
    responses_data: Json<Vec<ResponseSnapshot>>,
    is_resolved: bool,
    resolved_at: Option<DateTime<Utc>>,
    resolved_by: Option<Uuid>,
    resolution_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DivergenceAlertRow> for DivergenceAlert {
    type Error = DomainError;

    fn try_from(row: DivergenceAlertRow) -> Result<Self, Self::Error> {
        let severity: AlertSeverity = row.severity.parse().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid severity value: {}", e))
        })?;

        Ok(DivergenceAlert {
            id: AlertId::from_uuid(row.id),
            campaign_id: CampaignId::from_uuid(row.campaign_id),
            question_id: QuestionId::from_uuid(row.question_id),
            severity,
            dispersion: row.dispersion,
            responses: row.responses_data.0,
            is_resolved: row.is_resolved,
            resolved_at: row.resolved_at.map(Timestamp::from_datetime),
            resolved_by: row.resolved_by.map(AdminId::from_uuid),
            resolution_notes: row.resolution_notes,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

async fn insert_alert(conn: &mut PgConnection, alert: &DivergenceAlert) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO divergence_alerts (
            id, campaign_id, question_id, severity, dispersion, responses_data,
            is_resolved, resolved_at, resolved_by, resolution_notes, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(alert.id.as_uuid())
    .bind(alert.campaign_id.as_uuid())
    .bind(alert.question_id.as_uuid())
    .bind(alert.severity.as_str())
    .bind(alert.dispersion)
    .bind(Json(&alert.responses))
    .bind(alert.is_resolved)
    .bind(alert.resolved_at.as_ref().map(|t| *t.as_datetime()))
    .bind(alert.resolved_by.as_ref().map(|a| *a.as_uuid()))
    .bind(&alert.resolution_notes)
    .bind(alert.created_at.as_datetime())
    .bind(alert.updated_at.as_datetime())
    .execute(conn)
    .await
    .map_err(|e| DomainError::database("Failed to insert divergence alert", e))?;

    Ok(())
}

/// Writes an update, guarded by `NOT is_resolved`.
///
/// An unresolved alert is a refresh and only touches its measurements. A
/// resolved alert carries the resolution and writes that as well.
async fn update_alert(conn: &mut PgConnection, alert: &DivergenceAlert) -> Result<(), DomainError> {
    let query = if alert.is_resolved {
        sqlx::query(
            r#"
            UPDATE divergence_alerts SET
                severity = $2,
                dispersion = $3,
                responses_data = $4,
                updated_at = $5,
                is_resolved = TRUE,
                resolved_at = $6,
                resolved_by = $7,
                resolution_notes = $8
            WHERE id = $1 AND NOT is_resolved
            "#,
        )
        .bind(alert.id.as_uuid())
        .bind(alert.severity.as_str())
        .bind(alert.dispersion)
        .bind(Json(&alert.responses))
        .bind(alert.updated_at.as_datetime())
        .bind(alert.resolved_at.as_ref().map(|t| *t.as_datetime()))
        .bind(alert.resolved_by.as_ref().map(|a| *a.as_uuid()))
        .bind(&alert.resolution_notes)
    } else {
        sqlx::query(
            r#"
            UPDATE divergence_alerts SET
                severity = $2,
                dispersion = $3,
                responses_data = $4,
                updated_at = $5
            WHERE id = $1 AND NOT is_resolved
            "#,
        )
        .bind(alert.id.as_uuid())
        .bind(alert.severity.as_str())
        .bind(alert.dispersion)
        .bind(Json(&alert.responses))
        .bind(alert.updated_at.as_datetime())
    };

    let result = query
        .execute(&mut *conn)
        .await
        .map_err(|e| DomainError::database("Failed to update divergence alert", e))?;

    if result.rows_affected() == 0 {
        return Err(missing_or_resolved(conn, alert).await);
    }

    Ok(())
}

/// Explains why a guarded update matched no row.
async fn missing_or_resolved(conn: &mut PgConnection, alert: &DivergenceAlert) -> DomainError {
    let exists: Result<bool, _> =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM divergence_alerts WHERE id = $1)")
            .bind(alert.id.as_uuid())
            .fetch_one(conn)
            .await;

    match exists {
        Ok(true) => DomainError::new(
            ErrorCode::AlertAlreadyResolved,
            format!("Divergence alert {} is already resolved", alert.id),
        ),
        Ok(false) => DomainError::new(
            ErrorCode::AlertNotFound,
            format!("Divergence alert {} not found", alert.id),
        ),
        Err(e) => DomainError::database("Failed to check divergence alert", e),
    }
}

#[async_trait]
impl DivergenceAlertRepository for PostgresDivergenceAlertRepository {
    async fn find_unresolved(
        &self,
        campaign_id: &CampaignId,
        question_id: &QuestionId,
    ) -> Result<Option<DivergenceAlert>, DomainError> {
        let sql = format!(
            "SELECT {} FROM divergence_alerts \
             WHERE campaign_id = $1 AND question_id = $2 AND NOT is_resolved \
             LIMIT 1",
            ALERT_COLUMNS
        );

        let row: Option<DivergenceAlertRow> = sqlx::query_as(&sql)
            .bind(campaign_id.as_uuid())
            .bind(question_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch open divergence alert", e))?;

        row.map(DivergenceAlert::try_from).transpose()
    }

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<DivergenceAlert>, DomainError> {
        let sql = format!("SELECT {} FROM divergence_alerts WHERE id = $1", ALERT_COLUMNS);

        let row: Option<DivergenceAlertRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch divergence alert", e))?;

        row.map(DivergenceAlert::try_from).transpose()
    }

    async fn list_by_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<DivergenceAlert>, DomainError> {
        let sql = format!(
            "SELECT {} FROM divergence_alerts WHERE campaign_id = $1 ORDER BY created_at, id",
            ALERT_COLUMNS
        );

        let rows: Vec<DivergenceAlertRow> = sqlx::query_as(&sql)
            .bind(campaign_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to list divergence alerts", e))?;

        rows.into_iter().map(DivergenceAlert::try_from).collect()
    }

    async fn apply(&self, writes: &[AlertWrite]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to start transaction", e))?;

        // An early return drops `tx`, which rolls the batch back.
        for write in writes {
            match write {
                AlertWrite::Create(alert) => insert_alert(&mut *tx, alert).await?,
                AlertWrite::Update(alert) => update_alert(&mut *tx, alert).await?,
            }
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn update(&self, alert: &DivergenceAlert) -> Result<(), DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DomainError::database("Failed to acquire connection", e))?;

        update_alert(&mut *conn, alert).await
    }
}
