//! RecalculateDivergencesHandler - reconciles a campaign's divergence alerts.
//!
//! Reads every answered assignment, analyses each question with at least two
//! respondents, and raises or refreshes one alert per divergent question.
//! Questions that no longer diverge keep their alerts untouched.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::divergence::{
    AlertWrite, DivergenceAlert, DivergenceAlertRaised, DivergenceAlertRefreshed,
    DivergenceAnalyzer, ResponseAggregator,
};
use crate::domain::foundation::{
    CampaignId, DomainError, EventEnvelope, SerializableDomainEvent, Timestamp,
};
use crate::ports::{CampaignResponseReader, DivergenceAlertRepository, EventPublisher};

/// Command to recalculate the divergences of a campaign.
#[derive(Debug, Clone)]
pub struct RecalculateDivergencesCommand {
    pub campaign_id: CampaignId,
}

/// Result of a recalculation.
#[derive(Debug, Clone)]
pub struct RecalculationOutcome {
    pub campaign_id: CampaignId,
    /// Alerts raised or refreshed by this run, in question order.
    pub alerts: Vec<DivergenceAlert>,
    pub created: usize,
    pub updated: usize,
    /// Questions with enough respondents to be analysed.
    pub questions_evaluated: usize,
}

/// Handler for recalculating divergences.
pub struct RecalculateDivergencesHandler {
    reader: Arc<dyn CampaignResponseReader>,
    repository: Arc<dyn DivergenceAlertRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RecalculateDivergencesHandler {
    pub fn new(
        reader: Arc<dyn CampaignResponseReader>,
        repository: Arc<dyn DivergenceAlertRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            reader,
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecalculateDivergencesCommand,
    ) -> Result<RecalculationOutcome, DomainError> {
        let campaign_id = cmd.campaign_id;

        // 1. Read and group answers
        let rows = self.reader.fetch_answered(&campaign_id).await?;
        let groups = ResponseAggregator::group(rows);
        let questions_evaluated = groups.len();

        // 2. Decide one write per divergent question
        let now = Timestamp::now();
        let mut writes = Vec::new();

        for (question_id, group) in groups {
            let assessment = DivergenceAnalyzer::analyze(&group);
            if !assessment.has_divergence {
                continue;
            }

            debug!(
                campaign_id = %campaign_id,
                question_id = %question_id,
                severity = %assessment.severity,
                "Divergence detected"
            );

            let write = match self
                .repository
                .find_unresolved(&campaign_id, &question_id)
                .await?
            {
                Some(mut alert) => {
                    alert.refresh(&assessment, group.responses, now)?;
                    AlertWrite::Update(alert)
                }
                None => AlertWrite::Create(DivergenceAlert::raise(
                    campaign_id,
                    &group,
                    &assessment,
                    now,
                )),
            };
            writes.push(write);
        }

        // 3. Persist atomically
        if !writes.is_empty() {
            self.repository.apply(&writes).await?;
        }

        // 4. Announce, best effort
        self.publish_changes(&writes).await;

        let created = writes.iter().filter(|w| w.is_create()).count();
        let updated = writes.len() - created;

        info!(
            campaign_id = %campaign_id,
            questions_evaluated,
            created,
            updated,
            "Divergences recalculated"
        );

        Ok(RecalculationOutcome {
            campaign_id,
            alerts: writes.into_iter().map(AlertWrite::into_alert).collect(),
            created,
            updated,
            questions_evaluated,
        })
    }

    async fn publish_changes(&self, writes: &[AlertWrite]) {
        if writes.is_empty() {
            return;
        }

        let envelopes: Vec<EventEnvelope> = writes
            .iter()
            .map(|write| match write {
                AlertWrite::Create(alert) => DivergenceAlertRaised::from_alert(alert).to_envelope(),
                AlertWrite::Update(alert) => {
                    DivergenceAlertRefreshed::from_alert(alert).to_envelope()
                }
            })
            .collect();

        if let Err(e) = self.event_publisher.publish_all(envelopes).await {
            warn!(error = %e, "Failed to publish divergence alert events");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::test_support::{MockAlertRepository, MockEventPublisher};
    use crate::domain::divergence::{
        AlertSeverity, AnsweredAssignmentRow, ALERT_RAISED_EVENT, ALERT_REFRESHED_EVENT,
    };
    use crate::domain::foundation::{AdminId, ErrorCode, QuestionId, RespondentId};
    use crate::domain::survey::AnswerType;
    use async_trait::async_trait;
    use serde_json::{json, Value as JsonValue};

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockReader {
        rows: Vec<AnsweredAssignmentRow>,
        fail: bool,
    }

    #[async_trait]
    impl CampaignResponseReader for MockReader {
        async fn fetch_answered(
            &self,
            _campaign_id: &CampaignId,
        ) -> Result<Vec<AnsweredAssignmentRow>, DomainError> {
            if self.fail {
                return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated read failure"));
            }
            Ok(self.rows.clone())
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn row(question_id: QuestionId, answer: JsonValue, score: f64) -> AnsweredAssignmentRow {
        AnsweredAssignmentRow {
            question_id,
            respondent_id: RespondentId::new(),
            respondent_name: "Respondent".to_string(),
            group_name: "Operations".to_string(),
            answer,
            score: Some(score),
            answer_type: AnswerType::SingleChoice,
            options: vec![],
        }
    }

    fn handler(
        rows: Vec<AnsweredAssignmentRow>,
        repo: Arc<MockAlertRepository>,
        publisher: Arc<MockEventPublisher>,
    ) -> RecalculateDivergencesHandler {
        RecalculateDivergencesHandler::new(Arc::new(MockReader { rows, fail: false }), repo, publisher)
    }

    fn command(campaign_id: CampaignId) -> RecalculateDivergencesCommand {
        RecalculateDivergencesCommand { campaign_id }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn raises_alert_for_divergent_question() {
        let q = QuestionId::new();
        let rows = vec![row(q, json!("a"), 100.0), row(q, json!("b"), 0.0), row(q, json!("a"), 100.0)];
        let repo = Arc::new(MockAlertRepository::default());
        let publisher = Arc::new(MockEventPublisher::default());
        let campaign = CampaignId::new();

        let outcome = handler(rows, repo.clone(), publisher.clone())
            .handle(command(campaign))
            .await
            .unwrap();

        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.updated, 0);
        assert_eq!(outcome.questions_evaluated, 1);
        let stored = repo.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].campaign_id, campaign);
        assert_eq!(stored[0].severity, AlertSeverity::Critical);
        assert_eq!(stored[0].responses.len(), 3);
        assert_eq!(publisher.event_types(), vec![ALERT_RAISED_EVENT.to_string()]);
    }

    #[tokio::test]
    async fn second_run_refreshes_instead_of_duplicating() {
        let q = QuestionId::new();
        let rows = vec![row(q, json!("a"), 100.0), row(q, json!("b"), 0.0)];
        let repo = Arc::new(MockAlertRepository::default());
        let publisher = Arc::new(MockEventPublisher::default());
        let handler = handler(rows, repo.clone(), publisher.clone());
        let campaign = CampaignId::new();

        let first = handler.handle(command(campaign)).await.unwrap();
        let second = handler.handle(command(campaign)).await.unwrap();

        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 1);
        assert_eq!(second.alerts[0].id, first.alerts[0].id);
        let stored = repo.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].severity, first.alerts[0].severity);
        assert_eq!(stored[0].dispersion, first.alerts[0].dispersion);
        assert_eq!(
            publisher.event_types(),
            vec![ALERT_RAISED_EVENT.to_string(), ALERT_REFRESHED_EVENT.to_string()]
        );
    }

    #[tokio::test]
    async fn resolved_alert_is_followed_by_a_new_one() {
        let q = QuestionId::new();
        let rows = vec![row(q, json!("a"), 100.0), row(q, json!("b"), 0.0)];
        let repo = Arc::new(MockAlertRepository::default());
        let handler = handler(rows, repo.clone(), Arc::new(MockEventPublisher::default()));
        let campaign = CampaignId::new();

        let first = handler.handle(command(campaign)).await.unwrap();
        let mut resolved = first.alerts[0].clone();
        resolved.resolve(AdminId::new(), None, Timestamp::now()).unwrap();
        repo.update(&resolved).await.unwrap();

        let second = handler.handle(command(campaign)).await.unwrap();

        assert_eq!(second.created, 1);
        assert_ne!(second.alerts[0].id, resolved.id);
        assert_eq!(repo.stored().len(), 2);
    }

    #[tokio::test]
    async fn unanimous_and_single_respondent_questions_raise_nothing() {
        let unanimous = QuestionId::new();
        let lonely = QuestionId::new();
        let rows = vec![
            row(unanimous, json!("a"), 10.0),
            row(unanimous, json!("a"), 10.0),
            row(lonely, json!("b"), 0.0),
        ];
        let repo = Arc::new(MockAlertRepository::default());
        let publisher = Arc::new(MockEventPublisher::default());

        let outcome = handler(rows, repo.clone(), publisher.clone())
            .handle(command(CampaignId::new()))
            .await
            .unwrap();

        assert_eq!(outcome.questions_evaluated, 1);
        assert!(outcome.alerts.is_empty());
        assert_eq!(repo.apply_calls(), 0);
        assert!(publisher.event_types().is_empty());
    }

    #[tokio::test]
    async fn stale_alert_is_not_auto_resolved() {
        let q = QuestionId::new();
        let campaign = CampaignId::new();
        let repo = Arc::new(MockAlertRepository::default());

        let divergent = vec![row(q, json!("a"), 100.0), row(q, json!("b"), 0.0)];
        handler(divergent, repo.clone(), Arc::new(MockEventPublisher::default()))
            .handle(command(campaign))
            .await
            .unwrap();

        let agreed = vec![row(q, json!("a"), 100.0), row(q, json!("a"), 100.0)];
        let outcome = handler(agreed, repo.clone(), Arc::new(MockEventPublisher::default()))
            .handle(command(campaign))
            .await
            .unwrap();

        assert!(outcome.alerts.is_empty());
        let stored = repo.stored();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].is_resolved);
    }

    #[tokio::test]
    async fn publish_failure_does_not_fail_recalculation() {
        let q = QuestionId::new();
        let rows = vec![row(q, json!("a"), 100.0), row(q, json!("b"), 0.0)];
        let repo = Arc::new(MockAlertRepository::default());

        let outcome = handler(rows, repo.clone(), Arc::new(MockEventPublisher::failing()))
            .handle(command(CampaignId::new()))
            .await
            .unwrap();

        assert_eq!(outcome.created, 1);
        assert_eq!(repo.stored().len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn read_failure_propagates() {
        let handler = RecalculateDivergencesHandler::new(
            Arc::new(MockReader { rows: vec![], fail: true }),
            Arc::new(MockAlertRepository::default()),
            Arc::new(MockEventPublisher::default()),
        );

        let err = handler.handle(command(CampaignId::new())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[tokio::test]
    async fn write_failure_propagates_and_publishes_nothing() {
        let q = QuestionId::new();
        let rows = vec![row(q, json!("a"), 100.0), row(q, json!("b"), 0.0)];
        let publisher = Arc::new(MockEventPublisher::default());

        let err = handler(rows, Arc::new(MockAlertRepository::failing_apply()), publisher.clone())
            .handle(command(CampaignId::new()))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(publisher.event_types().is_empty());
    }
}
