//! Mock ports shared by the divergence handler tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::divergence::{AlertWrite, DivergenceAlert};
use crate::domain::foundation::{
    AlertId, CampaignId, DomainError, ErrorCode, EventEnvelope, QuestionId,
};
use crate::ports::{DivergenceAlertRepository, EventPublisher};

#[derive(Default)]
pub(crate) struct MockAlertRepository {
    alerts: Mutex<Vec<DivergenceAlert>>,
    apply_calls: Mutex<usize>,
    fail_apply: bool,
    fail_reads: bool,
}

impl MockAlertRepository {
    pub(crate) fn with_alerts(alerts: Vec<DivergenceAlert>) -> Self {
        Self {
            alerts: Mutex::new(alerts),
            ..Self::default()
        }
    }

    pub(crate) fn failing_apply() -> Self {
        Self {
            fail_apply: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub(crate) fn stored(&self) -> Vec<DivergenceAlert> {
        self.alerts.lock().unwrap().clone()
    }

    pub(crate) fn apply_calls(&self) -> usize {
        *self.apply_calls.lock().unwrap()
    }

    fn check_read(&self) -> Result<(), DomainError> {
        if self.fail_reads {
            return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated read failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl DivergenceAlertRepository for MockAlertRepository {
    async fn find_unresolved(
        &self,
        campaign_id: &CampaignId,
        question_id: &QuestionId,
    ) -> Result<Option<DivergenceAlert>, DomainError> {
        self.check_read()?;
        let alerts = self.alerts.lock().unwrap();
        Ok(alerts
            .iter()
            .find(|a| {
                &a.campaign_id == campaign_id && &a.question_id == question_id && !a.is_resolved
            })
            .cloned())
    }

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<DivergenceAlert>, DomainError> {
        self.check_read()?;
        Ok(self.alerts.lock().unwrap().iter().find(|a| &a.id == id).cloned())
    }

    async fn list_by_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<DivergenceAlert>, DomainError> {
        self.check_read()?;
        let alerts = self.alerts.lock().unwrap();
        Ok(alerts
            .iter()
            .filter(|a| &a.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn apply(&self, writes: &[AlertWrite]) -> Result<(), DomainError> {
        *self.apply_calls.lock().unwrap() += 1;
        if self.fail_apply {
            return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated write failure"));
        }
        let mut alerts = self.alerts.lock().unwrap();
        for write in writes {
            match write {
                AlertWrite::Create(alert) => alerts.push(alert.clone()),
                AlertWrite::Update(alert) => {
                    if let Some(existing) = alerts.iter_mut().find(|a| a.id == alert.id) {
                        *existing = alert.clone();
                    }
                }
            }
        }
        Ok(())
    }

    async fn update(&self, alert: &DivergenceAlert) -> Result<(), DomainError> {
        self.apply(&[AlertWrite::Update(alert.clone())]).await
    }
}

#[derive(Default)]
pub(crate) struct MockEventPublisher {
    published_events: Mutex<Vec<EventEnvelope>>,
    fail_publish: bool,
}

impl MockEventPublisher {
    pub(crate) fn failing() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    pub(crate) fn published_events(&self) -> Vec<EventEnvelope> {
        self.published_events.lock().unwrap().clone()
    }

    pub(crate) fn event_types(&self) -> Vec<String> {
        self.published_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.fail_publish {
            return Err(DomainError::new(ErrorCode::InternalError, "Simulated publish failure"));
        }
        self.published_events.lock().unwrap().push(event);
        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
