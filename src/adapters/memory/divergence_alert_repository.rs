//! In-memory implementation of DivergenceAlertRepository.
//!
//! For tests and local development. Batches are validated before any write
//! is applied, and the whole batch runs under one lock.

use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};

use crate::domain::divergence::{AlertWrite, DivergenceAlert};
use crate::domain::foundation::{AlertId, CampaignId, DomainError, ErrorCode, QuestionId};
use crate::ports::DivergenceAlertRepository;

use super::poisoned;

/// In-memory implementation of the DivergenceAlertRepository port.
#[derive(Default)]
pub struct InMemoryDivergenceAlertRepository {
    alerts: RwLock<Vec<DivergenceAlert>>,
}

impl InMemoryDivergenceAlertRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored alerts, resolved or not.
    pub fn len(&self) -> usize {
        self.alerts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate(alerts: &[DivergenceAlert], writes: &[AlertWrite]) -> Result<(), DomainError> {
    let mut open: Vec<(CampaignId, QuestionId)> = alerts
        .iter()
        .filter(|a| !a.is_resolved)
        .map(|a| (a.campaign_id, a.question_id))
        .collect();

    for write in writes {
        match write {
            AlertWrite::Update(alert) => match alerts.iter().find(|a| a.id == alert.id) {
                None => {
                    return Err(DomainError::new(
                        ErrorCode::AlertNotFound,
                        format!("Divergence alert {} not found", alert.id),
                    ));
                }
                Some(stored) if stored.is_resolved => {
                    return Err(DomainError::new(
                        ErrorCode::AlertAlreadyResolved,
                        format!("Divergence alert {} is already resolved", alert.id),
                    ));
                }
                Some(_) => {}
            },
            AlertWrite::Create(alert) => {
                let key = (alert.campaign_id, alert.question_id);
                if !alert.is_resolved && open.contains(&key) {
                    return Err(DomainError::new(
                        ErrorCode::DatabaseError,
                        format!(
                            "Question {} already has an open alert in campaign {}",
                            alert.question_id, alert.campaign_id
                        ),
                    ));
                }
                open.push(key);
            }
        }
    }

    Ok(())
}

#[async_trait]
impl DivergenceAlertRepository for InMemoryDivergenceAlertRepository {
    async fn find_unresolved(
        &self,
        campaign_id: &CampaignId,
        question_id: &QuestionId,
    ) -> Result<Option<DivergenceAlert>, DomainError> {
        let alerts = self.alerts.read().map_err(|_| poisoned("divergence alerts"))?;
        Ok(alerts
            .iter()
            .find(|a| {
                &a.campaign_id == campaign_id && &a.question_id == question_id && !a.is_resolved
            })
            .cloned())
    }

    async fn find_by_id(&self, id: &AlertId) -> Result<Option<DivergenceAlert>, DomainError> {
        let alerts = self.alerts.read().map_err(|_| poisoned("divergence alerts"))?;
        Ok(alerts.iter().find(|a| &a.id == id).cloned())
    }

    async fn list_by_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<DivergenceAlert>, DomainError> {
        let alerts = self.alerts.read().map_err(|_| poisoned("divergence alerts"))?;
        let mut found: Vec<DivergenceAlert> = alerts
            .iter()
            .filter(|a| &a.campaign_id == campaign_id)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.created_at);
        Ok(found)
    }

    async fn apply(&self, writes: &[AlertWrite]) -> Result<(), DomainError> {
        let mut alerts = self.alerts.write().map_err(|_| poisoned("divergence alerts"))?;
        validate(&alerts, writes)?;

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
