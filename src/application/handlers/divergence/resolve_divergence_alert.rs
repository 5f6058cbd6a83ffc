//! ResolveDivergenceAlertHandler - Command handler for closing an alert.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::divergence::{DivergenceAlert, DivergenceAlertResolved};
use crate::domain::foundation::{
    AdminId, AlertId, DomainError, ErrorCode, SerializableDomainEvent, Timestamp,
};
use crate::ports::{DivergenceAlertRepository, EventPublisher};

/// Command to resolve a divergence alert.
#[derive(Debug, Clone)]
pub struct ResolveDivergenceAlertCommand {
    pub alert_id: AlertId,
    pub resolved_by: AdminId,
    pub resolution_notes: Option<String>,
}

/// Handler for resolving divergence alerts.
///
/// Resolution is one-way: a second attempt fails with `AlertAlreadyResolved`
/// and leaves the first resolver on record.
pub struct ResolveDivergenceAlertHandler {
    repository: Arc<dyn DivergenceAlertRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ResolveDivergenceAlertHandler {
    pub fn new(
        repository: Arc<dyn DivergenceAlertRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ResolveDivergenceAlertCommand,
    ) -> Result<DivergenceAlert, DomainError> {
        // 1. Load the alert
        let mut alert = self
            .repository
            .find_by_id(&cmd.alert_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::AlertNotFound,
                    format!("Divergence alert {} not found", cmd.alert_id),
                )
            })?;

        // 2. Transition (domain logic)
        alert.resolve(cmd.resolved_by, cmd.resolution_notes, Timestamp::now())?;

        // 3. Persist
        self.repository.update(&alert).await?;

        info!(
            alert_id = %alert.id,
            campaign_id = %alert.campaign_id,
            resolved_by = %cmd.resolved_by,
            "Divergence alert resolved"
        );

        // 4. Announce, best effort
        if let Some(event) = DivergenceAlertResolved::from_alert(&alert) {
            let envelope = event.to_envelope().with_actor(cmd.resolved_by.to_string());
            if let Err(e) = self.event_publisher.publish(envelope).await {
                warn!(alert_id = %alert.id, error = %e, "Failed to publish alert resolution");
            }
        }

        Ok(alert)
    }
}
