//! DivergenceTriggerHandler - recalculates divergences when a respondent completes.
//!
//! Subscribed to `survey.respondent_completed.v1`. Analysis is a side effect
//! of answering, so every failure ends here as a warning and the handler
//! always reports success to the bus.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{RecalculateDivergencesCommand, RecalculateDivergencesHandler};
use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::domain::survey::RespondentCompleted;
use crate::ports::EventHandler;

/// Handles RespondentCompleted events by recalculating the campaign.
pub struct DivergenceTriggerHandler {
    recalculate: Arc<RecalculateDivergencesHandler>,
}

impl DivergenceTriggerHandler {
    pub fn new(recalculate: Arc<RecalculateDivergencesHandler>) -> Self {
        Self { recalculate }
    }
}

#[async_trait]
impl EventHandler for DivergenceTriggerHandler {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let completed: RespondentCompleted = match event.payload_as() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    event_id = %event.event_id,
                    error = %e,
                    "Ignoring malformed respondent completion event"
                );
                return Ok(());
            }
        };

        let cmd = RecalculateDivergencesCommand {
            campaign_id: completed.campaign_id,
        };

        match self.recalculate.handle(cmd).await {
            Ok(outcome) => debug!(
                campaign_id = %outcome.campaign_id,
                respondent_id = %completed.respondent_id,
                created = outcome.created,
                updated = outcome.updated,
                "Divergences recalculated after respondent completion"
            ),
            Err(e) => warn!(
                campaign_id = %completed.campaign_id,
                respondent_id = %completed.respondent_id,
                error = %e,
                "Divergence recalculation failed after respondent completion"
            ),
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "DivergenceTriggerHandler"
    }
}
