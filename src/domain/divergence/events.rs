//! Divergence domain events.

use serde::{Deserialize, Serialize};

use super::{AlertSeverity, DivergenceAlert};
use crate::domain::foundation::{
    domain_event, AdminId, AlertId, CampaignId, EventId, QuestionId, Timestamp,
};

pub const ALERT_RAISED_EVENT: &str = "divergence.alert_raised.v1";
pub const ALERT_REFRESHED_EVENT: &str = "divergence.alert_refreshed.v1";
pub const ALERT_RESOLVED_EVENT: &str = "divergence.alert_resolved.v1";

/// Published when a new alert is stored for a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceAlertRaised {
    pub event_id: EventId,
    pub alert_id: AlertId,
    pub campaign_id: CampaignId,
    pub question_id: QuestionId,
    pub severity: AlertSeverity,
    pub dispersion: Option<f64>,
    pub raised_at: Timestamp,
}

domain_event!(
    DivergenceAlertRaised,
    event_type = "divergence.alert_raised.v1",
    aggregate_id = alert_id,
    aggregate_type = "DivergenceAlert",
    occurred_at = raised_at,
    event_id = event_id
);

impl DivergenceAlertRaised {
    pub fn from_alert(alert: &DivergenceAlert) -> Self {
        Self {
            event_id: EventId::new(),
            alert_id: alert.id,
            campaign_id: alert.campaign_id,
            question_id: alert.question_id,
            severity: alert.severity,
            dispersion: alert.dispersion,
            raised_at: alert.created_at,
        }
    }
}

/// Published when an open alert is re-evaluated with newer answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceAlertRefreshed {
    pub event_id: EventId,
    pub alert_id: AlertId,
    pub campaign_id: CampaignId,
    pub question_id: QuestionId,
    pub severity: AlertSeverity,
    pub dispersion: Option<f64>,
    pub refreshed_at: Timestamp,
}

domain_event!(
    DivergenceAlertRefreshed,
    event_type = "divergence.alert_refreshed.v1",
    aggregate_id = alert_id,
    aggregate_type = "DivergenceAlert",
    occurred_at = refreshed_at,
    event_id = event_id
);

impl DivergenceAlertRefreshed {
    pub fn from_alert(alert: &DivergenceAlert) -> Self {
        Self {
            event_id: EventId::new(),
            alert_id: alert.id,
            campaign_id: alert.campaign_id,
            question_id: alert.question_id,
            severity: alert.severity,
            dispersion: alert.dispersion,
            refreshed_at: alert.updated_at,
        }
    }
}

/// Published when an administrator resolves an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceAlertResolved {
    pub event_id: EventId,
    pub alert_id: AlertId,
    pub campaign_id: CampaignId,
    pub question_id: QuestionId,
    pub resolved_by: AdminId,
    pub resolution_notes: Option<String>,
    pub resolved_at: Timestamp,
}

domain_event!(
    DivergenceAlertResolved,
    event_type = "divergence.alert_resolved.v1",
    aggregate_id = alert_id,
    aggregate_type = "DivergenceAlert",
    occurred_at = resolved_at,
    event_id = event_id
);

impl DivergenceAlertResolved {
    /// Returns `None` for an alert that has not been resolved.
    pub fn from_alert(alert: &DivergenceAlert) -> Option<Self> {
        Some(Self {
            event_id: EventId::new(),
            alert_id: alert.id,
            campaign_id: alert.campaign_id,
            question_id: alert.question_id,
            resolved_by: alert.resolved_by?,
            resolution_notes: alert.resolution_notes.clone(),
            resolved_at: alert.resolved_at?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::divergence::{DivergenceAssessment, QuestionResponses};
    use crate::domain::foundation::SerializableDomainEvent;
    use crate::domain::survey::AnswerType;

    fn alert() -> DivergenceAlert {
        let group = QuestionResponses {
            question_id: QuestionId::new(),
            answer_type: AnswerType::Scale,
            options: vec![],
            responses: vec![],
        };
        let assessment = DivergenceAssessment {
            has_divergence: true,
            dispersion: Some(5.3),
            severity: AlertSeverity::High,
        };
        DivergenceAlert::raise(CampaignId::new(), &group, &assessment, Timestamp::now())
    }

    #[test]
    fn raised_event_uses_alert_as_aggregate() {
        let alert = alert();
        let envelope = DivergenceAlertRaised::from_alert(&alert).to_envelope();

        assert_eq!(envelope.event_type, ALERT_RAISED_EVENT);
        assert_eq!(envelope.aggregate_type, "DivergenceAlert");
        assert_eq!(envelope.aggregate_id, alert.id.to_string());
        assert_eq!(envelope.payload["severity"], "high");
    }

    #[test]
    fn refreshed_event_carries_update_time() {
        let alert = alert();
        let event = DivergenceAlertRefreshed::from_alert(&alert);
        assert_eq!(event.refreshed_at, alert.updated_at);
        assert_eq!(event.to_envelope().event_type, ALERT_REFRESHED_EVENT);
    }

    #[test]
    fn resolved_event_requires_resolution() {
        let mut alert = alert();
        assert!(DivergenceAlertResolved::from_alert(&alert).is_none());

        let admin = AdminId::new();
        alert.resolve(admin, Some("ok".to_string()), Timestamp::now()).unwrap();
        let event = DivergenceAlertResolved::from_alert(&alert).unwrap();

        assert_eq!(event.resolved_by, admin);
        assert_eq!(event.to_envelope().event_type, ALERT_RESOLVED_EVENT);
    }
}
