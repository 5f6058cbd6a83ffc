//! DivergenceAlert aggregate.
//!
//! One alert records that respondents disagree on a question within a
//! campaign, together with a snapshot of the answers that caused it.
//!
//! # Design Decisions
//!
//! - **One open alert per question**: the reconciler refreshes an unresolved
//!   alert instead of raising a second one
//! - **One-way resolution**: a resolved alert is never reopened or refreshed
//! - **Snapshots, not references**: the answers are copied at analysis time

use serde::{Deserialize, Serialize};

use super::{AlertSeverity, DivergenceAssessment, QuestionResponses, ResponseSnapshot};
use crate::domain::foundation::{
    AdminId, AlertId, CampaignId, DomainError, ErrorCode, QuestionId, Timestamp,
};

/// DivergenceAlert aggregate.
///
/// # Invariants
///
/// - `resolved_at`, `resolved_by` are set iff `is_resolved`
/// - `created_at <= updated_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceAlert {
    pub id: AlertId,
    pub campaign_id: CampaignId,
    pub question_id: QuestionId,
    pub severity: AlertSeverity,

    /// Metric depends on the answer type; `None` when it is undefined.
    pub dispersion: Option<f64>,

    /// Answers that were analysed when the alert was last raised or refreshed.
    pub responses: Vec<ResponseSnapshot>,

    pub is_resolved: bool,
    pub resolved_at: Option<Timestamp>,
    pub resolved_by: Option<AdminId>,
    pub resolution_notes: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DivergenceAlert {
    /// Raises a new unresolved alert for a divergent question.
    pub fn raise(
        campaign_id: CampaignId,
        group: &QuestionResponses,
        assessment: &DivergenceAssessment,
        now: Timestamp,
    ) -> Self {
        Self {
            id: AlertId::new(),
            campaign_id,
            question_id: group.question_id,
            severity: assessment.severity,
            dispersion: assessment.dispersion,
            responses: group.responses.clone(),
            is_resolved: false,
            resolved_at: None,
            resolved_by: None,
            resolution_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the severity, dispersion and snapshot with a fresh analysis.
    ///
    /// # Errors
    ///
    /// `AlertAlreadyResolved` if the alert has been resolved.
    pub fn refresh(
        &mut self,
        assessment: &DivergenceAssessment,
        responses: Vec<ResponseSnapshot>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.severity = assessment.severity;
        self.dispersion = assessment.dispersion;
        self.responses = responses;
        self.updated_at = now;
        Ok(())
    }

    /// Marks the alert as reviewed by an administrator.
    ///
    /// # Errors
    ///
    /// `AlertAlreadyResolved` if the alert has been resolved before.
    pub fn resolve(
        &mut self,
        resolved_by: AdminId,
        notes: Option<String>,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.is_resolved = true;
        self.resolved_at = Some(now);
        self.resolved_by = Some(resolved_by);
        self.resolution_notes = notes.filter(|n| !n.trim().is_empty());
        self.updated_at = now;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_resolved {
            return Err(DomainError::new(
                ErrorCode::AlertAlreadyResolved,
                format!("Divergence alert {} is already resolved", self.id),
            ));
        }
        Ok(())
    }
}

/// A pending alert write, applied atomically with its siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertWrite {
    Create(DivergenceAlert),
    Update(DivergenceAlert),
}

impl AlertWrite {
    pub fn alert(&self) -> &DivergenceAlert {
        match self {
            AlertWrite::Create(alert) | AlertWrite::Update(alert) => alert,
        }
    }

    pub fn into_alert(self) -> DivergenceAlert {
        match self {
            AlertWrite::Create(alert) | AlertWrite::Update(alert) => alert,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, AlertWrite::Create(_))
    }
}
