//! Submitted answers and the assignment context they belong to.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::QuestionDefinition;
use crate::domain::foundation::{AssignmentId, CampaignId, RespondentId, Timestamp};

/// One submitted answer for one assignment. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub assignment_id: AssignmentId,
    /// Raw answer; its shape depends on the question's answer type.
    pub answer: JsonValue,
    pub score: Option<f64>,
    pub answered_at: Timestamp,
    pub time_spent_seconds: Option<u32>,
}

/// An assignment together with the question it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentContext {
    pub assignment_id: AssignmentId,
    pub campaign_id: CampaignId,
    pub respondent_id: RespondentId,
    pub question: QuestionDefinition,
    pub answered: bool,
}

/// Canonical string form of a raw answer.
///
/// JSON strings contribute their content and every other value its compact
/// JSON rendering, so the number `1` and the string `"1"` compare equal.
pub fn stringify_answer(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric reading of a raw answer, if it has one.
///
/// Accepts JSON numbers and strings holding a finite number; everything else
/// yields `None`.
pub fn numeric_answer(value: &JsonValue) -> Option<f64> {
    let number = match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
