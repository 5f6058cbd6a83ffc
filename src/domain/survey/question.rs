//! Question definitions as seen by scoring and divergence analysis.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::AnswerType;
use crate::domain::foundation::QuestionId;

/// Default numeric ceiling for a question's score.
pub const DEFAULT_MAX_SCORE: f64 = 100.0;

/// One selectable option of a choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Opaque value stored in answers.
    pub value: JsonValue,
    /// Display label.
    #[serde(default)]
    pub text: String,
    /// Score contribution when selected.
    #[serde(default)]
    pub score: f64,
}

impl QuestionOption {
    pub fn new(value: impl Into<JsonValue>, text: impl Into<String>, score: f64) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            score,
        }
    }
}

/// The parts of a question definition the engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: QuestionId,
    pub answer_type: AnswerType,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

impl QuestionDefinition {
    /// Creates a question without options and the default max score.
    pub fn new(id: QuestionId, answer_type: AnswerType) -> Self {
        Self {
            id,
            answer_type,
            options: Vec::new(),
            max_score: DEFAULT_MAX_SCORE,
        }
    }

    pub fn with_options(mut self, options: Vec<QuestionOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_score(mut self, max_score: f64) -> Self {
        self.max_score = max_score;
        self
    }
}

fn default_max_score() -> f64 {
    DEFAULT_MAX_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_with_defaults() {
        let id = QuestionId::new();
        let question: QuestionDefinition =
            serde_json::from_value(json!({ "id": id, "answer_type": "scale" })).unwrap();

        assert_eq!(question.answer_type, AnswerType::Scale);
        assert!(question.options.is_empty());
        assert_eq!(question.max_score, DEFAULT_MAX_SCORE);
    }

    #[test]
    fn option_score_defaults_to_zero() {
        let option: QuestionOption =
            serde_json::from_value(json!({ "value": "a", "text": "Option A" })).unwrap();
        assert_eq!(option.score, 0.0);
        assert_eq!(option.value, json!("a"));
    }
}
