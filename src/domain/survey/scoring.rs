//! Score Calculator - turns a raw answer into a numeric score.
//!
//! Scores feed the single-choice/yes-no severity computation of the
//! divergence analyzer, so both sides must agree on how answers are read.

use serde_json::Value as JsonValue;

use super::{numeric_answer, stringify_answer, AnswerType, QuestionDefinition};

/// Answers accepted as affirmative for yes/no questions.
pub const AFFIRMATIVE_ANSWERS: &[&str] = &["yes", "sí", "si", "true", "1"];

/// Scale questions with a max score above this use a 1-10 scale, else 1-5.
const TEN_POINT_SCALE_THRESHOLD: f64 = 50.0;

/// Stateless scoring rules per answer type.
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Computes the score of `answer` for `question`.
    ///
    /// # Edge Cases
    /// - Null answers score 0
    /// - Unknown options and unparseable scale values score 0
    pub fn score(question: &QuestionDefinition, answer: &JsonValue) -> f64 {
        if answer.is_null() {
            return 0.0;
        }

        match question.answer_type {
            AnswerType::YesNo => {
                let normalized = stringify_answer(answer).to_lowercase();
                if AFFIRMATIVE_ANSWERS.contains(&normalized.as_str()) {
                    question.max_score
                } else {
                    0.0
                }
            }
            AnswerType::SingleChoice => {
                let key = stringify_answer(answer);
                question
                    .options
                    .iter()
                    .find(|opt| stringify_answer(&opt.value) == key)
                    .map(|opt| opt.score)
                    .unwrap_or(0.0)
            }
            AnswerType::MultipleChoice => match answer {
                JsonValue::Array(selected) => question
                    .options
                    .iter()
                    .filter(|opt| selected.contains(&opt.value))
                    .map(|opt| opt.score)
                    .sum(),
                _ => 0.0,
            },
            AnswerType::Scale => match numeric_answer(answer) {
                Some(value) => value / Self::scale_points(question) * question.max_score,
                None => 0.0,
            },
            AnswerType::Text => {
                if Self::is_blank(answer) {
                    0.0
                } else {
                    question.max_score
                }
            }
        }
    }

    /// Number of points on the scale implied by the question's max score.
    pub fn scale_points(question: &QuestionDefinition) -> f64 {
        if question.max_score > TEN_POINT_SCALE_THRESHOLD {
            10.0
        } else {
            5.0
        }
    }

    fn is_blank(answer: &JsonValue) -> bool {
        match answer {
            JsonValue::String(s) => s.trim().is_empty(),
            JsonValue::Array(items) => items.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }
}
