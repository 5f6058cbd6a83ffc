//! Answer-type variants of a question.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The five shapes an answer can take.
///
/// The divergence analyzer dispatches on this type; each variant carries its
/// own dispersion metric and severity thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    SingleChoice,
    MultipleChoice,
    Text,
    Scale,
    YesNo,
}

impl AnswerType {
    /// All answer types in declaration order.
    pub fn all() -> &'static [AnswerType] {
        &[
            AnswerType::SingleChoice,
            AnswerType::MultipleChoice,
            AnswerType::Text,
            AnswerType::Scale,
            AnswerType::YesNo,
        ]
    }

    /// Returns the wire/database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerType::SingleChoice => "single_choice",
            AnswerType::MultipleChoice => "multiple_choice",
            AnswerType::Text => "text",
            AnswerType::Scale => "scale",
            AnswerType::YesNo => "yes_no",
        }
    }

    /// Whether questions of this type carry an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, AnswerType::SingleChoice | AnswerType::MultipleChoice)
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnswerType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| {
                ValidationError::invalid_format("answer_type", format!("unknown variant '{}'", s))
            })
    }
}
