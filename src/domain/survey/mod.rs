//! Survey module - Questions, answers and scoring.
//!
//! Only the slice of the survey model that scoring and divergence analysis
//! depend on lives here; campaign, company and user management belong to
//! the surrounding CRUD layer.

mod answer;
mod answer_type;
mod events;
mod question;
mod scoring;

pub use answer::{numeric_answer, stringify_answer, AnswerRecord, AssignmentContext};
pub use answer_type::AnswerType;
pub use events::{RespondentCompleted, RESPONDENT_COMPLETED_EVENT};
pub use question::{QuestionDefinition, QuestionOption, DEFAULT_MAX_SCORE};
pub use scoring::{ScoreCalculator, AFFIRMATIVE_ANSWERS};
