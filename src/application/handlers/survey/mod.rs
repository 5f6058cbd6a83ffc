//! Survey handlers.
//!
//! ## Commands
//! - Submitting a respondent's answers

mod submit_answers;

pub use submit_answers::{
    RejectedAnswer, SubmitAnswersCommand, SubmitAnswersHandler, SubmitAnswersResult,
    SubmittedAnswer,
};
