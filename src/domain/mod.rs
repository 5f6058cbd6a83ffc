//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, events)
//! - `survey` - Answer types, question definitions and answer scoring
//! - `divergence` - Divergence detection between respondents of a campaign

pub mod divergence;
pub mod foundation;
pub mod survey;
