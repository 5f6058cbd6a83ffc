//! CyberGAP - Divergence detection for compliance surveys
//!
//! Respondents from different areas of an organization answer the same
//! compliance questions. This crate finds the questions where their answers
//! disagree and keeps one reviewable alert per disagreement.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
