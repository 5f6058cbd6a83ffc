//! Response Aggregator - groups a campaign's answers by question.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::domain::foundation::{QuestionId, RespondentId};
use crate::domain::survey::{AnswerType, QuestionOption};

/// Minimum number of respondents before a question can diverge.
pub const MIN_RESPONDENTS: usize = 2;

/// One answered assignment as delivered by the read port.
#[derive(Debug, Clone, PartialEq)]
pub struct AnsweredAssignmentRow {
    pub question_id: QuestionId,
    pub respondent_id: RespondentId,
    pub respondent_name: String,
    pub group_name: String,
    pub answer: JsonValue,
    pub score: Option<f64>,
    pub answer_type: AnswerType,
    pub options: Vec<QuestionOption>,
}

/// A contributing answer, as stored in an alert's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub respondent_id: RespondentId,
    pub respondent_name: String,
    pub group_name: String,
    pub answer: JsonValue,
    pub score: Option<f64>,
}

/// All answers given to one question within a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionResponses {
    pub question_id: QuestionId,
    pub answer_type: AnswerType,
    pub options: Vec<QuestionOption>,
    /// Answers in the order the read port returned them.
    pub responses: Vec<ResponseSnapshot>,
}

impl QuestionResponses {
    /// Raw answers in response order.
    pub fn answers(&self) -> Vec<JsonValue> {
        self.responses.iter().map(|r| r.answer.clone()).collect()
    }

    /// Scores that are present, in response order.
    pub fn scores(&self) -> Vec<f64> {
        self.responses.iter().filter_map(|r| r.score).collect()
    }
}

/// Groups answered rows into per-question collections.
pub struct ResponseAggregator;

impl ResponseAggregator {
    /// Groups rows by question, dropping questions with fewer than
    /// [`MIN_RESPONDENTS`] answers.
    ///
    /// The answer type and options of a question are taken from its last row.
    pub fn group(rows: Vec<AnsweredAssignmentRow>) -> BTreeMap<QuestionId, QuestionResponses> {
        let mut grouped: BTreeMap<QuestionId, QuestionResponses> = BTreeMap::new();

        for row in rows {
            let snapshot = ResponseSnapshot {
                respondent_id: row.respondent_id,
                respondent_name: row.respondent_name,
                group_name: row.group_name,
                answer: row.answer,
                score: row.score,
            };

            let entry = grouped
                .entry(row.question_id)
                .or_insert_with(|| QuestionResponses {
                    question_id: row.question_id,
                    answer_type: row.answer_type,
                    options: Vec::new(),
                    responses: Vec::new(),
                });
            entry.answer_type = row.answer_type;
            entry.options = row.options;
            entry.responses.push(snapshot);
        }

        grouped.retain(|_, group| group.responses.len() >= MIN_RESPONDENTS);
        grouped
    }
}
