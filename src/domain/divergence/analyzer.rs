//! Divergence Analyzer - decides whether respondents disagree on a question.
//!
//! Dispatch is a `match` over [`AnswerType`]; every arm is a pure function of
//! the raw answers and the available scores, and keeps its own thresholds
//! next to it.
//!
//! | Answer type | Dispersion | Severity driver |
//! |---|---|---|
//! | single_choice, yes_no | sample variance of scores | score range |
//! | multiple_choice | 1 - mean pairwise Jaccard similarity | mean similarity |
//! | scale | sample variance of values | coefficient of variation |
//! | text | none | always low |

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;

use super::statistics::{mean, range, sample_std_dev, sample_variance};
use super::{AlertSeverity, QuestionResponses};
use crate::domain::survey::{numeric_answer, stringify_answer, AnswerType};

/// Outcome of analysing one question's answers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DivergenceAssessment {
    pub has_divergence: bool,
    pub dispersion: Option<f64>,
    pub severity: AlertSeverity,
}

impl DivergenceAssessment {
    /// No disagreement detected.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Stateless divergence analysis.
pub struct DivergenceAnalyzer;

impl DivergenceAnalyzer {
    /// Analyses an aggregated question group.
    pub fn analyze(group: &QuestionResponses) -> DivergenceAssessment {
        Self::assess(group.answer_type, &group.answers(), &group.scores())
    }

    /// Analyses raw answers and scores for a question of the given type.
    ///
    /// `scores` holds only the scores that are present; answers without a
    /// score are simply not represented in it.
    pub fn assess(answer_type: AnswerType, answers: &[JsonValue], scores: &[f64]) -> DivergenceAssessment {
        match answer_type {
            AnswerType::SingleChoice | AnswerType::YesNo => choice::assess(answers, scores),
            AnswerType::MultipleChoice => multiple_choice::assess(answers),
            AnswerType::Scale => scale::assess(answers),
            AnswerType::Text => text::assess(answers),
        }
    }
}

mod choice {
    use super::*;

    pub(super) const CRITICAL_RANGE: f64 = 75.0;
    pub(super) const HIGH_RANGE: f64 = 50.0;
    pub(super) const MEDIUM_RANGE: f64 = 25.0;

    pub(super) fn assess(answers: &[JsonValue], scores: &[f64]) -> DivergenceAssessment {
        let distinct: HashSet<String> = answers.iter().map(stringify_answer).collect();
        if distinct.len() <= 1 {
            return DivergenceAssessment::none();
        }

        // Divergent even without scores; severity then stays low.
        let mut assessment = DivergenceAssessment {
            has_divergence: true,
            ..DivergenceAssessment::default()
        };

        if let (Some(variance), Some(spread)) = (sample_variance(scores), range(scores)) {
            assessment.dispersion = Some(variance);
            assessment.severity = severity_for_range(spread);
        }

        assessment
    }

    pub(super) fn severity_for_range(spread: f64) -> AlertSeverity {
        if spread > CRITICAL_RANGE {
            AlertSeverity::Critical
        } else if spread > HIGH_RANGE {
            AlertSeverity::High
        } else if spread > MEDIUM_RANGE {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }
}

mod multiple_choice {
    use super::*;

    /// Mean similarity below which selections count as divergent.
    pub(super) const DIVERGENCE_SIMILARITY: f64 = 0.80;
    pub(super) const CRITICAL_SIMILARITY: f64 = 0.30;
    pub(super) const HIGH_SIMILARITY: f64 = 0.50;
    pub(super) const MEDIUM_SIMILARITY: f64 = 0.70;

    pub(super) fn assess(answers: &[JsonValue]) -> DivergenceAssessment {
        let selections: Vec<HashSet<String>> = answers.iter().map(selection).collect();

        let mut similarities = Vec::new();
        for (i, left) in selections.iter().enumerate() {
            for right in &selections[i + 1..] {
                if let Some(similarity) = jaccard(left, right) {
                    similarities.push(similarity);
                }
            }
        }

        let Some(avg_similarity) = mean(&similarities) else {
            return DivergenceAssessment::none();
        };

        DivergenceAssessment {
            has_divergence: avg_similarity < DIVERGENCE_SIMILARITY,
            dispersion: Some(1.0 - avg_similarity),
            severity: severity_for_similarity(avg_similarity),
        }
    }

    /// Arrays select each of their elements; any other value selects itself.
    fn selection(answer: &JsonValue) -> HashSet<String> {
        match answer {
            JsonValue::Array(items) => items.iter().map(stringify_answer).collect(),
            other => HashSet::from([stringify_answer(other)]),
        }
    }

    /// |A ∩ B| / |A ∪ B|, or `None` when both selections are empty.
    pub(super) fn jaccard(left: &HashSet<String>, right: &HashSet<String>) -> Option<f64> {
        let union = left.union(right).count();
        if union == 0 {
            return None;
        }
        let intersection = left.intersection(right).count();
        Some(intersection as f64 / union as f64)
    }

    pub(super) fn severity_for_similarity(similarity: f64) -> AlertSeverity {
        if similarity < CRITICAL_SIMILARITY {
            AlertSeverity::Critical
        } else if similarity < HIGH_SIMILARITY {
            AlertSeverity::High
        } else if similarity < MEDIUM_SIMILARITY {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }
}

mod scale {
    use super::*;

    /// Coefficient of variation (percent) above which values are divergent.
    pub(super) const DIVERGENCE_CV: f64 = 20.0;
    pub(super) const CRITICAL_CV: f64 = 50.0;
    pub(super) const HIGH_CV: f64 = 40.0;
    pub(super) const MEDIUM_CV: f64 = 30.0;

    pub(super) fn assess(answers: &[JsonValue]) -> DivergenceAssessment {
        let values: Vec<f64> = answers.iter().filter_map(numeric_answer).collect();

        let (Some(variance), Some(std_dev), Some(avg)) =
            (sample_variance(&values), sample_std_dev(&values), mean(&values))
        else {
            return DivergenceAssessment::none();
        };

        let cv = coefficient_of_variation(std_dev, avg);

        DivergenceAssessment {
            has_divergence: cv > DIVERGENCE_CV,
            dispersion: Some(variance),
            severity: severity_for_cv(cv),
        }
    }

    /// Standard deviation as a percentage of the mean; 0 for non-positive means.
    pub(super) fn coefficient_of_variation(std_dev: f64, avg: f64) -> f64 {
        if avg > 0.0 {
            std_dev / avg * 100.0
        } else {
            0.0
        }
    }

    pub(super) fn severity_for_cv(cv: f64) -> AlertSeverity {
        if cv > CRITICAL_CV {
            AlertSeverity::Critical
        } else if cv > HIGH_CV {
            AlertSeverity::High
        } else if cv > MEDIUM_CV {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }
}

mod text {
    use super::*;

    /// Free text needs manual review and is never escalated.
    pub(super) fn assess(answers: &[JsonValue]) -> DivergenceAssessment {
        let distinct: HashSet<String> = answers
            .iter()
            .map(|a| stringify_answer(a).trim().to_lowercase())
            .collect();

        DivergenceAssessment {
            has_divergence: distinct.len() > 1,
            dispersion: None,
            severity: AlertSeverity::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const EPSILON: f64 = 1e-9;

    fn assess(answer_type: AnswerType, answers: Vec<JsonValue>, scores: &[f64]) -> DivergenceAssessment {
        DivergenceAnalyzer::assess(answer_type, &answers, scores)
    }

    // ─────────────────────────────────────────────────────────────
    // single_choice / yes_no
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn single_choice_unanimous_is_not_divergent() {
        let result = assess(
            AnswerType::SingleChoice,
            vec![json!("a"), json!("a"), json!("a")],
            &[10.0, 10.0, 10.0],
        );
        assert_eq!(result, DivergenceAssessment::none());
    }

    #[test]
    fn single_choice_small_score_range_is_low() {
        let result = assess(
            AnswerType::SingleChoice,
            vec![json!("a"), json!("b"), json!("a")],
            &[10.0, 0.0, 10.0],
        );
        assert!(result.has_divergence);
        assert_eq!(result.severity, AlertSeverity::Low);
        assert!((result.dispersion.unwrap() - 100.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn single_choice_full_score_range_is_critical() {
        let result = assess(
            AnswerType::SingleChoice,
            vec![json!("a"), json!("b"), json!("a")],
            &[100.0, 0.0, 100.0],
        );
        assert!(result.has_divergence);
        assert_eq!(result.severity, AlertSeverity::Critical);
        assert!((result.dispersion.unwrap() - 10000.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn single_choice_range_thresholds_are_exclusive() {
        let answers = vec![json!("a"), json!("b")];
        assert_eq!(assess(AnswerType::SingleChoice, answers.clone(), &[0.0, 25.0]).severity, AlertSeverity::Low);
        assert_eq!(assess(AnswerType::SingleChoice, answers.clone(), &[0.0, 26.0]).severity, AlertSeverity::Medium);
        assert_eq!(assess(AnswerType::SingleChoice, answers.clone(), &[0.0, 50.0]).severity, AlertSeverity::Medium);
        assert_eq!(assess(AnswerType::SingleChoice, answers.clone(), &[0.0, 51.0]).severity, AlertSeverity::High);
        assert_eq!(assess(AnswerType::SingleChoice, answers.clone(), &[0.0, 75.0]).severity, AlertSeverity::High);
        assert_eq!(assess(AnswerType::SingleChoice, answers, &[0.0, 76.0]).severity, AlertSeverity::Critical);
    }

    #[test]
    fn single_choice_without_scores_stays_low_with_no_dispersion() {
        let result = assess(AnswerType::SingleChoice, vec![json!("a"), json!("b")], &[]);
        assert!(result.has_divergence);
        assert_eq!(result.dispersion, None);
        assert_eq!(result.severity, AlertSeverity::Low);
    }

    #[test]
    fn single_choice_with_one_score_stays_low() {
        let result = assess(AnswerType::SingleChoice, vec![json!("a"), json!("b")], &[100.0]);
        assert!(result.has_divergence);
        assert_eq!(result.dispersion, None);
        assert_eq!(result.severity, AlertSeverity::Low);
    }

    #[test]
    fn yes_no_behaves_like_single_choice() {
        let result = assess(AnswerType::YesNo, vec![json!("yes"), json!("no")], &[100.0, 0.0]);
        assert!(result.has_divergence);
        assert_eq!(result.severity, AlertSeverity::Critical);
        assert!((result.dispersion.unwrap() - 5000.0).abs() < EPSILON);
    }

    #[test]
    fn choice_compares_stringified_answers() {
        let result = assess(AnswerType::YesNo, vec![json!(1), json!("1")], &[100.0, 100.0]);
        assert!(!result.has_divergence);
    }

    // ─────────────────────────────────────────────────────────────
    // multiple_choice
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn multiple_choice_identical_sets_are_not_divergent() {
        let result = assess(
            AnswerType::MultipleChoice,
            vec![json!(["x", "y"]), json!(["y", "x"]), json!(["x", "y"])],
            &[],
        );
        assert!(!result.has_divergence);
        assert_eq!(result.dispersion, Some(0.0));
        assert_eq!(result.severity, AlertSeverity::Low);
    }

    #[test]
    fn multiple_choice_disjoint_sets_are_critical() {
        let result = assess(AnswerType::MultipleChoice, vec![json!(["x"]), json!(["y"])], &[]);
        assert!(result.has_divergence);
        assert_eq!(result.dispersion, Some(1.0));
        assert_eq!(result.severity, AlertSeverity::Critical);
    }

    #[test]
    fn multiple_choice_partial_overlap_scales_severity() {
        // {x,y} vs {x}: similarity 0.5 -> medium (not < 0.5)
        let medium = assess(AnswerType::MultipleChoice, vec![json!(["x", "y"]), json!(["x"])], &[]);
        assert!(medium.has_divergence);
        assert_eq!(medium.severity, AlertSeverity::Medium);
        assert!((medium.dispersion.unwrap() - 0.5).abs() < EPSILON);

        // {x,y,z} vs {x}: similarity 1/3 -> high
        let high = assess(AnswerType::MultipleChoice, vec![json!(["x", "y", "z"]), json!(["x"])], &[]);
        assert_eq!(high.severity, AlertSeverity::High);

        // {w,x,y,z} vs {w,x,y}: similarity 0.75 -> divergent but low
        let low = assess(
            AnswerType::MultipleChoice,
            vec![json!(["w", "x", "y", "z"]), json!(["w", "x", "y"])],
            &[],
        );
        assert!(low.has_divergence);
        assert_eq!(low.severity, AlertSeverity::Low);
    }

    #[test]
    fn multiple_choice_treats_scalar_as_singleton() {
        let result = assess(AnswerType::MultipleChoice, vec![json!("x"), json!(["x"])], &[]);
        assert!(!result.has_divergence);
        assert_eq!(result.dispersion, Some(0.0));
    }

    #[test]
    fn multiple_choice_skips_empty_unions() {
        // The pair of empty selections is skipped; the remaining pairs have similarity 0.
        let result = assess(
            AnswerType::MultipleChoice,
            vec![json!([]), json!([]), json!(["x"])],
            &[],
        );
        assert!(result.has_divergence);
        assert_eq!(result.dispersion, Some(1.0));
    }

    #[test]
    fn multiple_choice_all_empty_is_not_divergent() {
        let result = assess(AnswerType::MultipleChoice, vec![json!([]), json!([])], &[]);
        assert_eq!(result, DivergenceAssessment::none());
    }

    // ─────────────────────────────────────────────────────────────
    // scale
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn scale_constant_values_are_not_divergent() {
        let result = assess(AnswerType::Scale, vec![json!(5), json!(5), json!(5), json!(5)], &[]);
        assert!(!result.has_divergence);
        assert_eq!(result.dispersion, Some(0.0));
        assert_eq!(result.severity, AlertSeverity::Low);
    }

    #[test]
    fn scale_polarised_values_are_critical() {
        let result = assess(AnswerType::Scale, vec![json!(1), json!(5), json!(1), json!(5)], &[]);
        assert!(result.has_divergence);
        assert_eq!(result.severity, AlertSeverity::Critical);
        assert!((result.dispersion.unwrap() - 16.0 / 3.0).abs() < EPSILON);
    }

    #[test]
    fn scale_severity_follows_cv_thresholds() {
        // CV ≈ 16.5 -> not divergent
        let calm = assess(AnswerType::Scale, vec![json!(3), json!(4), json!(3), json!(4)], &[]);
        assert!(!calm.has_divergence);

        // CV ≈ 23.1 -> divergent, low
        let low = assess(AnswerType::Scale, vec![json!(2), json!(3), json!(2), json!(3)], &[]);
        assert!(low.has_divergence);
        assert_eq!(low.severity, AlertSeverity::Low);

        // CV ≈ 38.5 -> medium
        let medium = assess(AnswerType::Scale, vec![json!(2), json!(4), json!(2), json!(4)], &[]);
        assert_eq!(medium.severity, AlertSeverity::Medium);

        // CV ≈ 49.5 -> high
        let high = assess(AnswerType::Scale, vec![json!(2), json!(5), json!(2), json!(5)], &[]);
        assert_eq!(high.severity, AlertSeverity::High);

        // CV ≈ 57.7 -> critical
        let critical = assess(AnswerType::Scale, vec![json!(1), json!(3), json!(1), json!(3)], &[]);
        assert_eq!(critical.severity, AlertSeverity::Critical);
    }

    #[test]
    fn scale_drops_non_numeric_answers() {
        let result = assess(
            AnswerType::Scale,
            vec![json!("5"), json!("often"), json!(null), json!(5)],
            &[],
        );
        assert!(!result.has_divergence);
        assert_eq!(result.dispersion, Some(0.0));
    }

    #[test]
    fn scale_needs_two_numeric_values() {
        let result = assess(AnswerType::Scale, vec![json!(1), json!("n/a")], &[]);
        assert_eq!(result, DivergenceAssessment::none());
    }

    #[test]
    fn scale_zero_mean_has_zero_cv() {
        let result = assess(AnswerType::Scale, vec![json!(-2), json!(2)], &[]);
        assert!(!result.has_divergence);
        assert_eq!(result.dispersion, Some(8.0));
        assert_eq!(result.severity, AlertSeverity::Low);
    }

    // ─────────────────────────────────────────────────────────────
    // text
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn text_normalises_case_and_whitespace() {
        let result = assess(
            AnswerType::Text,
            vec![json!("Yes we comply"), json!("  yes we comply ")],
            &[],
        );
        assert!(!result.has_divergence);
    }

    #[test]
    fn text_differences_are_divergent_but_low() {
        let result = assess(AnswerType::Text, vec![json!("Yes"), json!("No")], &[100.0, 0.0]);
        assert!(result.has_divergence);
        assert_eq!(result.severity, AlertSeverity::Low);
        assert_eq!(result.dispersion, None);
    }

    // ─────────────────────────────────────────────────────────────
    // helpers and properties
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn jaccard_of_identical_sets_is_one() {
        let set: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        assert_eq!(multiple_choice::jaccard(&set, &set), Some(1.0));
    }

    #[test]
    fn coefficient_of_variation_ignores_non_positive_mean() {
        assert_eq!(scale::coefficient_of_variation(3.0, 0.0), 0.0);
        assert_eq!(scale::coefficient_of_variation(3.0, -1.0), 0.0);
        assert_eq!(scale::coefficient_of_variation(1.0, 4.0), 25.0);
    }

    proptest! {
        #[test]
        fn multiple_choice_dispersion_is_a_fraction(
            selections in prop::collection::vec(prop::collection::vec(0u8..6, 0..5), 2..8)
        ) {
            let answers: Vec<JsonValue> = selections
                .iter()
                .map(|s| JsonValue::Array(s.iter().map(|v| json!(format!("opt{}", v))).collect()))
                .collect();
            let result = DivergenceAnalyzer::assess(AnswerType::MultipleChoice, &answers, &[]);
            if let Some(dispersion) = result.dispersion {
                prop_assert!((0.0..=1.0).contains(&dispersion));
            }
        }

        #[test]
        fn unanimous_choice_never_diverges(answer in "[a-z]{1,8}", n in 2usize..10) {
            let answers = vec![json!(answer); n];
            let result = DivergenceAnalyzer::assess(AnswerType::SingleChoice, &answers, &vec![50.0; n]);
            prop_assert!(!result.has_divergence);
        }
    }
}
