//! Answer equivalence grader.
//!
//! [`Grader::grade`] never fails: every internal error is logged at debug
//! level and collapsed to `(false, 0.0)`.

use std::sync::Arc;

use crate::algebra::{matching_strategy, AlgebraContext};
use crate::config::GradingConfig;
use crate::error::GradeError;
use crate::model::{AnswerType, GradingOutcome, Question};
use crate::normalize::{jaccard, normalize_text, token_set};
use crate::traits::SymbolicEngine;

/// Grades candidate answers against reference answers.
#[derive(Clone)]
pub struct Grader {
    engine: Arc<dyn SymbolicEngine>,
    config: GradingConfig,
}

impl std::fmt::Debug for Grader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grader")
            .field("engine", &self.engine.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Grader {
    pub fn new(engine: Arc<dyn SymbolicEngine>, config: GradingConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Grade `candidate` against `correct` for the given answer type.
    pub fn grade(&self, answer_type: AnswerType, correct: &str, candidate: &str) -> GradingOutcome {
        let result = match answer_type {
            AnswerType::Numeric => grade_numeric(correct, candidate, self.config.numeric_tolerance),
            AnswerType::Algebra => Ok(self.grade_algebra(correct, candidate)),
            AnswerType::ShortAnswer => Ok(grade_short_answer(
                correct,
                candidate,
                self.config.short_answer_threshold,
            )),
            AnswerType::Mcq => Ok(grade_mcq(correct, candidate)),
        };

        result.unwrap_or_else(|e| {
            tracing::debug!(%answer_type, error = %e, "grading failed, scoring as incorrect");
            GradingOutcome::incorrect()
        })
    }

    /// Grade using a raw answer-type tag. Unknown tags score `(false, 0.0)`.
    pub fn grade_tagged(&self, tag: &str, correct: &str, candidate: &str) -> GradingOutcome {
        match tag.parse::<AnswerType>() {
            Ok(answer_type) => self.grade(answer_type, correct, candidate),
            Err(_) => {
                let e = GradeError::UnknownAnswerType(tag.to_string());
                tracing::debug!(error = %e, "grading failed, scoring as incorrect");
                GradingOutcome::incorrect()
            }
        }
    }

    /// Grade a candidate answer to a question.
    pub fn grade_question(&self, question: &Question, candidate: &str) -> GradingOutcome {
        self.grade(question.answer_type, &question.correct_answer, candidate)
    }

    fn grade_algebra(&self, correct: &str, candidate: &str) -> GradingOutcome {
        let ctx = AlgebraContext {
            engine: self.engine.as_ref(),
            tolerance: self.config.algebra_tolerance,
            correct: correct.trim(),
            candidate: candidate.trim(),
        };
        match matching_strategy(&ctx) {
            Some(strategy) => {
                tracing::debug!(strategy, "algebra answers equivalent");
                GradingOutcome::correct()
            }
            None => GradingOutcome::incorrect(),
        }
    }
}

fn parse_number(s: &str) -> Result<f64, GradeError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GradeError::InvalidNumber(s.to_string()))
}

/// Binary match within an absolute tolerance.
pub fn grade_numeric(
    correct: &str,
    candidate: &str,
    tolerance: f64,
) -> Result<GradingOutcome, GradeError> {
    let expected = parse_number(correct)?;
    let actual = parse_number(candidate)?;
    Ok(GradingOutcome::from_match((expected - actual).abs() < tolerance))
}

/// Jaccard similarity over normalized token sets, with partial credit.
pub fn grade_short_answer(correct: &str, candidate: &str, threshold: f64) -> GradingOutcome {
    let correct_norm = normalize_text(correct);
    let candidate_norm = normalize_text(candidate);

    if correct_norm == candidate_norm {
        return GradingOutcome::correct();
    }
    let correct_tokens = token_set(&correct_norm);
    if correct_tokens.is_empty() {
        return GradingOutcome::incorrect();
    }

    let similarity = jaccard(&correct_tokens, &token_set(&candidate_norm));
    GradingOutcome {
        is_correct: similarity >= threshold,
        score: similarity,
    }
}

/// Case- and surrounding-whitespace-insensitive exact match.
pub fn grade_mcq(correct: &str, candidate: &str) -> GradingOutcome {
    GradingOutcome::from_match(correct.trim().to_lowercase() == candidate.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::test_support::TinyEngine;

    fn grader() -> Grader {
        Grader::new(Arc::new(TinyEngine::default()), GradingConfig::default())
    }

    #[test]
    fn numeric_within_tolerance() {
        let g = grader();
        assert_eq!(g.grade(AnswerType::Numeric, "4", "4.0000"), GradingOutcome::correct());
        assert_eq!(g.grade(AnswerType::Numeric, "4", " 4.0009 "), GradingOutcome::correct());
        assert_eq!(g.grade(AnswerType::Numeric, "4", "4.1"), GradingOutcome::incorrect());
        assert_eq!(g.grade(AnswerType::Numeric, "4", "4.002"), GradingOutcome::incorrect());
    }

    #[test]
    fn numeric_parse_failures_are_incorrect() {
        let g = grader();
        assert_eq!(g.grade(AnswerType::Numeric, "4", "four"), GradingOutcome::incorrect());
        assert_eq!(g.grade(AnswerType::Numeric, "abc", "4"), GradingOutcome::incorrect());
        assert_eq!(g.grade(AnswerType::Numeric, "inf", "inf"), GradingOutcome::incorrect());
        assert!(matches!(
            grade_numeric("4", "", 1e-3),
            Err(GradeError::InvalidNumber(_))
        ));
    }

    #[test]
    fn numeric_tolerance_is_configurable() {
        let config = GradingConfig {
            numeric_tolerance: 1e-5,
            ..GradingConfig::default()
        };
        let g = Grader::new(Arc::new(TinyEngine::default()), config);
        assert!(!g.grade(AnswerType::Numeric, "1", "1.0001").is_correct);
        assert!(g.grade(AnswerType::Numeric, "1", "1.000001").is_correct);
    }

    #[test]
    fn short_answer_partial_credit() {
        let outcome = grader().grade(
            AnswerType::ShortAnswer,
            "the mitochondria is the powerhouse of the cell",
            "mitochondria powerhouse cell",
        );
        assert!(!outcome.is_correct);
        assert!((outcome.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn short_answer_exact_and_threshold() {
        let g = grader();
        assert_eq!(
            g.grade(AnswerType::ShortAnswer, "Photosynthesis.", "  photosynthesis "),
            GradingOutcome::correct()
        );
        // 3 shared of 4 total tokens.
        let outcome = g.grade(AnswerType::ShortAnswer, "water boils at 100", "water boils at");
        assert!(outcome.is_correct);
        assert!((outcome.score - 0.75).abs() < 1e-12);
    }

    #[test]
    fn short_answer_empty_reference() {
        let g = grader();
        // Blank after normalization on both sides is still an exact match.
        assert_eq!(g.grade(AnswerType::ShortAnswer, "", ""), GradingOutcome::correct());
        assert_eq!(g.grade(AnswerType::ShortAnswer, "!!!", "???"), GradingOutcome::correct());
        assert_eq!(g.grade(AnswerType::ShortAnswer, "!!!", "anything"), GradingOutcome::incorrect());
        assert_eq!(g.grade(AnswerType::ShortAnswer, "", "a b"), GradingOutcome::incorrect());
    }

    #[test]
    fn mcq_ignores_case_and_padding() {
        let g = grader();
        assert_eq!(g.grade(AnswerType::Mcq, "B", " b "), GradingOutcome::correct());
        assert_eq!(g.grade(AnswerType::Mcq, "B", "C"), GradingOutcome::incorrect());
        assert_eq!(g.grade(AnswerType::Mcq, "B", "b)"), GradingOutcome::incorrect());
    }

    #[test]
    fn unknown_tag_is_incorrect() {
        let g = grader();
        assert_eq!(g.grade_tagged("essay", "a", "a"), GradingOutcome::incorrect());
        assert_eq!(g.grade_tagged("MCQ", "a", "A"), GradingOutcome::correct());
    }

    #[test]
    fn correct_never_below_threshold() {
        let g = grader();
        let pairs = [
            ("red green blue", "red green"),
            ("red green blue", "red green blue yellow"),
            ("a b c d e f g h i j", "a b c d e f g"),
        ];
        for (correct, candidate) in pairs {
            let outcome = g.grade(AnswerType::ShortAnswer, correct, candidate);
            if outcome.is_correct {
                assert!(outcome.score >= 0.7, "{correct} / {candidate}: {outcome:?}");
            }
            assert!((0.0..=1.0).contains(&outcome.score));
        }
    }

    #[test]
    fn grading_is_idempotent() {
        let g = grader();
        let first = g.grade(AnswerType::ShortAnswer, "alpha beta gamma", "beta gamma delta");
        let second = g.grade(AnswerType::ShortAnswer, "alpha beta gamma", "beta gamma delta");
        assert_eq!(first.is_correct, second.is_correct);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
    }
}
