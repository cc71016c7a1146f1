//! Core data model types for gradewise.
//!
//! Questions, grading outcomes and extraction results. Every value here is
//! created and consumed within a single grading or extraction call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a question's answer is compared against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    Numeric,
    Algebra,
    ShortAnswer,
    Mcq,
}

impl AnswerType {
    /// Score at or above which an answer of this type counts as correct.
    ///
    /// Binary types only ever produce 0.0 or 1.0, so their threshold is 1.0.
    pub fn correctness_threshold(self, short_answer_threshold: f64) -> f64 {
        match self {
            AnswerType::ShortAnswer => short_answer_threshold,
            _ => 1.0,
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerType::Numeric => write!(f, "numeric"),
            AnswerType::Algebra => write!(f, "algebra"),
            AnswerType::ShortAnswer => write!(f, "short_answer"),
            AnswerType::Mcq => write!(f, "mcq"),
        }
    }
}

impl FromStr for AnswerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numeric" | "number" => Ok(AnswerType::Numeric),
            "algebra" | "algebraic" => Ok(AnswerType::Algebra),
            "short_answer" | "short-answer" | "short" => Ok(AnswerType::ShortAnswer),
            "mcq" | "multiple_choice" | "multiple-choice" => Ok(AnswerType::Mcq),
            other => Err(format!("unknown answer type: {other}")),
        }
    }
}

/// A single question as provided by the question source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stored identifier. Never used for positional numbering.
    pub id: String,
    /// How answers to this question are graded.
    pub answer_type: AnswerType,
    /// Canonical correct answer.
    pub correct_answer: String,
    /// Topic label used for per-topic statistics.
    pub topic: String,
    /// Question text shown to students.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// An ordered collection of questions, e.g. one assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Unique identifier for this question set.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this question set.
    #[serde(default)]
    pub description: String,
    /// Questions in positional order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Result of grading one candidate answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingOutcome {
    pub is_correct: bool,
    /// Score in `[0.0, 1.0]`.
    pub score: f64,
}

impl GradingOutcome {
    /// Full marks.
    pub const fn correct() -> Self {
        Self {
            is_correct: true,
            score: 1.0,
        }
    }

    /// No marks.
    pub const fn incorrect() -> Self {
        Self {
            is_correct: false,
            score: 0.0,
        }
    }

    /// Binary outcome for types without partial credit.
    pub const fn from_match(matched: bool) -> Self {
        if matched {
            Self::correct()
        } else {
            Self::incorrect()
        }
    }
}

impl fmt::Display for GradingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_correct { "correct" } else { "incorrect" };
        write!(f, "{verdict} (score {:.3})", self.score)
    }
}

/// The answer text segmented out of recognized text for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedAnswer {
    pub question_id: String,
    /// Empty when no span was found for the question.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_type_display_and_parse() {
        assert_eq!(AnswerType::ShortAnswer.to_string(), "short_answer");
        assert_eq!("MCQ".parse::<AnswerType>().unwrap(), AnswerType::Mcq);
        assert_eq!(
            " algebra ".parse::<AnswerType>().unwrap(),
            AnswerType::Algebra
        );
        assert_eq!(
            "short-answer".parse::<AnswerType>().unwrap(),
            AnswerType::ShortAnswer
        );
        assert!("essay".parse::<AnswerType>().is_err());
    }

    #[test]
    fn thresholds() {
        assert_eq!(AnswerType::ShortAnswer.correctness_threshold(0.7), 0.7);
        assert_eq!(AnswerType::Numeric.correctness_threshold(0.7), 1.0);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(GradingOutcome::correct().to_string(), "correct (score 1.000)");
        let partial = GradingOutcome {
            is_correct: false,
            score: 0.5,
        };
        assert_eq!(partial.to_string(), "incorrect (score 0.500)");
    }

    #[test]
    fn question_serde_roundtrip() {
        let q = Question {
            id: "q-7".into(),
            answer_type: AnswerType::ShortAnswer,
            correct_answer: "photosynthesis".into(),
            topic: "biology".into(),
            prompt: None,
        };
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"short_answer\""));
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
