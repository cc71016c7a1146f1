//! TOML question set parser.
//!
//! Loads question sets from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerType, Question, QuestionSet};
use crate::normalize::normalize_text;

/// Intermediate TOML structure for parsing question set files.
#[derive(Debug, Deserialize)]
struct TomlQuestionFile {
    question_set: TomlQuestionSetHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestionSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    answer_type: String,
    correct_answer: String,
    #[serde(default)]
    topic: String,
    #[serde(default)]
    prompt: Option<String>,
}

/// Parse a single TOML file into a `QuestionSet`.
pub fn parse_question_set(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set file: {}", path.display()))?;

    parse_question_set_str(&content, path)
}

/// Parse a TOML string into a `QuestionSet` (useful for testing).
pub fn parse_question_set_str(content: &str, source_path: &Path) -> Result<QuestionSet> {
    let parsed: TomlQuestionFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let answer_type: AnswerType = q
                .answer_type
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;
            Ok(Question {
                id: q.id,
                answer_type,
                correct_answer: q.correct_answer,
                topic: q.topic,
                prompt: q.prompt,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionSet {
        id: parsed.question_set.id,
        name: parsed.question_set.name,
        description: parsed.question_set.description,
        questions,
    })
}

/// Recursively load all `.toml` question set files from a directory.
pub fn load_question_directory(dir: &Path) -> Result<Vec<QuestionSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_question_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_question_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from question set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn for_question(question: &Question, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(question.id.clone()),
            message: message.into(),
        }
    }
}

/// Validate a question set for common authoring mistakes.
pub fn validate_question_set(set: &QuestionSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "question set has no questions".into(),
        });
    }

    let mut seen_ids = std::collections::HashSet::new();
    for q in &set.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning::for_question(
                q,
                format!("duplicate question ID: {}", q.id),
            ));
        }

        if q.correct_answer.trim().is_empty() {
            warnings.push(ValidationWarning::for_question(q, "correct_answer is empty"));
            continue;
        }

        if q.topic.trim().is_empty() {
            warnings.push(ValidationWarning::for_question(q, "topic is empty"));
        }

        match q.answer_type {
            AnswerType::Numeric => {
                let parsed = q.correct_answer.trim().parse::<f64>();
                if !parsed.is_ok_and(f64::is_finite) {
                    warnings.push(ValidationWarning::for_question(
                        q,
                        format!("numeric answer is not a number: {:?}", q.correct_answer),
                    ));
                }
            }
            AnswerType::Algebra => {
                if q.correct_answer.matches('=').count() > 1 {
                    warnings.push(ValidationWarning::for_question(
                        q,
                        "algebra answer has more than one '=' and will only match as text",
                    ));
                }
            }
            AnswerType::ShortAnswer => {
                if normalize_text(&q.correct_answer).is_empty() {
                    warnings.push(ValidationWarning::for_question(
                        q,
                        "short answer has no words after normalization and only matches a blank answer",
                    ));
                }
            }
            AnswerType::Mcq => {}
        }
    }

    warnings
}
