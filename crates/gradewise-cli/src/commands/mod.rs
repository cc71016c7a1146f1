//! Subcommand implementations.

pub mod compare;
pub mod grade;
pub mod init;
pub mod mark;
pub mod segment;
pub mod summary;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use gradewise_core::config::GradewiseConfig;
use gradewise_core::grader::Grader;
use gradewise_core::model::QuestionSet;
use gradewise_core::parser;
use gradewise_symbolic::PolynomialEngine;

/// Build a grader backed by the default symbolic engine.
pub fn build_grader(config: &GradewiseConfig) -> Grader {
    let engine = PolynomialEngine::new(config.limits);
    Grader::new(Arc::new(engine), config.grading)
}

/// Load a single question set, warning about authoring mistakes.
pub fn load_questions(path: &Path) -> Result<QuestionSet> {
    let set = parser::parse_question_set(path)?;
    for warning in parser::validate_question_set(&set) {
        match &warning.question_id {
            Some(id) => tracing::warn!("{}: [{id}] {}", set.id, warning.message),
            None => tracing::warn!("{}: {}", set.id, warning.message),
        }
    }
    Ok(set)
}

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
