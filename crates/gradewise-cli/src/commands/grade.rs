//! The `gradewise grade` command.

use std::path::PathBuf;

use anyhow::Result;

use gradewise_core::config::load_config_from;
use gradewise_core::model::AnswerType;

use super::build_grader;

pub fn execute(
    answer_type: String,
    correct: String,
    candidate: String,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let grader = build_grader(&config);

    if let Err(e) = answer_type.parse::<AnswerType>() {
        tracing::warn!("{e}; the answer will be scored as incorrect");
    }
    let outcome = grader.grade_tagged(&answer_type, &correct, &candidate);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{outcome}");
    }

    Ok(())
}
