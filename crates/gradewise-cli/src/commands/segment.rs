//! The `gradewise segment` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradewise_core::segmenter::{segment, segment_lines};

use super::{load_questions, read_text};

pub fn execute(questions_path: PathBuf, text_path: PathBuf, by_lines: bool) -> Result<()> {
    let set = load_questions(&questions_path)?;
    let raw_text = read_text(&text_path)?;

    let answers = if by_lines {
        segment_lines(&raw_text, &set.questions)
    } else {
        segment(&raw_text, &set.questions)
    };

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Answer"]);
    for (position, answer) in answers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(position + 1),
            Cell::new(&answer.question_id),
            Cell::new(if answer.text.is_empty() {
                "(none)"
            } else {
                answer.text.as_str()
            }),
        ]);
    }
    println!("{table}");

    let missing = answers.iter().filter(|a| a.text.is_empty()).count();
    if missing > 0 {
        println!("{missing} question(s) without an answer");
    }

    Ok(())
}
