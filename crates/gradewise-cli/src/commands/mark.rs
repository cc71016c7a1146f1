//! The `gradewise mark` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradewise_core::config::load_config_from;
use gradewise_core::engine::{AnswerSource, MarkingEngine, ProgressReporter};
use gradewise_core::report::{MarkingReport, QuestionMark};

use super::{build_grader, load_questions, read_text};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_question_marked(&self, mark: &QuestionMark) {
        let verdict = if mark.outcome.is_correct { "OK" } else { "--" };
        eprintln!(
            "  [{verdict}] {} ({}) score {:.3}",
            mark.question_id, mark.answer_type, mark.outcome.score
        );
    }

    fn on_marking_complete(&self, report: &MarkingReport) {
        eprintln!(
            "\nMarked {} question(s) from {}",
            report.marks.len(),
            report.question_set.name
        );
    }
}

pub fn execute(
    questions_path: PathBuf,
    text_path: Option<PathBuf>,
    answers_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "table" | "json" | "all"),
        "unknown format '{format}', expected table, json or all"
    );

    let config = load_config_from(config_path.as_deref())?;
    let set = load_questions(&questions_path)?;

    let source = match (text_path, answers_path) {
        (Some(text), _) => AnswerSource::RecognizedText(read_text(&text)?),
        (None, Some(answers)) => AnswerSource::Typed(
            read_text(&answers)?
                .lines()
                .map(str::to_string)
                .collect(),
        ),
        (None, None) => anyhow::bail!("either --text or --answers is required"),
    };

    let engine = MarkingEngine::new(build_grader(&config));
    let report = engine.mark_with_progress(&set, &source, &ConsoleReporter);

    if format != "json" {
        print_summary(&report);
    }
    println!(
        "Score: {}/{} correct, overall {:.1}%",
        report.summary.correct,
        report.summary.total,
        report.summary.overall_score * 100.0
    );

    if format != "table" {
        let output = output.unwrap_or(config.output_dir);
        let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
        let path = output.join(format!("report-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &MarkingReport) {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Type", "Answer", "Correct", "Score"]);
    for mark in &report.marks {
        table.add_row(vec![
            Cell::new(&mark.question_id),
            Cell::new(mark.answer_type),
            Cell::new(&mark.answer),
            Cell::new(if mark.outcome.is_correct { "yes" } else { "no" }),
            Cell::new(format!("{:.3}", mark.outcome.score)),
        ]);
    }
    println!("{table}");

    if report.summary.topics.is_empty() {
        return;
    }

    let mut topics = Table::new();
    topics.set_header(vec!["Topic", "Correct", "Accuracy"]);
    for topic in &report.summary.topics {
        topics.add_row(vec![
            Cell::new(&topic.topic),
            Cell::new(format!("{}/{}", topic.correct, topic.total)),
            Cell::new(format!("{:.1}%", topic.accuracy * 100.0)),
        ]);
    }
    println!("{topics}");

    if !report.summary.strengths.is_empty() {
        println!("Strengths: {}", report.summary.strengths.join(", "));
    }
    if !report.summary.weak_topics.is_empty() {
        println!("Needs work: {}", report.summary.weak_topics.join(", "));
    }
}
