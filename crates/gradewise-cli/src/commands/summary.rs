//! The `gradewise summary` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradewise_core::report::MarkingReport;
use gradewise_core::statistics::{aggregate, AggregateSummary};

pub fn execute(reports_path: PathBuf, format: String) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "table" | "json"),
        "unknown format '{format}', expected table or json"
    );

    let reports = MarkingReport::load_all(&reports_path)?;
    anyhow::ensure!(
        !reports.is_empty(),
        "no reports found in {}",
        reports_path.display()
    );
    tracing::info!("summarizing {} report(s)", reports.len());

    let summary = aggregate(&reports);
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &AggregateSummary) {
    println!(
        "{} submission(s), overall {:.1}%",
        summary.submissions,
        summary.overall_score * 100.0
    );

    let mut sets = Table::new();
    sets.set_header(vec!["Question set", "Submissions", "Average"]);
    for set in &summary.question_sets {
        sets.add_row(vec![
            Cell::new(&set.name),
            Cell::new(set.submissions),
            Cell::new(format!("{:.1}%", set.average_score * 100.0)),
        ]);
    }
    println!("{sets}");

    if !summary.hardest_questions.is_empty() {
        let mut hardest = Table::new();
        hardest.set_header(vec!["Question", "Topic", "Correct", "Percent"]);
        for question in &summary.hardest_questions {
            hardest.add_row(vec![
                Cell::new(format!("{}/{}", question.question_set, question.question_id)),
                Cell::new(&question.topic),
                Cell::new(format!("{}/{}", question.correct, question.attempts)),
                Cell::new(format!("{:.1}%", question.percent_correct * 100.0)),
            ]);
        }
        println!("{hardest}");
    }

    if !summary.strengths.is_empty() {
        println!("Strengths: {}", summary.strengths.join(", "));
    }
    if !summary.weak_topics.is_empty() {
        println!("Needs work: {}", summary.weak_topics.join(", "));
    }
    for item in &summary.recommended_practice {
        println!(
            "Practice: {}/{} ({})",
            item.question_set, item.question_id, item.topic
        );
    }
}
