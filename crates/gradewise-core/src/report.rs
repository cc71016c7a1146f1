//! Marking report types with JSON persistence and score comparison.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerType, GradingOutcome};
use crate::statistics::MarkingSummary;

/// Where the graded answers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSourceKind {
    /// Segmented out of OCR text.
    RecognizedText,
    /// Typed directly, one answer per question.
    Typed,
}

/// The grade given to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionMark {
    pub question_id: String,
    pub topic: String,
    pub answer_type: AnswerType,
    /// The candidate answer that was graded.
    pub answer: String,
    pub outcome: GradingOutcome,
}

/// A complete marking report for one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the question set.
    pub question_set: QuestionSetSummary,
    pub source: AnswerSourceKind,
    /// Marks in question order.
    pub marks: Vec<QuestionMark>,
    pub summary: MarkingSummary,
}

/// Summary of a question set (without the questions themselves).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSetSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

impl MarkingReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: MarkingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Load every `.json` report under a directory, or a single report file.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn load_all(path: &Path) -> Result<Vec<Self>> {
        if path.is_file() {
            return Ok(vec![Self::load_json(path)?]);
        }
        if !path.is_dir() {
            anyhow::bail!("no reports at {}", path.display());
        }

        let mut entries = std::fs::read_dir(path)
            .with_context(|| format!("failed to read directory: {}", path.display()))?
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.path());

        let mut reports = Vec::new();
        for entry in entries {
            let file = entry.path();
            if file.is_dir() {
                reports.extend(Self::load_all(&file)?);
            } else if file.extension().is_some_and(|ext| ext == "json") {
                match Self::load_json(&file) {
                    Ok(report) => reports.push(report),
                    Err(e) => tracing::warn!("skipping {}: {:#}", file.display(), e),
                }
            }
        }
        Ok(reports)
    }

    /// Compare per-question scores against a baseline report.
    ///
    /// Useful after changing tolerances or thresholds: re-mark the same
    /// answers and see which questions moved by more than `threshold`.
    pub fn compare(&self, baseline: &MarkingReport, threshold: f64) -> ScoreComparison {
        let score_map = |report: &MarkingReport| -> BTreeMap<String, f64> {
            report
                .marks
                .iter()
                .map(|m| (m.question_id.clone(), m.outcome.score))
                .collect()
        };

        let baseline_scores = score_map(baseline);
        let current_scores = score_map(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_questions = 0usize;

        for (question_id, &current) in &current_scores {
            let Some(&baseline_score) = baseline_scores.get(question_id) else {
                new_questions += 1;
                continue;
            };
            let change = ScoreChange {
                question_id: question_id.clone(),
                baseline_score,
                current_score: current,
                delta: current - baseline_score,
            };
            if change.delta < -threshold {
                regressions.push(change);
            } else if change.delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let removed_questions = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(*k))
            .count();

        ScoreComparison {
            regressions,
            improvements,
            unchanged,
            new_questions,
            removed_questions,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComparison {
    /// Questions whose score went down.
    pub regressions: Vec<ScoreChange>,
    /// Questions whose score went up.
    pub improvements: Vec<ScoreChange>,
    /// Questions with no significant change.
    pub unchanged: usize,
    /// Questions in current but not baseline.
    pub new_questions: usize,
    /// Questions in baseline but not current.
    pub removed_questions: usize,
}

/// A score change for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
    pub question_id: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
}

impl ScoreComparison {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        for (title, changes) in [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Question | Baseline | Current | Delta |\n");
            md.push_str("|----------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:+.1}% |\n",
                    c.question_id,
                    c.baseline_score * 100.0,
                    c.current_score * 100.0,
                    c.delta * 100.0
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
