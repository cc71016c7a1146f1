//! Marking engine.
//!
//! Turns a submission (recognized text or typed answers) into a
//! [`MarkingReport`] by segmenting, grading every question once, and
//! summarizing the marks.

use std::time::Instant;

use uuid::Uuid;

use crate::grader::Grader;
use crate::model::{ExtractedAnswer, QuestionSet};
use crate::report::{AnswerSourceKind, MarkingReport, QuestionMark, QuestionSetSummary};
use crate::segmenter::segment;
use crate::statistics::summarize;

/// Where a submission's answers come from.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerSource {
    /// Raw OCR output, split into answers by the segmenter.
    RecognizedText(String),
    /// One answer per question, in question order.
    Typed(Vec<String>),
}

impl AnswerSource {
    pub fn kind(&self) -> AnswerSourceKind {
        match self {
            AnswerSource::RecognizedText(_) => AnswerSourceKind::RecognizedText,
            AnswerSource::Typed(_) => AnswerSourceKind::Typed,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_question_marked(&self, mark: &QuestionMark);
    fn on_marking_complete(&self, report: &MarkingReport);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_question_marked(&self, _: &QuestionMark) {}
    fn on_marking_complete(&self, _: &MarkingReport) {}
}

/// Grades whole submissions against a question set.
#[derive(Debug, Clone)]
pub struct MarkingEngine {
    grader: Grader,
}

impl MarkingEngine {
    pub fn new(grader: Grader) -> Self {
        Self { grader }
    }

    pub fn grader(&self) -> &Grader {
        &self.grader
    }

    /// Mark a submission.
    pub fn mark(&self, set: &QuestionSet, source: &AnswerSource) -> MarkingReport {
        self.mark_with_progress(set, source, &NoopReporter)
    }

    /// Mark a submission, reporting each question as it is graded.
    pub fn mark_with_progress(
        &self,
        set: &QuestionSet,
        source: &AnswerSource,
        progress: &dyn ProgressReporter,
    ) -> MarkingReport {
        let start = Instant::now();
        let answers = extract_answers(set, source);

        let marks: Vec<QuestionMark> = set
            .questions
            .iter()
            .zip(answers)
            .map(|(question, answer)| {
                let outcome = self.grader.grade_question(question, &answer.text);
                let mark = QuestionMark {
                    question_id: question.id.clone(),
                    topic: question.topic.clone(),
                    answer_type: question.answer_type,
                    answer: answer.text,
                    outcome,
                };
                tracing::debug!(
                    question = %mark.question_id,
                    answer_type = %mark.answer_type,
                    outcome = %mark.outcome,
                    "marked question"
                );
                progress.on_question_marked(&mark);
                mark
            })
            .collect();

        let summary = summarize(&marks);
        tracing::info!(
            question_set = %set.id,
            correct = summary.correct,
            total = summary.total,
            overall_score = summary.overall_score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "marking complete"
        );

        let report = MarkingReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            question_set: QuestionSetSummary {
                id: set.id.clone(),
                name: set.name.clone(),
                question_count: set.questions.len(),
            },
            source: source.kind(),
            marks,
            summary,
        };
        progress.on_marking_complete(&report);
        report
    }
}

fn extract_answers(set: &QuestionSet, source: &AnswerSource) -> Vec<ExtractedAnswer> {
    match source {
        AnswerSource::RecognizedText(text) => segment(text, &set.questions),
        AnswerSource::Typed(answers) => {
            if answers.len() > set.questions.len() {
                tracing::warn!(
                    extra = answers.len() - set.questions.len(),
                    "more typed answers than questions, ignoring the extras"
                );
            }
            set.questions
                .iter()
                .enumerate()
                .map(|(i, q)| ExtractedAnswer {
                    question_id: q.id.clone(),
                    text: answers.get(i).map(|a| a.trim().to_string()).unwrap_or_default(),
                })
                .collect()
        }
    }
}
