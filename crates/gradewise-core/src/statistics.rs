//! Aggregate statistics over graded answers.
//!
//! Per-topic accuracy drives the strengths / weak topics lists shown to
//! students and teachers. [`summarize`] covers one submission and
//! [`aggregate`] covers many saved reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::report::{MarkingReport, QuestionMark};

/// Topics at or above this accuracy are strengths.
pub const STRENGTH_ACCURACY: f64 = 0.7;
/// Topics below this accuracy are weak.
pub const WEAK_ACCURACY: f64 = 0.5;
/// Length of the hardest-questions list.
pub const HARDEST_QUESTIONS: usize = 10;
/// Weak topics that get practice recommendations.
pub const PRACTICE_TOPICS: usize = 3;
/// Missed questions recommended per weak topic.
pub const PRACTICE_PER_TOPIC: usize = 2;

/// Accuracy for a single topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicStats {
    pub topic: String,
    pub correct: usize,
    pub total: usize,
    /// `correct / total`.
    pub accuracy: f64,
}

/// Summary of one marked submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkingSummary {
    /// Number of questions graded.
    pub total: usize,
    /// Number of answers judged correct.
    pub correct: usize,
    /// Mean score across all questions.
    pub overall_score: f64,
    /// Per-topic accuracy, weakest first.
    pub topics: Vec<TopicStats>,
    pub strengths: Vec<String>,
    pub weak_topics: Vec<String>,
}

/// Compute the summary for a set of marks.
pub fn summarize(marks: &[QuestionMark]) -> MarkingSummary {
    let total = marks.len();
    let correct = marks.iter().filter(|m| m.outcome.is_correct).count();
    let overall_score = if total == 0 {
        0.0
    } else {
        marks.iter().map(|m| m.outcome.score).sum::<f64>() / total as f64
    };

    let topics = topic_stats(marks.iter());
    let (strengths, weak_topics) = classify(&topics);

    MarkingSummary {
        total,
        correct,
        overall_score,
        topics,
        strengths,
        weak_topics,
    }
}

/// Per-topic accuracy, weakest first. Ties keep topic name order.
fn topic_stats<'a>(marks: impl Iterator<Item = &'a QuestionMark>) -> Vec<TopicStats> {
    let mut per_topic: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for mark in marks {
        let entry = per_topic.entry(mark.topic.as_str()).or_default();
        entry.1 += 1;
        if mark.outcome.is_correct {
            entry.0 += 1;
        }
    }

    let mut topics: Vec<TopicStats> = per_topic
        .into_iter()
        .map(|(topic, (correct, total))| TopicStats {
            topic: topic.to_string(),
            correct,
            total,
            accuracy: correct as f64 / total as f64,
        })
        .collect();
    topics.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy));
    topics
}

/// Split topics into strengths and weak topics, keeping their order.
fn classify(topics: &[TopicStats]) -> (Vec<String>, Vec<String>) {
    let strengths = topics
        .iter()
        .filter(|t| t.accuracy >= STRENGTH_ACCURACY)
        .map(|t| t.topic.clone())
        .collect();
    let weak_topics = topics
        .iter()
        .filter(|t| t.accuracy < WEAK_ACCURACY)
        .map(|t| t.topic.clone())
        .collect();
    (strengths, weak_topics)
}

/// Average score of one question set across submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSetAverage {
    pub question_set: String,
    pub name: String,
    /// Submissions with at least one mark.
    pub submissions: usize,
    /// Mean of the per-submission overall scores.
    pub average_score: f64,
}

/// How often one question was answered correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDifficulty {
    pub question_set: String,
    pub question_id: String,
    pub topic: String,
    pub attempts: usize,
    pub correct: usize,
    pub percent_correct: f64,
}

/// A missed question worth practising again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeItem {
    pub topic: String,
    pub question_set: String,
    pub question_id: String,
}

/// Statistics across many marked submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub submissions: usize,
    /// Mean score across every graded answer.
    pub overall_score: f64,
    /// Per-topic accuracy over all answers, weakest first.
    pub topics: Vec<TopicStats>,
    pub strengths: Vec<String>,
    pub weak_topics: Vec<String>,
    /// Missed questions from the weakest topics.
    pub recommended_practice: Vec<PracticeItem>,
    /// One entry per question set, ordered by id.
    pub question_sets: Vec<QuestionSetAverage>,
    /// Lowest percent-correct first.
    pub hardest_questions: Vec<QuestionDifficulty>,
}

/// Combine saved reports into class-wide and student-wide statistics.
pub fn aggregate(reports: &[MarkingReport]) -> AggregateSummary {
    let marks = || reports.iter().flat_map(|r| r.marks.iter());

    let graded = marks().count();
    let overall_score = if graded == 0 {
        0.0
    } else {
        marks().map(|m| m.outcome.score).sum::<f64>() / graded as f64
    };

    let topics = topic_stats(marks());
    let (strengths, weak_topics) = classify(&topics);

    let mut per_set: BTreeMap<&str, (&str, usize, f64)> = BTreeMap::new();
    let mut per_question: BTreeMap<(&str, &str), (&str, usize, usize)> = BTreeMap::new();
    for report in reports {
        let set_id = report.question_set.id.as_str();
        if !report.marks.is_empty() {
            let entry = per_set
                .entry(set_id)
                .or_insert((report.question_set.name.as_str(), 0, 0.0));
            entry.1 += 1;
            entry.2 += report.summary.overall_score;
        }
        for mark in &report.marks {
            let entry = per_question
                .entry((set_id, mark.question_id.as_str()))
                .or_insert((mark.topic.as_str(), 0, 0));
            entry.1 += 1;
            if mark.outcome.is_correct {
                entry.2 += 1;
            }
        }
    }

    let question_sets = per_set
        .into_iter()
        .map(|(id, (name, submissions, score_sum))| QuestionSetAverage {
            question_set: id.to_string(),
            name: name.to_string(),
            submissions,
            average_score: score_sum / submissions as f64,
        })
        .collect();

    let mut hardest_questions: Vec<QuestionDifficulty> = per_question
        .into_iter()
        .map(|((set_id, question_id), (topic, attempts, correct))| QuestionDifficulty {
            question_set: set_id.to_string(),
            question_id: question_id.to_string(),
            topic: topic.to_string(),
            attempts,
            correct,
            percent_correct: correct as f64 / attempts as f64,
        })
        .collect();
    hardest_questions.sort_by(|a, b| a.percent_correct.total_cmp(&b.percent_correct));
    hardest_questions.truncate(HARDEST_QUESTIONS);

    let recommended_practice = recommend_practice(reports, &weak_topics);

    AggregateSummary {
        submissions: reports.len(),
        overall_score,
        topics,
        strengths,
        weak_topics,
        recommended_practice,
        question_sets,
        hardest_questions,
    }
}

/// Distinct missed questions from the first few weak topics, in report order.
fn recommend_practice(reports: &[MarkingReport], weak_topics: &[String]) -> Vec<PracticeItem> {
    let mut items = Vec::new();
    for topic in weak_topics.iter().take(PRACTICE_TOPICS) {
        let mut picked: Vec<PracticeItem> = Vec::new();
        'reports: for report in reports {
            let missed = report
                .marks
                .iter()
                .filter(|m| &m.topic == topic && !m.outcome.is_correct);
            for mark in missed {
                if picked.len() == PRACTICE_PER_TOPIC {
                    break 'reports;
                }
                let item = PracticeItem {
                    topic: topic.clone(),
                    question_set: report.question_set.id.clone(),
                    question_id: mark.question_id.clone(),
                };
                if !picked.contains(&item) {
                    picked.push(item);
                }
            }
        }
        items.extend(picked);
    }
    items
}
