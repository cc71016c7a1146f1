//! OCR answer segmentation.
//!
//! Splits a block of recognized text into one answer per question. Students
//! number answers by position (1-based), so marker numbers are mapped back to
//! question identifiers through the question list order.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::{ExtractedAnswer, Question};
use crate::normalize::collapse_whitespace;

/// One style of answer numbering.
struct MarkerFamily {
    name: &'static str,
    regex: Regex,
    /// Reject markers immediately followed by a digit, so `2.5` is not `2.`.
    reject_digit_after: bool,
}

/// A marker occurrence in the text.
#[derive(Debug, Clone, Copy)]
struct Marker {
    family: usize,
    number: usize,
    start: usize,
    end: usize,
}

/// Marker families in priority order. Earlier families claim numbers first.
fn families() -> &'static [MarkerFamily] {
    static FAMILIES: OnceLock<Vec<MarkerFamily>> = OnceLock::new();
    FAMILIES.get_or_init(|| {
        vec![
            MarkerFamily {
                name: "numbered",
                regex: Regex::new(r"(?m)(?:^|[^\w.+\-*/^=])(\d+)[.)]")
                    .expect("numbered marker regex compile should succeed"),
                reject_digit_after: true,
            },
            MarkerFamily {
                name: "q_prefix",
                regex: Regex::new(r"(?i)\bq\s*(\d+)\s*[:.)\-]?")
                    .expect("q marker regex compile should succeed"),
                reject_digit_after: false,
            },
            MarkerFamily {
                name: "question_prefix",
                regex: Regex::new(r"(?i)\bquestion\s*(\d+)\s*[:.)\-]?")
                    .expect("question marker regex compile should succeed"),
                reject_digit_after: false,
            },
        ]
    })
}

fn find_markers(text: &str) -> Vec<Marker> {
    let mut markers = Vec::new();
    for (index, family) in families().iter().enumerate() {
        for caps in family.regex.captures_iter(text) {
            let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if family.reject_digit_after
                && text[whole.end()..].starts_with(|c: char| c.is_ascii_digit())
            {
                continue;
            }
            // Absurdly long digit runs are not question numbers.
            let Ok(number) = digits.as_str().parse::<usize>() else {
                continue;
            };
            markers.push(Marker {
                family: index,
                number,
                start: whole.start(),
                end: whole.end(),
            });
        }
    }
    markers.sort_by_key(|m| (m.start, m.family));
    markers
}

/// Segment recognized text into answers, one per question, in question order.
///
/// Never fails: questions with no matching span get an empty answer.
pub fn segment(raw_text: &str, questions: &[Question]) -> Vec<ExtractedAnswer> {
    let count = questions.len();
    let markers = find_markers(raw_text);
    let mut found: BTreeMap<usize, String> = BTreeMap::new();

    for (index, family) in families().iter().enumerate() {
        if found.len() == count {
            break;
        }
        let mut claimed = 0usize;
        for marker in markers.iter().filter(|m| m.family == index) {
            if marker.number == 0 || marker.number > count || found.contains_key(&marker.number) {
                continue;
            }
            // A span runs until the next marker of the same family.
            let stop = markers
                .iter()
                .filter(|m| m.family == marker.family)
                .map(|m| m.start)
                .find(|&start| start >= marker.end)
                .unwrap_or(raw_text.len());
            let text = collapse_whitespace(&raw_text[marker.end..stop]);
            if text.is_empty() {
                continue;
            }
            found.insert(marker.number, text);
            claimed += 1;
        }
        if claimed > 0 {
            tracing::debug!(family = family.name, claimed, "segmented answers");
        }
    }

    assemble(questions, |position| found.remove(&position))
}

/// Assign the i-th non-blank line to the i-th question.
///
/// A simpler fallback for answer sheets written one answer per line without
/// numbering. Extra lines are ignored; missing lines yield empty answers.
pub fn segment_lines(raw_text: &str, questions: &[Question]) -> Vec<ExtractedAnswer> {
    let mut lines = raw_text
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty());
    assemble(questions, |_| lines.next())
}

fn assemble(
    questions: &[Question],
    mut answer_for: impl FnMut(usize) -> Option<String>,
) -> Vec<ExtractedAnswer> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| ExtractedAnswer {
            question_id: q.id.clone(),
            text: answer_for(i + 1).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerType;

    fn questions(ids: &[&str]) -> Vec<Question> {
        ids.iter()
            .map(|id| Question {
                id: id.to_string(),
                answer_type: AnswerType::ShortAnswer,
                correct_answer: "x".into(),
                topic: "t".into(),
                prompt: None,
            })
            .collect()
    }

    fn texts(answers: &[ExtractedAnswer]) -> Vec<&str> {
        answers.iter().map(|a| a.text.as_str()).collect()
    }

    #[test]
    fn empty_text_yields_empty_answers() {
        let answers = segment("", &questions(&["q1", "q2"]));
        assert_eq!(
            answers,
            vec![
                ExtractedAnswer {
                    question_id: "q1".into(),
                    text: String::new()
                },
                ExtractedAnswer {
                    question_id: "q2".into(),
                    text: String::new()
                },
            ]
        );
    }

    #[test]
    fn numbered_answers_map_by_position() {
        let answers = segment("1. 42\n2. x=3", &questions(&["alpha", "beta"]));
        assert_eq!(answers[0].question_id, "alpha");
        assert_eq!(answers[1].question_id, "beta");
        assert_eq!(texts(&answers), vec!["42", "x=3"]);
    }

    #[test]
    fn parenthesis_markers_and_multiline_spans() {
        let raw = "1) the cell\n   wall\n\n2)   chlorophyll  ";
        let answers = segment(raw, &questions(&["a", "b"]));
        assert_eq!(texts(&answers), vec!["the cell wall", "chlorophyll"]);
    }

    #[test]
    fn decimals_are_not_markers() {
        let answers = segment("1. x = 2.5\n2. 3.14", &questions(&["a", "b"]));
        assert_eq!(texts(&answers), vec!["x = 2.5", "3.14"]);
    }

    #[test]
    fn q_prefix_family() {
        let answers = segment("q1: 12\nQ 2 - y=4\nQ3 B", &questions(&["a", "b", "c"]));
        assert_eq!(texts(&answers), vec!["12", "y=4", "B"]);
    }

    #[test]
    fn question_prefix_family() {
        let raw = "Question 1: mitochondria\nQUESTION 2 - osmosis";
        let answers = segment(raw, &questions(&["a", "b"]));
        assert_eq!(texts(&answers), vec!["mitochondria", "osmosis"]);
    }

    #[test]
    fn earlier_family_claims_first() {
        let answers = segment("Q1: from q\n1. from numbered", &questions(&["a"]));
        assert_eq!(texts(&answers), vec!["from numbered"]);
    }

    #[test]
    fn later_families_fill_gaps() {
        let raw = "Question 3: third\n1. first\n2. second";
        let answers = segment(raw, &questions(&["a", "b", "c"]));
        assert_eq!(
            texts(&answers),
            vec!["first", "second", "third 1. first 2. second"]
        );
    }

    #[test]
    fn other_family_markers_stay_inside_spans() {
        let answers = segment("1. see question 3 first\n2. b\n3. c", &questions(&["a", "b", "c"]));
        assert_eq!(texts(&answers), vec!["see question 3 first", "b", "c"]);

        let answers = segment("1. answer is q2 squared\n2. b", &questions(&["a", "b"]));
        assert_eq!(texts(&answers), vec!["answer is q2 squared", "b"]);
    }

    #[test]
    fn markers_after_punctuation() {
        let answers = segment("Answers:1. 42 (2) 17", &questions(&["a", "b"]));
        assert_eq!(texts(&answers), vec!["42", "17"]);
    }

    #[test]
    fn brackets_inside_algebra_are_not_markers() {
        let answers = segment("1. (x+2)(x-2)\n2. y = 3(x/4)", &questions(&["a", "b"]));
        assert_eq!(texts(&answers), vec!["(x+2)(x-2)", "y = 3(x/4)"]);
    }

    #[test]
    fn out_of_range_and_missing_numbers() {
        let answers = segment("2. two\n7. seven", &questions(&["a", "b", "c"]));
        assert_eq!(texts(&answers), vec!["", "two", ""]);
    }

    #[test]
    fn empty_span_does_not_claim() {
        let answers = segment("1.\n2. b\nQ1: a", &questions(&["a", "b"]));
        assert_eq!(texts(&answers), vec!["a", "b Q1: a"]);
    }

    #[test]
    fn first_occurrence_wins_within_family() {
        let answers = segment("1. first\n1. again", &questions(&["a"]));
        assert_eq!(texts(&answers), vec!["first"]);
    }

    #[test]
    fn words_containing_q_are_not_markers() {
        let answers = segment("Iraq 5 is not a marker", &questions(&["a", "b", "c", "d", "e"]));
        assert!(answers.iter().all(|a| a.text.is_empty()));
    }

    #[test]
    fn output_length_matches_questions() {
        for raw in ["", "garbage", "1. a 2. b 3. c 4. d", "Q9: z"] {
            assert_eq!(segment(raw, &questions(&["a", "b"])).len(), 2);
        }
        assert!(segment("1. a", &[]).is_empty());
    }

    #[test]
    fn segmenting_is_idempotent() {
        let qs = questions(&["a", "b"]);
        let raw = "1) yes\nQuestion 2: no";
        assert_eq!(segment(raw, &qs), segment(raw, &qs));
    }

    #[test]
    fn line_segmentation() {
        let answers = segment_lines("  42 \n\n x = 3\n", &questions(&["a", "b", "c"]));
        assert_eq!(texts(&answers), vec!["42", "x = 3", ""]);
        let answers = segment_lines("a\nb\nc", &questions(&["only"]));
        assert_eq!(texts(&answers), vec!["a"]);
    }
}
