//! End-to-end marking of the bundled question sets.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gradewise_core::config::GradingConfig;
use gradewise_core::engine::{AnswerSource, MarkingEngine};
use gradewise_core::grader::Grader;
use gradewise_core::parser::{load_question_directory, parse_question_set, validate_question_set};
use gradewise_core::report::{AnswerSourceKind, MarkingReport};
use gradewise_symbolic::PolynomialEngine;

fn repo_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(relative)
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn engine(config: GradingConfig) -> MarkingEngine {
    MarkingEngine::new(Grader::new(Arc::new(PolynomialEngine::default()), config))
}

#[test]
fn bundled_question_sets_are_valid() {
    let sets = load_question_directory(&repo_path("question-sets")).unwrap();
    assert_eq!(sets.len(), 2);
    for set in &sets {
        assert!(validate_question_set(set).is_empty(), "{}", set.id);
    }
}

#[test]
fn mark_typed_algebra() {
    let set = parse_question_set(&repo_path("question-sets/algebra-basics.toml")).unwrap();
    let answers = std::fs::read_to_string(fixture("algebra-typed.txt"))
        .unwrap()
        .lines()
        .map(String::from)
        .collect();

    let report = engine(GradingConfig::default()).mark(&set, &AnswerSource::Typed(answers));

    assert_eq!(report.source, AnswerSourceKind::Typed);
    let verdicts: Vec<bool> = report.marks.iter().map(|m| m.outcome.is_correct).collect();
    assert_eq!(verdicts, [true, true, true, true, true, false]);
    assert_eq!(report.summary.correct, 5);
    assert_eq!(report.summary.weak_topics, Vec::<String>::new());
}

#[test]
fn mark_recognized_science_scan() {
    let set = parse_question_set(&repo_path("question-sets/science-quiz.toml")).unwrap();
    let text = std::fs::read_to_string(fixture("science-scan.txt")).unwrap();

    let report = engine(GradingConfig::default())
        .mark(&set, &AnswerSource::RecognizedText(text));

    let answers: Vec<&str> = report.marks.iter().map(|m| m.answer.as_str()).collect();
    assert_eq!(
        answers,
        ["mitochondria powerhouse cell", "Photosynthesis.", "100.0", "c", "D"]
    );
    assert_eq!(report.marks[0].outcome.score, 0.5);
    assert_eq!(report.summary.correct, 3);
    assert!((report.summary.overall_score - 0.7).abs() < 1e-12);
    assert_eq!(report.summary.strengths, ["chemistry"]);
    assert_eq!(report.summary.weak_topics, ["astronomy"]);
}

#[test]
fn looser_tolerance_shows_as_improvement() {
    let set = parse_question_set(&repo_path("question-sets/algebra-basics.toml")).unwrap();
    let source = AnswerSource::Typed(
        ["x = 2", "y = 2x + 1", "(x-2)(x+2)", "x^2+2x+1", "11", "0.4"]
            .map(String::from)
            .to_vec(),
    );

    let strict = engine(GradingConfig::default()).mark(&set, &source);
    let loose = engine(GradingConfig {
        numeric_tolerance: 0.2,
        ..GradingConfig::default()
    })
    .mark(&set, &source);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/strict.json");
    strict.save_json(&path).unwrap();
    let baseline = MarkingReport::load_json(&path).unwrap();

    let comparison = loose.compare(&baseline, 0.05);
    assert!(!comparison.has_regressions());
    assert_eq!(comparison.improvements.len(), 1);
    assert_eq!(comparison.improvements[0].question_id, "slope");
    assert_eq!(comparison.unchanged, 5);
}
