use std::sync::Arc;

use gradewise_core::config::{GradingConfig, SymbolicLimits};
use gradewise_core::grader::Grader;
use gradewise_core::model::{AnswerType, GradingOutcome};
use gradewise_symbolic::PolynomialEngine;

fn grader() -> Grader {
    Grader::new(
        Arc::new(PolynomialEngine::default()),
        GradingConfig::default(),
    )
}

fn algebra(correct: &str, candidate: &str) -> GradingOutcome {
    grader().grade(AnswerType::Algebra, correct, candidate)
}

#[test]
fn swapped_sides_are_equivalent() {
    assert_eq!(algebra("x=2", "2=x"), GradingOutcome::correct());
    assert_eq!(algebra("x = 2", "x=2"), GradingOutcome::correct());
}

#[test]
fn factored_and_expanded_forms_are_equivalent() {
    assert_eq!(algebra("x^2-4", "(x-2)*(x+2)"), GradingOutcome::correct());
    assert_eq!(algebra("x^2-4", "(x-2)(x+2)"), GradingOutcome::correct());
    assert_eq!(algebra("(x+1)^2", "x**2 + 2x + 1"), GradingOutcome::correct());
}

#[test]
fn rearranged_equations_are_equivalent() {
    assert_eq!(algebra("2x + 4 = 10", "x = 3"), GradingOutcome::correct());
    assert_eq!(algebra("y = 2x + 1", "y - 1 = 2x"), GradingOutcome::correct());
    assert_eq!(algebra("x^2 = 4", "x^2 - 4 = 0"), GradingOutcome::correct());
}

#[test]
fn quadratic_solution_sets_must_match() {
    assert_eq!(algebra("x^2 = 9", "(x-3)(x+3) = 0"), GradingOutcome::correct());
    assert_eq!(algebra("x^2 = 9", "x = 3"), GradingOutcome::incorrect());
}

#[test]
fn numeric_expressions_compare_within_tolerance() {
    assert_eq!(algebra("sqrt(2)", "1.4142"), GradingOutcome::correct());
    assert_eq!(algebra("1/3", "0.333"), GradingOutcome::correct());
    assert_eq!(algebra("1/3", "0.33"), GradingOutcome::incorrect());
}

#[test]
fn different_answers_are_incorrect() {
    assert_eq!(algebra("x=2", "x=3"), GradingOutcome::incorrect());
    assert_eq!(algebra("x^2-4", "(x-2)^2"), GradingOutcome::incorrect());
    assert_eq!(algebra("2x", "x + 2"), GradingOutcome::incorrect());
}

#[test]
fn unparseable_answers_fall_back_to_text() {
    assert_eq!(
        algebra("no real solution", "No real solution."),
        GradingOutcome::correct()
    );
    assert_eq!(algebra("x = 2", "y = 2"), GradingOutcome::incorrect());
    assert_eq!(algebra("x = 2", ""), GradingOutcome::incorrect());
    assert_eq!(algebra("", ""), GradingOutcome::correct());
}

#[test]
fn rational_expressions_cancel() {
    assert_eq!(algebra("x + 1", "(x^2 - 1)/(x - 1)"), GradingOutcome::correct());
    assert_eq!(algebra("1", "1/(x+1) + x/(x+1)"), GradingOutcome::correct());
    assert_eq!(algebra("1", "(x+1)/(x+1)"), GradingOutcome::correct());
    assert_eq!(
        algebra("y = x + 1", "y = (x^2 - 1)/(x - 1)"),
        GradingOutcome::correct()
    );
    assert_eq!(algebra("x + 1", "(x^2 - 1)/(x + 1)"), GradingOutcome::incorrect());
    assert_eq!(algebra("sqrt(x^2)", "x"), GradingOutcome::incorrect());
}

#[test]
fn over_budget_expressions_are_compared_numerically() {
    let limits = SymbolicLimits {
        max_exponent: 4,
        ..SymbolicLimits::default()
    };
    let grader = Grader::new(
        Arc::new(PolynomialEngine::new(limits)),
        GradingConfig::default(),
    );
    assert_eq!(
        grader.grade(AnswerType::Algebra, "(x+1)^10", "(x+1)^9 * (x+1)"),
        GradingOutcome::correct()
    );
    assert_eq!(
        grader.grade(AnswerType::Algebra, "(x+1)^10", "(x+1)^9"),
        GradingOutcome::incorrect()
    );
}

#[test]
fn overflowing_exponents_grade_as_incorrect() {
    let tower = "((((((x^32)^32)^32)^32)^32)^32)^32";
    assert_eq!(algebra(tower, "x"), GradingOutcome::incorrect());
    assert_eq!(algebra("y = 2", &format!("y = {tower}")), GradingOutcome::incorrect());
}

#[test]
fn grading_is_idempotent() {
    let g = grader();
    for (correct, candidate) in [("x=2", "2=x"), ("x^2-4", "(x-2)(x+2)"), ("2x", "x+2")] {
        assert_eq!(
            g.grade(AnswerType::Algebra, correct, candidate),
            g.grade(AnswerType::Algebra, correct, candidate)
        );
    }
}
