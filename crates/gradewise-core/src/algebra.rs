//! ALGEBRA equivalence as an ordered chain of strategies.
//!
//! Each strategy either matches, declines, or fails. Failures are logged and
//! treated like a decline; the first match wins.

use std::collections::BTreeMap;

use crate::error::SymbolicError;
use crate::expr::Expr;
use crate::normalize::normalize_text;
use crate::traits::SymbolicEngine;

/// What a single strategy concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Equivalent,
    NoOpinion,
}

/// Inputs shared by every strategy.
pub struct AlgebraContext<'a> {
    pub engine: &'a dyn SymbolicEngine,
    pub tolerance: f64,
    pub correct: &'a str,
    pub candidate: &'a str,
}

type Strategy = fn(&AlgebraContext<'_>) -> Result<Verdict, SymbolicError>;

/// Strategies in the order they are tried.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("equation_difference", equation_difference),
    ("solve_and_compare", solve_and_compare),
    ("expression", expression_equivalence),
    ("normalized_text", normalized_text),
];

/// Name of the first strategy that finds the answers equivalent, if any.
pub fn matching_strategy(ctx: &AlgebraContext<'_>) -> Option<&'static str> {
    for (name, strategy) in STRATEGIES {
        match strategy(ctx) {
            Ok(Verdict::Equivalent) => return Some(*name),
            Ok(Verdict::NoOpinion) => {}
            Err(e) => {
                tracing::debug!(strategy = *name, error = %e, "algebra strategy failed");
            }
        }
    }
    None
}

/// Split on a single `=`. Anything else is not an equation.
fn split_equation(s: &str) -> Option<(&str, &str)> {
    if s.matches('=').count() != 1 {
        return None;
    }
    s.split_once('=')
}

struct ParsedEquation {
    lhs: Expr,
    rhs: Expr,
}

fn parse_equation(
    engine: &dyn SymbolicEngine,
    text: &str,
) -> Result<Option<ParsedEquation>, SymbolicError> {
    let Some((lhs, rhs)) = split_equation(text) else {
        return Ok(None);
    };
    Ok(Some(ParsedEquation {
        lhs: engine.parse(lhs.trim())?,
        rhs: engine.parse(rhs.trim())?,
    }))
}

fn parse_equations(
    ctx: &AlgebraContext<'_>,
) -> Result<Option<(ParsedEquation, ParsedEquation)>, SymbolicError> {
    let correct = parse_equation(ctx.engine, ctx.correct)?;
    let candidate = parse_equation(ctx.engine, ctx.candidate)?;
    Ok(correct.zip(candidate))
}

/// `simplify(lhs - rhs)` of both equations differ by zero.
fn equation_difference(ctx: &AlgebraContext<'_>) -> Result<Verdict, SymbolicError> {
    let Some((correct, candidate)) = parse_equations(ctx)? else {
        return Ok(Verdict::NoOpinion);
    };
    let engine = ctx.engine;
    let correct_diff = Expr::difference(&correct.lhs, &correct.rhs);
    let candidate_diff = Expr::difference(&candidate.lhs, &candidate.rhs);
    let symbolic = engine
        .simplify(&correct_diff)
        .and_then(|c| Ok((c, engine.simplify(&candidate_diff)?)))
        .and_then(|(c, s)| engine.simplify(&Expr::difference(&c, &s)));
    if matches!(&symbolic, Ok(d) if d.is_zero()) {
        return Ok(Verdict::Equivalent);
    }
    if agree_at_sample_points(ctx, &correct_diff, &candidate_diff) {
        return Ok(Verdict::Equivalent);
    }
    symbolic.map(|_| Verdict::NoOpinion)
}

/// Solve both equations for each shared variable and compare solution sets.
fn solve_and_compare(ctx: &AlgebraContext<'_>) -> Result<Verdict, SymbolicError> {
    let Some((correct, candidate)) = parse_equations(ctx)? else {
        return Ok(Verdict::NoOpinion);
    };
    let mut correct_vars = correct.lhs.free_symbols();
    correct_vars.extend(correct.rhs.free_symbols());
    let mut candidate_vars = candidate.lhs.free_symbols();
    candidate_vars.extend(candidate.rhs.free_symbols());

    let mut last_error = None;
    for var in correct_vars.intersection(&candidate_vars) {
        let solutions = ctx
            .engine
            .solve(&correct.lhs, &correct.rhs, var)
            .and_then(|c| Ok((c, ctx.engine.solve(&candidate.lhs, &candidate.rhs, var)?)));
        match solutions {
            Ok((c, s)) if !c.is_empty() && !s.is_empty() => {
                if solution_sets_match(ctx, &c, &s) {
                    return Ok(Verdict::Equivalent);
                }
            }
            Ok(_) => {}
            Err(e) => last_error = Some(e),
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(Verdict::NoOpinion),
    }
}

fn solution_sets_match(ctx: &AlgebraContext<'_>, a: &[Expr], b: &[Expr]) -> bool {
    let covered = |from: &[Expr], to: &[Expr]| {
        from.iter()
            .all(|x| to.iter().any(|y| same_value(ctx, x, y)))
    };
    covered(a, b) && covered(b, a)
}

fn same_value(ctx: &AlgebraContext<'_>, a: &Expr, b: &Expr) -> bool {
    if matches!(ctx.engine.simplify(&Expr::difference(a, b)), Ok(d) if d.is_zero()) {
        return true;
    }
    match (ctx.engine.evaluate(a), ctx.engine.evaluate(b)) {
        (Ok(x), Ok(y)) => (x - y).abs() < ctx.tolerance,
        _ => false,
    }
}

/// Compare plain expressions symbolically, then numerically.
fn expression_equivalence(ctx: &AlgebraContext<'_>) -> Result<Verdict, SymbolicError> {
    if ctx.correct.contains('=') || ctx.candidate.contains('=') {
        return Ok(Verdict::NoOpinion);
    }
    let correct = ctx.engine.parse(ctx.correct.trim())?;
    let candidate = ctx.engine.parse(ctx.candidate.trim())?;

    let simplified = ctx.engine.simplify(&Expr::difference(&correct, &candidate));
    if matches!(&simplified, Ok(d) if d.is_zero()) {
        return Ok(Verdict::Equivalent);
    }

    if let (Ok(a), Ok(b)) = (ctx.engine.evaluate(&correct), ctx.engine.evaluate(&candidate)) {
        if (a - b).abs() < ctx.tolerance {
            return Ok(Verdict::Equivalent);
        }
    }

    if agree_at_sample_points(ctx, &correct, &candidate) {
        return Ok(Verdict::Equivalent);
    }

    simplified.map(|_| Verdict::NoOpinion)
}

/// Values tried for each free symbol. Kept away from small integers so
/// removable singularities such as `x = 1` in `(x^2 - 1)/(x - 1)` are missed.
const SAMPLE_POINTS: [f64; 7] = [0.3719, 1.6183, -0.7071, 2.2361, -1.4142, 3.1416, -2.7183];

/// Samples that must evaluate on both sides before agreement counts.
const MIN_AGREEING_SAMPLES: usize = 4;

/// Numeric identity check over the free symbols of both expressions.
///
/// Catches equivalences the engine cannot simplify, like cancelling a
/// multi-term factor. Points where either side fails to evaluate are
/// skipped; any evaluated point that disagrees rejects the match.
fn agree_at_sample_points(ctx: &AlgebraContext<'_>, a: &Expr, b: &Expr) -> bool {
    let mut symbols = a.free_symbols();
    symbols.extend(b.free_symbols());
    if symbols.is_empty() {
        return false;
    }

    let mut agreeing = 0;
    for round in 0..SAMPLE_POINTS.len() {
        // Distinct symbols get distinct values within a round.
        let bindings: BTreeMap<String, f64> = symbols
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let point = SAMPLE_POINTS[(round + 3 * i) % SAMPLE_POINTS.len()];
                (name.clone(), point)
            })
            .collect();
        let values = (
            ctx.engine.evaluate(&a.substitute(&bindings)),
            ctx.engine.evaluate(&b.substitute(&bindings)),
        );
        let (Ok(x), Ok(y)) = values else {
            continue;
        };
        let scale = x.abs().max(y.abs()).max(1.0);
        if (x - y).abs() >= ctx.tolerance * scale {
            return false;
        }
        agreeing += 1;
    }
    agreeing >= MIN_AGREEING_SAMPLES
}

/// Last resort for prose the engine cannot parse.
fn normalized_text(ctx: &AlgebraContext<'_>) -> Result<Verdict, SymbolicError> {
    Ok(if normalize_text(ctx.correct) == normalize_text(ctx.candidate) {
        Verdict::Equivalent
    } else {
        Verdict::NoOpinion
    })
}
