//! gradewise-symbolic — the default symbolic engine.
//!
//! Parses student algebra, rewrites it into a canonical sparse polynomial
//! over symbols and opaque subexpressions, solves linear and quadratic
//! equations, and evaluates closed expressions numerically. Every operation
//! is bounded by [`SymbolicLimits`].

pub mod canonical;
pub mod eval;
pub mod parser;
pub mod poly;
pub mod solve;

use gradewise_core::config::SymbolicLimits;
use gradewise_core::error::SymbolicError;
use gradewise_core::expr::Expr;
use gradewise_core::traits::SymbolicEngine;

use crate::canonical::{to_expr, Canonicalizer};

/// Polynomial canonical-form engine.
#[derive(Debug, Clone, Default)]
pub struct PolynomialEngine {
    limits: SymbolicLimits,
}

impl PolynomialEngine {
    pub fn new(limits: SymbolicLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &SymbolicLimits {
        &self.limits
    }
}

impl SymbolicEngine for PolynomialEngine {
    fn name(&self) -> &str {
        "polynomial"
    }

    fn parse(&self, input: &str) -> Result<Expr, SymbolicError> {
        parser::parse_expression(input, &self.limits)
    }

    fn simplify(&self, expr: &Expr) -> Result<Expr, SymbolicError> {
        let poly = Canonicalizer::new(&self.limits).to_poly(expr)?;
        Ok(to_expr(&poly))
    }

    fn solve(&self, lhs: &Expr, rhs: &Expr, var: &str) -> Result<Vec<Expr>, SymbolicError> {
        let poly = Canonicalizer::new(&self.limits).to_poly(&Expr::difference(lhs, rhs))?;
        let roots = solve::solve_polynomial(&poly, var, self.limits.max_terms)?;
        Ok(roots.iter().map(to_expr).collect())
    }

    fn evaluate(&self, expr: &Expr) -> Result<f64, SymbolicError> {
        eval::evaluate(expr, &self.limits)
    }
}
