//! Core trait definitions.
//!
//! The grader delegates all symbolic work to a [`SymbolicEngine`]. The
//! default implementation lives in the `gradewise-symbolic` crate; tests can
//! substitute their own.

use crate::error::SymbolicError;
use crate::expr::Expr;

/// The four-operation symbolic expression service used by ALGEBRA grading.
///
/// Implementations must be deterministic and must bound their own work on
/// pathological input.
pub trait SymbolicEngine: Send + Sync {
    /// Human-readable engine name (e.g. "polynomial").
    fn name(&self) -> &str;

    /// Parse a string into an expression. Strings containing `=` are rejected.
    fn parse(&self, input: &str) -> Result<Expr, SymbolicError>;

    /// Rewrite an expression into canonical form. Expressions equal to zero
    /// must come back as `Expr::Num(0.0)`.
    fn simplify(&self, expr: &Expr) -> Result<Expr, SymbolicError>;

    /// Solve `lhs = rhs` for `var`, returning every solution found.
    fn solve(&self, lhs: &Expr, rhs: &Expr, var: &str) -> Result<Vec<Expr>, SymbolicError>;

    /// Evaluate an expression with no free symbols to a finite number.
    fn evaluate(&self, expr: &Expr) -> Result<f64, SymbolicError>;
}
