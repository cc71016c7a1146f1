//! Grading and symbolic error types.
//!
//! `SymbolicError` is defined here rather than in `gradewise-symbolic` so the
//! grader can tell a parse failure from an exhausted budget without string
//! matching. None of these errors cross the public `grade` boundary.

use thiserror::Error;

/// Errors raised by a [`SymbolicEngine`](crate::traits::SymbolicEngine).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolicError {
    /// The input is not a valid expression.
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// The engine cannot handle this construct (e.g. a cubic equation).
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Numeric evaluation hit a free symbol.
    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),

    /// Evaluation produced NaN or infinity.
    #[error("non-finite result")]
    NonFinite,

    /// Division by an expression that simplifies to zero.
    #[error("division by zero")]
    DivisionByZero,

    /// The input exceeded one of the configured symbolic limits.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),
}

impl SymbolicError {
    /// Returns `true` if the failure is caused by the input itself rather than
    /// a limitation of the engine.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, SymbolicError::Parse { .. })
    }
}

/// Internal grading failures. Collapsed to `(false, 0.0)` at the boundary.
#[derive(Debug, Error)]
pub enum GradeError {
    /// A NUMERIC answer did not parse as a finite number.
    #[error("not a number: {0:?}")]
    InvalidNumber(String),

    /// The answer type tag is not one of the known types.
    #[error("unknown answer type: {0:?}")]
    UnknownAnswerType(String),

    /// The symbolic engine failed.
    #[error(transparent)]
    Symbolic(#[from] SymbolicError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_are_malformed_input() {
        let err = SymbolicError::Parse {
            offset: 3,
            message: "unexpected ')'".into(),
        };
        assert!(err.is_malformed_input());
        assert!(!SymbolicError::NonFinite.is_malformed_input());
        assert_eq!(err.to_string(), "parse error at offset 3: unexpected ')'");
    }

    #[test]
    fn grade_error_wraps_symbolic() {
        let err: GradeError = SymbolicError::DivisionByZero.into();
        assert_eq!(err.to_string(), "division by zero");
    }
}
