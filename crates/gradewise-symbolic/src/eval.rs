//! Numeric evaluation of closed expressions.

use gradewise_core::config::SymbolicLimits;
use gradewise_core::error::SymbolicError;
use gradewise_core::expr::Expr;

use crate::canonical::{product_operands, sum_operands};

/// Evaluate an expression with no free symbols.
pub fn evaluate(expr: &Expr, limits: &SymbolicLimits) -> Result<f64, SymbolicError> {
    let value = eval(expr, 0, limits)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SymbolicError::NonFinite)
    }
}

fn eval(expr: &Expr, depth: usize, limits: &SymbolicLimits) -> Result<f64, SymbolicError> {
    if depth > limits.max_depth {
        return Err(SymbolicError::BudgetExceeded(format!(
            "expression nested deeper than {}",
            limits.max_depth
        )));
    }

    Ok(match expr {
        Expr::Num(v) => *v,
        Expr::Const(c) => c.value(),
        Expr::Sym(name) => return Err(SymbolicError::UnboundSymbol(name.clone())),
        Expr::Neg(inner) => -eval(inner, depth + 1, limits)?,
        Expr::Add(..) | Expr::Sub(..) => {
            let mut acc = 0.0;
            for (subtract, operand) in sum_operands(expr) {
                let v = eval(operand, depth + 1, limits)?;
                acc = if subtract { acc - v } else { acc + v };
            }
            acc
        }
        Expr::Mul(..) | Expr::Div(..) => {
            let mut acc = 1.0;
            for (divide, operand) in product_operands(expr) {
                let v = eval(operand, depth + 1, limits)?;
                if divide {
                    if v == 0.0 {
                        return Err(SymbolicError::DivisionByZero);
                    }
                    acc /= v;
                } else {
                    acc *= v;
                }
            }
            acc
        }
        Expr::Pow(base, exponent) => {
            eval(base, depth + 1, limits)?.powf(eval(exponent, depth + 1, limits)?)
        }
        Expr::Call(func, arg) => func.apply(eval(arg, depth + 1, limits)?),
    })
}
