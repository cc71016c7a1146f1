//! Engine-neutral expression tree.
//!
//! A [`SymbolicEngine`](crate::traits::SymbolicEngine) parses strings into
//! `Expr` and returns simplified `Expr` values in its canonical form. The
//! grader only builds differences and inspects results for zero.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named mathematical constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }

    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "pi" | "π" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }
}

/// Single-argument functions understood by the expression grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Func {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Ln,
    Log,
    Exp,
    Abs,
}

impl Func {
    pub fn name(self) -> &'static str {
        match self {
            Func::Sqrt => "sqrt",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Ln => "ln",
            Func::Log => "log",
            Func::Exp => "exp",
            Func::Abs => "abs",
        }
    }

    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Func::Sqrt),
            "sin" => Some(Func::Sin),
            "cos" => Some(Func::Cos),
            "tan" => Some(Func::Tan),
            "ln" => Some(Func::Ln),
            "log" => Some(Func::Log),
            "exp" => Some(Func::Exp),
            "abs" => Some(Func::Abs),
            _ => None,
        }
    }

    /// Apply the function to a real argument. `log` is base 10.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sqrt => x.sqrt(),
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Ln => x.ln(),
            Func::Log => x.log10(),
            Func::Exp => x.exp(),
            Func::Abs => x.abs(),
        }
    }
}

/// An algebraic expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Num(f64),
    Const(Constant),
    Sym(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    pub fn sym(name: impl Into<String>) -> Self {
        Expr::Sym(name.into())
    }

    /// `lhs - rhs` without simplification.
    pub fn difference(lhs: &Expr, rhs: &Expr) -> Self {
        Expr::Sub(Box::new(lhs.clone()), Box::new(rhs.clone()))
    }

    /// True for the literal zero an engine returns from `simplify`.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(v) if *v == 0.0)
    }

    /// All symbol names appearing in the expression, in sorted order.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    /// Replace bound symbols with numbers. Unbound symbols are kept.
    pub fn substitute(&self, bindings: &BTreeMap<String, f64>) -> Expr {
        let sub = |e: &Expr| Box::new(e.substitute(bindings));
        match self {
            Expr::Num(_) | Expr::Const(_) => self.clone(),
            Expr::Sym(name) => bindings
                .get(name)
                .map_or_else(|| self.clone(), |&v| Expr::Num(v)),
            Expr::Neg(inner) => Expr::Neg(sub(inner.as_ref())),
            Expr::Call(func, inner) => Expr::Call(*func, sub(inner.as_ref())),
            Expr::Add(a, b) => Expr::Add(sub(a.as_ref()), sub(b.as_ref())),
            Expr::Sub(a, b) => Expr::Sub(sub(a.as_ref()), sub(b.as_ref())),
            Expr::Mul(a, b) => Expr::Mul(sub(a.as_ref()), sub(b.as_ref())),
            Expr::Div(a, b) => Expr::Div(sub(a.as_ref()), sub(b.as_ref())),
            Expr::Pow(a, b) => Expr::Pow(sub(a.as_ref()), sub(b.as_ref())),
        }
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Num(_) | Expr::Const(_) => {}
            Expr::Sym(name) => {
                out.insert(name.clone());
            }
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.collect_symbols(out),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) | Expr::Pow(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(_) => 3,
            Expr::Num(v) if *v < 0.0 => 3,
            Expr::Pow(..) => 4,
            _ => 5,
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(v) => write!(f, "{v}"),
            Expr::Const(Constant::Pi) => write!(f, "pi"),
            Expr::Const(Constant::E) => write!(f, "e"),
            Expr::Sym(name) => write!(f, "{name}"),
            Expr::Neg(inner) => {
                write!(f, "-")?;
                inner.write_operand(f, 3)
            }
            Expr::Add(a, b) => {
                a.write_operand(f, 1)?;
                write!(f, " + ")?;
                b.write_operand(f, 1)
            }
            Expr::Sub(a, b) => {
                a.write_operand(f, 1)?;
                write!(f, " - ")?;
                b.write_operand(f, 2)
            }
            Expr::Mul(a, b) => {
                a.write_operand(f, 2)?;
                write!(f, "*")?;
                b.write_operand(f, 3)
            }
            Expr::Div(a, b) => {
                a.write_operand(f, 2)?;
                write!(f, "/")?;
                b.write_operand(f, 3)
            }
            Expr::Pow(a, b) => {
                a.write_operand(f, 5)?;
                write!(f, "^")?;
                b.write_operand(f, 4)
            }
            Expr::Call(func, arg) => write!(f, "{}({arg})", func.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Box<Expr> {
        Box::new(Expr::Num(v))
    }

    fn x() -> Box<Expr> {
        Box::new(Expr::sym("x"))
    }

    #[test]
    fn free_symbols_are_sorted_and_deduplicated() {
        let e = Expr::Add(
            Box::new(Expr::Mul(Box::new(Expr::sym("y")), x())),
            Box::new(Expr::Call(Func::Sin, x())),
        );
        let syms: Vec<_> = e.free_symbols().into_iter().collect();
        assert_eq!(syms, vec!["x", "y"]);
        assert!(Expr::Const(Constant::Pi).free_symbols().is_empty());
    }

    #[test]
    fn substitute_binds_only_named_symbols() {
        let e = Expr::Add(
            Box::new(Expr::Mul(Box::new(Expr::sym("y")), x())),
            Box::new(Expr::Call(Func::Sin, x())),
        );
        let bindings = BTreeMap::from([("x".to_string(), 2.0)]);
        let bound = e.substitute(&bindings);
        assert_eq!(bound.to_string(), "y*2 + sin(2)");
        assert_eq!(bound.free_symbols().into_iter().collect::<Vec<_>>(), vec!["y"]);
    }

    #[test]
    fn display_parenthesizes_by_precedence() {
        let e = Expr::Mul(
            Box::new(Expr::Sub(x(), num(2.0))),
            Box::new(Expr::Add(x(), num(2.0))),
        );
        assert_eq!(e.to_string(), "(x - 2)*(x + 2)");

        let e = Expr::Sub(x(), Box::new(Expr::Sub(x(), num(1.0))));
        assert_eq!(e.to_string(), "x - (x - 1)");

        let e = Expr::Pow(x(), num(-2.0));
        assert_eq!(e.to_string(), "x^(-2)");

        let e = Expr::Neg(Box::new(Expr::Pow(x(), num(2.0))));
        assert_eq!(e.to_string(), "-x^2");
    }

    #[test]
    fn zero_detection() {
        assert!(Expr::Num(0.0).is_zero());
        assert!(Expr::Num(-0.0).is_zero());
        assert!(!Expr::Num(1e-12).is_zero());
        assert!(!Expr::sym("x").is_zero());
    }

    #[test]
    fn lookups() {
        assert_eq!(Func::lookup("sqrt"), Some(Func::Sqrt));
        assert_eq!(Func::lookup("foo"), None);
        assert_eq!(Constant::lookup("pi"), Some(Constant::Pi));
        assert!((Func::Log.apply(1000.0) - 3.0).abs() < 1e-12);
    }
}
