//! Conversion between expression trees and canonical polynomials.
//!
//! Two expressions that are equal as polynomials over the same atoms convert
//! to the same [`Polynomial`], and [`to_expr`] renders it back in a fixed
//! order, so `simplify` is deterministic and idempotent.

use gradewise_core::config::SymbolicLimits;
use gradewise_core::error::SymbolicError;
use gradewise_core::expr::{Expr, Func};

use crate::poly::{degree, too_many_terms, Atom, Monomial, Polynomial};

/// Converts expressions to polynomials within a work budget.
pub struct Canonicalizer<'a> {
    limits: &'a SymbolicLimits,
}

fn finite(value: f64) -> Result<f64, SymbolicError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SymbolicError::NonFinite)
    }
}

/// Operands of a left-leaning chain of `+`/`-`, each flagged when subtracted.
///
/// Walking the spine iteratively keeps long sums like `1 + 2 + ... + n` from
/// counting against the depth limit.
pub(crate) fn sum_operands(expr: &Expr) -> Vec<(bool, &Expr)> {
    let mut out = Vec::new();
    let mut node = expr;
    loop {
        match node {
            Expr::Add(a, b) => {
                out.push((false, b.as_ref()));
                node = a;
            }
            Expr::Sub(a, b) => {
                out.push((true, b.as_ref()));
                node = a;
            }
            _ => {
                out.push((false, node));
                break;
            }
        }
    }
    out.reverse();
    out
}

/// Operands of a left-leaning chain of `*`/`/`, each flagged when dividing.
pub(crate) fn product_operands(expr: &Expr) -> Vec<(bool, &Expr)> {
    let mut out = Vec::new();
    let mut node = expr;
    loop {
        match node {
            Expr::Mul(a, b) => {
                out.push((false, b.as_ref()));
                node = a;
            }
            Expr::Div(a, b) => {
                out.push((true, b.as_ref()));
                node = a;
            }
            _ => {
                out.push((false, node));
                break;
            }
        }
    }
    out.reverse();
    out
}

impl<'a> Canonicalizer<'a> {
    pub fn new(limits: &'a SymbolicLimits) -> Self {
        Self { limits }
    }

    pub fn to_poly(&self, expr: &Expr) -> Result<Polynomial, SymbolicError> {
        self.convert(expr, 0)
    }

    fn check_terms(&self, p: Polynomial) -> Result<Polynomial, SymbolicError> {
        if p.term_count() > self.limits.max_terms {
            Err(too_many_terms(self.limits.max_terms))
        } else {
            Ok(p)
        }
    }

    fn convert(&self, expr: &Expr, depth: usize) -> Result<Polynomial, SymbolicError> {
        if depth > self.limits.max_depth {
            return Err(SymbolicError::BudgetExceeded(format!(
                "expression nested deeper than {}",
                self.limits.max_depth
            )));
        }

        match expr {
            Expr::Num(v) => Ok(Polynomial::constant(finite(*v)?)),
            Expr::Const(c) => Ok(Polynomial::constant(c.value())),
            Expr::Sym(name) => Ok(Polynomial::atom(Atom::symbol(name.clone()))),
            Expr::Neg(inner) => Ok(self.convert(inner, depth + 1)?.neg()),
            Expr::Add(..) | Expr::Sub(..) => {
                let mut acc = Polynomial::zero();
                for (subtract, operand) in sum_operands(expr) {
                    let p = self.convert(operand, depth + 1)?;
                    acc = if subtract { acc.sub(&p) } else { acc.add(&p) };
                    acc = self.check_terms(acc)?;
                }
                Ok(acc)
            }
            Expr::Mul(..) | Expr::Div(..) => {
                let mut acc = Polynomial::constant(1.0);
                for (divide, operand) in product_operands(expr) {
                    let p = self.convert(operand, depth + 1)?;
                    let factor = if divide { self.reciprocal(&p)? } else { p };
                    acc = acc.mul(&factor, self.limits.max_terms)?;
                }
                Ok(acc)
            }
            Expr::Pow(base, exponent) => {
                let base = self.convert(base, depth + 1)?;
                let exponent = self.convert(exponent, depth + 1)?;
                self.power(&base, &exponent)
            }
            Expr::Call(func, arg) => {
                let arg = self.convert(arg, depth + 1)?;
                self.call(*func, &arg)
            }
        }
    }

    /// `1 / p`. Multi-term denominators become an opaque reciprocal atom of
    /// the polynomial scaled so its leading coefficient is 1.
    fn reciprocal(&self, p: &Polynomial) -> Result<Polynomial, SymbolicError> {
        match p.as_constant() {
            Some(c) if c == 0.0 => return Err(SymbolicError::DivisionByZero),
            Some(c) => return Ok(Polynomial::constant(finite(1.0 / c)?)),
            None => {}
        }
        if let Some(inverse) = p.reciprocal_of_term() {
            return Ok(inverse);
        }
        let lead = p.leading_coefficient().unwrap_or(1.0);
        let monic = p.scale(1.0 / lead);
        let atom = Atom::opaque(Expr::Pow(
            Box::new(to_expr(&monic)),
            Box::new(Expr::Num(-1.0)),
        ));
        Ok(Polynomial::atom(atom).scale(1.0 / lead))
    }

    fn power(&self, base: &Polynomial, exponent: &Polynomial) -> Result<Polynomial, SymbolicError> {
        let Some(n) = exponent.as_constant() else {
            if base.as_constant() == Some(std::f64::consts::E) {
                return Ok(Polynomial::atom(Atom::opaque(Expr::Call(
                    Func::Exp,
                    Box::new(to_expr(exponent)),
                ))));
            }
            return Ok(Polynomial::atom(Atom::opaque(Expr::Pow(
                Box::new(to_expr(base)),
                Box::new(to_expr(exponent)),
            ))));
        };

        if let Some(b) = base.as_constant() {
            return Ok(Polynomial::constant(finite(b.powf(n))?));
        }

        if n.fract() != 0.0 {
            return Ok(Polynomial::atom(Atom::opaque(Expr::Pow(
                Box::new(to_expr(base)),
                Box::new(Expr::Num(n)),
            ))));
        }

        if n.abs() > f64::from(self.limits.max_exponent) {
            return Err(SymbolicError::BudgetExceeded(format!(
                "exponent {n} larger than {}",
                self.limits.max_exponent
            )));
        }

        // Bounded by max_exponent above.
        let k = n.abs() as u32;
        if n >= 0.0 {
            base.pow(k, self.limits.max_terms)
        } else {
            self.reciprocal(base)?.pow(k, self.limits.max_terms)
        }
    }

    fn call(&self, func: Func, arg: &Polynomial) -> Result<Polynomial, SymbolicError> {
        if let Some(c) = arg.as_constant() {
            return Ok(Polynomial::constant(finite(func.apply(c))?));
        }
        match func {
            Func::Sqrt => self.power(arg, &Polynomial::constant(0.5)),
            _ => Ok(Polynomial::atom(Atom::opaque(Expr::Call(
                func,
                Box::new(to_expr(arg)),
            )))),
        }
    }
}

fn product(factors: Vec<Expr>) -> Option<Expr> {
    factors
        .into_iter()
        .reduce(|acc, f| Expr::Mul(Box::new(acc), Box::new(f)))
}

fn factor(atom: &Atom, exp: i32) -> Expr {
    if exp == 1 {
        atom.to_expr()
    } else {
        Expr::Pow(Box::new(atom.to_expr()), Box::new(Expr::Num(f64::from(exp))))
    }
}

/// One term with a non-negative coefficient magnitude.
fn term_expr(mono: &Monomial, magnitude: f64) -> Expr {
    let numerator = product(
        mono.iter()
            .filter(|(_, &e)| e > 0)
            .map(|(a, &e)| factor(a, e))
            .collect(),
    );
    let denominator = product(
        mono.iter()
            .filter(|(_, &e)| e < 0)
            .map(|(a, &e)| factor(a, -e))
            .collect(),
    );

    let top = match numerator {
        None => Expr::Num(magnitude),
        Some(n) if magnitude == 1.0 => n,
        Some(n) => Expr::Mul(Box::new(Expr::Num(magnitude)), Box::new(n)),
    };
    match denominator {
        None => top,
        Some(d) => Expr::Div(Box::new(top), Box::new(d)),
    }
}

/// Render a polynomial as an expression, highest total degree first.
pub fn to_expr(p: &Polynomial) -> Expr {
    let mut terms: Vec<(&Monomial, f64)> = p.terms().collect();
    // Stable: ties keep the canonical monomial order.
    terms.sort_by_key(|(mono, _)| std::cmp::Reverse(degree(mono)));

    let mut out: Option<Expr> = None;
    for (mono, c) in terms {
        let term = term_expr(mono, c.abs());
        out = Some(match out {
            None if mono.is_empty() => Expr::Num(c),
            None if c < 0.0 => Expr::Neg(Box::new(term)),
            None => term,
            Some(acc) if c < 0.0 => Expr::Sub(Box::new(acc), Box::new(term)),
            Some(acc) => Expr::Add(Box::new(acc), Box::new(term)),
        });
    }
    out.unwrap_or(Expr::Num(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn canonical(input: &str) -> Polynomial {
        let limits = SymbolicLimits::default();
        let expr = parse_expression(input, &limits).unwrap();
        Canonicalizer::new(&limits).to_poly(&expr).unwrap()
    }

    fn render(input: &str) -> String {
        to_expr(&canonical(input)).to_string()
    }

    fn try_canonical(input: &str, limits: &SymbolicLimits) -> Result<Polynomial, SymbolicError> {
        let expr = parse_expression(input, &SymbolicLimits::default()).unwrap();
        Canonicalizer::new(limits).to_poly(&expr)
    }

    #[test]
    fn expansion_and_collection() {
        assert_eq!(canonical("(x-2)(x+2)"), canonical("x^2 - 4"));
        assert_eq!(canonical("(x+1)^2"), canonical("x^2 + 2x + 1"));
        assert_eq!(canonical("2(x+y) - 2y"), canonical("2x"));
        assert!(canonical("x - x").is_zero());
    }

    #[test]
    fn constants_fold() {
        assert_eq!(canonical("2^10").as_constant(), Some(1024.0));
        assert_eq!(canonical("sqrt(16) + 1").as_constant(), Some(5.0));
        assert_eq!(canonical("pi - pi").as_constant(), Some(0.0));
        assert_eq!(canonical("1/4").as_constant(), Some(0.25));
    }

    #[test]
    fn single_term_denominators() {
        assert_eq!(canonical("x/x"), canonical("1"));
        assert_eq!(canonical("(x^2 + x)/x"), canonical("x + 1"));
        assert_eq!(canonical("x^-2 * x^3"), canonical("x"));
        assert_eq!(canonical("6x/(3x^2)"), canonical("2/x"));
    }

    #[test]
    fn multi_term_denominators_are_atoms() {
        assert_eq!(canonical("1/(x+1)"), canonical("1/(1+x)"));
        assert_eq!(canonical("x/(2x+2)"), canonical("0.5x/(x+1)"));
        assert_ne!(canonical("1/(x+1)"), canonical("1/(x+2)"));
    }

    #[test]
    fn functions_are_atoms_over_canonical_arguments() {
        assert_eq!(canonical("sin(x+1)"), canonical("sin(1+x)"));
        assert_eq!(canonical("sqrt(x)"), canonical("x^0.5"));
        assert_eq!(canonical("e^(2x)"), canonical("exp(x+x)"));
        assert_eq!(canonical("2sin(x) - sin(x)"), canonical("sin(x)"));
    }

    #[test]
    fn rendering_orders_by_degree() {
        assert_eq!(render("(x-2)(x+2)"), "x^2 - 4");
        assert_eq!(render("3 - x"), "-x + 3");
        assert_eq!(render("x - x"), "0");
        assert_eq!(render("2/x"), "2/x");
    }

    #[test]
    fn rendering_is_a_fixed_point() {
        let limits = SymbolicLimits::default();
        for input in [
            "(x+1)^3",
            "x/(x+1) + y",
            "sin(2x) - 3/y^2",
            "sqrt(x+1)",
            "(a-b)(a+b)/c",
        ] {
            let once = canonical(input);
            let again = Canonicalizer::new(&limits).to_poly(&to_expr(&once)).unwrap();
            assert_eq!(once, again, "{input}");
        }
    }

    #[test]
    fn errors() {
        let limits = SymbolicLimits::default();
        assert_eq!(
            try_canonical("x/0", &limits),
            Err(SymbolicError::DivisionByZero)
        );
        assert_eq!(
            try_canonical("x/(y-y)", &limits),
            Err(SymbolicError::DivisionByZero)
        );
        assert_eq!(try_canonical("ln(0)", &limits), Err(SymbolicError::NonFinite));
        assert!(matches!(
            try_canonical("x^100", &limits),
            Err(SymbolicError::BudgetExceeded(_))
        ));
        let tight = SymbolicLimits {
            max_terms: 8,
            ..SymbolicLimits::default()
        };
        assert!(matches!(
            try_canonical("(a+b+c)^4", &tight),
            Err(SymbolicError::BudgetExceeded(_))
        ));
    }

    #[test]
    fn nested_powers_overflowing_exponents_are_over_budget() {
        let limits = SymbolicLimits::default();
        assert!(matches!(
            try_canonical("((((((x^32)^32)^32)^32)^32)^32)^32", &limits),
            Err(SymbolicError::BudgetExceeded(_))
        ));
        assert!(matches!(
            try_canonical("((((((x^-32)^32)^32)^32)^32)^32)^32", &limits),
            Err(SymbolicError::BudgetExceeded(_))
        ));
        assert_eq!(render("((x^32)^32)^32"), "x^32768");
    }

    #[test]
    fn long_flat_sums_do_not_hit_depth_limit() {
        let limits = SymbolicLimits {
            max_depth: 8,
            ..SymbolicLimits::default()
        };
        let sum = vec!["1"; 40].join(" + ");
        let p = try_canonical(&sum, &limits).unwrap();
        assert_eq!(p.as_constant(), Some(40.0));
    }
}
