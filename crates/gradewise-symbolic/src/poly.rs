//! Sparse multivariate polynomials with `f64` coefficients.
//!
//! Variables are [`Atom`]s: plain symbols, or opaque subexpressions the
//! polynomial layer does not look inside (`sin(x)`, `(x + 1)^(-1)`, `x^0.5`).
//! Exponents may be negative, so single-term denominators stay polynomial.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use gradewise_core::error::SymbolicError;
use gradewise_core::expr::Expr;

/// Coefficients that shrink below this fraction of their inputs are
/// treated as exact cancellation.
const CANCEL_EPSILON: f64 = 1e-9;

/// A polynomial variable.
#[derive(Debug, Clone)]
pub enum Atom {
    Symbol(String),
    /// A canonical subexpression, compared by its rendering.
    Opaque { key: String, expr: Expr },
}

impl Atom {
    pub fn symbol(name: impl Into<String>) -> Self {
        Atom::Symbol(name.into())
    }

    pub fn opaque(expr: Expr) -> Self {
        Atom::Opaque {
            key: expr.to_string(),
            expr,
        }
    }

    pub fn to_expr(&self) -> Expr {
        match self {
            Atom::Symbol(name) => Expr::sym(name.clone()),
            Atom::Opaque { expr, .. } => expr.clone(),
        }
    }

    /// True if `var` occurs inside an opaque atom.
    pub fn hides(&self, var: &str) -> bool {
        match self {
            Atom::Symbol(_) => false,
            Atom::Opaque { expr, .. } => expr.free_symbols().contains(var),
        }
    }

    fn sort_key(&self) -> (u8, &str) {
        match self {
            Atom::Symbol(name) => (0, name.as_str()),
            Atom::Opaque { key, .. } => (1, key.as_str()),
        }
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Atom exponents of one term. Zero exponents are never stored.
pub type Monomial = BTreeMap<Atom, i32>;

fn multiply_monomials(a: &Monomial, b: &Monomial) -> Result<Monomial, SymbolicError> {
    let mut out = a.clone();
    for (atom, &exp) in b {
        let current = out.get(atom).copied().unwrap_or(0);
        // i32::MIN is excluded so every stored exponent can be negated.
        let sum = current
            .checked_add(exp)
            .filter(|&e| e != i32::MIN)
            .ok_or_else(|| {
                SymbolicError::BudgetExceeded(format!("exponent of {} overflows", atom.sort_key().1))
            })?;
        if sum == 0 {
            out.remove(atom);
        } else {
            out.insert(atom.clone(), sum);
        }
    }
    Ok(out)
}

/// Total degree, used for display ordering.
pub fn degree(mono: &Monomial) -> i64 {
    mono.values().map(|&e| i64::from(e)).sum()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, f64>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        let mut p = Self::zero();
        p.add_term(Monomial::new(), value);
        p
    }

    pub fn atom(atom: Atom) -> Self {
        let mut p = Self::zero();
        p.add_term(Monomial::from([(atom, 1)]), 1.0);
        p
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, f64)> {
        self.terms.iter().map(|(m, &c)| (m, c))
    }

    /// The value of a polynomial with no atoms.
    pub fn as_constant(&self) -> Option<f64> {
        match self.terms.len() {
            0 => Some(0.0),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(mono, _)| mono.is_empty())
                .map(|(_, &c)| c),
            _ => None,
        }
    }

    /// The first term in canonical order, if any.
    pub fn leading_coefficient(&self) -> Option<f64> {
        self.terms.values().next().copied()
    }

    fn add_term(&mut self, mono: Monomial, coeff: f64) {
        if coeff == 0.0 {
            return;
        }
        match self.terms.get(&mono).copied() {
            Some(existing) => {
                let sum = existing + coeff;
                if sum.abs() <= CANCEL_EPSILON * existing.abs().max(coeff.abs()) {
                    self.terms.remove(&mono);
                } else {
                    self.terms.insert(mono, sum);
                }
            }
            None => {
                self.terms.insert(mono, coeff);
            }
        }
    }

    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let mut out = self.clone();
        for (mono, &c) in &other.terms {
            out.add_term(mono.clone(), c);
        }
        out
    }

    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Polynomial {
        self.scale(-1.0)
    }

    pub fn scale(&self, factor: f64) -> Polynomial {
        let mut out = Polynomial::zero();
        for (mono, &c) in &self.terms {
            out.add_term(mono.clone(), c * factor);
        }
        out
    }

    pub fn mul(&self, other: &Polynomial, max_terms: usize) -> Result<Polynomial, SymbolicError> {
        let mut out = Polynomial::zero();
        for (ma, &ca) in &self.terms {
            for (mb, &cb) in &other.terms {
                out.add_term(multiply_monomials(ma, mb)?, ca * cb);
                if out.terms.len() > max_terms {
                    return Err(too_many_terms(max_terms));
                }
            }
        }
        Ok(out)
    }

    /// Raise to a non-negative integer power by repeated multiplication.
    pub fn pow(&self, exponent: u32, max_terms: usize) -> Result<Polynomial, SymbolicError> {
        let mut out = Polynomial::constant(1.0);
        for _ in 0..exponent {
            out = out.mul(self, max_terms)?;
        }
        Ok(out)
    }

    /// `1 / self` when `self` is a single nonzero term.
    pub fn reciprocal_of_term(&self) -> Option<Polynomial> {
        if self.terms.len() != 1 {
            return None;
        }
        let (mono, &c) = self.terms.iter().next()?;
        let inverted = mono.iter().map(|(a, e)| (a.clone(), -e)).collect();
        let mut out = Polynomial::zero();
        out.add_term(inverted, 1.0 / c);
        Some(out)
    }

    /// Group terms by the exponent of symbol `var`, removing `var` from each.
    pub fn coefficients_in(&self, var: &str) -> BTreeMap<i32, Polynomial> {
        let key = Atom::symbol(var);
        let mut out: BTreeMap<i32, Polynomial> = BTreeMap::new();
        for (mono, &c) in &self.terms {
            let mut rest = mono.clone();
            let exp = rest.remove(&key).unwrap_or(0);
            out.entry(exp).or_default().add_term(rest, c);
        }
        out
    }
}

pub fn too_many_terms(max_terms: usize) -> SymbolicError {
    SymbolicError::BudgetExceeded(format!("more than {max_terms} terms"))
}
