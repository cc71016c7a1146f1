//! Solving `p = 0` for one variable: linear and quadratic cases.

use gradewise_core::error::SymbolicError;

use crate::poly::Polynomial;

/// Roots of `p = 0` in `var`, ascending for quadratics.
///
/// Returns an empty list when there is no (real) solution, and
/// `Unsupported` for identities, degree above two, quadratics with
/// symbolic coefficients, and `var` in a denominator or opaque atom.
pub fn solve_polynomial(
    p: &Polynomial,
    var: &str,
    max_terms: usize,
) -> Result<Vec<Polynomial>, SymbolicError> {
    if p
        .terms()
        .any(|(mono, _)| mono.keys().any(|atom| atom.hides(var)))
    {
        return Err(SymbolicError::Unsupported(format!(
            "{var} appears inside a non-polynomial term"
        )));
    }

    let coefficients = p.coefficients_in(var);
    if coefficients.keys().any(|&e| e < 0) {
        return Err(SymbolicError::Unsupported(format!(
            "{var} appears in a denominator"
        )));
    }

    let degree = coefficients.keys().copied().max().unwrap_or(0);
    let coefficient = |k: i32| coefficients.get(&k).cloned().unwrap_or_default();
    tracing::trace!(var, degree, "solving polynomial equation");

    match degree {
        0 if p.is_zero() => Err(SymbolicError::Unsupported(format!(
            "identity holds for every {var}"
        ))),
        0 => Ok(Vec::new()),
        1 => {
            let Some(inverse) = coefficient(1).reciprocal_of_term() else {
                return Err(SymbolicError::Unsupported(format!(
                    "coefficient of {var} has several terms"
                )));
            };
            Ok(vec![coefficient(0).neg().mul(&inverse, max_terms)?])
        }
        2 => {
            let (Some(a), Some(b), Some(c)) = (
                coefficient(2).as_constant(),
                coefficient(1).as_constant(),
                coefficient(0).as_constant(),
            ) else {
                return Err(SymbolicError::Unsupported(format!(
                    "quadratic in {var} has symbolic coefficients"
                )));
            };
            Ok(quadratic_roots(a, b, c)
                .into_iter()
                .map(Polynomial::constant)
                .collect())
        }
        d => Err(SymbolicError::Unsupported(format!("degree {d} in {var}"))),
    }
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    let scale = (b * b).max((4.0 * a * c).abs());
    if discriminant.abs() <= 1e-12 * scale {
        return vec![-b / (2.0 * a)];
    }
    if discriminant < 0.0 {
        return Vec::new();
    }
    let root = discriminant.sqrt();
    let mut roots = vec![(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)];
    roots.sort_by(f64::total_cmp);
    roots
}
