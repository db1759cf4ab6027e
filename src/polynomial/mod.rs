//! Power-basis polynomial utilities.
//!
//! A vector valued polynomial of degree `n` in `d` dimensions is stored as a `d x (n+1)` matrix
//! whose column `j` holds the coefficient of `x^j`.

use thiserror::Error;

use crate::types::{MatD, VecD};

pub mod hermite;

#[derive(Error, Debug, PartialEq)]
pub enum PolynomialError {
    #[error("Target degree `{degree}` is lower than the polynomial degree `{required}`.")]
    DegreeTooLow { degree: usize, required: usize },
}

/// Binomial coefficient `C(n, k)` as a float, zero for `k > n`.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);

    let mut c = 1.0;
    for i in 0..k {
        c *= (n - i) as f64;
        c /= (i + 1) as f64;
    }
    c
}

/// Horner evaluation of scalar coefficients `c[0] + c[1] x + ...`.
pub fn evaluate_scalar(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Evaluates a vector valued polynomial at `x`.
pub fn evaluate(coeffs: &MatD, x: f64) -> VecD {
    let mut value = VecD::zeros(coeffs.nrows());
    for j in (0..coeffs.ncols()).rev() {
        value *= x;
        value += coeffs.column(j);
    }
    value
}

/// Evaluates a polynomial and its derivatives up to `order` at `x`.
///
/// Column `k` of the result holds the `k`-th derivative. Orders above the degree are zero.
pub fn evaluate_derivatives(coeffs: &MatD, x: f64, order: usize) -> MatD {
    let mut result = MatD::zeros(coeffs.nrows(), order + 1);
    let mut current = coeffs.clone();

    for k in 0..=order {
        if current.ncols() == 0 {
            break;
        }
        result.set_column(k, &evaluate(&current, x));
        current = derivative(&current);
    }
    result
}

/// Coefficients of the derivative. A constant differentiates to an empty matrix.
pub fn derivative(coeffs: &MatD) -> MatD {
    let n = coeffs.ncols();
    if n <= 1 {
        return MatD::zeros(coeffs.nrows(), 0);
    }
    MatD::from_fn(coeffs.nrows(), n - 1, |r, j| (j + 1) as f64 * coeffs[(r, j + 1)])
}

/// Coefficients of `x -> q(offset + scale * x)`.
pub fn compose_affine(coeffs: &MatD, offset: f64, scale: f64) -> MatD {
    let n = coeffs.ncols();
    let mut result = MatD::zeros(coeffs.nrows(), n);

    // Horner in polynomial arithmetic: result = result * (offset + scale x) + c_k
    for k in (0..n).rev() {
        for j in (0..n).rev() {
            let shifted = if j > 0 { scale * result.column(j - 1) } else { VecD::zeros(coeffs.nrows()) };
            let column = offset * result.column(j) + shifted;
            result.set_column(j, &column);
        }
        let mut constant = result.column_mut(0);
        constant += coeffs.column(k);
    }
    result
}

/// Reparametrizes a polynomial given on `[a, b]` to `[0, 1]`.
pub fn trim(coeffs: &MatD, a: f64, b: f64) -> MatD {
    compose_affine(coeffs, a, b - a)
}

/// Converts power-basis coefficients on `[0, 1]` to the `degree + 1` Bernstein poles of the
/// same polynomial, elevating the degree where needed.
///
/// `b_j = sum_k C(j, k) / C(degree, k) a_k`
pub fn to_bernstein(coeffs: &MatD, degree: usize) -> Result<MatD, PolynomialError> {
    let n = coeffs.ncols();
    if n > degree + 1 {
        return Err(PolynomialError::DegreeTooLow { degree, required: n - 1 });
    }
    Ok(bernstein_poles(coeffs, degree))
}

/// [to_bernstein] for a `degree` the caller already knows to be sufficient.
pub(crate) fn bernstein_poles(coeffs: &MatD, degree: usize) -> MatD {
    let n = coeffs.ncols();
    let mut poles = MatD::zeros(coeffs.nrows(), degree + 1);
    for j in 0..=degree {
        let mut pole = poles.column_mut(j);
        for k in 0..n.min(j + 1) {
            pole += coeffs.column(k) * (binomial(j, k) / binomial(degree, k));
        }
    }
    poles
}

/// Product of two scalar polynomials.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}
