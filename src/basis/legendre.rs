//! Legendre and symmetric Jacobi polynomials on `[-1, 1]` and Gauss-Legendre quadrature.
//!
//! The Jacobi polynomials `P_k^(a,a)` are orthogonal with respect to the weight `(1-x^2)^a`.
//! `a = 0` gives the Legendre polynomials used for the canonical coefficients of approximated
//! patches, larger `a` the correction terms of constrained approximations whose end
//! derivatives are prescribed.

use std::f64::consts::PI;

use crate::types::{MatD, VecD};

/// Values `P_0^(a,a)(x), ..., P_n^(a,a)(x)` of the symmetric Jacobi polynomials.
pub fn jacobi_values(n: usize, a: usize, x: f64) -> VecD {
    let mut values = VecD::zeros(n + 1);
    values[0] = 1.0;
    if n == 0 {
        return values;
    }
    let a = a as f64;
    values[1] = (a + 1.0) * x;

    for k in 2..=n {
        let (c0, c1, c2) = jacobi_recurrence(k, a);
        values[k] = (c1 * x * values[k - 1] - c2 * values[k - 2]) / c0;
    }
    values
}

/// Values `P_0(x), ..., P_n(x)` of the Legendre polynomials.
pub fn legendre_values(n: usize, x: f64) -> VecD {
    jacobi_values(n, 0, x)
}

/// Coefficients of `c0 P_k = c1 x P_{k-1} - c2 P_{k-2}` for `a = b`.
fn jacobi_recurrence(k: usize, a: f64) -> (f64, f64, f64) {
    let k = k as f64;
    let s = 2.0 * k + 2.0 * a;

    let c0 = 2.0 * k * (k + 2.0 * a) * (s - 2.0);
    let c1 = (s - 1.0) * s * (s - 2.0);
    let c2 = 2.0 * (k + a - 1.0) * (k + a - 1.0) * s;
    (c0, c1, c2)
}

/// Power-basis coefficients of `P_0^(a,a), ..., P_n^(a,a)`.
///
/// Row `k` holds the coefficients of `P_k`, column `j` belongs to `x^j`.
pub fn jacobi_to_monomial(n: usize, a: usize) -> MatD {
    let mut table = MatD::zeros(n + 1, n + 1);
    table[(0, 0)] = 1.0;
    if n == 0 {
        return table;
    }
    let af = a as f64;
    table[(1, 1)] = af + 1.0;

    for k in 2..=n {
        let (c0, c1, c2) = jacobi_recurrence(k, af);
        for j in 0..=k {
            let shifted = if j > 0 { table[(k - 1, j - 1)] } else { 0.0 };
            table[(k, j)] = (c1 * shifted - c2 * table[(k - 2, j)]) / c0;
        }
    }
    table
}

/// Power-basis coefficients of the Legendre polynomials, see [jacobi_to_monomial].
pub fn legendre_to_monomial(n: usize) -> MatD {
    jacobi_to_monomial(n, 0)
}

/// Nodes and weights of the `m`-point Gauss-Legendre rule on `[-1, 1]`.
///
/// The rule integrates polynomials up to degree `2m-1` exactly. Nodes are returned ascending.
pub fn gauss_legendre(m: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0; m];
    let mut weights = vec![0.0; m];

    for i in 0..m {
        let mut x = (PI * (i as f64 + 0.75) / (m as f64 + 0.5)).cos();

        for _ in 0..100 {
            let (value, derivative) = legendre_with_derivative(m, x);
            let dx = value / derivative;
            x -= dx;
            if dx.abs() <= 1e-15 {
                break;
            }
        }
        let (_, derivative) = legendre_with_derivative(m, x);

        nodes[m - 1 - i] = x;
        weights[m - 1 - i] = 2.0 / ((1.0 - x * x) * derivative * derivative);
    }
    (nodes, weights)
}

/// Returns `(P_m(x), P_m'(x))` for `|x| < 1`.
fn legendre_with_derivative(m: usize, x: f64) -> (f64, f64) {
    let (mut previous, mut value) = (0.0, 1.0);
    for k in 1..=m {
        let next = ((2 * k - 1) as f64 * x * value - (k - 1) as f64 * previous) / k as f64;
        previous = value;
        value = next;
    }
    (value, m as f64 * (x * value - previous) / (x * x - 1.0))
}
