//! Hermite basis polynomials for prescribed end derivatives.

use crate::types::MatD;

/// Power-basis coefficients of the Hermite basis on `[first, last]`.
///
/// The basis has `n = first_order + last_order + 2` polynomials of degree `n - 1`. Row `i` of
/// the result is the polynomial for which exactly one of the `n` end conditions
///
/// `h(first), h'(first), ..., h^(first_order)(first), h(last), ..., h^(last_order)(last)`
///
/// equals one and all others vanish. Returns `None` for a degenerate interval or when the
/// condition matrix cannot be inverted.
pub fn hermite_coefficients(first: f64, last: f64, first_order: usize, last_order: usize) -> Option<MatD> {
    let (d1, d2) = (first.abs(), last.abs());
    if !first.is_finite() || !last.is_finite() || d1 > 100.0 || d2 > 100.0 {
        return None;
    }
    let scale = d1 + d2;
    if scale < 0.01 || (last - first).abs() / scale < 0.01 {
        return None;
    }

    let n = first_order + last_order + 2;
    let mut conditions = MatD::zeros(n, n);

    let ends = [(first, first_order), (last, last_order)];
    let mut row = 0;
    for &(t, order) in ends.iter() {
        for r in 0..=order {
            for j in r..n {
                conditions[(row, j)] = falling_factorial(j, r) * t.powi((j - r) as i32);
            }
            row += 1;
        }
    }

    conditions.try_inverse().map(|inverse| inverse.transpose())
}

/// `j (j-1) ... (j-r+1)`
fn falling_factorial(j: usize, r: usize) -> f64 {
    (j - r + 1..=j).fold(1.0, |acc, k| acc * k as f64)
}
