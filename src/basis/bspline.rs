//! Evaluates the basis spline functions using the Cox-de Boor-Mansfield recurrence relation
//!
//! `N_{i,0}(u) = 1` if `U_i <= u < U_{i+1}`, else `0`
//!
//! `N_{i,p}(u) = (u - U_i) / (U_{i+p} - U_i) N_{i,p-1}(u) + (U_{i+p+1} - u) / (U_{i+p+1} - U_{i+1}) N_{i+1,p-1}(u)`
//!
//! where fractions with a vanishing denominator are defined as zero. On the span
//! `[U_k, U_{k+1})` only the `p+1` functions `N_{k-p,p}, ..., N_{k,p}` are non-zero, so the
//! evaluators compute this local window once per parameter and scatter it into the rows of
//! the dense result.

use crate::{
    basis::{check_bounds, check_sorted, safe_ratio, BasisError, BasisMatrix},
    curve::knots::hunt_span,
    types::{MatD, MAX_DEGREE},
};

/// Basis matrices together with the span each row was evaluated on.
///
/// The non-zero entries of row `i` are the columns `spans[i] - p ..= spans[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineBasisMatrix {
    pub basis: BasisMatrix,
    pub spans: Vec<usize>,
    pub degree: usize,
}

impl SplineBasisMatrix {
    /// First column index that may be non-zero in row `i`.
    pub fn first_active(&self, i: usize) -> usize {
        self.spans[i] - self.degree
    }
}

/// Evaluates the `i`-th basis spline function of degree `p` directly from its recursive
/// definition.
///
/// This costs `O(2^p)` and serves as reference for the table based evaluators. The upper
/// domain end `u = U_n` is attributed to the last non-empty span.
///
/// ## Arguments
///
/// - `U` the flat knot vector
/// - `i` the index with `i ∈ {0, 1, ..., n-1}`
/// - `p` the spline degree
/// - `u` the parameter
pub fn basis_function(U: &[f64], i: usize, p: usize, u: f64) -> f64 {
    let n = U.len() - p - 1;
    let last = crate::curve::knots::find_span(U, p, U[n]);
    recurse(U, i, p, u, last)
}

fn recurse(U: &[f64], i: usize, p: usize, u: f64, last: usize) -> f64 {
    if p == 0 {
        if (U[i] <= u && u < U[i + 1]) || (i == last && u == U[i + 1]) {
            return 1.0;
        }
        return 0.0;
    }

    let summand1 = if U[i + p] == U[i] { 0.0 } else { (u - U[i]) / (U[i + p] - U[i]) * recurse(U, i, p - 1, u, last) };

    // `(U[i+p+1] - u) / (...)` is numerically more stable than `1 - (u - U[i+1]) / (...)`
    let summand2 = if U[i + 1 + p] == U[i + 1] {
        0.0
    } else {
        (U[i + p + 1] - u) / (U[i + p + 1] - U[i + 1]) * recurse(U, i + 1, p - 1, u, last)
    };

    summand1 + summand2
}

/// Computes the `p+1` non-zero basis functions on span `k` and their derivatives up to `order`.
///
/// Row `d` of the result holds the `d`-th derivatives of `N_{k-p,p}, ..., N_{k,p}` at `u`.
/// Derivatives of an order above `p` vanish and are returned as zero rows.
///
/// The triangular table stores the basis values of increasing degree in its upper part and the
/// knot differences `U_{k+r+1} - U_{k+1-j+r}` in its lower part. The derivatives are obtained from
/// the degree `p-1` entries and these differences, scaled by `p!/(p-d)!` at the end.
pub fn local_basis(U: &[f64], p: usize, k: usize, u: f64, order: usize) -> MatD {
    let mut ders = MatD::zeros(order + 1, p + 1);

    let mut ndu = MatD::zeros(p + 1, p + 1);
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];

    ndu[(0, 0)] = 1.0;
    for j in 1..=p {
        left[j] = u - U[k + 1 - j];
        right[j] = U[k + j] - u;
        let mut saved = 0.0;

        for r in 0..j {
            // lower triangle
            ndu[(j, r)] = right[r + 1] + left[j - r];
            let temp = safe_ratio(ndu[(r, j - 1)], ndu[(j, r)]);

            // upper triangle
            ndu[(r, j)] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[(j, j)] = saved;
    }

    for j in 0..=p {
        ders[(0, j)] = ndu[(j, p)];
    }

    let n = order.min(p);
    let pi = p as isize;

    // two alternating rows of the derivative coefficients
    let mut a = MatD::zeros(2, p + 1);

    for r in 0..=pi {
        let (mut s1, mut s2) = (0, 1);
        a[(0, 0)] = 1.0;

        for kd in 1..=n as isize {
            let mut d = 0.0;
            let rk = r - kd;
            let pk = pi - kd;

            if r >= kd {
                a[(s2, 0)] = safe_ratio(a[(s1, 0)], ndu[((pk + 1) as usize, rk as usize)]);
                d = a[(s2, 0)] * ndu[(rk as usize, pk as usize)];
            }

            let j1 = if rk >= -1 { 1 } else { -rk };
            let j2 = if r - 1 <= pk { kd - 1 } else { pi - r };

            for j in j1..=j2 {
                let (ju, rkj) = (j as usize, (rk + j) as usize);
                a[(s2, ju)] = safe_ratio(a[(s1, ju)] - a[(s1, ju - 1)], ndu[((pk + 1) as usize, rkj)]);
                d += a[(s2, ju)] * ndu[(rkj, pk as usize)];
            }

            if r <= pk {
                let (ku, ru) = (kd as usize, r as usize);
                a[(s2, ku)] = -safe_ratio(a[(s1, ku - 1)], ndu[((pk + 1) as usize, ru)]);
                d += a[(s2, ku)] * ndu[(ru, pk as usize)];
            }

            ders[(kd as usize, r as usize)] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    let mut factor = p as f64;
    for kd in 1..=n {
        for j in 0..=p {
            ders[(kd, j)] *= factor;
        }
        factor *= (p - kd) as f64;
    }

    ders
}

/// Evaluates the `nb_poles` basis spline functions of degree `p` and their first derivatives
/// at every parameter.
///
/// The parameters must be sorted ascending; the span of each parameter is searched forward
/// from the span of its predecessor.
///
/// # Examples
/// ```
/// use polyspline::basis::bspline::evaluate_matrix;
///
/// let knots = [0., 0., 0., 0.5, 1., 1., 1.];
/// let basis = evaluate_matrix(4, 2, &[0.0, 0.25, 1.0], &knots).unwrap();
///
/// assert_eq!(basis.spans, vec![2, 2, 3]);
/// assert_eq!(basis.basis.values[(1, 3)], 0.0);
/// ```
pub fn evaluate_matrix(nb_poles: usize, p: usize, params: &[f64], U: &[f64]) -> Result<SplineBasisMatrix, BasisError> {
    evaluate_matrix_to_order(nb_poles, p, params, U, 1)
}

/// Same as [evaluate_matrix], additionally filling the second derivatives for `order >= 2`.
pub fn evaluate_matrix_to_order(
    nb_poles: usize,
    p: usize,
    params: &[f64],
    U: &[f64],
    order: usize,
) -> Result<SplineBasisMatrix, BasisError> {
    check_knots(nb_poles, p, U)?;
    check_sorted(params)?;
    check_bounds(params, U[p], U[nb_poles])?;

    let order = order.clamp(1, 2);
    let mut basis = BasisMatrix::zeros(params.len(), nb_poles, order);
    let mut spans = Vec::with_capacity(params.len());

    let mut k = p;
    for (i, &u) in params.iter().enumerate() {
        k = hunt_span(U, p, u, k);
        spans.push(k);

        let ders = local_basis(U, p, k, u, order);
        let first = k - p;

        for r in 0..=p {
            basis.values[(i, first + r)] = ders[(0, r)];
            basis.first_derivatives[(i, first + r)] = ders[(1, r)];
            if let Some(second) = basis.second_derivatives.as_mut() {
                second[(i, first + r)] = ders[(2, r)];
            }
        }
    }

    Ok(SplineBasisMatrix { basis, spans, degree: p })
}

fn check_knots(nb_poles: usize, p: usize, U: &[f64]) -> Result<(), BasisError> {
    if p > MAX_DEGREE {
        return Err(BasisError::DegreeTooHigh { p, limit: MAX_DEGREE });
    }
    if nb_poles < p + 1 {
        return Err(BasisError::TooFewPoles { required: p + 1, found: nb_poles });
    }

    let expected = nb_poles + p + 1;
    if U.len() != expected {
        return Err(BasisError::KnotCountMismatch { nb_poles, p, expected, found: U.len() });
    }

    match (1..U.len()).find(|&i| U[i] < U[i - 1]) {
        Some(index) => Err(BasisError::UnsortedKnots { index, value: U[index] }),
        None => Ok(()),
    }
}
