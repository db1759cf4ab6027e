//! Evaluates the Bernstein polynomials
//!
//! `B_j^n(u) = C(n, j) u^j (1-u)^(n-j)`, `j = 0, ..., n`
//!
//! of a Bézier segment with `n+1` poles on `[0,1]`, together with their derivatives.

use crate::{
    basis::{check_bounds, BasisError, BasisMatrix},
    types::{VecD, MAX_DEGREE},
};

/// Fills `scratch[..=degree]` with the Bernstein polynomials of `degree` at `u`.
///
/// The triangle is built in place, one degree per pass. Within a pass the entries must be
/// updated from the highest index down: entry `j` reads the old value of entry `j-1`, which
/// an ascending loop would already have overwritten.
fn fill_triangle(scratch: &mut [f64], degree: usize, u: f64) {
    let v = 1.0 - u;
    scratch[0] = 1.0;

    for d in 1..=degree {
        scratch[d] = u * scratch[d - 1];
        for j in (1..d).rev() {
            scratch[j] = v * scratch[j] + u * scratch[j - 1];
        }
        scratch[0] *= v;
    }
}

/// Evaluates the `nb_poles` Bernstein polynomials of degree `nb_poles - 1` and their first
/// derivatives at every parameter.
///
/// Row `i` of the result belongs to `params[i]`, column `j` to the basis function `B_j`.
///
/// # Examples
/// ```
/// use polyspline::basis::bernstein::evaluate_matrix;
///
/// let basis = evaluate_matrix(3, &[0.0, 0.5, 1.0]).unwrap();
/// assert_eq!(basis.values.row(1).iter().copied().collect::<Vec<_>>(), vec![0.25, 0.5, 0.25]);
/// ```
pub fn evaluate_matrix(nb_poles: usize, params: &[f64]) -> Result<BasisMatrix, BasisError> {
    check_pole_count(nb_poles)?;
    if params.is_empty() {
        return Err(BasisError::NoParameters);
    }
    check_bounds(params, 0.0, 1.0)?;

    let n = nb_poles - 1;
    let mut basis = BasisMatrix::zeros(params.len(), nb_poles, 1);

    // degree `n-1` values, shared by the values and the derivatives of degree `n`
    let mut scratch = vec![0.0; n];

    for (i, &u) in params.iter().enumerate() {
        fill_triangle(&mut scratch, n - 1, u);

        let v = 1.0 - u;
        for j in 0..=n {
            let lower = if j > 0 { scratch[j - 1] } else { 0.0 };
            let upper = if j < n { scratch[j] } else { 0.0 };

            basis.values[(i, j)] = v * upper + u * lower;
            basis.first_derivatives[(i, j)] = n as f64 * (lower - upper);
        }
    }
    Ok(basis)
}

/// Returns the second derivatives of the `nb_poles` Bernstein polynomials at `u`.
pub fn second_derivatives(u: f64, nb_poles: usize) -> Result<VecD, BasisError> {
    check_pole_count(nb_poles)?;
    check_bounds(&[u], 0.0, 1.0)?;

    let n = nb_poles - 1;
    match n {
        1 => Ok(VecD::zeros(2)),
        2 => Ok(VecD::from_vec(vec![2.0, -4.0, 2.0])),
        _ => {
            let mut scratch = vec![0.0; n - 1];
            fill_triangle(&mut scratch, n - 2, u);

            let b = |j: isize| if j < 0 || j > (n - 2) as isize { 0.0 } else { scratch[j as usize] };
            let scale = (n * (n - 1)) as f64;

            Ok(VecD::from_fn(nb_poles, |j, _| {
                let j = j as isize;
                scale * (b(j - 2) - 2.0 * b(j - 1) + b(j))
            }))
        }
    }
}

fn check_pole_count(nb_poles: usize) -> Result<(), BasisError> {
    if nb_poles < 2 {
        return Err(BasisError::TooFewPoles { required: 2, found: nb_poles });
    }
    if nb_poles - 1 > MAX_DEGREE {
        return Err(BasisError::DegreeTooHigh { p: nb_poles - 1, limit: MAX_DEGREE });
    }
    Ok(())
}
