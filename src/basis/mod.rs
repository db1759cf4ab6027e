//! Evaluates polynomial basis functions at parameter sequences.
//!
//! - [Bernstein][bernstein] basis of a single Bézier segment on `[0,1]`
//! - [B-spline][bspline] basis of a flat knot vector (Cox-de Boor recurrence)
//! - [Legendre and Jacobi][legendre] polynomials with Gauss-Legendre quadrature
//!
//! The matrix evaluators return dense matrices with one row per parameter and one column per
//! basis function (pole). The evaluators never fail on valid input; violated preconditions
//! such as unsorted parameters are reported as [BasisError] instead of producing wrong rows.

use thiserror::Error;

use crate::types::MatD;

pub mod bernstein;
pub mod bspline;
pub mod legendre;

/// Dense basis matrices `A[sample][pole]` and their parameter derivatives.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisMatrix {
    pub values: MatD,
    pub first_derivatives: MatD,
    pub second_derivatives: Option<MatD>,
}

impl BasisMatrix {
    pub(crate) fn zeros(samples: usize, poles: usize, order: usize) -> Self {
        BasisMatrix {
            values: MatD::zeros(samples, poles),
            first_derivatives: MatD::zeros(samples, poles),
            second_derivatives: (order >= 2).then(|| MatD::zeros(samples, poles)),
        }
    }

    pub fn samples(&self) -> usize {
        self.values.nrows()
    }

    pub fn poles(&self) -> usize {
        self.values.ncols()
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum BasisError {
    #[error("At least `{required}` poles are needed, got `{found}`.")]
    TooFewPoles { required: usize, found: usize },

    #[error("No evaluation parameters were given.")]
    NoParameters,

    #[error("Parameter `u = {u}` lies outside the interval `[{lower_bound}, {upper_bound}]`.")]
    ParameterOutOfBounds { u: f64, lower_bound: f64, upper_bound: f64 },

    #[error("Parameter `{index}` with value `{u}` is smaller than its predecessor.")]
    UnsortedParameters { index: usize, u: f64 },

    #[error(
        "`{nb_poles}` poles of degree `p = {p}` require `{expected}` flat knots, got `{found}`."
    )]
    KnotCountMismatch { nb_poles: usize, p: usize, expected: usize, found: usize },

    #[error("Knot `{index}` with value `{value}` is smaller than its predecessor.")]
    UnsortedKnots { index: usize, value: f64 },

    #[error("Degree `p = {p}` exceeds the supported maximum `{limit}`.")]
    DegreeTooHigh { p: usize, limit: usize },
}

/// Returns `numerator / denominator`, or zero for a vanishing denominator.
///
/// Zero-length knot intervals occur at knots of full multiplicity; their terms of the
/// recurrence are defined to vanish.
#[inline]
pub(crate) fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub(crate) fn check_sorted(params: &[f64]) -> Result<(), BasisError> {
    if params.is_empty() {
        return Err(BasisError::NoParameters);
    }
    match (1..params.len()).find(|&i| params[i] < params[i - 1]) {
        Some(index) => Err(BasisError::UnsortedParameters { index, u: params[index] }),
        None => Ok(()),
    }
}

pub(crate) fn check_bounds(params: &[f64], lower_bound: f64, upper_bound: f64) -> Result<(), BasisError> {
    match params.iter().find(|u| !(lower_bound..=upper_bound).contains(*u)) {
        Some(&u) => Err(BasisError::ParameterOutOfBounds { u, lower_bound, upper_bound }),
        None => Ok(()),
    }
}
