//! Adaptive polynomial approximation of functions given by evaluators.
//!
//! - [curve] approximates a function of one variable by Hermite interpolation at segment ends
//!   plus a Jacobi expansion of the remainder, assembled into a B-spline curve.
//! - [surface] decomposes a rectangular domain into patches carrying Legendre and canonical
//!   (power basis) coefficients.
//!
//! Both engines only call their evaluator and keep no state between calls. Failing to meet the
//! tolerance within the configured limits is not an error: the best-effort result is returned
//! with [Status::LimitReached].

use thiserror::Error;

use crate::{
    conversion::ConversionError,
    types::{parametric_resolution, VecD},
};

pub mod curve;
pub mod surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every piece satisfies the tolerance.
    Converged,
    /// The piece or degree limits stopped the refinement first.
    LimitReached,
}

impl Status {
    /// Integer error code, `0` for success.
    pub fn code(&self) -> i32 {
        match self {
            Status::Converged => 0,
            Status::LimitReached => 1,
        }
    }

    pub fn is_converged(&self) -> bool {
        *self == Status::Converged
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ApproximationError {
    #[error("The tolerance `{tolerance}` must be positive and finite.")]
    InvalidTolerance { tolerance: f64 },

    #[error("The domain `[{lower_bound}, {upper_bound}]` is empty, too narrow or not finite.")]
    InvalidDomain { lower_bound: f64, upper_bound: f64 },

    #[error("Degree `{degree}` exceeds the supported maximum `{limit}`.")]
    DegreeTooHigh { degree: usize, limit: usize },

    #[error("Degree `{degree}` is too low, at least `{required}` is needed.")]
    DegreeTooLow { degree: usize, required: usize },

    #[error("The limit `{name} = {value}` is too small.")]
    InvalidLimit { name: &'static str, value: usize },

    #[error("The evaluator returned `{found}` coordinates, expected `{expected}`.")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("The evaluator returned a non-finite value at `{parameters:?}`.")]
    NonFiniteValue { parameters: Vec<f64> },

    #[error("The evaluator cannot provide derivative `{order}` at `t = {t}`.")]
    DerivativeUnavailable { t: f64, order: usize },

    #[error("No Hermite basis with continuity `C^{continuity}` exists on `[{first}, {last}]`.")]
    HermiteUnavailable { first: f64, last: f64, continuity: usize },

    #[error("Assembling the B-spline failed with error {err}.")]
    Conversion { err: ConversionError },
}

pub(crate) fn check_tolerance(tolerance: f64) -> Result<(), ApproximationError> {
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        return Err(ApproximationError::InvalidTolerance { tolerance });
    }
    Ok(())
}

pub(crate) fn check_domain((lower_bound, upper_bound): (f64, f64)) -> Result<(), ApproximationError> {
    let finite = lower_bound.is_finite() && upper_bound.is_finite();
    if !(finite && upper_bound - lower_bound > parametric_resolution(lower_bound, upper_bound)) {
        return Err(ApproximationError::InvalidDomain { lower_bound, upper_bound });
    }
    Ok(())
}

pub(crate) fn check_limit(name: &'static str, value: usize, minimum: usize) -> Result<(), ApproximationError> {
    if value < minimum {
        return Err(ApproximationError::InvalidLimit { name, value });
    }
    Ok(())
}

/// Rejects evaluator output of the wrong size or with non-finite coordinates.
pub(crate) fn check_value(value: &VecD, dimension: usize, parameters: &[f64]) -> Result<(), ApproximationError> {
    if value.len() != dimension {
        return Err(ApproximationError::DimensionMismatch { expected: dimension, found: value.len() });
    }
    if value.iter().any(|x| !x.is_finite()) {
        return Err(ApproximationError::NonFiniteValue { parameters: parameters.to_vec() });
    }
    Ok(())
}

/// `samples` equidistant points on `[-1, 1]`, both ends included.
pub(crate) fn sample_points(samples: usize) -> Vec<f64> {
    (0..samples).map(|i| -1.0 + 2.0 * i as f64 / (samples - 1) as f64).collect()
}
