use nalgebra::{Dyn, MatrixView, MatrixViewMut, OMatrix, OVector, U1};

pub type VecD = OVector<f64, Dyn>;

pub type VecDView<'a> = MatrixView<'a, f64, Dyn, U1, U1, Dyn>;
pub type VecDViewMut<'a> = MatrixViewMut<'a, f64, Dyn, U1, U1, Dyn>;

pub type MatD = OMatrix<f64, Dyn, Dyn>;

/// Upper bound accepted for any polynomial or spline degree.
///
/// Scratch buffers are sized from the actual degree, this only rejects absurd requests
/// before anything is allocated.
pub const MAX_DEGREE: usize = 64;

/// Two breakpoints closer than this are considered identical.
pub const PARAMETRIC_TOLERANCE: f64 = 1e-12;

/// Width an interval between `a` and `b` must exceed to be non-degenerate.
///
/// Relative to the magnitude of the bounds, absolute below one.
pub(crate) fn parametric_resolution(a: f64, b: f64) -> f64 {
    PARAMETRIC_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Largest absolute difference between two equally shaped vectors.
pub(crate) fn max_abs_diff(a: &VecD, b: &VecD) -> f64 {
    a.iter().zip(b.iter()).fold(0.0, |acc, (x, y)| acc.max((x - y).abs()))
}
