//! Global curve interpolation.
//!
//! Finds the poles `P` of the curve through the data points `Q` at the parameters `ū` by
//! solving the collocation system `N(ū) P^T = Q^T`.

use crate::{
    basis::bspline,
    curve::{
        knots::Knots,
        points::{ControlPoints, DataPoints, Points},
        Curve, CurveError,
    },
};

/// Interpolates `points` at the ascending parameters `params` with a curve on `knots`.
///
/// The number of data points must match the number of poles the knot vector supports. With
/// [Schoenberg points][Knots::schoenberg_points] as parameters the system is always regular.
///
/// # Examples
/// ```
/// use nalgebra::dmatrix;
/// use polyspline::curve::{interpolation::interpolate, knots, points::DataPoints};
///
/// let knots = knots::uniform(2, 2).unwrap();
/// let params = knots.schoenberg_points();
/// let points = DataPoints::new(dmatrix![0.0, 1.0, 0.0, 2.0;]);
///
/// let curve = interpolate(&knots, params.as_slice(), &points).unwrap();
/// assert!((curve.evaluate(params[1]).unwrap()[0] - 1.0).abs() < 1e-12);
/// ```
pub fn interpolate(knots: &Knots, params: &[f64], points: &DataPoints) -> Result<Curve, CurveError> {
    let n = knots.nb_poles();
    if params.len() != points.count() {
        return Err(CurveError::SampleCountMismatch { params: params.len(), points: points.count() });
    }
    if n != points.count() {
        return Err(CurveError::PoleCountMismatch { expected: n, found: points.count() });
    }

    let collocation = bspline::evaluate_matrix(n, knots.degree(), params, knots.flat().as_slice())
        .map_err(|err| CurveError::BasisError { err })?;

    let lu = collocation.basis.values.lu();
    let poles = lu.solve(&points.matrix().transpose()).ok_or(CurveError::SingularSystem)?;

    Curve::new(knots.clone(), ControlPoints::new(poles.transpose()))
}
