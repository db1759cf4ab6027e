//! Implements the B-spline curve.
//!
//! A B-spline curve of degree `p` with `n` poles is defined by
//!
//! `C(u) = sum_i N_{i,p}(u) P_i`,  `u ∈ [U_p, U_n]`
//!
//! with the
//! - `k`-th derivative `C^(k)(u) = sum_i N^(k)_{i,p}(u) P_i`,
//! - flat [knot vector][knots] `U` defining the [spline basis functions][crate::basis::bspline] `N`, and
//! - `n`, `N`-dimensional [control points][points] `P`.
//!
//! Curves are what [conversion][crate::conversion] produces and what the
//! [curve approximation][crate::approximation::curve] returns.

use thiserror::Error;

use crate::{
    basis::{bspline::local_basis, BasisError},
    curve::{
        knots::Knots,
        points::{ControlPoints, Points},
    },
    manipulation::insert::{insert, InsertError},
    types::VecD,
};

pub mod interpolation;
pub mod knots;
pub mod points;

#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub knots: Knots,
    pub points: ControlPoints,
}

#[derive(Error, Debug, PartialEq)]
pub enum CurveError {
    #[error("Parameter `u = {u}` lies outside the interval `[{lower_bound}, {upper_bound}]`.")]
    ParameterOutOfBounds { u: f64, lower_bound: f64, upper_bound: f64 },

    #[error("The knot vector supports `{expected}` poles, but `{found}` control points were given.")]
    PoleCountMismatch { expected: usize, found: usize },

    #[error("`{params}` parameters were given for `{points}` data points.")]
    SampleCountMismatch { params: usize, points: usize },

    #[error("The collocation matrix of the interpolation problem is singular.")]
    SingularSystem,

    #[error("Basis evaluation failed with error {err}.")]
    BasisError { err: BasisError },
}

impl Curve {
    /// Returns a B-Spline
    ///
    /// # Examples
    /// ```
    /// use nalgebra::dmatrix;
    /// use polyspline::curve::{knots, points::ControlPoints, Curve};
    ///
    /// // Create a coordinate matrix containing five 3D points.
    /// let points = ControlPoints::new(dmatrix![
    /// // 1    2    3    4    5
    ///  -2.0,-2.0,-1.0, 0.5, 1.5; // x
    ///  -1.0, 0.0, 1.0, 1.0, 2.0; // y
    ///   0.0, 0.5, 1.5,-0.5,-1.0; // z
    /// ]);
    /// let knots = knots::uniform(2, 3).unwrap();
    /// let curve = Curve::new(knots, points).unwrap();
    /// assert_eq!(curve.evaluate(0.0).unwrap().as_slice(), &[-2.0, -1.0, 0.0]);
    /// ```
    pub fn new(knots: Knots, points: ControlPoints) -> Result<Self, CurveError> {
        match (knots.nb_poles(), points.count()) {
            (expected, found) if expected != found => Err(CurveError::PoleCountMismatch { expected, found }),
            _ => Ok(Self { knots, points }),
        }
    }

    pub fn degree(&self) -> usize {
        self.knots.degree()
    }

    pub fn nb_poles(&self) -> usize {
        self.points.count()
    }

    /// Returns the dimension of the curve.
    pub fn dimension(&self) -> usize {
        self.points.dimension()
    }

    pub fn domain(&self) -> (f64, f64) {
        self.knots.domain()
    }

    pub fn evaluate(&self, u: f64) -> Result<VecD, CurveError> {
        self.evaluate_derivative(u, 0)
    }

    /// Evaluates the `k`-th derivative at `u`.
    ///
    /// Only the `p+1` poles of the span containing `u` contribute. Orders `k > p` vanish.
    pub fn evaluate_derivative(&self, u: f64, k: usize) -> Result<VecD, CurveError> {
        let (lower_bound, upper_bound) = self.domain();
        if !(lower_bound..=upper_bound).contains(&u) {
            return Err(CurveError::ParameterOutOfBounds { u, lower_bound, upper_bound });
        }

        let p = self.degree();
        let mut value = VecD::zeros(self.dimension());

        if k <= p {
            let span = self.knots.find_span(u);
            let ders = local_basis(self.knots.flat.as_slice(), p, span, u, k);

            for r in 0..=p {
                value += ders[(k, r)] * self.points.get(span - p + r);
            }
        }
        Ok(value)
    }

    /// Inserts a knot into the curve at parameter `u`.
    ///
    /// # Arguments
    /// * `u` - The parameter`u` that must lie in the open domain.
    pub fn insert(&mut self, u: f64) -> Result<&mut Self, InsertError> {
        self.insert_times(u, 1)
    }

    /// Inserts a knot `x` times into the curve at parameter `u`.
    ///
    /// # Arguments
    /// * `u` - The parameter`u` that must lie in the open domain.
    /// * `x` - The number of insertions of parameter `u`.
    pub fn insert_times(&mut self, u: f64, x: usize) -> Result<&mut Self, InsertError> {
        for _ in 0..x {
            insert(self, u)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};
    use rstest::fixture;

    use crate::curve::knots::uniform;

    use super::*;

    fn manual(degree: usize, points: crate::types::MatD) -> Curve {
        let knots = uniform(degree, points.ncols() - degree).unwrap();
        Curve::new(knots, ControlPoints::new(points)).unwrap()
    }

    #[fixture]
    /// A two-dimensional, linear test curve with default degree two.
    fn c(#[default(2)] degree: usize) -> Curve {
        let c = manual(
            degree,
            dmatrix![
                1., 3., 5.;
                2., 4., 6.;
            ],
        );
        assert_eq!(c.knots.flat(), &dvector![0., 0., 0., 1., 1., 1.]);
        c
    }

    #[test]
    fn pole_count_mismatch() {
        let knots = uniform(2, 2).unwrap();
        assert_eq!(
            Curve::new(knots, ControlPoints::new(dmatrix![1., 2., 3.;])),
            Err(CurveError::PoleCountMismatch { expected: 4, found: 3 })
        );
    }

    mod evaluate {
        use rstest::rstest;

        use super::*;

        #[rstest]
        fn non_existing_derivative(c: Curve) {
            let k = 3;
            assert_eq!(c.evaluate_derivative(0.5, k), Ok(dvector![0., 0.]));
        }

        #[rstest]
        fn outside_lower_bound(c: Curve) {
            let u = -0.1;
            assert_eq!(
                c.evaluate_derivative(u, 0),
                Err(CurveError::ParameterOutOfBounds { u, lower_bound: 0.0, upper_bound: 1.0 })
            );
        }

        #[rstest]
        fn outside_upper_bound(c: Curve) {
            let u = 1.1;
            assert_eq!(
                c.evaluate_derivative(u, 1),
                Err(CurveError::ParameterOutOfBounds { u, lower_bound: 0.0, upper_bound: 1.0 })
            );
        }

        #[rstest]
        fn start(c: Curve) {
            assert_eq!(c.evaluate_derivative(0., 0).unwrap(), dvector![1., 2.])
        }

        #[rstest]
        fn middle(c: Curve) {
            assert_eq!(c.evaluate_derivative(0.5, 0).unwrap(), dvector![3., 4.])
        }

        #[rstest]
        fn end(c: Curve) {
            assert_eq!(c.evaluate_derivative(1., 0).unwrap(), dvector![5., 6.])
        }

        #[rstest]
        fn constant_first_derivative(c: Curve) {
            for &u in [0.0, 0.3, 1.0].iter() {
                assert_relative_eq!(c.evaluate_derivative(u, 1).unwrap(), dvector![4., 4.], epsilon = 1e-12);
            }
        }

        #[test]
        fn derivative_after_insertion() {
            let mut c = manual(2, dmatrix![1., 1., 1., 1.;]);
            c.insert(0.5).unwrap();

            assert_relative_eq!(c.evaluate_derivative(0.9, 1).unwrap(), dvector![0.], epsilon = 1e-14);
        }

        #[test]
        fn derivatives_match_central_differences() {
            let c = manual(
                3,
                dmatrix![
                    0.0, 1.0, 3.0, 2.0, 4.0, 5.0;
                    1.0, 0.0, 2.0, -1.0, 0.5, 1.0;
                ],
            );
            let h = 1e-6;

            for &u in [0.1, 0.4, 0.6, 0.85].iter() {
                let numeric = (c.evaluate(u + h).unwrap() - c.evaluate(u - h).unwrap()) / (2.0 * h);
                assert_relative_eq!(c.evaluate_derivative(u, 1).unwrap(), numeric, epsilon = 1e-6);

                let numeric = (c.evaluate_derivative(u + h, 1).unwrap() - c.evaluate_derivative(u - h, 1).unwrap())
                    / (2.0 * h);
                assert_relative_eq!(c.evaluate_derivative(u, 2).unwrap(), numeric, epsilon = 1e-5);
            }
        }

        #[test]
        fn non_unit_domain() {
            let knots = Knots::from_multiplicities(1, &[2.0, 3.0, 5.0], &[2, 1, 2]).unwrap();
            let c = Curve::new(knots, ControlPoints::new(dmatrix![0., 1., 5.;])).unwrap();

            assert_eq!(c.domain(), (2.0, 5.0));
            assert_eq!(c.evaluate(3.0).unwrap(), dvector![1.]);
            assert_relative_eq!(c.evaluate(4.0).unwrap(), dvector![3.], epsilon = 1e-15);
            assert_relative_eq!(c.evaluate_derivative(4.0, 1).unwrap(), dvector![2.], epsilon = 1e-15);
        }

        #[test]
        fn evaluate_p_repeated_knots() {
            let mut c = manual(3, dmatrix![-1., -0.5, 0.5, 1.;]);
            let u = 0.5;
            assert_eq!(c.knots.flat(), &dvector![0., 0., 0., 0., 1., 1., 1., 1.]);
            assert_eq!(c.evaluate(0.0).unwrap(), dvector![-1.]);
            assert_eq!(c.evaluate(1.0).unwrap(), dvector![1.]);

            for expected in [
                dmatrix![-1., -0.75, 0.0, 0.75, 1.;],
                dmatrix![-1., -0.75, -0.375, 0.375, 0.75, 1.;],
                dmatrix![-1., -0.75, -0.375, 0.0, 0.375, 0.75, 1.;],
            ] {
                c.insert(u).unwrap();
                assert_eq!(c.points.matrix(), &expected);
                assert_relative_eq!(c.evaluate(u).unwrap(), dvector![0.0], epsilon = 1e-15);
                assert_relative_eq!(c.evaluate(0.0).unwrap(), dvector![-1.], epsilon = 1e-15);
                assert_relative_eq!(c.evaluate(1.0).unwrap(), dvector![1.], epsilon = 1e-15);
            }
            assert_eq!(c.knots.multiplicity(u), 3);
        }
    }
}
