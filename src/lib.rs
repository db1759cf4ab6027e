#![allow(non_snake_case)]
//! **polyspline** is a numerics library for polynomial and B-spline bases, conversion of piecewise
//! polynomials into B-spline curves and adaptive approximation of curves and surfaces, based on
//! [nalgebra].
//!
//! ## Features
//! - [Bernstein][basis::bernstein] and [B-spline][basis::bspline] basis evaluation with derivatives,
//!   in matrix form for many parameters at once.
//! - [Legendre and Jacobi][basis::legendre] polynomials with Gauss-Legendre quadrature.
//! - [Power-basis polynomials][polynomial] with [Hermite interpolation][polynomial::hermite]
//!   coefficients.
//! - B-spline [curves][curve::Curve] with [knot vectors][curve::knots],
//!   [interpolation][curve::interpolation] and [knot insertion][manipulation::insert].
//! - [Conversion][conversion] of piecewise polynomials with prescribed continuity at the
//!   junctions into a single B-spline curve.
//! - Adaptive approximation of [curves][approximation::curve] and
//!   [surfaces][approximation::surface] given by evaluators.
//!
//! ## Conventions
//!
//! Points, poles and polynomial coefficients of a `d`-dimensional object are stored column-wise
//! in `d x n` matrices. A power-basis polynomial `c_0 + c_1 x + ... + c_n x^n` has column `j`
//! holding `c_j`.
//!
//! Degrees are limited to [types::MAX_DEGREE].
//!
//! ## Literature:
//! |            |                                                                                                                          |
//! |-----------:|:-------------------------------------------------------------------------------------------------------------------------|
//! | Piegl1997  | Piegl, L., Tiller, W. The NURBS Book. Monographs in Visual Communication. Springer, Berlin, Heidelberg, 2nd ed., 1997.   |
//! | Farin2002  | Farin, G. Curves and Surfaces for CAGD: A Practical Guide. Morgan Kaufmann, 5th ed., 2002.                                |
//! | Szego1975  | Szegő, G. Orthogonal Polynomials. American Mathematical Society Colloquium Publications 23, 4th ed., 1975.               |

pub mod approximation;
pub mod basis;
pub mod conversion;
pub mod curve;
pub mod manipulation;
pub mod polynomial;
pub mod types;
