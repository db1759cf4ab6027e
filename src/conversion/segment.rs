use crate::{
    conversion::ConversionError,
    polynomial,
    types::{MatD, VecD},
};

/// A vector valued polynomial piece in power form.
///
/// The coefficients belong to the segment's local variable `t ∈ interval`. An optional
/// `mapped` interval places the piece within the parametrization of the assembled curve,
/// otherwise the local interval is used for that as well.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialSegment {
    pub coefficients: MatD,
    pub interval: (f64, f64),
    pub mapped: Option<(f64, f64)>,
}

impl PolynomialSegment {
    /// Creates a segment from a `dimension x (degree+1)` coefficient matrix.
    pub fn new(coefficients: MatD, interval: (f64, f64)) -> Self {
        PolynomialSegment { coefficients, interval, mapped: None }
    }

    /// Creates a segment from coefficients laid out as `[power][dimension]`.
    ///
    /// # Examples
    /// ```
    /// use polyspline::conversion::PolynomialSegment;
    ///
    /// // (1 + 2t, 3 - t)
    /// let segment = PolynomialSegment::from_flat(2, 1, &[1.0, 3.0, 2.0, -1.0], (0.0, 1.0)).unwrap();
    /// assert_eq!(segment.evaluate(1.0).as_slice(), &[3.0, 2.0]);
    /// ```
    pub fn from_flat(
        dimension: usize,
        degree: usize,
        coefficients: &[f64],
        interval: (f64, f64),
    ) -> Result<Self, ConversionError> {
        let expected = (degree + 1) * dimension;
        if coefficients.len() != expected {
            return Err(ConversionError::CoefficientCountMismatch { expected, found: coefficients.len() });
        }
        Ok(Self::new(MatD::from_column_slice(dimension, degree + 1, coefficients), interval))
    }

    /// Places the segment on `[s0, s1]` of the assembled curve.
    pub fn with_mapping(mut self, s0: f64, s1: f64) -> Self {
        self.mapped = Some((s0, s1));
        self
    }

    pub fn degree(&self) -> usize {
        self.coefficients.ncols().saturating_sub(1)
    }

    pub fn dimension(&self) -> usize {
        self.coefficients.nrows()
    }

    /// Interval the segment occupies in the assembled curve.
    pub fn target_interval(&self) -> (f64, f64) {
        self.mapped.unwrap_or(self.interval)
    }

    /// Evaluates the segment at its local parameter `t`.
    pub fn evaluate(&self, t: f64) -> VecD {
        polynomial::evaluate(&self.coefficients, t)
    }

    /// `k`-th derivative with respect to the local parameter.
    pub fn evaluate_derivative(&self, t: f64, k: usize) -> VecD {
        polynomial::evaluate_derivatives(&self.coefficients, t, k).column(k).clone_owned()
    }

    /// Bernstein poles of degree `degree` over the segment's interval.
    pub(crate) fn bezier_poles(&self, degree: usize) -> Result<MatD, ConversionError> {
        let (t0, t1) = self.interval;
        let local = polynomial::trim(&self.coefficients, t0, t1);
        polynomial::to_bernstein(&local, degree).map_err(|err| ConversionError::PolynomialError { err })
    }
}
