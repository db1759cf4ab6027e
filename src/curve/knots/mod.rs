//! Implements the flat knot vector defining the [spline basis functions][crate::basis::bspline].
//!
//! A B-spline of degree `p` with `n` poles is parametrized by `n+p+1` knots in ascending order.
//! The knots can equally be given as distinct values with multiplicities, which is the form
//! consumers usually store:
//!
//! ```text
//! flat knots      0 0 0 1 2 2 2
//! distinct knots  0     1 2
//! multiplicities  3     1 3
//! ```
//!
//! The interval `[U_p, U_n]` is called 'domain'. A multiplicity `m` at an internal knot leaves
//! the curve `p-m` times continuously differentiable there.

use thiserror::Error;

use crate::types::{VecD, MAX_DEGREE};

#[derive(Debug, Clone, PartialEq)]
pub struct Knots {
    pub(crate) flat: VecD,
    pub(crate) p: usize,
}

#[derive(Error, Debug, PartialEq)]
pub enum KnotError {
    #[error("Parameter `u = {u}` lies outside the interval `[{lower_bound}, {upper_bound}]`.")]
    ParameterOutOfBounds { u: f64, lower_bound: f64, upper_bound: f64 },

    #[error("Knot `{index}` with value `{value}` is smaller than its predecessor.")]
    Unsorted { index: usize, value: f64 },

    #[error("A degree `p = {p}` spline needs at least `{required}` knots, got `{found}`.")]
    TooFewKnots { p: usize, required: usize, found: usize },

    #[error("The domain `[{lower_bound}, {upper_bound}]` of the knot vector is empty.")]
    EmptyDomain { lower_bound: f64, upper_bound: f64 },

    #[error(
        "Knot `u = {u}` has a multiplicity of `m = {m}`, \
        which exceeds `p + 1` for the spline degree `p = {p}`."
    )]
    MultiplicityTooHigh { u: f64, m: usize, p: usize },

    #[error("Knot `u = {u}` has a multiplicity of zero.")]
    ZeroMultiplicity { u: f64 },

    #[error("`{knots}` distinct knots were given with `{multiplicities}` multiplicities.")]
    LengthMismatch { knots: usize, multiplicities: usize },

    #[error("Degree `p = {p}` exceeds the supported maximum `{limit}`.")]
    DegreeTooHigh { p: usize, limit: usize },

    #[error("The number of polynomial segments `n = {n}` must be at least one.")]
    NoSegments { n: usize },
}

impl Knots {
    /// Creates a knot vector from its flat representation.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::dvector;
    /// use polyspline::curve::knots::Knots;
    ///
    /// let knots = Knots::new(2, dvector![0., 0., 0., 1., 2., 2., 2.]).unwrap();
    /// assert_eq!(knots.nb_poles(), 4);
    /// assert_eq!(knots.distinct(), vec![0., 1., 2.]);
    /// assert_eq!(knots.multiplicities(), vec![3, 1, 3]);
    /// ```
    pub fn new(degree: usize, flat: VecD) -> Result<Self, KnotError> {
        let p = degree;
        if p > MAX_DEGREE {
            return Err(KnotError::DegreeTooHigh { p, limit: MAX_DEGREE });
        }

        let required = 2 * (p + 1);
        if flat.len() < required {
            return Err(KnotError::TooFewKnots { p, required, found: flat.len() });
        }

        if let Some(index) = (1..flat.len()).find(|&i| flat[i] < flat[i - 1]) {
            return Err(KnotError::Unsorted { index, value: flat[index] });
        }

        let n = flat.len() - p - 1;
        if flat[p] >= flat[n] {
            return Err(KnotError::EmptyDomain { lower_bound: flat[p], upper_bound: flat[n] });
        }

        let knots = Knots { flat, p };
        for (u, m) in knots.distinct().into_iter().zip(knots.multiplicities()) {
            if m > p + 1 {
                return Err(KnotError::MultiplicityTooHigh { u, m, p });
            }
        }
        Ok(knots)
    }

    /// Expands distinct knots and their multiplicities into a flat knot vector.
    pub fn from_multiplicities(degree: usize, knots: &[f64], multiplicities: &[usize]) -> Result<Self, KnotError> {
        if knots.len() != multiplicities.len() {
            return Err(KnotError::LengthMismatch { knots: knots.len(), multiplicities: multiplicities.len() });
        }

        if let Some(index) = (1..knots.len()).find(|&i| knots[i] <= knots[i - 1]) {
            return Err(KnotError::Unsorted { index, value: knots[index] });
        }

        if let Some((&u, _)) = knots.iter().zip(multiplicities).find(|&(_, &m)| m == 0) {
            return Err(KnotError::ZeroMultiplicity { u });
        }

        let flat: Vec<f64> =
            knots.iter().zip(multiplicities).flat_map(|(&u, &m)| std::iter::repeat(u).take(m)).collect();

        Knots::new(degree, VecD::from_vec(flat))
    }

    pub fn flat(&self) -> &VecD {
        &self.flat
    }

    pub fn degree(&self) -> usize {
        self.p
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// Number of poles `n = len - p - 1` the knot vector supports.
    pub fn nb_poles(&self) -> usize {
        self.flat.len() - self.p - 1
    }

    /// Number of distinct knot values.
    pub fn nb_knots(&self) -> usize {
        self.distinct().len()
    }

    pub fn distinct(&self) -> Vec<f64> {
        let mut knots: Vec<f64> = Vec::with_capacity(self.flat.len());
        for &u in self.flat.iter() {
            if knots.last() != Some(&u) {
                knots.push(u);
            }
        }
        knots
    }

    pub fn multiplicities(&self) -> Vec<usize> {
        let U = &self.flat;
        let mut multiplicities: Vec<usize> = Vec::with_capacity(U.len());
        for i in 0..U.len() {
            match multiplicities.last_mut() {
                Some(m) if U[i - 1] == U[i] => *m += 1,
                _ => multiplicities.push(1),
            }
        }
        multiplicities
    }

    pub fn multiplicity(&self, u: f64) -> usize {
        self.flat.iter().filter(|&&x| x == u).count()
    }

    /// Returns the parameter interval `[U_p, U_n]` the spline is defined on.
    pub fn domain(&self) -> (f64, f64) {
        (self.flat[self.p], self.flat[self.nb_poles()])
    }

    pub fn contains(&self, u: f64) -> bool {
        let (lower, upper) = self.domain();
        (lower..=upper).contains(&u)
    }

    pub fn check_parameter(&self, u: f64) -> Result<(), KnotError> {
        let (lower_bound, upper_bound) = self.domain();
        if !self.contains(u) {
            return Err(KnotError::ParameterOutOfBounds { u, lower_bound, upper_bound });
        }
        Ok(())
    }

    pub fn is_clamped(&self) -> bool {
        let clamp_size = self.p + 1;
        let (lower, upper) = self.domain();

        let is_head_clamped = self.flat.iter().take(clamp_size).all(|&u| u == lower);
        let is_tail_clamped = self.flat.iter().rev().take(clamp_size).all(|&u| u == upper);

        is_head_clamped && is_tail_clamped
    }

    pub fn find_span(&self, u: f64) -> usize {
        find_span(self.flat.as_slice(), self.p, u)
    }

    /// Schoenberg (Greville) abscissae, one per pole.
    ///
    /// For `p = 0` the midpoint of each span is returned instead of the empty average.
    pub fn schoenberg_points(&self) -> VecD {
        let p = self.p;
        let U = &self.flat;

        VecD::from_fn(self.nb_poles(), |i, _| {
            if p == 0 {
                0.5 * (U[i] + U[i + 1])
            } else {
                U.rows(i + 1, p).sum() / p as f64
            }
        })
    }

    /// Returns a copy with `u` inserted once, keeping the vector sorted.
    pub(crate) fn inserted(&self, u: f64) -> Knots {
        let position = self.flat.iter().take_while(|&&x| x <= u).count();
        Knots { flat: self.flat.clone().insert_row(position, u), p: self.p }
    }
}

/// Returns the clamped uniform knot vector of degree `degree` with `segments` polynomial
/// segments on `[0, 1]`.
pub fn uniform(degree: usize, segments: usize) -> Result<Knots, KnotError> {
    if segments == 0 {
        return Err(KnotError::NoSegments { n: segments });
    }
    let p = degree;
    let mut U = VecD::zeros(segments + 2 * p + 1);

    for i in 1..segments {
        U[p + i] = i as f64 / segments as f64;
    }
    for i in 0..=p {
        U[segments + p + i] = 1.0;
    }

    Knots::new(p, U)
}

/// Returns the index `k ∈ [p, n-1]` of the span `[U_k, U_{k+1})` containing `u`.
///
/// The largest `k` with `U_k <= u` is chosen, so the span is never empty. The upper domain end
/// belongs to the last span. Parameters outside the domain are clamped to the first or last span.
pub fn find_span(U: &[f64], p: usize, u: f64) -> usize {
    let n = U.len() - p - 1;

    let mut low = p;
    let mut high = n - 1;

    while low < high {
        let mid = high - (high - low) / 2;

        if U[mid] > u {
            high = mid - 1;
        } else {
            low = mid;
        }
    }
    high
}

/// Same contract as [find_span] but searches forward from `start`.
///
/// `u` must not be smaller than the parameter that produced `start`; callers evaluating
/// ascending parameter sequences pay amortized constant time per lookup.
pub fn hunt_span(U: &[f64], p: usize, u: f64, start: usize) -> usize {
    let n = U.len() - p - 1;

    let mut k = start.clamp(p, n - 1);
    while k + 1 < n && U[k + 1] <= u {
        k += 1;
    }
    k
}

#[cfg(test)]
mod tests {
    use nalgebra::dvector;
    use rstest::rstest;

    use super::*;

    const SEGMENTS: usize = 4;

    fn knots_example(degree: usize) -> Knots {
        uniform(degree, SEGMENTS).unwrap()
    }

    #[rstest(degree, expected, case(1, 5), case(2, 6), case(3, 7))]
    fn nb_poles(degree: usize, expected: usize) {
        assert_eq!(knots_example(degree).nb_poles(), expected);
    }

    #[test]
    fn uniform_degree_2() {
        assert_eq!(knots_example(2).flat(), &dvector![0., 0., 0., 0.25, 0.5, 0.75, 1., 1., 1.]);
    }

    #[test]
    fn uniform_without_segments() {
        assert_eq!(uniform(2, 0), Err(KnotError::NoSegments { n: 0 }));
    }

    #[test]
    fn distinct_and_multiplicities() {
        let knots = Knots::new(2, dvector![0., 0., 0., 0.25, 0.5, 0.5, 0.75, 1., 1., 1.]).unwrap();

        assert_eq!(knots.distinct(), vec![0., 0.25, 0.5, 0.75, 1.]);
        assert_eq!(knots.multiplicities(), vec![3, 1, 2, 1, 3]);
        assert_eq!(knots.nb_knots(), 5);
    }

    #[test]
    fn knot_count_invariant() {
        let knots = Knots::from_multiplicities(3, &[0., 0.5, 1.], &[4, 2, 4]).unwrap();
        let sum: usize = knots.multiplicities().iter().sum();

        assert_eq!(sum, knots.nb_poles() + knots.degree() + 1);
        assert_eq!(knots.nb_poles(), 6);
    }

    #[test]
    fn multiplicity() {
        let knots = Knots::new(2, dvector![0., 0., 0., 0.25, 0.5, 0.5, 0.75, 1., 1., 1.]).unwrap();

        assert_eq!(knots.multiplicity(0.2), 0);
        assert_eq!(knots.multiplicity(0.25), 1);
        assert_eq!(knots.multiplicity(0.5), 2);
        assert_eq!(knots.multiplicity(0.), 3);
    }

    #[test]
    fn unsorted() {
        assert_eq!(
            Knots::new(1, dvector![0.0, 1.0, 0.5, 1.0, 1.0]),
            Err(KnotError::Unsorted { index: 2, value: 0.5 })
        );
    }

    #[test]
    fn too_few_knots() {
        assert_eq!(
            Knots::new(2, dvector![0., 0., 1., 1.]),
            Err(KnotError::TooFewKnots { p: 2, required: 6, found: 4 })
        );
    }

    #[test]
    fn empty_domain() {
        assert_eq!(
            Knots::new(1, dvector![0., 1., 1., 1.]),
            Err(KnotError::EmptyDomain { lower_bound: 1.0, upper_bound: 1.0 })
        );
    }

    #[test]
    fn multiplicity_too_high() {
        assert_eq!(
            Knots::new(1, dvector![0., 0., 0.5, 0.5, 0.5, 1., 1.]),
            Err(KnotError::MultiplicityTooHigh { u: 0.5, m: 3, p: 1 })
        );
    }

    #[test]
    fn from_multiplicities_length_mismatch() {
        assert_eq!(
            Knots::from_multiplicities(1, &[0., 1.], &[2, 1, 2]),
            Err(KnotError::LengthMismatch { knots: 2, multiplicities: 3 })
        );
    }

    #[test]
    fn from_multiplicities_zero() {
        assert_eq!(Knots::from_multiplicities(1, &[0., 0.5, 1.], &[2, 0, 2]), Err(KnotError::ZeroMultiplicity { u: 0.5 }));
    }

    #[test]
    fn domain_and_clamping() {
        let knots = Knots::from_multiplicities(2, &[1., 2., 3.], &[3, 1, 3]).unwrap();
        assert_eq!(knots.domain(), (1., 3.));
        assert!(knots.is_clamped());

        let unclamped = Knots::new(1, dvector![0., 1., 2., 3.]).unwrap();
        assert_eq!(unclamped.domain(), (1., 2.));
        assert!(!unclamped.is_clamped());
    }

    #[test]
    fn check_parameter() {
        let knots = knots_example(2);
        assert_eq!(knots.check_parameter(1.0), Ok(()));
        assert_eq!(
            knots.check_parameter(1.1),
            Err(KnotError::ParameterOutOfBounds { u: 1.1, lower_bound: 0.0, upper_bound: 1.0 })
        );
    }

    #[rstest(u, expected, case(0.0, 1), case(0.24, 1), case(0.25, 2), case(0.26, 2), case(0.75, 4), case(1.0, 4))]
    fn find_span_degree_1(u: f64, expected: usize) {
        assert_eq!(knots_example(1).find_span(u), expected);
    }

    #[test]
    fn find_span_repeated_knot_picks_non_empty_span() {
        let knots = Knots::new(2, dvector![0., 0., 0., 0.5, 0.5, 1., 1., 1.]).unwrap();
        assert_eq!(knots.find_span(0.5), 4);
        assert_eq!(knots.find_span(0.49), 2);
        assert_eq!(knots.find_span(1.0), 4);
    }

    #[test]
    fn hunt_span_agrees_with_bisection() {
        let knots = Knots::from_multiplicities(3, &[0., 0.1, 0.4, 0.7, 1.], &[4, 1, 2, 3, 4]).unwrap();
        let U = knots.flat().as_slice();

        let mut span = 0;
        for i in 0..=100 {
            let u = i as f64 / 100.0;
            span = hunt_span(U, 3, u, span);
            assert_eq!(span, find_span(U, 3, u), "u = {}", u);
        }
    }

    #[test]
    fn schoenberg_points() {
        let knots = Knots::from_multiplicities(2, &[0., 1., 2.], &[3, 1, 3]).unwrap();
        assert_eq!(knots.schoenberg_points(), dvector![0., 0.5, 1.5, 2.]);
    }

    #[test]
    fn inserted() {
        let knots = knots_example(1).inserted(0.5);
        assert_eq!(knots.flat(), &dvector![0., 0., 0.25, 0.5, 0.5, 0.75, 1., 1.]);
    }
}
