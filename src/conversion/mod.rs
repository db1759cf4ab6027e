//! Converts piecewise polynomials into a single B-spline.
//!
//! Given `N` [polynomial segments][PolynomialSegment] and the continuity wanted at each of
//! the `N-1` junctions, [PolynomialToBSpline] builds the equivalent B-spline of degree
//! `p = max(segment degrees)`. The knots are the segment breakpoints with multiplicity `p+1`
//! at both ends and `p - k` at a junction of continuity `C^k`.
//!
//! Each pole is the blossom (polar form) of the polynomial pieces under its support, evaluated
//! at the pole's `p` interior knots. For pieces that really join with the requested continuity
//! every supporting piece yields the same value. Independently fitted pieces generally do not,
//! so each pole is the mean of the estimates of all supporting pieces; the largest deviation
//! from that mean is kept as [junction defect][PolynomialToBSpline::junction_defect].

use thiserror::Error;

use crate::{
    curve::{
        knots::{KnotError, Knots},
        points::ControlPoints,
        Curve, CurveError,
    },
    polynomial::PolynomialError,
    types::{max_abs_diff, parametric_resolution, MatD, VecD, MAX_DEGREE},
};

pub use segment::PolynomialSegment;

mod segment;

/// Deviations of the blended poles above this are reported.
const JUNCTION_DEFECT_WARNING: f64 = 1e-7;

/// Continuity required at the junctions between consecutive segments.
///
/// `-1` leaves a junction discontinuous, `k >= 0` requests `C^k`.
#[derive(Debug, Clone, PartialEq)]
pub enum Smoothness {
    Uniform(i32),
    PerJunction(Vec<i32>),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConversionError {
    #[error("Segment `{segment}` has dimension `{found}`, expected `{expected}`.")]
    DimensionMismatch { segment: usize, expected: usize, found: usize },

    #[error("`{found}` continuities were given for `{expected}` junctions.")]
    SmoothnessCountMismatch { expected: usize, found: usize },

    #[error(
        "Continuity `C^{continuity}` at junction `{junction}` cannot be represented by a \
        spline of degree `p = {degree}`."
    )]
    ContinuityTooHigh { junction: usize, continuity: i32, degree: usize },

    #[error("Degree `p = {p}` exceeds the supported maximum `{limit}`.")]
    DegreeTooHigh { p: usize, limit: usize },

    #[error("Segment `{segment}` starts at `{start}`, but its predecessor ends at `{end}`.")]
    DisjointIntervals { segment: usize, end: f64, start: f64 },

    #[error("Expected `{expected}` polynomial coefficients, got `{found}`.")]
    CoefficientCountMismatch { expected: usize, found: usize },

    #[error("Knot vector construction failed with error {err}.")]
    KnotError { err: KnotError },

    #[error("The conversion did not succeed, no B-spline is available.")]
    NotDone,

    #[error("Polynomial conversion failed with error {err}.")]
    PolynomialError { err: PolynomialError },

    #[error("Curve construction failed with error {err}.")]
    CurveError { err: CurveError },
}

#[derive(Debug, Clone, PartialEq)]
struct Converted {
    knots: Knots,
    poles: MatD,
    junction_defect: f64,
}

/// The B-spline equivalent of a sequence of polynomial segments.
///
/// Contract violations are rejected by the constructors. Degenerate input such as an empty
/// segment list or an interval of zero length yields a conversion that is not
/// [done][PolynomialToBSpline::is_done], whose data accessors return
/// [ConversionError::NotDone].
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialToBSpline {
    result: Option<Converted>,
}

impl PolynomialToBSpline {
    /// Converts with the same continuity `k` at every junction.
    ///
    /// # Examples
    /// ```
    /// use nalgebra::dmatrix;
    /// use polyspline::conversion::{PolynomialSegment, PolynomialToBSpline};
    ///
    /// let segments = [
    ///     PolynomialSegment::new(dmatrix![0.0, 1.0], (0.0, 1.0)),
    ///     PolynomialSegment::new(dmatrix![0.5, 0.5], (1.0, 2.0)),
    /// ];
    /// let conversion = PolynomialToBSpline::uniform(&segments, 0).unwrap();
    ///
    /// assert!(conversion.is_done());
    /// assert_eq!(conversion.poles().unwrap(), &dmatrix![0.0, 1.0, 1.5]);
    /// assert_eq!(conversion.knots().unwrap(), vec![0.0, 1.0, 2.0]);
    /// assert_eq!(conversion.multiplicities().unwrap(), vec![2, 1, 2]);
    /// ```
    pub fn uniform(segments: &[PolynomialSegment], continuity: i32) -> Result<Self, ConversionError> {
        Self::new(segments, &Smoothness::Uniform(continuity), None)
    }

    /// Converts with continuity `continuities[j]` between segments `j` and `j+1`.
    pub fn per_junction(segments: &[PolynomialSegment], continuities: &[i32]) -> Result<Self, ConversionError> {
        Self::new(segments, &Smoothness::PerJunction(continuities.to_vec()), None)
    }

    /// Converts a single segment into a Bézier curve.
    pub fn single(segment: &PolynomialSegment) -> Result<Self, ConversionError> {
        Self::new(std::slice::from_ref(segment), &Smoothness::PerJunction(Vec::new()), None)
    }

    /// Converts with a caller chosen degree, which must not be lower than any segment degree.
    pub fn with_degree(
        segments: &[PolynomialSegment],
        smoothness: &Smoothness,
        degree: usize,
    ) -> Result<Self, ConversionError> {
        Self::new(segments, smoothness, Some(degree))
    }

    fn new(
        segments: &[PolynomialSegment],
        smoothness: &Smoothness,
        degree: Option<usize>,
    ) -> Result<Self, ConversionError> {
        let not_done = Self { result: None };

        if segments.is_empty() || segments.iter().any(|s| s.coefficients.ncols() == 0) {
            log::debug!("polynomial conversion skipped: empty input");
            return Ok(not_done);
        }

        let dimension = segments[0].dimension();
        if let Some((segment, s)) = segments.iter().enumerate().find(|(_, s)| s.dimension() != dimension) {
            return Err(ConversionError::DimensionMismatch { segment, expected: dimension, found: s.dimension() });
        }

        let max_segment_degree = segments.iter().map(PolynomialSegment::degree).max().unwrap_or(0);
        let p = degree.unwrap_or(max_segment_degree);
        if p < max_segment_degree {
            return Err(ConversionError::PolynomialError {
                err: PolynomialError::DegreeTooLow { degree: p, required: max_segment_degree },
            });
        }
        if p > MAX_DEGREE {
            return Err(ConversionError::DegreeTooHigh { p, limit: MAX_DEGREE });
        }

        let continuities = junction_continuities(smoothness, segments.len())?;
        if let Some((junction, &continuity)) =
            continuities.iter().enumerate().find(|&(_, &k)| k < -1 || k >= p as i32)
        {
            return Err(ConversionError::ContinuityTooHigh { junction, continuity, degree: p });
        }

        let breakpoints = match collect_breakpoints(segments)? {
            Some(breakpoints) => breakpoints,
            None => {
                log::debug!("polynomial conversion skipped: degenerate interval");
                return Ok(not_done);
            }
        };

        let mut multiplicities = Vec::with_capacity(breakpoints.len());
        multiplicities.push(p + 1);
        multiplicities.extend(continuities.iter().map(|&k| (p as i32 - k) as usize));
        multiplicities.push(p + 1);

        let knots = Knots::from_multiplicities(p, &breakpoints, &multiplicities)
            .map_err(|err| ConversionError::KnotError { err })?;

        let bezier: Vec<MatD> = segments.iter().map(|s| s.bezier_poles(p)).collect::<Result<_, _>>()?;

        let (poles, junction_defect) = blend_poles(&knots, &multiplicities, &breakpoints, &bezier, dimension);

        if junction_defect > JUNCTION_DEFECT_WARNING {
            log::warn!(
                "segments disagree by up to {:e} at their junctions, poles were averaged",
                junction_defect
            );
        }
        log::debug!(
            "converted {} segments into a degree {} B-spline with {} poles",
            segments.len(),
            p,
            poles.ncols()
        );

        Ok(Self { result: Some(Converted { knots, poles, junction_defect }) })
    }

    pub fn is_done(&self) -> bool {
        self.result.is_some()
    }

    fn converted(&self) -> Result<&Converted, ConversionError> {
        self.result.as_ref().ok_or(ConversionError::NotDone)
    }

    pub fn nb_poles(&self) -> Result<usize, ConversionError> {
        Ok(self.converted()?.poles.ncols())
    }

    pub fn degree(&self) -> Result<usize, ConversionError> {
        Ok(self.converted()?.knots.degree())
    }

    /// Number of distinct knots.
    pub fn nb_knots(&self) -> Result<usize, ConversionError> {
        Ok(self.converted()?.knots.nb_knots())
    }

    /// Distinct knots, i.e. the segment breakpoints.
    pub fn knots(&self) -> Result<Vec<f64>, ConversionError> {
        Ok(self.converted()?.knots.distinct())
    }

    pub fn multiplicities(&self) -> Result<Vec<usize>, ConversionError> {
        Ok(self.converted()?.knots.multiplicities())
    }

    pub fn flat_knots(&self) -> Result<&VecD, ConversionError> {
        Ok(self.converted()?.knots.flat())
    }

    /// Poles as `dimension x nb_poles` matrix.
    pub fn poles(&self) -> Result<&MatD, ConversionError> {
        Ok(&self.converted()?.poles)
    }

    /// Largest deviation of a supporting piece's estimate from its blended pole.
    ///
    /// Zero up to rounding when the segments satisfy the requested continuity.
    pub fn junction_defect(&self) -> Result<f64, ConversionError> {
        Ok(self.converted()?.junction_defect)
    }

    pub fn curve(&self) -> Result<Curve, ConversionError> {
        let converted = self.converted()?;
        Curve::new(converted.knots.clone(), ControlPoints::new(converted.poles.clone()))
            .map_err(|err| ConversionError::CurveError { err })
    }

    pub fn into_curve(self) -> Result<Curve, ConversionError> {
        let converted = self.result.ok_or(ConversionError::NotDone)?;
        Curve::new(converted.knots, ControlPoints::new(converted.poles)).map_err(|err| ConversionError::CurveError { err })
    }
}

fn junction_continuities(smoothness: &Smoothness, nb_segments: usize) -> Result<Vec<i32>, ConversionError> {
    let expected = nb_segments - 1;
    match smoothness {
        Smoothness::Uniform(k) => Ok(vec![*k; expected]),
        Smoothness::PerJunction(ks) if ks.len() == expected => Ok(ks.clone()),
        Smoothness::PerJunction(ks) => Err(ConversionError::SmoothnessCountMismatch { expected, found: ks.len() }),
    }
}

/// Collects the `N+1` breakpoints of the assembled curve.
///
/// Returns `None` if a local or target interval is empty or reversed.
fn collect_breakpoints(segments: &[PolynomialSegment]) -> Result<Option<Vec<f64>>, ConversionError> {
    let mut breakpoints = Vec::with_capacity(segments.len() + 1);

    for (segment, s) in segments.iter().enumerate() {
        let (t0, t1) = s.interval;
        let (s0, s1) = s.target_interval();
        if !(t1 - t0 > parametric_resolution(t0, t1)) || !(s1 - s0 > parametric_resolution(s0, s1)) {
            return Ok(None);
        }

        match breakpoints.last() {
            None => breakpoints.push(s0),
            Some(&end) if (s0 - end).abs() > parametric_resolution(end, s0) => {
                return Err(ConversionError::DisjointIntervals { segment, end, start: s0 });
            }
            Some(_) => {}
        }
        breakpoints.push(s1);
    }
    Ok(Some(breakpoints))
}

/// Computes every pole as the mean blossom of the supporting pieces.
///
/// Returns the poles and the largest deviation of a single estimate from its mean.
fn blend_poles(
    knots: &Knots,
    multiplicities: &[usize],
    breakpoints: &[f64],
    bezier: &[MatD],
    dimension: usize,
) -> (MatD, f64) {
    let p = knots.degree();
    let T = knots.flat();
    let n = knots.nb_poles();

    // the non-empty span `[T_j, T_{j+1})` starting at the last copy of breakpoint `m` belongs to segment `m`
    let mut owner: Vec<Option<usize>> = vec![None; T.len()];
    let mut last = 0;
    for (m, &multiplicity) in multiplicities.iter().enumerate().take(bezier.len()) {
        last += multiplicity;
        owner[last - 1] = Some(m);
    }

    let mut poles = MatD::zeros(dimension, n);
    let mut defect: f64 = 0.0;

    for i in 0..n {
        let arguments = T.rows(i + 1, p);

        let estimates: Vec<VecD> = (i.max(p)..=(i + p).min(n - 1))
            .filter_map(|j| owner[j])
            .map(|m| {
                let (a, b) = (breakpoints[m], breakpoints[m + 1]);
                let x: Vec<f64> = arguments.iter().map(|&u| (u - a) / (b - a)).collect();
                blossom(&bezier[m], &x)
            })
            .collect();

        if estimates.is_empty() {
            continue;
        }

        let mean = estimates.iter().fold(VecD::zeros(dimension), |acc, e| acc + e) / estimates.len() as f64;
        for estimate in estimates.iter() {
            defect = defect.max(max_abs_diff(estimate, &mean));
        }
        poles.set_column(i, &mean);
    }
    (poles, defect)
}

/// Evaluates the blossom of a Bézier piece at the arguments `x` (one per degree).
///
/// De Casteljau's algorithm with a separate parameter per level.
fn blossom(poles: &MatD, x: &[f64]) -> VecD {
    let mut work = poles.clone();
    let p = poles.ncols() - 1;

    for (level, &t) in x.iter().enumerate() {
        for j in 0..p - level {
            let column = (1.0 - t) * work.column(j) + t * work.column(j + 1);
            work.set_column(j, &column);
        }
    }
    work.column(0).clone_owned()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};
    use rstest::rstest;

    use crate::polynomial;

    use super::*;

    fn line_segments() -> Vec<PolynomialSegment> {
        vec![
            PolynomialSegment::new(dmatrix![0.0, 1.0], (0.0, 1.0)),
            PolynomialSegment::new(dmatrix![0.5, 0.5], (1.0, 2.0)),
        ]
    }

    /// `t^2` on `[0,1]` followed by `-t^2 + 4t - 2` on `[1,2]`, joined with `C^1`.
    fn quadratic_segments() -> Vec<PolynomialSegment> {
        vec![
            PolynomialSegment::new(dmatrix![0.0, 0.0, 1.0], (0.0, 1.0)),
            PolynomialSegment::new(dmatrix![-2.0, 4.0, -1.0], (1.0, 2.0)),
        ]
    }

    fn check_knot_count(conversion: &PolynomialToBSpline) {
        let total: usize = conversion.multiplicities().unwrap().iter().sum();
        assert_eq!(total, conversion.nb_poles().unwrap() + conversion.degree().unwrap() + 1);
    }

    #[test]
    fn linear_c0() {
        let conversion = PolynomialToBSpline::uniform(&line_segments(), 0).unwrap();

        assert!(conversion.is_done());
        assert_eq!(conversion.degree(), Ok(1));
        assert_eq!(conversion.nb_poles(), Ok(3));
        assert_eq!(conversion.nb_knots(), Ok(3));
        assert_eq!(conversion.knots(), Ok(vec![0.0, 1.0, 2.0]));
        assert_eq!(conversion.multiplicities(), Ok(vec![2, 1, 2]));
        assert_eq!(conversion.flat_knots().unwrap(), &dvector![0.0, 0.0, 1.0, 2.0, 2.0]);
        assert_relative_eq!(conversion.poles().unwrap(), &dmatrix![0.0, 1.0, 1.5], epsilon = 1e-15);
        check_knot_count(&conversion);
    }

    #[test]
    fn constant_segment() {
        let segment = PolynomialSegment::new(dmatrix![4.0; -1.0], (0.0, 3.0));
        let conversion = PolynomialToBSpline::single(&segment).unwrap();

        assert_eq!(conversion.degree(), Ok(0));
        assert_eq!(conversion.nb_poles(), Ok(1));
        assert_eq!(conversion.poles().unwrap(), &dmatrix![4.0; -1.0]);
        check_knot_count(&conversion);
    }

    #[test]
    fn single_segment_is_bezier() {
        // t^2 on [1, 3]
        let segment = PolynomialSegment::new(dmatrix![0.0, 0.0, 1.0], (1.0, 3.0));
        let conversion = PolynomialToBSpline::single(&segment).unwrap();

        assert_eq!(conversion.multiplicities(), Ok(vec![3, 3]));
        assert_relative_eq!(conversion.poles().unwrap(), &dmatrix![1.0, 3.0, 9.0], epsilon = 1e-14);
    }

    #[test]
    fn quadratic_c1_round_trip() {
        let segments = quadratic_segments();
        let conversion = PolynomialToBSpline::uniform(&segments, 1).unwrap();
        let curve = conversion.curve().unwrap();

        assert_eq!(conversion.multiplicities(), Ok(vec![3, 1, 3]));
        assert_relative_eq!(conversion.junction_defect().unwrap(), 0.0, epsilon = 1e-14);

        for segment in segments.iter() {
            assert_relative_eq!(curve.evaluate(1.0).unwrap(), segment.evaluate(1.0), epsilon = 1e-9);
            assert_relative_eq!(curve.evaluate_derivative(1.0, 1).unwrap(), segment.evaluate_derivative(1.0, 1), epsilon = 1e-9);
        }
        for &t in [0.0, 0.25, 0.75].iter() {
            assert_relative_eq!(curve.evaluate(t).unwrap(), segments[0].evaluate(t), epsilon = 1e-12);
            assert_relative_eq!(curve.evaluate(t + 1.0).unwrap(), segments[1].evaluate(t + 1.0), epsilon = 1e-12);
        }
        check_knot_count(&conversion);
    }

    #[test]
    fn per_junction_reproduces_cubic() {
        // the same cubic on three consecutive intervals
        let cubic = dmatrix![1.0, -2.0, 0.0, 1.0; 0.0, 1.0, 1.0, 0.0];
        let segments: Vec<_> =
            (0..3).map(|m| PolynomialSegment::new(cubic.clone(), (m as f64, m as f64 + 1.0))).collect();

        let conversion = PolynomialToBSpline::per_junction(&segments, &[2, 1]).unwrap();
        assert_eq!(conversion.multiplicities(), Ok(vec![4, 1, 2, 4]));
        assert_eq!(conversion.nb_poles(), Ok(7));
        assert_relative_eq!(conversion.junction_defect().unwrap(), 0.0, epsilon = 1e-12);

        let curve = conversion.into_curve().unwrap();
        for &u in [0.0, 0.4, 1.0, 1.7, 2.0, 2.5, 3.0].iter() {
            assert_relative_eq!(curve.evaluate(u).unwrap(), polynomial::evaluate(&cubic, u), epsilon = 1e-12);
        }
    }

    #[test]
    fn agrees_with_interpolation() {
        use crate::curve::{
            interpolation::interpolate,
            knots::uniform,
            points::{DataPoints, Points},
        };

        let knots = uniform(3, 3).unwrap();
        let params = knots.schoenberg_points();
        let data = DataPoints::new(MatD::from_fn(2, params.len(), |r, j| {
            if r == 0 {
                (3.0 * params[j]).sin()
            } else {
                params[j] * params[j] - 1.0
            }
        }));
        let interpolated = interpolate(&knots, params.as_slice(), &data).unwrap();

        // Taylor expansion of every span at its left end, in the local variable `u - a`
        let breakpoints = knots.distinct();
        let segments: Vec<_> = breakpoints
            .windows(2)
            .map(|w| {
                let coefficients = MatD::from_fn(2, 4, |r, j| {
                    let factorial: f64 = (1..=j).map(|i| i as f64).product();
                    interpolated.evaluate_derivative(w[0], j).unwrap()[r] / factorial
                });
                PolynomialSegment::new(coefficients, (0.0, w[1] - w[0])).with_mapping(w[0], w[1])
            })
            .collect();

        let conversion = PolynomialToBSpline::uniform(&segments, 2).unwrap();

        assert_relative_eq!(conversion.flat_knots().unwrap(), knots.flat(), epsilon = 1e-12);
        assert_relative_eq!(conversion.poles().unwrap(), interpolated.points.matrix(), epsilon = 1e-9);
        assert!(conversion.junction_defect().unwrap() < 1e-9);
    }

    #[test]
    fn mapped_intervals() {
        // x on [-1, 1] placed onto [2, 4], then 1 + 2x on [0, 1] placed onto [4, 5]
        let segments = [
            PolynomialSegment::new(dmatrix![0.0, 1.0], (-1.0, 1.0)).with_mapping(2.0, 4.0),
            PolynomialSegment::new(dmatrix![1.0, 2.0], (0.0, 1.0)).with_mapping(4.0, 5.0),
        ];
        let conversion = PolynomialToBSpline::uniform(&segments, 0).unwrap();

        assert_eq!(conversion.knots(), Ok(vec![2.0, 4.0, 5.0]));
        assert_relative_eq!(conversion.poles().unwrap(), &dmatrix![-1.0, 1.0, 3.0], epsilon = 1e-14);

        let curve = conversion.curve().unwrap();
        assert_relative_eq!(curve.evaluate(3.0).unwrap(), dvector![0.0], epsilon = 1e-14);
        assert_relative_eq!(curve.evaluate(4.5).unwrap(), dvector![2.0], epsilon = 1e-14);
    }

    #[test]
    fn degree_elevation() {
        // a line followed by a parabola, joined with C^0
        let segments = [
            PolynomialSegment::new(dmatrix![0.0, 1.0], (0.0, 1.0)),
            PolynomialSegment::new(dmatrix![0.0, 0.0, 1.0], (1.0, 2.0)),
        ];
        let conversion = PolynomialToBSpline::uniform(&segments, 0).unwrap();
        assert_eq!(conversion.degree(), Ok(2));
        assert_eq!(conversion.multiplicities(), Ok(vec![3, 2, 3]));

        let curve = conversion.curve().unwrap();
        assert_relative_eq!(curve.evaluate(0.5).unwrap(), dvector![0.5], epsilon = 1e-14);
        assert_relative_eq!(curve.evaluate(1.5).unwrap(), dvector![2.25], epsilon = 1e-14);
        check_knot_count(&conversion);
    }

    #[test]
    fn requested_degree() {
        let conversion = PolynomialToBSpline::with_degree(&line_segments(), &Smoothness::Uniform(0), 3).unwrap();

        assert_eq!(conversion.degree(), Ok(3));
        assert_eq!(conversion.multiplicities(), Ok(vec![4, 3, 4]));
        let curve = conversion.curve().unwrap();
        assert_relative_eq!(curve.evaluate(1.5).unwrap(), dvector![1.25], epsilon = 1e-14);
    }

    #[test]
    fn discontinuous_junction() {
        let segments = [
            PolynomialSegment::new(dmatrix![0.0, 1.0], (0.0, 1.0)),
            PolynomialSegment::new(dmatrix![5.0, 0.0], (1.0, 2.0)),
        ];
        let conversion = PolynomialToBSpline::uniform(&segments, -1).unwrap();

        assert_eq!(conversion.multiplicities(), Ok(vec![2, 2, 2]));
        assert_relative_eq!(conversion.poles().unwrap(), &dmatrix![0.0, 1.0, 5.0, 5.0], epsilon = 1e-15);
        assert_eq!(conversion.junction_defect(), Ok(0.0));
    }

    #[test]
    fn mismatched_pieces_are_blended() {
        // the pieces miss each other by 0.2 at the junction
        let segments = [
            PolynomialSegment::new(dmatrix![0.0, 1.0], (0.0, 1.0)),
            PolynomialSegment::new(dmatrix![1.2, 0.0], (1.0, 2.0)),
        ];
        let conversion = PolynomialToBSpline::uniform(&segments, 0).unwrap();

        assert_relative_eq!(conversion.poles().unwrap(), &dmatrix![0.0, 1.1, 1.2], epsilon = 1e-14);
        assert_relative_eq!(conversion.junction_defect().unwrap(), 0.1, epsilon = 1e-14);
    }

    #[rstest(continuity, case(-1), case(0), case(1), case(2))]
    fn knot_count_invariant(continuity: i32) {
        let segments: Vec<_> = (0..4)
            .map(|m| PolynomialSegment::new(dmatrix![1.0, 0.5, -0.25, 0.125], (m as f64, m as f64 + 1.0)))
            .collect();
        let conversion = PolynomialToBSpline::uniform(&segments, continuity).unwrap();

        check_knot_count(&conversion);
        assert_eq!(conversion.poles().unwrap().ncols(), conversion.nb_poles().unwrap());
    }

    mod errors {
        use super::*;

        #[test]
        fn empty_input_is_not_done() {
            let conversion = PolynomialToBSpline::uniform(&[], 0).unwrap();

            assert!(!conversion.is_done());
            assert_eq!(conversion.nb_poles(), Err(ConversionError::NotDone));
            assert_eq!(conversion.poles(), Err(ConversionError::NotDone));
            assert_eq!(conversion.into_curve(), Err(ConversionError::NotDone));
        }

        #[test]
        fn zero_length_interval_is_not_done() {
            let segment = PolynomialSegment::new(dmatrix![1.0, 1.0], (0.5, 0.5));
            assert!(!PolynomialToBSpline::single(&segment).unwrap().is_done());

            let mapped = PolynomialSegment::new(dmatrix![1.0, 1.0], (0.0, 1.0)).with_mapping(2.0, 2.0);
            assert!(!PolynomialToBSpline::single(&mapped).unwrap().is_done());
        }

        #[test]
        fn dimension_mismatch() {
            let segments = [
                PolynomialSegment::new(dmatrix![0.0, 1.0], (0.0, 1.0)),
                PolynomialSegment::new(dmatrix![0.0, 1.0; 1.0, 1.0], (1.0, 2.0)),
            ];
            assert_eq!(
                PolynomialToBSpline::uniform(&segments, 0),
                Err(ConversionError::DimensionMismatch { segment: 1, expected: 1, found: 2 })
            );
        }

        #[test]
        fn smoothness_count_mismatch() {
            assert_eq!(
                PolynomialToBSpline::per_junction(&line_segments(), &[0, 0]),
                Err(ConversionError::SmoothnessCountMismatch { expected: 1, found: 2 })
            );
        }

        #[rstest(continuity, case(1), case(2), case(-2))]
        fn continuity_too_high(continuity: i32) {
            assert_eq!(
                PolynomialToBSpline::uniform(&line_segments(), continuity),
                Err(ConversionError::ContinuityTooHigh { junction: 0, continuity, degree: 1 })
            );
        }

        #[test]
        fn disjoint_intervals() {
            let segments = [
                PolynomialSegment::new(dmatrix![0.0, 1.0], (0.0, 1.0)),
                PolynomialSegment::new(dmatrix![0.0, 1.0], (1.5, 2.0)),
            ];
            assert_eq!(
                PolynomialToBSpline::uniform(&segments, 0),
                Err(ConversionError::DisjointIntervals { segment: 1, end: 1.0, start: 1.5 })
            );
        }

        #[test]
        fn requested_degree_too_low() {
            assert_eq!(
                PolynomialToBSpline::with_degree(&quadratic_segments(), &Smoothness::Uniform(0), 1),
                Err(ConversionError::PolynomialError {
                    err: PolynomialError::DegreeTooLow { degree: 1, required: 2 }
                })
            );
        }
    }
}
