//! Approximates a function of one variable by a B-spline curve.
//!
//! On every segment `[a, b]`, mapped to `x ∈ [-1, 1]`, the approximation is
//!
//! `Q(x) = H(x) + (1 - x^2)^α sum_k c_k P_k^(α,α)(x)`,  `α = continuity + 1`
//!
//! where the Hermite part `H` matches the derivatives `0..=continuity` of the function at both
//! segment ends and the Jacobi terms approximate the remainder without disturbing those end
//! conditions. Adjacent segments therefore join with the requested continuity. Trailing
//! Jacobi terms are dropped as long as the sampled error stays within the tolerance, segments
//! that miss the tolerance are halved.

use crate::{
    approximation::{
        check_domain, check_limit, check_tolerance, check_value, sample_points, ApproximationError, Status,
    },
    basis::legendre::{gauss_legendre, jacobi_to_monomial, jacobi_values},
    conversion::{PolynomialSegment, PolynomialToBSpline},
    curve::Curve,
    polynomial::{self, hermite::hermite_coefficients},
    types::{max_abs_diff, parametric_resolution, MatD, VecD, MAX_DEGREE},
};

/// A function of one variable and, optionally, its derivatives.
pub trait CurveEvaluator {
    fn dimension(&self) -> usize;

    /// Returns the `derivative`-th derivative at `t`, or `None` if that order is unavailable.
    fn evaluate(&self, t: f64, derivative: usize) -> Option<VecD>;
}

/// Adapts a closure `t -> value`. Only order zero is available.
pub struct FnCurve<F> {
    dimension: usize,
    f: F,
}

impl<F: Fn(f64) -> VecD> FnCurve<F> {
    pub fn new(dimension: usize, f: F) -> Self {
        FnCurve { dimension, f }
    }
}

impl<F: Fn(f64) -> VecD> CurveEvaluator for FnCurve<F> {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn evaluate(&self, t: f64, derivative: usize) -> Option<VecD> {
        (derivative == 0).then(|| (self.f)(t))
    }
}

impl CurveEvaluator for Curve {
    fn dimension(&self) -> usize {
        Curve::dimension(self)
    }

    fn evaluate(&self, t: f64, derivative: usize) -> Option<VecD> {
        self.evaluate_derivative(t, derivative).ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveConfig {
    pub tolerance: f64,
    /// Continuity at segment junctions, also the derivative order requested from the evaluator.
    pub continuity: usize,
    pub max_degree: usize,
    pub max_segments: usize,
    /// Number of equidistant points per segment the error is measured at.
    pub samples: usize,
}

impl Default for CurveConfig {
    fn default() -> Self {
        CurveConfig { tolerance: 1e-6, continuity: 0, max_degree: 14, max_segments: 64, samples: 33 }
    }
}

#[derive(Debug, Clone)]
pub struct CurveApproximation {
    pub curve: Curve,
    /// The fitted pieces, each placed on its sub-interval of the domain.
    pub segments: Vec<PolynomialSegment>,
    pub max_error: f64,
    pub mean_error: f64,
    pub status: Status,
}

#[derive(Debug, Clone)]
struct SegmentFit {
    segment: PolynomialSegment,
    max_error: f64,
    mean_error: f64,
}

impl SegmentFit {
    fn interval(&self) -> (f64, f64) {
        self.segment.target_interval()
    }
}

/// Approximates `evaluator` on `domain`.
///
/// # Examples
/// ```
/// use nalgebra::dvector;
/// use polyspline::approximation::curve::{approximate, CurveConfig, FnCurve};
///
/// let evaluator = FnCurve::new(1, |t: f64| dvector![t.exp()]);
/// let config = CurveConfig { tolerance: 1e-8, ..CurveConfig::default() };
///
/// let approximation = approximate(&evaluator, (0.0, 1.0), &config).unwrap();
/// assert!(approximation.status.is_converged());
/// assert!((approximation.curve.evaluate(1.0).unwrap()[0] - 1f64.exp()).abs() < 1e-8);
/// ```
pub fn approximate<E: CurveEvaluator + ?Sized>(
    evaluator: &E,
    domain: (f64, f64),
    config: &CurveConfig,
) -> Result<CurveApproximation, ApproximationError> {
    check_config(domain, config)?;
    let fitter = SegmentFitter::new(evaluator, config)?;

    let mut fits = vec![fitter.fit(domain)?];
    let status = loop {
        let worst = fits
            .iter()
            .enumerate()
            .filter(|(_, fit)| fit.max_error > config.tolerance)
            .max_by(|(_, a), (_, b)| a.max_error.total_cmp(&b.max_error))
            .map(|(i, _)| i);

        let i = match worst {
            None => break Status::Converged,
            Some(i) => i,
        };
        let (a, b) = fits[i].interval();
        // both halves must stay assemblable
        if fits.len() >= config.max_segments || b - a <= 4.0 * parametric_resolution(a, b) {
            break Status::LimitReached;
        }

        let middle = 0.5 * (a + b);
        log::trace!("splitting segment [{}, {}] with error {:e}", a, b, fits[i].max_error);
        let right = fitter.fit((middle, b))?;
        fits[i] = fitter.fit((a, middle))?;
        fits.insert(i + 1, right);
    };

    let max_error = fits.iter().map(|fit| fit.max_error).fold(0.0, f64::max);
    let mean_error = fits.iter().map(|fit| fit.mean_error).sum::<f64>() / fits.len() as f64;
    let segments: Vec<PolynomialSegment> = fits.into_iter().map(|fit| fit.segment).collect();

    let curve = PolynomialToBSpline::uniform(&segments, config.continuity as i32)
        .and_then(PolynomialToBSpline::into_curve)
        .map_err(|err| ApproximationError::Conversion { err })?;

    log::debug!(
        "approximated curve with {} segments of degree {}, max error {:e} ({:?})",
        segments.len(),
        curve.degree(),
        max_error,
        status
    );

    Ok(CurveApproximation { curve, segments, max_error, mean_error, status })
}

fn check_config(domain: (f64, f64), config: &CurveConfig) -> Result<(), ApproximationError> {
    check_tolerance(config.tolerance)?;
    check_domain(domain)?;

    if config.max_degree > MAX_DEGREE {
        return Err(ApproximationError::DegreeTooHigh { degree: config.max_degree, limit: MAX_DEGREE });
    }
    let required = 2 * config.continuity + 1;
    if config.max_degree < required {
        return Err(ApproximationError::DegreeTooLow { degree: config.max_degree, required });
    }

    check_limit("max_segments", config.max_segments, 1)?;
    check_limit("samples", config.samples, 2)
}

/// Hermite basis matching derivatives `0..=continuity` at both ends of `[first, last]`.
fn hermite_basis((first, last): (f64, f64), continuity: usize) -> Result<MatD, ApproximationError> {
    hermite_coefficients(first, last, continuity, continuity).ok_or(ApproximationError::HermiteUnavailable {
        first,
        last,
        continuity,
    })
}

/// Per-domain data shared by all segment fits.
struct SegmentFitter<'a, E: ?Sized> {
    evaluator: &'a E,
    config: &'a CurveConfig,
    /// Power-basis coefficients of the Hermite basis on `[-1, 1]`, one row per end condition.
    hermite: MatD,
    /// Power-basis coefficients of `(1 - x^2)^α P_k^(α,α)`, one row per term.
    corrections: MatD,
    nodes: Vec<f64>,
    weights: Vec<f64>,
    /// `∫ (1 - x^2)^α P_k^2`
    norms: Vec<f64>,
    samples: Vec<f64>,
}

impl<'a, E: CurveEvaluator + ?Sized> SegmentFitter<'a, E> {
    fn new(evaluator: &'a E, config: &'a CurveConfig) -> Result<Self, ApproximationError> {
        let c = config.continuity;
        let alpha = c + 1;
        let terms = config.max_degree + 1 - 2 * alpha;

        let hermite = hermite_basis((-1.0, 1.0), c)?;

        let mut weight = vec![1.0];
        for _ in 0..alpha {
            weight = polynomial::multiply(&weight, &[1.0, 0.0, -1.0]);
        }
        let jacobi = jacobi_to_monomial(terms.saturating_sub(1), alpha);
        let mut corrections = MatD::zeros(terms, config.max_degree + 1);
        for k in 0..terms {
            let term = polynomial::multiply(&weight, &jacobi.row(k).iter().take(k + 1).copied().collect::<Vec<_>>());
            for (j, &coefficient) in term.iter().enumerate() {
                corrections[(k, j)] = coefficient;
            }
        }

        let (nodes, weights) = gauss_legendre(config.max_degree + 2);
        let norms = (0..terms)
            .map(|k| {
                nodes
                    .iter()
                    .zip(weights.iter())
                    .map(|(&x, &w)| {
                        let p = jacobi_values(k, alpha, x)[k];
                        w * (1.0 - x * x).powi(alpha as i32) * p * p
                    })
                    .sum()
            })
            .collect();

        Ok(SegmentFitter {
            evaluator,
            config,
            hermite,
            corrections,
            nodes,
            weights,
            norms,
            samples: sample_points(config.samples),
        })
    }

    fn value(&self, t: f64, order: usize) -> Result<VecD, ApproximationError> {
        let value =
            self.evaluator.evaluate(t, order).ok_or(ApproximationError::DerivativeUnavailable { t, order })?;
        check_value(&value, self.evaluator.dimension(), &[t])?;
        Ok(value)
    }

    fn fit(&self, (a, b): (f64, f64)) -> Result<SegmentFit, ApproximationError> {
        let dimension = self.evaluator.dimension();
        let c = self.config.continuity;
        let alpha = c + 1;
        let terms = self.corrections.nrows();

        let middle = 0.5 * (a + b);
        let half = 0.5 * (b - a);
        let at = |x: f64| middle + half * x;

        // Hermite part from the scaled end derivatives d^r/dx^r f(t(x)) = half^r f^(r)(t)
        let mut coefficients = MatD::zeros(dimension, self.config.max_degree + 1);
        let ends = [a, b];
        let mut row = 0;
        for &t in ends.iter() {
            for r in 0..=c {
                let condition = self.value(t, r)? * half.powi(r as i32);
                for j in 0..self.hermite.ncols() {
                    let mut column = coefficients.column_mut(j);
                    column += &condition * self.hermite[(row, j)];
                }
                row += 1;
            }
        }
        let hermite_part = coefficients.clone();

        // Jacobi coefficients of the remainder
        let mut jacobi = MatD::zeros(dimension, terms);
        if terms > 0 {
            for (&x, &w) in self.nodes.iter().zip(self.weights.iter()) {
                let remainder = self.value(at(x), 0)? - polynomial::evaluate(&hermite_part, x);
                let p = jacobi_values(terms - 1, alpha, x);
                for k in 0..terms {
                    let mut column = jacobi.column_mut(k);
                    column += &remainder * (w * p[k]);
                }
            }
            for k in 0..terms {
                let mut column = jacobi.column_mut(k);
                column /= self.norms[k];
            }
        }

        // measure, then keep the fewest terms meeting the tolerance
        let values: Vec<VecD> = self.samples.iter().map(|&x| self.value(at(x), 0)).collect::<Result<_, _>>()?;
        let errors_with = |used: usize| -> Vec<f64> {
            let mut candidate = hermite_part.clone();
            for k in 0..used {
                candidate += jacobi.column(k) * self.corrections.row(k);
            }
            self.samples
                .iter()
                .zip(values.iter())
                .map(|(&x, value)| max_abs_diff(value, &polynomial::evaluate(&candidate, x)))
                .collect()
        };

        let mut used = terms;
        let mut errors = errors_with(terms);
        while used > 0 {
            let fewer = errors_with(used - 1);
            if fewer.iter().cloned().fold(0.0, f64::max) > self.config.tolerance {
                break;
            }
            used -= 1;
            errors = fewer;
        }

        for k in 0..used {
            coefficients += jacobi.column(k) * self.corrections.row(k);
        }
        let degree = if used == 0 { 2 * c + 1 } else { 2 * alpha + used - 1 };
        let coefficients = coefficients.columns(0, degree + 1).clone_owned();

        let max_error = errors.iter().cloned().fold(0.0, f64::max);
        let mean_error = errors.iter().sum::<f64>() / errors.len() as f64;

        Ok(SegmentFit {
            segment: PolynomialSegment::new(coefficients, (-1.0, 1.0)).with_mapping(a, b),
            max_error,
            mean_error,
        })
    }
}
