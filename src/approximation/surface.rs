//! Approximates a function of two variables on a rectangle by polynomial patches.
//!
//! The domain is decomposed into a grid of patches. On each patch, mapped to `[-1, 1]^2`, the
//! function is projected onto the tensor Legendre basis
//!
//! `F(x, y) ≈ sum_k sum_l c_kl P_k(x) P_l(y)`
//!
//! using Gauss-Legendre quadrature. Since `|P_k| <= 1`, trailing rows and columns whose
//! coefficient sum stays within half the tolerance are dropped without exceeding it. A patch
//! still missing the tolerance is cut in half, in the direction whose trailing coefficients
//! are larger; the cut runs through the whole grid.
//!
//! The patches are independent: no continuity is enforced across patch boundaries.

use crate::{
    approximation::{check_domain, check_limit, check_tolerance, check_value, sample_points, ApproximationError, Status},
    basis::legendre::{gauss_legendre, legendre_to_monomial, legendre_values},
    polynomial::{bernstein_poles, compose_affine, evaluate_scalar},
    types::{parametric_resolution, MatD, VecD, MAX_DEGREE},
};

/// A function of two variables.
pub trait SurfaceEvaluator {
    fn dimension(&self) -> usize;

    fn evaluate(&self, u: f64, v: f64) -> VecD;
}

/// Adapts a closure `(u, v) -> value`.
pub struct FnSurface<F> {
    dimension: usize,
    f: F,
}

impl<F: Fn(f64, f64) -> VecD> FnSurface<F> {
    pub fn new(dimension: usize, f: F) -> Self {
        FnSurface { dimension, f }
    }
}

impl<F: Fn(f64, f64) -> VecD> SurfaceEvaluator for FnSurface<F> {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn evaluate(&self, u: f64, v: f64) -> VecD {
        (self.f)(u, v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceConfig {
    pub tolerance: f64,
    pub max_degree_u: usize,
    pub max_degree_v: usize,
    /// Upper bound for the number of patches of the decomposition.
    pub max_patches: usize,
    /// The error is measured on a `samples x samples` grid per patch.
    pub samples: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        SurfaceConfig { tolerance: 1e-6, max_degree_u: 12, max_degree_v: 12, max_patches: 64, samples: 11 }
    }
}

/// Direction a patch is preferably cut in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutSense {
    U,
    V,
}

/// A polynomial patch of the decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub u_range: (f64, f64),
    pub v_range: (f64, f64),
    pub degree_u: usize,
    pub degree_v: usize,
    /// Legendre coefficients `c[(k, l)]`, one matrix per dimension.
    pub legendre: Vec<MatD>,
    /// Power-basis coefficients in the local variables `(x, y) ∈ [-1, 1]^2`, one matrix per
    /// dimension.
    pub canonical: Vec<MatD>,
    pub max_error: f64,
    pub mean_error: f64,
    trailing_u: f64,
    trailing_v: f64,
}

fn to_local(t: f64, (a, b): (f64, f64)) -> f64 {
    (2.0 * t - a - b) / (b - a)
}

fn to_global(x: f64, (a, b): (f64, f64)) -> f64 {
    0.5 * (a + b) + 0.5 * (b - a) * x
}

impl Patch {
    /// Evaluates the patch at the global parameters `(u, v)`.
    pub fn evaluate(&self, u: f64, v: f64) -> VecD {
        let x = to_local(u, self.u_range);
        let y = to_local(v, self.v_range);

        VecD::from_iterator(
            self.canonical.len(),
            self.canonical.iter().map(|coefficients| {
                let rows: Vec<f64> = coefficients
                    .row_iter()
                    .map(|row| evaluate_scalar(row.transpose().as_slice(), y))
                    .collect();
                evaluate_scalar(&rows, x)
            }),
        )
    }

    /// Bézier poles of the patch over `[0, 1]^2`, one `(degree_u+1) x (degree_v+1)` matrix
    /// per dimension.
    pub fn bezier_poles(&self) -> Vec<MatD> {
        self.canonical
            .iter()
            .map(|coefficients| {
                // rows are polynomials in y: substitute y = 2t - 1 and convert
                let along_v = bernstein_poles(&compose_affine(coefficients, -1.0, 2.0), self.degree_v);
                let along_u = bernstein_poles(&compose_affine(&along_v.transpose(), -1.0, 2.0), self.degree_u);
                along_u.transpose()
            })
            .collect()
    }

    pub fn cut_sense(&self) -> CutSense {
        if self.trailing_v > self.trailing_u {
            CutSense::V
        } else {
            CutSense::U
        }
    }

    pub fn contains(&self, u: f64, v: f64) -> bool {
        (self.u_range.0..=self.u_range.1).contains(&u) && (self.v_range.0..=self.v_range.1).contains(&v)
    }
}

/// The patch decomposition of a surface approximation.
///
/// Patches are stored row by row in `u`: patch `(iu, iv)` has index `iu * nb_patches_v + iv`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceApproximation {
    pub u_cuts: Vec<f64>,
    pub v_cuts: Vec<f64>,
    pub patches: Vec<Patch>,
    pub status: Status,
    dimension: usize,
}

impl SurfaceApproximation {
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn nb_patches_u(&self) -> usize {
        self.u_cuts.len() - 1
    }

    pub fn nb_patches_v(&self) -> usize {
        self.v_cuts.len() - 1
    }

    pub fn patch(&self, iu: usize, iv: usize) -> Option<&Patch> {
        if iu >= self.nb_patches_u() || iv >= self.nb_patches_v() {
            return None;
        }
        self.patches.get(iu * self.nb_patches_v() + iv)
    }

    /// The patch containing `(u, v)`, `None` outside the domain.
    pub fn patch_at(&self, u: f64, v: f64) -> Option<&Patch> {
        let iu = cell(&self.u_cuts, u)?;
        let iv = cell(&self.v_cuts, v)?;
        self.patch(iu, iv)
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Option<VecD> {
        self.patch_at(u, v).map(|patch| patch.evaluate(u, v))
    }

    pub fn max_error(&self) -> f64 {
        self.patches.iter().map(|patch| patch.max_error).fold(0.0, f64::max)
    }

    pub fn mean_error(&self) -> f64 {
        self.patches.iter().map(|patch| patch.mean_error).sum::<f64>() / self.patches.len() as f64
    }

    /// Canonical coefficients indexed `[dimension][patch][iu * (degree_v + 1) + iv]`.
    pub fn canonical_coefficients(&self) -> Vec<Vec<Vec<f64>>> {
        (0..self.dimension)
            .map(|d| {
                self.patches
                    .iter()
                    .map(|patch| {
                        let coefficients = &patch.canonical[d];
                        (0..=patch.degree_u)
                            .flat_map(|iu| (0..=patch.degree_v).map(move |iv| coefficients[(iu, iv)]))
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }
}

/// Index of the grid cell containing `t`, the last cell owns the upper end.
fn cell(cuts: &[f64], t: f64) -> Option<usize> {
    let (first, last) = (cuts[0], cuts[cuts.len() - 1]);
    if !(first..=last).contains(&t) {
        return None;
    }
    let index = cuts.partition_point(|&c| c <= t).saturating_sub(1);
    Some(index.min(cuts.len() - 2))
}

/// Approximates `evaluator` on `u_range x v_range`.
///
/// # Examples
/// ```
/// use nalgebra::dvector;
/// use polyspline::approximation::surface::{approximate, FnSurface, SurfaceConfig};
///
/// let evaluator = FnSurface::new(1, |u: f64, v: f64| dvector![(u * v).sin()]);
/// let approximation = approximate(&evaluator, (0.0, 1.0), (0.0, 1.0), &SurfaceConfig::default()).unwrap();
///
/// assert!(approximation.status.is_converged());
/// assert!(approximation.max_error() <= 1e-6);
/// ```
pub fn approximate<E: SurfaceEvaluator + ?Sized>(
    evaluator: &E,
    u_range: (f64, f64),
    v_range: (f64, f64),
    config: &SurfaceConfig,
) -> Result<SurfaceApproximation, ApproximationError> {
    check_config(u_range, v_range, config)?;
    let fitter = PatchFitter::new(evaluator, config);

    let mut u_cuts = vec![u_range.0, u_range.1];
    let mut v_cuts = vec![v_range.0, v_range.1];
    let mut patches = vec![fitter.fit(u_range, v_range)?];

    let status = loop {
        let worst = patches
            .iter()
            .enumerate()
            .filter(|(_, patch)| patch.max_error > config.tolerance)
            .max_by(|(_, a), (_, b)| a.max_error.total_cmp(&b.max_error))
            .map(|(i, _)| i);

        let i = match worst {
            None => break Status::Converged,
            Some(i) => i,
        };

        let (nu, nv) = (u_cuts.len() - 1, v_cuts.len() - 1);
        let patch = &patches[i];
        let can_cut = |sense: CutSense| match sense {
            CutSense::U => (nu + 1) * nv <= config.max_patches && is_divisible(patch.u_range),
            CutSense::V => nu * (nv + 1) <= config.max_patches && is_divisible(patch.v_range),
        };

        let preferred = patch.cut_sense();
        let other = match preferred {
            CutSense::U => CutSense::V,
            CutSense::V => CutSense::U,
        };
        let sense = match (can_cut(preferred), can_cut(other)) {
            (true, _) => preferred,
            (false, true) => other,
            (false, false) => break Status::LimitReached,
        };

        let (iu, iv) = (i / nv, i % nv);
        log::trace!(
            "cutting patch ({}, {}) with error {:e} in {:?}, grid {}x{}",
            iu,
            iv,
            patch.max_error,
            sense,
            nu,
            nv
        );

        let mut next = Vec::with_capacity(config.max_patches);
        match sense {
            CutSense::U => {
                u_cuts.insert(iu + 1, 0.5 * (u_cuts[iu] + u_cuts[iu + 1]));
                for a in 0..=nu {
                    for b in 0..nv {
                        if a == iu || a == iu + 1 {
                            next.push(fitter.fit((u_cuts[a], u_cuts[a + 1]), (v_cuts[b], v_cuts[b + 1]))?);
                        } else {
                            let old = if a < iu { a } else { a - 1 };
                            next.push(patches[old * nv + b].clone());
                        }
                    }
                }
            }
            CutSense::V => {
                v_cuts.insert(iv + 1, 0.5 * (v_cuts[iv] + v_cuts[iv + 1]));
                for a in 0..nu {
                    for b in 0..=nv {
                        if b == iv || b == iv + 1 {
                            next.push(fitter.fit((u_cuts[a], u_cuts[a + 1]), (v_cuts[b], v_cuts[b + 1]))?);
                        } else {
                            let old = if b < iv { b } else { b - 1 };
                            next.push(patches[a * nv + old].clone());
                        }
                    }
                }
            }
        }
        patches = next;
    };

    let approximation = SurfaceApproximation { u_cuts, v_cuts, patches, status, dimension: evaluator.dimension() };
    log::debug!(
        "approximated surface with {}x{} patches, max error {:e} ({:?})",
        approximation.nb_patches_u(),
        approximation.nb_patches_v(),
        approximation.max_error(),
        status
    );
    Ok(approximation)
}

fn is_divisible((a, b): (f64, f64)) -> bool {
    // both halves stay wider than the resolution
    b - a > 4.0 * parametric_resolution(a, b)
}

fn check_config(u_range: (f64, f64), v_range: (f64, f64), config: &SurfaceConfig) -> Result<(), ApproximationError> {
    check_tolerance(config.tolerance)?;
    check_domain(u_range)?;
    check_domain(v_range)?;

    for &degree in [config.max_degree_u, config.max_degree_v].iter() {
        if degree > MAX_DEGREE {
            return Err(ApproximationError::DegreeTooHigh { degree, limit: MAX_DEGREE });
        }
    }
    check_limit("max_patches", config.max_patches, 1)?;
    check_limit("samples", config.samples, 2)
}

/// Quadrature rules and sampling grid shared by all patch fits.
struct PatchFitter<'a, E: ?Sized> {
    evaluator: &'a E,
    config: &'a SurfaceConfig,
    /// `w_i (2k+1)/2 P_k(x_i)`, one row per node
    projection_u: MatD,
    projection_v: MatD,
    nodes_u: Vec<f64>,
    nodes_v: Vec<f64>,
    samples: Vec<f64>,
}

fn projection(degree: usize) -> (Vec<f64>, MatD) {
    let (nodes, weights) = gauss_legendre(degree + 1);
    let matrix = MatD::from_fn(nodes.len(), degree + 1, |i, k| {
        weights[i] * (2 * k + 1) as f64 / 2.0 * legendre_values(degree, nodes[i])[k]
    });
    (nodes, matrix)
}

impl<'a, E: SurfaceEvaluator + ?Sized> PatchFitter<'a, E> {
    fn new(evaluator: &'a E, config: &'a SurfaceConfig) -> Self {
        let (nodes_u, projection_u) = projection(config.max_degree_u);
        let (nodes_v, projection_v) = projection(config.max_degree_v);

        PatchFitter {
            evaluator,
            config,
            projection_u,
            projection_v,
            nodes_u,
            nodes_v,
            samples: sample_points(config.samples),
        }
    }

    fn value(&self, u: f64, v: f64) -> Result<VecD, ApproximationError> {
        let value = self.evaluator.evaluate(u, v);
        check_value(&value, self.evaluator.dimension(), &[u, v])?;
        Ok(value)
    }

    fn fit(&self, u_range: (f64, f64), v_range: (f64, f64)) -> Result<Patch, ApproximationError> {
        let dimension = self.evaluator.dimension();

        // one `nodes_u x nodes_v` matrix of function values per dimension
        let mut values = vec![MatD::zeros(self.nodes_u.len(), self.nodes_v.len()); dimension];
        for (i, &x) in self.nodes_u.iter().enumerate() {
            for (j, &y) in self.nodes_v.iter().enumerate() {
                let value = self.value(to_global(x, u_range), to_global(y, v_range))?;
                for (d, matrix) in values.iter_mut().enumerate() {
                    matrix[(i, j)] = value[d];
                }
            }
        }

        let full: Vec<MatD> =
            values.iter().map(|f| self.projection_u.transpose() * f * &self.projection_v).collect();

        let row_weight = |k: usize, columns: usize| -> f64 {
            full.iter().map(|c| c.row(k).columns(0, columns).abs().sum()).fold(0.0, f64::max)
        };
        let column_weight = |l: usize, rows: usize| -> f64 {
            full.iter().map(|c| c.column(l).rows(0, rows).abs().sum()).fold(0.0, f64::max)
        };

        let (mut du, mut dv) = (self.config.max_degree_u, self.config.max_degree_v);
        let trailing_u = row_weight(du, dv + 1);
        let trailing_v = column_weight(dv, du + 1);

        let budget = 0.5 * self.config.tolerance;
        let mut dropped = 0.0;
        loop {
            let row = (du > 0).then(|| row_weight(du, dv + 1));
            let column = (dv > 0).then(|| column_weight(dv, du + 1));

            let (weight, is_row) = match (row, column) {
                (Some(r), Some(c)) if r <= c => (r, true),
                (_, Some(c)) => (c, false),
                (Some(r), None) => (r, true),
                (None, None) => break,
            };
            if dropped + weight > budget {
                break;
            }
            dropped += weight;
            if is_row {
                du -= 1;
            } else {
                dv -= 1;
            }
        }

        let to_monomial_u = legendre_to_monomial(du);
        let to_monomial_v = legendre_to_monomial(dv);
        let legendre: Vec<MatD> = full.iter().map(|c| c.view((0, 0), (du + 1, dv + 1)).clone_owned()).collect();
        let canonical: Vec<MatD> =
            legendre.iter().map(|c| to_monomial_u.transpose() * c * &to_monomial_v).collect();

        let mut patch = Patch {
            u_range,
            v_range,
            degree_u: du,
            degree_v: dv,
            legendre,
            canonical,
            max_error: 0.0,
            mean_error: 0.0,
            trailing_u,
            trailing_v,
        };

        let mut total = 0.0;
        for &x in self.samples.iter() {
            for &y in self.samples.iter() {
                let (u, v) = (to_global(x, u_range), to_global(y, v_range));
                let error = (self.value(u, v)? - patch.evaluate(u, v)).amax();
                patch.max_error = patch.max_error.max(error);
                total += error;
            }
        }
        patch.mean_error = total / (self.samples.len() * self.samples.len()) as f64;

        Ok(patch)
    }
}
