//! Inserts an additional knot into the curve.
//!
//! Knot insertion refines the knot vector without changing the shape of the curve. Inserting
//! an existing knot lowers the continuity at that knot by one.

use std::ops::AddAssign;

use thiserror::Error;

use crate::{
    curve::{points::Points, Curve},
    types::MatD,
};

#[derive(Error, Debug, PartialEq)]
pub enum InsertError {
    #[error("Parameter `u = {u}` lies outside the interval `({lower_bound}, {upper_bound})`.")]
    OutOfBounds { u: f64, lower_bound: f64, upper_bound: f64 },

    #[error(
        "The knot `u = {u}` has a multiplicity of `m = {m}` already. \
    Therefore, the knot cannot be inserted as this would exceed the maximum \
    multiplicity corresponding to the curve degree with `p = {p}`."
    )]
    MultiplicityError { u: f64, m: usize, p: usize },
}

/// Knot insertion algorithm by Boehm
/// `u` the knot to be inserted. The value must lie in the open domain `(U_p, U_n)`.
pub fn insert(c: &mut Curve, u: f64) -> Result<(), InsertError> {
    let (lower_bound, upper_bound) = c.domain();
    if u <= lower_bound || u >= upper_bound {
        return Err(InsertError::OutOfBounds { u, lower_bound, upper_bound });
    }

    let p = c.degree();

    let m = c.knots.multiplicity(u);
    if m > p {
        return Err(InsertError::MultiplicityError { u, m, p });
    }

    let dim = c.points.dimension();

    let U_old = c.knots.flat();
    let P_old = c.points.matrix();

    let l = c.knots.find_span(u);

    // Only the control points `l-p+1` to `l` change.
    let control_point_count = c.points.count();

    let mut P_new = MatD::zeros(dim, control_point_count + 1);

    let top_cols = l - p + 1;
    P_new.columns_mut(0, top_cols).copy_from(&P_old.columns(0, top_cols));

    let bot_cols = control_point_count - l;
    P_new.columns_mut(P_new.ncols() - bot_cols, bot_cols).copy_from(&P_old.columns(P_old.ncols() - bot_cols, bot_cols));

    let mut alpha: f64;
    for i in (l - p + 1)..=l {
        alpha = (u - U_old[i]) / (U_old[i + p] - U_old[i]);

        P_new.column_mut(i).add_assign((1. - alpha) * P_old.column(i - 1) + alpha * P_old.column(i));
    }

    log::trace!("inserted knot u = {} at span {} (multiplicity {} -> {})", u, l, m, m + 1);

    c.knots = c.knots.inserted(u);
    c.points.matrix = P_new;
    Ok(())
}
