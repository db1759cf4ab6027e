//! Point sets stored column-wise in `dimension x count` matrices.
//!
//! [ControlPoints] form the control polygon of a [Curve][crate::curve::Curve],
//! [DataPoints] are the samples a curve is interpolated through.

use crate::types::{MatD, VecDView, VecDViewMut};

#[derive(PartialEq, Debug, Clone)]
pub struct ControlPoints {
    pub(crate) matrix: MatD,
}

#[derive(PartialEq, Debug, Clone)]
pub struct DataPoints {
    pub(crate) matrix: MatD,
}

pub trait Points {
    fn matrix(&self) -> &MatD;
    fn matrix_mut(&mut self) -> &mut MatD;

    fn get(&self, i: usize) -> VecDView {
        self.matrix().column(i)
    }

    fn get_mut(&mut self, i: usize) -> VecDViewMut {
        self.matrix_mut().column_mut(i)
    }

    fn dimension(&self) -> usize {
        self.matrix().nrows()
    }

    fn count(&self) -> usize {
        self.matrix().ncols()
    }

    fn is_empty(&self) -> bool {
        self.matrix().is_empty()
    }
}

impl Points for ControlPoints {
    fn matrix(&self) -> &MatD {
        &self.matrix
    }

    fn matrix_mut(&mut self) -> &mut MatD {
        &mut self.matrix
    }
}

impl Points for DataPoints {
    fn matrix(&self) -> &MatD {
        &self.matrix
    }

    fn matrix_mut(&mut self) -> &mut MatD {
        &mut self.matrix
    }
}

impl ControlPoints {
    pub fn new(matrix: MatD) -> Self {
        ControlPoints { matrix }
    }

    pub fn into_matrix(self) -> MatD {
        self.matrix
    }
}

impl DataPoints {
    pub fn new(matrix: MatD) -> Self {
        DataPoints { matrix }
    }
}
