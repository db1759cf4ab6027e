//! Shape preserving manipulations of existing [curves][crate::curve::Curve].

pub mod insert;
