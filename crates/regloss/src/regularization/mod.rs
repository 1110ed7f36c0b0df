//! Regularization of predicted deformation fields.
//!
//! # Available Regularizers
//!
//! * **SmoothnessRegularizer**: mean l1/l2 forward differences per spatial axis
//! * **LatticePrecisionTerm**: 4-neighbour graph-Laplacian quadratic form
//! * **BoundaryLoss**: consistency between two slabs of a split volume

pub mod smoothness;
pub mod precision;
pub mod boundary;

pub use smoothness::{SmoothnessConfig, SmoothnessRegularizer};
pub use precision::{LatticePrecisionConfig, LatticePrecisionTerm};
pub use boundary::{BoundaryLoss, BoundaryLossConfig};
