//! Forward finite differences along spatial axes.
//!
//! For an axis of extent `n` the difference has extent `n - 1`:
//!
//! diff[i] = field[i + 1] - field[i]

use std::fmt;
use std::str::FromStr;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};
use crate::field::{ensure_extent, spatial_dim};

/// How a difference is turned into a penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Penalty {
    /// Absolute value.
    #[default]
    L1,
    /// Square.
    L2,
}

impl Penalty {
    pub fn apply<B: Backend, const D: usize>(&self, diff: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Penalty::L1 => diff.abs(),
            Penalty::L2 => diff.powf_scalar(2.0),
        }
    }
}

impl FromStr for Penalty {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "l1" => Ok(Penalty::L1),
            "l2" => Ok(Penalty::L2),
            _ => Err(FieldError::UnknownPenalty(s.to_string())),
        }
    }
}

impl fmt::Display for Penalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Penalty::L1 => write!(f, "l1"),
            Penalty::L2 => write!(f, "l2"),
        }
    }
}

/// Forward difference of `field` along spatial axis `axis`.
///
/// # Arguments
/// * `field` - Field of shape `[B, C, s_1, ..., s_k]`
/// * `axis` - Spatial axis in `0..k`; its extent must be at least 2
pub fn forward_difference<B: Backend, const D: usize>(
    field: Tensor<B, D>,
    axis: usize,
) -> Result<Tensor<B, D>> {
    let dim = spatial_dim::<D>(axis)?;
    ensure_extent(&field, dim, 2)?;
    let n = field.dims()[dim];

    let ahead = field.clone().narrow(dim, 1, n - 1);
    let behind = field.narrow(dim, 0, n - 1);
    Ok(ahead - behind)
}

/// Forward difference with `penalty` applied elementwise.
pub fn penalized_difference<B: Backend, const D: usize>(
    field: Tensor<B, D>,
    axis: usize,
    penalty: Penalty,
) -> Result<Tensor<B, D>> {
    forward_difference(field, axis).map(|diff| penalty.apply(diff))
}
