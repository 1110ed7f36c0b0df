//! Lattice-graph primitives for the 4-neighbour precision term.
//!
//! The graph Laplacian `D - A` of the 4-neighbour lattice is never built.
//! Its diagonal (the degree map) is produced by convolving a ones lattice
//! with a cross kernel, and the off-diagonal part is handled by finite
//! differences in the loss itself.

use std::f64::consts::PI;

use burn::tensor::backend::Backend;
use burn::tensor::module::conv2d;
use burn::tensor::ops::ConvOptions;
use burn::tensor::{Tensor, TensorData};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};

/// Period used when the weighting is not derived from the input.
pub const DEFAULT_PERIOD: usize = 128;

/// Offset keeping periodic weights strictly positive.
pub const PERIODIC_WEIGHT_EPSILON: f64 = 1e-6;

/// Modulation applied along one lattice axis before the precision term.
///
/// Position `i < period` gets weight `sin(i * pi / period) + epsilon`;
/// positions at or beyond the period keep unit weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodicWeighting {
    /// Period fixed independently of the field. The field must span at
    /// least `period` positions along the weighted axis.
    Fixed { period: usize },
    /// Period equal to the field's extent along the weighted axis.
    FromInput,
    /// Unit weight everywhere.
    Disabled,
}

impl Default for PeriodicWeighting {
    fn default() -> Self {
        Self::Fixed {
            period: DEFAULT_PERIOD,
        }
    }
}

impl PeriodicWeighting {
    /// Resolve the period for an axis of `extent` positions.
    ///
    /// Returns `None` when weighting is disabled.
    pub fn period(&self, extent: usize) -> Result<Option<usize>> {
        match *self {
            PeriodicWeighting::Fixed { period } => {
                if period == 0 {
                    return Err(FieldError::invalid_weighting("period must be positive"));
                }
                if extent < period {
                    return Err(FieldError::dimension_mismatch(format!(
                        "weighted axis has extent {} but the fixed period is {}",
                        extent, period
                    )));
                }
                if extent > period {
                    tracing::warn!(
                        extent,
                        period,
                        "axis longer than the period; trailing positions keep unit weight"
                    );
                }
                Ok(Some(period))
            }
            PeriodicWeighting::FromInput => {
                if extent == 0 {
                    return Err(FieldError::dimension_mismatch("weighted axis is empty"));
                }
                Ok(Some(extent))
            }
            PeriodicWeighting::Disabled => Ok(None),
        }
    }

    /// Weight for every position along an axis of `extent` positions.
    pub fn weights(&self, extent: usize, epsilon: f64) -> Result<Vec<f32>> {
        let period = match self.period(extent)? {
            Some(period) => period,
            None => return Ok(vec![1.0; extent]),
        };

        let weights = (0..extent)
            .map(|i| {
                if i < period {
                    ((i as f64 * PI / period as f64).sin() + epsilon) as f32
                } else {
                    1.0
                }
            })
            .collect();
        Ok(weights)
    }
}

/// 3x3 cross kernel selecting the four direct neighbours, `[1, 1, 3, 3]`.
pub fn cross_kernel<B: Backend>(device: &B::Device) -> Tensor<B, 4> {
    #[rustfmt::skip]
    let taps = vec![
        0.0f32, 1.0, 0.0,
        1.0,    0.0, 1.0,
        0.0,    1.0, 0.0,
    ];
    Tensor::from_data(TensorData::new(taps, [1, 1, 3, 3]), device)
}

/// Number of in-lattice 4-neighbours of every position, `[1, 1, H, W]`.
///
/// Corners have 2, edges 3 and interior positions 4. The map broadcasts
/// over batch and channels.
pub fn degree_map<B: Backend>(height: usize, width: usize, device: &B::Device) -> Tensor<B, 4> {
    let lattice = Tensor::<B, 4>::ones([1, 1, height, width], device);
    let options = ConvOptions::new([1, 1], [1, 1], [1, 1], 1);
    conv2d(lattice, cross_kernel(device), None, options)
}
