use std::ops::Range;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use regloss_core::field::{ensure_same_shape, spatial_dim};

use crate::error::{LossError, Result};
use crate::loss::Loss;

/// Default restricted range along the first spatial axis.
pub const DEFAULT_INTENSITY_RANGE: Range<usize> = 8..520;

/// Variance-weighted squared intensity error over a sub-range of the lattice.
///
/// loss = mean(variance · (y_pred - y_true)²)
///
/// where all three fields are cut to `range` along one spatial axis.
#[derive(Debug, Clone)]
pub struct IntensityLoss<B: Backend, const D: usize> {
    variance: Tensor<B, D>,
    axis: usize,
    range: Range<usize>,
}

impl<B: Backend, const D: usize> IntensityLoss<B, D> {
    /// Create the loss from a precomputed per-position variance field.
    ///
    /// The field has the full (uncropped) shape of the inputs.
    pub fn new(variance: Tensor<B, D>) -> Self {
        Self {
            variance,
            axis: 0,
            range: DEFAULT_INTENSITY_RANGE,
        }
    }

    /// Spatial axis the range applies to.
    pub fn with_axis(mut self, axis: usize) -> Self {
        self.axis = axis;
        self
    }

    /// Positions kept along the restricted axis.
    pub fn with_range(mut self, range: Range<usize>) -> Self {
        self.range = range;
        self
    }

    pub fn variance(&self) -> &Tensor<B, D> {
        &self.variance
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    fn crop(&self, field: Tensor<B, D>, dim: usize) -> Tensor<B, D> {
        field.narrow(dim, self.range.start, self.range.len())
    }

    pub fn forward(&self, y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> Result<Tensor<B, 1>> {
        ensure_same_shape(&y_true, &y_pred)?;
        ensure_same_shape(&y_true, &self.variance)?;

        let dim = spatial_dim::<D>(self.axis)?;
        let extent = y_true.dims()[dim];
        if self.range.is_empty() || self.range.end > extent {
            return Err(LossError::dimension_mismatch(format!(
                "range {:?} does not fit spatial axis {} of extent {}",
                self.range, self.axis, extent
            )));
        }

        let residual = self.crop(y_pred, dim) - self.crop(y_true, dim);
        let weighted = residual.powf_scalar(2.0) * self.crop(self.variance.clone(), dim);
        Ok(weighted.mean())
    }
}

impl<B: Backend, const D: usize> Loss<B, D> for IntensityLoss<B, D> {
    fn evaluate(&self, y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> Result<Tensor<B, 1>> {
        self.forward(y_true, y_pred)
    }

    fn name(&self) -> &'static str {
        "IntensityLoss"
    }
}
