use burn::prelude::*;
use regloss_core::field::spatial_dim;

use crate::error::{ensure_finite, LossError, Result as LossResult};
use crate::loss::Loss;

/// Configuration for the boundary consistency loss.
#[derive(Config, Debug)]
pub struct BoundaryLossConfig {
    /// Loss scale. Zero switches the term off.
    pub gamma: f64,
    /// Spatial axis along which the slabs are cut.
    #[config(default = "0")]
    pub axis: usize,
    /// Slab thickness.
    #[config(default = "16")]
    pub width: usize,
    /// Start of the trailing slab.
    #[config(default = "512")]
    pub offset: usize,
}

impl BoundaryLossConfig {
    pub fn init(&self) -> LossResult<BoundaryLoss> {
        ensure_finite("gamma", self.gamma)?;
        if self.width == 0 {
            return Err(LossError::invalid_configuration("slab width must be positive"));
        }
        if self.offset < self.width {
            return Err(LossError::invalid_configuration(format!(
                "slabs overlap: offset {} is smaller than width {}",
                self.offset, self.width
            )));
        }

        tracing::debug!(
            gamma = self.gamma,
            axis = self.axis,
            width = self.width,
            offset = self.offset,
            "boundary loss configured"
        );
        Ok(BoundaryLoss {
            gamma: self.gamma,
            axis: self.axis,
            width: self.width,
            offset: self.offset,
        })
    }
}

/// Consistency between the leading slab and a slab further along one axis.
///
/// For a volume stored with a wrap-around margin, `[0, width)` and
/// `[offset, offset + width)` describe the same tissue:
///
/// loss = γ · mean((field[0..width] - field[offset..offset + width])²)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryLoss {
    gamma: f64,
    axis: usize,
    width: usize,
    offset: usize,
}

impl BoundaryLoss {
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn forward<B: Backend, const D: usize>(
        &self,
        field: Tensor<B, D>,
    ) -> LossResult<Tensor<B, 1>> {
        let dim = spatial_dim::<D>(self.axis)?;
        let extent = field.dims()[dim];
        let needed = self.offset + self.width;
        if extent < needed {
            return Err(LossError::dimension_mismatch(format!(
                "spatial axis {} has extent {}, need at least {}",
                self.axis, extent, needed
            )));
        }

        let lead = field.clone().narrow(dim, 0, self.width);
        let trail = field.narrow(dim, self.offset, self.width);
        Ok((lead - trail).powf_scalar(2.0).mean().mul_scalar(self.gamma))
    }
}

impl<B: Backend, const D: usize> Loss<B, D> for BoundaryLoss {
    fn evaluate(&self, _y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> LossResult<Tensor<B, 1>> {
        self.forward(y_pred)
    }

    fn name(&self) -> &'static str {
        "BoundaryLoss"
    }
}
