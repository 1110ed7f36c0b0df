use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use regloss_core::field::{ensure_same_shape, ensure_spatial, spatial_volume};

use crate::error::Result;
use crate::loss::Loss;

/// Floor of the Dice denominator.
pub const DICE_FLOOR: f64 = 1e-5;

/// Soft Dice overlap loss.
///
/// Per batch item and channel:
///
/// dice = 2·Σ(I·J) / max(Σ(I + J), 1e-5)
///
/// summed over all spatial axes. The loss is `-mean(dice)`, in `[-1, 0]`
/// for nonnegative masks. Two empty masks give 0 instead of NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlapLoss;

impl OverlapLoss {
    pub fn new() -> Self {
        Self
    }

    /// Dice score per `(batch, channel)`, shape `[B, C]`.
    pub fn dice<B: Backend, const D: usize>(
        &self,
        y_true: Tensor<B, D>,
        y_pred: Tensor<B, D>,
    ) -> Result<Tensor<B, 2>> {
        ensure_spatial::<D>()?;
        ensure_same_shape(&y_true, &y_pred)?;

        let dims = y_true.dims();
        let [batch, channels] = [dims[0], dims[1]];
        let volume = spatial_volume(&dims);

        let flat_true: Tensor<B, 3> = y_true.reshape([batch, channels, volume]);
        let flat_pred: Tensor<B, 3> = y_pred.reshape([batch, channels, volume]);

        let top = (flat_true.clone() * flat_pred.clone()).sum_dim(2).mul_scalar(2.0);
        let bottom = (flat_true + flat_pred).sum_dim(2).clamp_min(DICE_FLOOR);

        Ok((top / bottom).reshape([batch, channels]))
    }

    pub fn forward<B: Backend, const D: usize>(
        &self,
        y_true: Tensor<B, D>,
        y_pred: Tensor<B, D>,
    ) -> Result<Tensor<B, 1>> {
        Ok(self.dice(y_true, y_pred)?.mean().neg())
    }
}

impl<B: Backend, const D: usize> Loss<B, D> for OverlapLoss {
    fn evaluate(&self, y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> Result<Tensor<B, 1>> {
        self.forward(y_true, y_pred)
    }

    fn name(&self) -> &'static str {
        "OverlapLoss"
    }
}
