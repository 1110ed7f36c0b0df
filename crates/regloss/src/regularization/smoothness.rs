//! Finite-difference smoothness regularization for deformation fields.
//!
//! The penalty is the average over spatial axes of the mean penalized
//! forward difference along that axis:
//!
//! R(u) = (1/k) · Σ_a mean(|∂_a u|)      (l1)
//! R(u) = (1/k) · Σ_a mean((∂_a u)²)     (l2)
//!
//! Every axis contributes one equally weighted mean, even though the
//! difference arrays along different axes hold different element counts.

use burn::prelude::*;
use regloss_core::field::{ensure_spatial, spatial_rank};
use regloss_core::{penalized_difference, Penalty};

use crate::error::Result as LossResult;
use crate::loss::Loss;

/// Configuration for the smoothness regularizer.
#[derive(Config, Debug)]
pub struct SmoothnessConfig {
    /// Penalty applied to the differences.
    #[config(default = "Penalty::L1")]
    pub penalty: Penalty,
}

impl SmoothnessConfig {
    pub fn init(&self) -> SmoothnessRegularizer {
        tracing::debug!(penalty = %self.penalty, "smoothness regularizer configured");
        SmoothnessRegularizer::new(self.penalty)
    }
}

/// Smoothness regularizer over any number of spatial axes.
///
/// # Example
///
/// ```rust,ignore
/// use regloss::{Penalty, SmoothnessConfig};
///
/// let reg = SmoothnessConfig::new().with_penalty(Penalty::L2).init();
/// // deformation field: [B, 3, D, H, W]
/// let flow = Tensor::zeros([1, 3, 32, 32, 32], &device);
/// let loss = reg.forward(flow)?;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothnessRegularizer {
    penalty: Penalty,
}

impl SmoothnessRegularizer {
    pub fn new(penalty: Penalty) -> Self {
        Self { penalty }
    }

    /// Planar regularizer, always l2.
    pub fn planar() -> Self {
        Self::new(Penalty::L2)
    }

    pub fn penalty(&self) -> Penalty {
        self.penalty
    }

    /// Regularization loss of a field `[B, C, s_1, ..., s_k]`.
    pub fn forward<B: Backend, const D: usize>(
        &self,
        field: Tensor<B, D>,
    ) -> LossResult<Tensor<B, 1>> {
        ensure_spatial::<D>()?;
        tracing::trace!(shape = ?field.dims(), penalty = %self.penalty, "smoothness");

        let axis_means = (0..spatial_rank(D))
            .map(|axis| {
                penalized_difference(field.clone(), axis, self.penalty).map(|diff| diff.mean())
            })
            .collect::<regloss_core::Result<Vec<_>>>()?;

        Ok(Tensor::cat(axis_means, 0).mean())
    }
}

impl<B: Backend, const D: usize> Loss<B, D> for SmoothnessRegularizer {
    fn evaluate(&self, _y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> LossResult<Tensor<B, 1>> {
        self.forward(y_pred)
    }

    fn name(&self) -> &'static str {
        "SmoothnessRegularizer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_defaults() {
        assert_eq!(SmoothnessConfig::new().init().penalty(), Penalty::L1);
        assert_eq!(SmoothnessRegularizer::planar().penalty(), Penalty::L2);
    }

    #[test]
    fn test_uniform_field() {
        let device = Default::default();
        let flow = Tensor::<B, 5>::ones([1, 3, 8, 8, 8], &device).mul_scalar(2.5);

        let loss: f32 = SmoothnessConfig::new().init().forward(flow).unwrap().into_scalar();
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn test_rejects_field_without_spatial_axes() {
        let device = Default::default();
        let flat = Tensor::<B, 2>::ones([2, 3], &device);
        assert!(SmoothnessRegularizer::planar().forward(flat).is_err());
    }
}
