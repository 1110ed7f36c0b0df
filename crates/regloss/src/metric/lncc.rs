//! Local normalized cross-correlation from box-filter sums.
//!
//! Window statistics come from five box sums (of I, J, I², J² and I·J), so
//! the metric is built entirely from convolutions and pointwise arithmetic.
//! With window volume N and local means u_I = S_I / N, u_J = S_J / N:
//!
//! cross = S_IJ - u_J·S_I - u_I·S_J + u_I·u_J·N   (N × covariance)
//! var_I = S_I2 - 2·u_I·S_I + u_I²·N               (N × variance)
//! cc    = cross² / (var_I·var_J + ε)
//!
//! and the loss is `-mean(cc)`. A perfect local match gives -1.

use burn::prelude::*;
use regloss_core::field::ensure_same_shape;
use regloss_core::{BoxSumFilter, WindowSpec, WindowSum};

use crate::error::{LossError, Result as LossResult};
use crate::loss::Loss;

/// Denominator offset of the volumetric variant.
pub const EPSILON_3D: f64 = 1e-5;

/// Denominator offset of the planar variant (double-precision machine epsilon).
pub const EPSILON_2D: f64 = f64::EPSILON;

/// Configuration for volumetric local cross-correlation.
#[derive(Config, Debug)]
pub struct LocalCorrelation3dConfig {
    /// Window extent per spatial axis.
    #[config(default = "[9, 9, 9]")]
    pub window: [usize; 3],
    /// Offset added to the variance product.
    #[config(default = "1e-5")]
    pub epsilon: f64,
}

/// Configuration for planar local cross-correlation.
#[derive(Config, Debug)]
pub struct LocalCorrelation2dConfig {
    /// Window extent per spatial axis.
    #[config(default = "[9, 9]")]
    pub window: [usize; 2],
    /// Offset added to the variance product.
    #[config(default = "2.220446049250313e-16")]
    pub epsilon: f64,
}

impl LocalCorrelation3dConfig {
    /// Validate the configuration and build the loss.
    pub fn init(&self) -> LossResult<LocalCorrelation3d> {
        LocalCorrelation::new(WindowSpec::new(self.window)?, self.epsilon)
    }
}

impl LocalCorrelation2dConfig {
    /// Validate the configuration and build the loss.
    pub fn init(&self) -> LossResult<LocalCorrelation2d> {
        LocalCorrelation::new(WindowSpec::new(self.window)?, self.epsilon)
    }
}

/// Local normalized cross-correlation loss over `N` spatial axes.
///
/// Fields are `[B, C, s_1, ..., s_N]`, usually with a single channel. A
/// multi-channel field is correlated channel by channel (the box filter is
/// grouped), and the loss averages over every position, channel and batch
/// item, so it equals the mean of the per-channel losses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalCorrelation<const N: usize> {
    filter: BoxSumFilter<N>,
    epsilon: f64,
}

/// Planar variant, fields `[B, C, H, W]`.
pub type LocalCorrelation2d = LocalCorrelation<2>;

/// Volumetric variant, fields `[B, C, D, H, W]`.
pub type LocalCorrelation3d = LocalCorrelation<3>;

impl<const N: usize> LocalCorrelation<N> {
    /// Create the loss from a window and a denominator offset.
    pub fn new(window: WindowSpec<N>, epsilon: f64) -> LossResult<Self> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(LossError::invalid_configuration(format!(
                "epsilon must be finite and non-negative, got {}",
                epsilon
            )));
        }
        tracing::debug!(window = ?window.extents(), epsilon, "local correlation configured");
        Ok(Self {
            filter: BoxSumFilter::new(window),
            epsilon,
        })
    }

    pub fn window(&self) -> &WindowSpec<N> {
        self.filter.window()
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Squared local correlation at every position, same shape as the inputs.
    pub fn correlation_map<B: Backend, const D: usize>(
        &self,
        i: Tensor<B, D>,
        j: Tensor<B, D>,
    ) -> LossResult<Tensor<B, D>>
    where
        BoxSumFilter<N>: WindowSum<B, D>,
    {
        ensure_same_shape(&i, &j)?;
        tracing::trace!(shape = ?i.dims(), "local correlation");

        let n = <BoxSumFilter<N> as WindowSum<B, D>>::window_volume(&self.filter) as f64;

        let i2 = i.clone() * i.clone();
        let j2 = j.clone() * j.clone();
        let ij = i.clone() * j.clone();

        let i_sum = self.filter.window_sum(i);
        let j_sum = self.filter.window_sum(j);
        let i2_sum = self.filter.window_sum(i2);
        let j2_sum = self.filter.window_sum(j2);
        let ij_sum = self.filter.window_sum(ij);

        let u_i = i_sum.clone().div_scalar(n);
        let u_j = j_sum.clone().div_scalar(n);

        // Both mixed terms are summed first so swapping I and J gives the same bits.
        let mixed = u_j.clone() * i_sum.clone() + u_i.clone() * j_sum.clone();
        let cross = ij_sum - mixed + (u_i.clone() * u_j.clone()).mul_scalar(n);

        let i_var = i2_sum - u_i.clone().mul_scalar(2.0) * i_sum
            + (u_i.clone() * u_i).mul_scalar(n);
        let j_var = j2_sum - u_j.clone().mul_scalar(2.0) * j_sum
            + (u_j.clone() * u_j).mul_scalar(n);

        Ok(cross.clone() * cross / (i_var * j_var).add_scalar(self.epsilon))
    }

    /// `-mean(cc)` over all positions, channels and batch items.
    pub fn forward<B: Backend, const D: usize>(
        &self,
        i: Tensor<B, D>,
        j: Tensor<B, D>,
    ) -> LossResult<Tensor<B, 1>>
    where
        BoxSumFilter<N>: WindowSum<B, D>,
    {
        Ok(self.correlation_map(i, j)?.mean().neg())
    }

    /// `-mean(cc · weights)` with a per-position weight field.
    ///
    /// # Arguments
    /// * `weights` - Weight field with the same shape as `i` and `j`
    pub fn forward_weighted<B: Backend, const D: usize>(
        &self,
        i: Tensor<B, D>,
        j: Tensor<B, D>,
        weights: Tensor<B, D>,
    ) -> LossResult<Tensor<B, 1>>
    where
        BoxSumFilter<N>: WindowSum<B, D>,
    {
        ensure_same_shape(&i, &weights)?;
        let cc = self.correlation_map(i, j)?;
        Ok((cc * weights).mean().neg())
    }
}

impl<B: Backend, const N: usize, const D: usize> Loss<B, D> for LocalCorrelation<N>
where
    BoxSumFilter<N>: WindowSum<B, D>,
{
    fn evaluate(&self, y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> LossResult<Tensor<B, 1>> {
        self.forward(y_true, y_pred)
    }

    fn name(&self) -> &'static str {
        match N {
            2 => "LocalCorrelation2d",
            _ => "LocalCorrelation3d",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_config_defaults() {
        let lncc = LocalCorrelation3dConfig::new().init().unwrap();
        assert_eq!(lncc.window().extents(), [9, 9, 9]);
        assert_eq!(lncc.epsilon(), EPSILON_3D);

        let lncc = LocalCorrelation2dConfig::new().init().unwrap();
        assert_eq!(lncc.window().extents(), [9, 9]);
        assert_eq!(lncc.epsilon(), EPSILON_2D);
    }

    #[test]
    fn test_invalid_config() {
        let result = LocalCorrelation3dConfig::new().with_window([9, 0, 9]).init();
        assert!(matches!(result, Err(LossError::Field(_))));

        let result = LocalCorrelation2dConfig::new().with_epsilon(-1.0).init();
        assert!(matches!(result, Err(LossError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_shape_mismatch() {
        let device = Default::default();
        let lncc = LocalCorrelation2dConfig::new().with_window([3, 3]).init().unwrap();
        let i = Tensor::<B, 4>::zeros([1, 1, 8, 8], &device);
        let j = Tensor::<B, 4>::zeros([1, 1, 8, 7], &device);

        assert!(matches!(
            lncc.forward(i, j),
            Err(LossError::Field(regloss_core::FieldError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_map_is_bounded() {
        let device = Default::default();
        let lncc = LocalCorrelation3dConfig::new().with_window([3, 3, 3]).init().unwrap();
        let i = Tensor::<B, 5>::random([1, 1, 6, 6, 6], Distribution::Uniform(0.0, 1.0), &device);
        let j = Tensor::<B, 5>::random([1, 1, 6, 6, 6], Distribution::Uniform(0.0, 1.0), &device);

        let cc = lncc.correlation_map(i, j).unwrap();
        let min: f32 = cc.clone().min().into_scalar();
        let max: f32 = cc.max().into_scalar();
        assert!(min >= 0.0);
        assert!(max <= 1.0 + 1e-3);
    }

    #[test]
    fn test_name() {
        let lncc = LocalCorrelation2dConfig::new().init().unwrap();
        assert_eq!(<LocalCorrelation2d as Loss<B, 4>>::name(&lncc), "LocalCorrelation2d");
    }
}
