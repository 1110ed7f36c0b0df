//! KL-style loss for a predicted (mean, log-variance) field.
//!
//! For a field with mean channels μ and log-variance channels log σ²:
//!
//! sigma_terms = α · D · exp(log σ²) - log σ²
//! prec_terms  = ½ · α · μᵗ(D - A)μ
//! KL          = ½ · mean_spatial(sigma_terms) + ½ · prec_terms
//!
//! where D is the 4-neighbour degree map and μᵗ(D - A)μ the lattice
//! precision term. The result keeps one value per batch item and mean
//! channel; the caller reduces it.
//!
//! Large positive log-variances overflow `exp`; bound them upstream.

use burn::prelude::*;
use regloss_core::degree_map;

use crate::error::{ensure_positive, LossError, Result as LossResult};
use crate::loss::Loss;
use crate::regularization::{LatticePrecisionConfig, LatticePrecisionTerm};

/// Configuration for the uncertainty loss.
#[derive(Config, Debug)]
pub struct UncertaintyLossConfig {
    /// Precision weight α.
    pub alpha: f64,
    /// Number of mean channels; the field carries as many log-variance channels after them.
    #[config(default = "2")]
    pub mean_channels: usize,
    /// Precision term applied to the mean channels.
    #[config(default = "LatticePrecisionConfig::new()")]
    pub precision: LatticePrecisionConfig,
}

impl UncertaintyLossConfig {
    pub fn init(&self) -> LossResult<UncertaintyLoss> {
        ensure_positive("alpha", self.alpha)?;
        if self.mean_channels == 0 {
            return Err(LossError::invalid_configuration("mean_channels must be positive"));
        }
        if self.precision.weighted_channel >= self.mean_channels {
            return Err(LossError::invalid_configuration(format!(
                "weighted channel {} is not one of the {} mean channels",
                self.precision.weighted_channel, self.mean_channels
            )));
        }
        let precision = self.precision.init()?;

        tracing::debug!(
            alpha = self.alpha,
            mean_channels = self.mean_channels,
            "uncertainty loss configured"
        );
        Ok(UncertaintyLoss {
            alpha: self.alpha,
            mean_channels: self.mean_channels,
            precision,
        })
    }
}

/// KL-style uncertainty loss over `[B, 2m, H, W]` fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertaintyLoss {
    alpha: f64,
    mean_channels: usize,
    precision: LatticePrecisionTerm,
}

impl UncertaintyLoss {
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn mean_channels(&self) -> usize {
        self.mean_channels
    }

    /// Channels the input field must carry.
    pub fn expected_channels(&self) -> usize {
        2 * self.mean_channels
    }

    /// Loss per batch item and mean channel, shape `[B, m]`.
    pub fn forward<B: Backend>(&self, field: Tensor<B, 4>) -> LossResult<Tensor<B, 2>> {
        let [batch, channels, height, width] = field.dims();
        if channels != self.expected_channels() {
            return Err(LossError::ChannelMismatch {
                expected: self.expected_channels(),
                actual: channels,
            });
        }
        if height < 2 || width < 2 {
            return Err(LossError::dimension_mismatch(format!(
                "lattice must be at least 2x2, got {}x{}",
                height, width
            )));
        }
        tracing::trace!(shape = ?field.dims(), "uncertainty loss");

        let m = self.mean_channels;
        let device = field.device();
        let mean = field.clone().narrow(1, 0, m);
        let log_sigma = field.narrow(1, m, m);

        // [1, 1, H, W], broadcast over batch and channels
        let degree = degree_map::<B>(height, width, &device);
        let sigma_terms = (degree * log_sigma.clone().exp()).mul_scalar(self.alpha) - log_sigma;
        let sigma_mean: Tensor<B, 2> = sigma_terms.mean_dim(3).mean_dim(2).reshape([batch, m]);

        let prec_terms = self.precision.forward(mean)?.mul_scalar(0.5 * self.alpha);

        Ok(sigma_mean.mul_scalar(0.5) + prec_terms.mul_scalar(0.5).reshape([1, 1]))
    }
}

impl<B: Backend> Loss<B, 4> for UncertaintyLoss {
    /// Flattened `[B * m]` values; reduce before using as a training loss.
    fn evaluate(&self, _y_true: Tensor<B, 4>, y_pred: Tensor<B, 4>) -> LossResult<Tensor<B, 1>> {
        let kl = self.forward(y_pred)?;
        let [batch, m] = kl.dims();
        Ok(kl.reshape([batch * m]))
    }

    fn name(&self) -> &'static str {
        "UncertaintyLoss"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use regloss_core::PeriodicWeighting;

    type B = NdArray<f32>;

    #[test]
    fn test_config_validation() {
        assert!(UncertaintyLossConfig::new(1.0).init().is_ok());
        assert!(UncertaintyLossConfig::new(-1.0).init().is_err());
        assert!(UncertaintyLossConfig::new(1.0).with_mean_channels(0).init().is_err());
        // Default weighted channel 1 is not a mean channel when m = 1.
        assert!(UncertaintyLossConfig::new(1.0).with_mean_channels(1).init().is_err());
    }

    #[test]
    fn test_channel_mismatch() {
        let device = Default::default();
        let loss = UncertaintyLossConfig::new(1.0).init().unwrap();
        let field = Tensor::<B, 4>::zeros([1, 3, 4, 128], &device);
        assert!(matches!(
            loss.forward(field),
            Err(LossError::ChannelMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_zero_field_is_half_alpha_mean_degree() {
        let device = Default::default();
        let alpha = 2.0;
        let loss = UncertaintyLossConfig::new(alpha)
            .with_precision(
                LatticePrecisionConfig::new().with_weighting(PeriodicWeighting::FromInput),
            )
            .init()
            .unwrap();

        // Zero mean and zero log-variance: sigma_terms = α·D, prec_terms = 0.
        let field = Tensor::<B, 4>::zeros([2, 4, 3, 3], &device);
        let kl = loss.forward(field).unwrap();
        assert_eq!(kl.dims(), [2, 2]);

        // Mean degree on a 3x3 lattice: (4·2 + 4·3 + 4) / 9 = 24 / 9.
        let expected = 0.5 * alpha as f32 * 24.0 / 9.0;
        for value in kl.into_data().to_vec::<f32>().unwrap() {
            assert!((value - expected).abs() < 1e-5, "expected {}, got {}", expected, value);
        }
    }
}
