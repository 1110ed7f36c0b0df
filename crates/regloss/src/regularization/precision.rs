//! Lattice precision term μᵗ(D - A)μ without building the Laplacian.
//!
//! For the 4-neighbour lattice graph with degree matrix D and adjacency A:
//!
//! μᵗ(D - A)μ = Σ_i μ_i · Σ_{j ∈ N(i)} (μ_i - μ_j)
//!
//! Along each lattice axis the neighbour sum splits into a forward and a
//! backward contribution:
//!
//! μ[1:]  · (μ[1:]  - μ[:-1])
//! μ[:-1] · (μ[:-1] - μ[1:])
//!
//! Difference arrays do not wrap, so boundary nodes get fewer neighbour
//! terms (a free boundary). Each contribution is averaged, and the term is
//! the sum of the four averages.

use burn::prelude::*;
use regloss_core::field::SPATIAL_OFFSET;
use regloss_core::lattice::PERIODIC_WEIGHT_EPSILON;
use regloss_core::{forward_difference, PeriodicWeighting};

use crate::error::{LossError, Result as LossResult};
use crate::loss::Loss;

/// Configuration for the lattice precision term.
#[derive(Config, Debug)]
pub struct LatticePrecisionConfig {
    /// Modulation applied along the column axis of the weighted channel.
    #[config(default = "PeriodicWeighting::default()")]
    pub weighting: PeriodicWeighting,
    /// Channel multiplied by the periodic weight.
    #[config(default = "1")]
    pub weighted_channel: usize,
    /// Offset keeping the periodic weight positive.
    #[config(default = "1e-6")]
    pub epsilon: f64,
}

impl LatticePrecisionConfig {
    pub fn init(&self) -> LossResult<LatticePrecisionTerm> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(LossError::invalid_configuration(format!(
                "weight epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if let PeriodicWeighting::Fixed { period: 0 } = self.weighting {
            return Err(LossError::invalid_configuration("weighting period must be positive"));
        }

        tracing::debug!(
            weighting = ?self.weighting,
            weighted_channel = self.weighted_channel,
            "lattice precision term configured"
        );
        Ok(LatticePrecisionTerm {
            weighting: self.weighting,
            weighted_channel: self.weighted_channel,
            epsilon: self.epsilon,
        })
    }
}

/// Approximate precision quadratic form of a planar vector field.
///
/// Input is `[B, C, H, W]`; H is the row axis and W the column axis. The
/// weighted channel is scaled along W by the periodic weight before the
/// differences are taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticePrecisionTerm {
    weighting: PeriodicWeighting,
    weighted_channel: usize,
    epsilon: f64,
}

impl Default for LatticePrecisionTerm {
    fn default() -> Self {
        Self {
            weighting: PeriodicWeighting::default(),
            weighted_channel: 1,
            epsilon: PERIODIC_WEIGHT_EPSILON,
        }
    }
}

impl LatticePrecisionTerm {
    pub fn weighting(&self) -> PeriodicWeighting {
        self.weighting
    }

    /// Scale the weighted channel by the periodic weight along the columns.
    pub fn modulate<B: Backend>(&self, mean: Tensor<B, 4>) -> LossResult<Tensor<B, 4>> {
        let [_, channels, _, width] = mean.dims();
        if self.weighted_channel >= channels {
            return Err(LossError::dimension_mismatch(format!(
                "weighted channel {} out of range for a {}-channel field",
                self.weighted_channel, channels
            )));
        }
        if self.weighting == PeriodicWeighting::Disabled {
            return Ok(mean);
        }

        let column_weights = self.weighting.weights(width, self.epsilon)?;
        let mut weights = Vec::with_capacity(channels * width);
        for channel in 0..channels {
            if channel == self.weighted_channel {
                weights.extend_from_slice(&column_weights);
            } else {
                weights.extend(std::iter::repeat(1.0f32).take(width));
            }
        }

        let weights = Tensor::<B, 4>::from_data(
            TensorData::new(weights, [1, channels, 1, width]),
            &mean.device(),
        );
        Ok(mean * weights)
    }

    /// The precision term, a `[1]` tensor.
    pub fn forward<B: Backend>(&self, mean: Tensor<B, 4>) -> LossResult<Tensor<B, 1>> {
        tracing::trace!(shape = ?mean.dims(), "lattice precision term");
        let weighted = self.modulate(mean)?;

        let rows = neighbour_terms(weighted.clone(), 0)?;
        let columns = neighbour_terms(weighted, 1)?;
        Ok(rows + columns)
    }
}

/// Forward plus backward neighbour contributions along one spatial axis.
fn neighbour_terms<B: Backend>(field: Tensor<B, 4>, axis: usize) -> LossResult<Tensor<B, 1>> {
    let dim = axis + SPATIAL_OFFSET;
    let n = field.dims()[dim];
    let diff = forward_difference(field.clone(), axis)?;

    let ahead = field.clone().narrow(dim, 1, n - 1);
    let behind = field.narrow(dim, 0, n - 1);

    let forward = (ahead * diff.clone()).mean();
    let backward = (behind * diff.neg()).mean();
    Ok(forward + backward)
}

impl<B: Backend> Loss<B, 4> for LatticePrecisionTerm {
    fn evaluate(&self, _y_true: Tensor<B, 4>, y_pred: Tensor<B, 4>) -> LossResult<Tensor<B, 1>> {
        self.forward(y_pred)
    }

    fn name(&self) -> &'static str {
        "LatticePrecisionTerm"
    }
}
