//! Layout helpers for channels-first fields.
//!
//! A field of rank `D` has shape `[batch, channels, s_1, ..., s_k]` with
//! `k = D - 2` spatial axes. Spatial axis `a` is tensor dimension
//! `a + SPATIAL_OFFSET`.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::{FieldError, Result};

/// Tensor dimension holding the batch index.
pub const BATCH_DIM: usize = 0;

/// Tensor dimension holding the channel index.
pub const CHANNEL_DIM: usize = 1;

/// Index of the first spatial dimension.
pub const SPATIAL_OFFSET: usize = 2;

/// Number of spatial axes of a rank-`D` field.
pub const fn spatial_rank(rank: usize) -> usize {
    rank.saturating_sub(SPATIAL_OFFSET)
}

/// Map a spatial axis to its tensor dimension, checking it exists.
pub fn spatial_dim<const D: usize>(axis: usize) -> Result<usize> {
    let spatial = spatial_rank(D);
    if axis >= spatial {
        return Err(FieldError::dimension_mismatch(format!(
            "spatial axis {} out of range for a field with {} spatial axes",
            axis, spatial
        )));
    }
    Ok(axis + SPATIAL_OFFSET)
}

/// Fail unless the field has at least one spatial axis.
pub fn ensure_spatial<const D: usize>() -> Result<()> {
    if spatial_rank(D) == 0 {
        return Err(FieldError::dimension_mismatch(format!(
            "rank {} field has no spatial axes; expected [batch, channels, spatial...]",
            D
        )));
    }
    Ok(())
}

/// Fail unless both fields have identical shapes.
pub fn ensure_same_shape<B: Backend, const D: usize>(
    expected: &Tensor<B, D>,
    actual: &Tensor<B, D>,
) -> Result<()> {
    let expected = expected.dims();
    let actual = actual.dims();
    if expected != actual {
        return Err(FieldError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

/// Fail unless the field spans at least `min` positions along `dim`.
pub fn ensure_extent<B: Backend, const D: usize>(
    field: &Tensor<B, D>,
    dim: usize,
    min: usize,
) -> Result<()> {
    let extent = field.dims()[dim];
    if extent < min {
        return Err(FieldError::dimension_mismatch(format!(
            "dimension {} has extent {}, need at least {}",
            dim, extent, min
        )));
    }
    Ok(())
}

/// Number of positions a field holds per (batch, channel) pair.
pub fn spatial_volume<const D: usize>(dims: &[usize; D]) -> usize {
    dims[SPATIAL_OFFSET..].iter().product()
}

/// Zero-pad a field along one tensor dimension.
///
/// Padding is built by concatenation so the result stays differentiable
/// with respect to `field`.
pub fn zero_pad<B: Backend, const D: usize>(
    field: Tensor<B, D>,
    dim: usize,
    before: usize,
    after: usize,
) -> Tensor<B, D> {
    if before == 0 && after == 0 {
        return field;
    }

    let device = field.device();
    let dims = field.dims();
    let mut parts: Vec<Tensor<B, D>> = Vec::with_capacity(3);

    if before > 0 {
        let mut shape = dims;
        shape[dim] = before;
        parts.push(Tensor::zeros(shape, &device));
    }
    parts.push(field);
    if after > 0 {
        let mut shape = dims;
        shape[dim] = after;
        parts.push(Tensor::zeros(shape, &device));
    }

    Tensor::cat(parts, dim)
}
