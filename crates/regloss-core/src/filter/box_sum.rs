use burn::tensor::backend::Backend;
use burn::tensor::module::{conv2d, conv3d};
use burn::tensor::ops::ConvOptions;
use burn::tensor::Tensor;

use crate::field::{zero_pad, SPATIAL_OFFSET};
use crate::window::WindowSpec;

/// Sum of a field over a window centred on every lattice position.
///
/// Implemented by filters whose spatial rank matches the field rank `D`.
pub trait WindowSum<B: Backend, const D: usize> {
    /// Window sums with the same shape as `field`.
    fn window_sum(&self, field: Tensor<B, D>) -> Tensor<B, D>;

    /// Number of lattice positions in the window.
    fn window_volume(&self) -> usize;
}

/// Box filter: convolution with a unit-valued kernel.
///
/// Positions outside the lattice count as zero, so the output has the same
/// shape as the input ("SAME" convolution). Every channel is summed on its
/// own through a grouped convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSumFilter<const N: usize> {
    window: WindowSpec<N>,
}

impl<const N: usize> BoxSumFilter<N> {
    pub fn new(window: WindowSpec<N>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &WindowSpec<N> {
        &self.window
    }

    fn pad_same<B: Backend, const D: usize>(&self, field: Tensor<B, D>) -> Tensor<B, D> {
        let mut padded = field;
        for axis in 0..N {
            let (before, after) = self.window.same_padding(axis);
            padded = zero_pad(padded, axis + SPATIAL_OFFSET, before, after);
        }
        padded
    }
}

impl<B: Backend> WindowSum<B, 4> for BoxSumFilter<2> {
    fn window_sum(&self, field: Tensor<B, 4>) -> Tensor<B, 4> {
        let [_, channels, _, _] = field.dims();
        let [wh, ww] = self.window.extents();
        tracing::trace!(shape = ?field.dims(), window = ?self.window.extents(), "box sum 2d");

        // Kernel: [OutChannels, InChannels / groups, H, W]
        let kernel = Tensor::<B, 4>::ones([channels, 1, wh, ww], &field.device());
        let padded = self.pad_same(field);

        let options = ConvOptions::new([1, 1], [0, 0], [1, 1], channels);
        conv2d(padded, kernel, None, options)
    }

    fn window_volume(&self) -> usize {
        self.window.volume()
    }
}

impl<B: Backend> WindowSum<B, 5> for BoxSumFilter<3> {
    fn window_sum(&self, field: Tensor<B, 5>) -> Tensor<B, 5> {
        let [_, channels, _, _, _] = field.dims();
        let [wd, wh, ww] = self.window.extents();
        tracing::trace!(shape = ?field.dims(), window = ?self.window.extents(), "box sum 3d");

        let kernel = Tensor::<B, 5>::ones([channels, 1, wd, wh, ww], &field.device());
        let padded = self.pad_same(field);

        let options = ConvOptions::new([1, 1, 1], [0, 0, 0], [1, 1, 1], channels);
        conv3d(padded, kernel, None, options)
    }

    fn window_volume(&self) -> usize {
        self.window.volume()
    }
}
