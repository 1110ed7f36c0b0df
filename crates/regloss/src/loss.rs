//! Loss trait shared by every component.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::error::Result;

/// A configured loss with a uniform evaluation signature.
///
/// Hyperparameters are fixed when the loss is built; evaluation is a pure
/// function of the two fields. Losses that only look at the prediction
/// (regularizers, the uncertainty loss) ignore `y_true`.
///
/// The trait is object safe, so a training loop can hold a
/// `Vec<Box<dyn Loss<B, 5>>>` and pick among them at runtime.
///
/// # Type Parameters
/// * `B` - The tensor backend
/// * `D` - Field rank, `[batch, channels, spatial...]`
pub trait Loss<B: Backend, const D: usize> {
    /// Evaluate the loss.
    ///
    /// # Returns
    /// A `[1]` tensor for scalar losses. Losses with per-item output return
    /// the flattened values, which the caller reduces.
    fn evaluate(&self, y_true: Tensor<B, D>, y_pred: Tensor<B, D>) -> Result<Tensor<B, 1>>;

    /// Get the name of this loss.
    fn name(&self) -> &'static str;
}
