//! Drive a predicted volume towards a fixed one with plain gradient descent
//! on LNCC plus a smoothness penalty, then score an uncertainty field.

use burn::backend::Autodiff;
use burn::tensor::{Distribution, Tensor};
use burn_ndarray::NdArray;
use regloss::{
    LatticePrecisionConfig, LocalCorrelation3dConfig, Penalty, PeriodicWeighting,
    SmoothnessConfig, UncertaintyLossConfig,
};

type Backend = Autodiff<NdArray<f32>>;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let device = Default::default();
    let iterations = 50;
    let learning_rate = 0.5;
    let smoothness_weight = 0.1;

    let lncc = LocalCorrelation3dConfig::new().with_window([5, 5, 5]).init()?;
    let smoothness = SmoothnessConfig::new().with_penalty(Penalty::L2).init();

    let fixed = Tensor::<Backend, 5>::random(

        [1, 1, 16, 16, 16],

        Distribution::Uniform(0.0, 1.0),

        &device,

    );
    let mut moving =
        Tensor::<Backend, 5>::random([1, 1, 16, 16, 16], Distribution::Uniform(0.0, 1.0), &device)
            .require_grad();

    for i in 0..iterations {
        let similarity = lncc.forward(fixed.clone(), moving.clone())?;
        let penalty = smoothness.forward(moving.clone())?.mul_scalar(smoothness_weight);
        let loss = similarity + penalty;

        if i % 10 == 0 {
            let value: f32 = loss.clone().into_scalar();
            tracing::info!("Iteration {}: Loss {:.6}", i, value);
        }

        let grads = loss.backward();
        let grad = moving
            .grad(&grads)
            .ok_or_else(|| anyhow::anyhow!("moving volume received no gradient"))?;
        let updated = moving.inner() - grad.mul_scalar(learning_rate);
        moving = Tensor::from_inner(updated).require_grad();
    }

    let final_lncc: f32 = lncc.forward(fixed, moving)?.into_scalar();
    tracing::info!("Final LNCC {:.6}", final_lncc);

    // 2 mean channels followed by 2 log-variance channels.
    let kl = UncertaintyLossConfig::new(1.0)
        .with_precision(LatticePrecisionConfig::new().with_weighting(PeriodicWeighting::FromInput))
        .init()?;
    let field = Tensor::<Backend, 4>::random(
        [2, 4, 32, 32],
        Distribution::Uniform(-0.5, 0.5),
        &device,
    );
    let per_item = kl.forward(field)?;
    tracing::info!("Uncertainty loss per item: {:?}", per_item.dims());
    let reduced: f32 = per_item.mean().into_scalar();
    tracing::info!("Uncertainty loss {:.6}", reduced);

    Ok(())
}
