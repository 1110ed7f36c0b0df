use burn::tensor::{Distribution, Tensor, TensorData};
use burn_ndarray::NdArray;
use proptest::prelude::*;
use regloss::{LocalCorrelation2dConfig, LocalCorrelation3dConfig, Loss};

type B = NdArray<f32>;

fn volume(values: Vec<f32>, shape: [usize; 5]) -> Tensor<B, 5> {
    Tensor::from_data(TensorData::new(values, shape), &Default::default())
}

proptest! {
    #[test]
    fn test_lncc_is_symmetric(
        i in prop::collection::vec(0.0f32..1.0, 64),
        j in prop::collection::vec(0.0f32..1.0, 64),
    ) {
        let lncc = LocalCorrelation3dConfig::new().with_window([3, 3, 3]).init().unwrap();
        let i = volume(i, [1, 1, 4, 4, 4]);
        let j = volume(j, [1, 1, 4, 4, 4]);

        let ij: f32 = lncc.forward(i.clone(), j.clone()).unwrap().into_scalar();
        let ji: f32 = lncc.forward(j, i).unwrap().into_scalar();
        prop_assert!((ij - ji).abs() < 1e-6, "lncc(I, J) = {}, lncc(J, I) = {}", ij, ji);
    }
}

#[test]
fn test_lncc_perfect_match() {
    let device = Default::default();
    let fixed = Tensor::<B, 5>::random([1, 1, 4, 4, 4], Distribution::Uniform(0.0, 1.0), &device);

    // A 7-wide window centred anywhere in a 4-wide volume covers all of it.
    let lncc = LocalCorrelation3dConfig::new().with_window([7, 7, 7]).init().unwrap();
    let value: f32 = lncc.forward(fixed.clone(), fixed).unwrap().into_scalar();

    assert!((value + 1.0).abs() < 1e-3, "expected -1, got {}", value);
}

#[test]
fn test_lncc_zero_variance_is_finite() {
    let device = Default::default();
    // [batch 2, channel 1, 2x2x2] of ones with a single-voxel window.
    let ones = Tensor::<B, 5>::ones([2, 1, 2, 2, 2], &device);

    let lncc = LocalCorrelation3dConfig::new().with_window([1, 1, 1]).init().unwrap();
    let cc = lncc.correlation_map(ones.clone(), ones.clone()).unwrap();
    let max: f32 = cc.abs().max().into_scalar();
    assert_eq!(max, 0.0);

    let value: f32 = lncc.forward(ones.clone(), ones).unwrap().into_scalar();
    assert!(value.is_finite());
    assert_eq!(value, 0.0);
}

#[test]
fn test_lncc_offset_reduces_correlation() {
    let device = Default::default();
    let fixed = Tensor::<B, 5>::random([1, 1, 8, 8, 8], Distribution::Uniform(0.0, 1.0), &device);
    let noise = Tensor::<B, 5>::random([1, 1, 8, 8, 8], Distribution::Uniform(0.0, 1.0), &device);
    let moving = fixed.clone() + noise;

    let lncc = LocalCorrelation3dConfig::new().with_window([3, 3, 3]).init().unwrap();
    let matched: f32 = lncc.forward(fixed.clone(), fixed.clone()).unwrap().into_scalar();
    let perturbed: f32 = lncc.forward(fixed, moving).unwrap().into_scalar();

    assert!(perturbed > matched, "perturbed {} should exceed matched {}", perturbed, matched);
    assert!(perturbed <= 0.0);
}

#[test]
fn test_lncc_2d_perfect_match_and_symmetry() {
    let device = Default::default();
    let i = Tensor::<B, 4>::random([2, 1, 6, 6], Distribution::Uniform(0.0, 1.0), &device);
    let j = Tensor::<B, 4>::random([2, 1, 6, 6], Distribution::Uniform(0.0, 1.0), &device);

    let lncc = LocalCorrelation2dConfig::new().with_window([11, 11]).init().unwrap();
    let matched: f32 = lncc.forward(i.clone(), i.clone()).unwrap().into_scalar();
    assert!((matched + 1.0).abs() < 1e-3, "expected -1, got {}", matched);

    let ij: f32 = lncc.evaluate(i.clone(), j.clone()).unwrap().into_scalar();
    let ji: f32 = lncc.evaluate(j, i).unwrap().into_scalar();
    assert!((ij - ji).abs() < 1e-6);
}

#[test]
fn test_lncc_weighted() {
    let device = Default::default();
    let i = Tensor::<B, 4>::random([1, 1, 6, 6], Distribution::Uniform(0.0, 1.0), &device);
    let j = Tensor::<B, 4>::random([1, 1, 6, 6], Distribution::Uniform(0.0, 1.0), &device);
    let lncc = LocalCorrelation2dConfig::new().with_window([3, 3]).init().unwrap();

    let plain: f32 = lncc.forward(i.clone(), j.clone()).unwrap().into_scalar();
    let unit = Tensor::<B, 4>::ones([1, 1, 6, 6], &device);
    let weighted: f32 = lncc.forward_weighted(i.clone(), j.clone(), unit).unwrap().into_scalar();
    assert!((plain - weighted).abs() < 1e-6);

    let zero = Tensor::<B, 4>::zeros([1, 1, 6, 6], &device);
    let masked: f32 = lncc.forward_weighted(i, j, zero).unwrap().into_scalar();
    assert_eq!(masked, 0.0);
}

#[test]
fn test_lncc_channels_are_independent() {
    let device = Default::default();
    let lncc = LocalCorrelation3dConfig::new().with_window([3, 3, 3]).init().unwrap();
    let shape = [1, 1, 4, 4, 4];
    let i0 = Tensor::<B, 5>::random(shape, Distribution::Uniform(0.0, 1.0), &device);
    let i1 = Tensor::<B, 5>::random(shape, Distribution::Uniform(0.0, 1.0), &device);
    let j0 = Tensor::<B, 5>::random(shape, Distribution::Uniform(0.0, 1.0), &device);
    let j1 = Tensor::<B, 5>::random(shape, Distribution::Uniform(0.0, 1.0), &device);

    let first: f32 = lncc.forward(i0.clone(), j0.clone()).unwrap().into_scalar();
    let second: f32 = lncc.forward(i1.clone(), j1.clone()).unwrap().into_scalar();

    let i = Tensor::cat(vec![i0, i1], 1);
    let j = Tensor::cat(vec![j0, j1], 1);
    let both: f32 = lncc.forward(i, j).unwrap().into_scalar();

    assert!((both - 0.5 * (first + second)).abs() < 1e-5);
}
