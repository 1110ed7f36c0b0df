use burn::tensor::{Tensor, TensorData};
use burn_ndarray::NdArray;
use regloss::OverlapLoss;

type B = NdArray<f32>;

fn mask(values: &[u8], shape: [usize; 5]) -> Tensor<B, 5> {
    let data: Vec<f32> = values.iter().map(|&v| v as f32).collect();
    Tensor::from_data(TensorData::new(data, shape), &Default::default())
}

#[test]
fn test_identical_masks() {
    let a = mask(&[1, 0, 1, 1, 0, 0, 1, 0], [1, 1, 2, 2, 2]);
    let loss: f32 = OverlapLoss::new().forward(a.clone(), a).unwrap().into_scalar();
    assert!((loss + 1.0).abs() < 1e-6, "expected -1, got {}", loss);
}

#[test]
fn test_empty_masks() {
    let device = Default::default();
    let empty = Tensor::<B, 5>::zeros([2, 1, 3, 3, 3], &device);
    let loss: f32 = OverlapLoss::new().forward(empty.clone(), empty).unwrap().into_scalar();
    assert!(loss.is_finite());
    assert_eq!(loss, 0.0);
}

#[test]
fn test_disjoint_masks() {
    let a = mask(&[1, 1, 0, 0, 0, 0, 0, 0], [1, 1, 2, 2, 2]);
    let b = mask(&[0, 0, 1, 1, 0, 0, 0, 0], [1, 1, 2, 2, 2]);
    let loss: f32 = OverlapLoss::new().forward(a, b).unwrap().into_scalar();
    assert_eq!(loss, 0.0);
}

#[test]
fn test_shape_mismatch() {
    let device = Default::default();
    let a = Tensor::<B, 5>::zeros([1, 1, 2, 2, 2], &device);
    let b = Tensor::<B, 5>::zeros([1, 1, 2, 2, 3], &device);
    assert!(OverlapLoss::new().forward(a, b).is_err());
}
