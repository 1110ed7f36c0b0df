//! Similarity metrics between a target and a predicted field.
//!
//! * **LocalCorrelation**: local normalized cross-correlation from box sums
//! * **OverlapLoss**: soft Dice overlap of segmentation masks
//! * **IntensityLoss**: variance-weighted squared intensity error

pub mod lncc;
pub mod overlap;
pub mod intensity;

pub use lncc::{
    LocalCorrelation, LocalCorrelation2d, LocalCorrelation2dConfig, LocalCorrelation3d,
    LocalCorrelation3dConfig, EPSILON_2D, EPSILON_3D,
};
pub use overlap::OverlapLoss;
pub use intensity::IntensityLoss;
