pub mod error;
pub mod loss;
pub mod metric;
pub mod regularization;
pub mod uncertainty;

pub use error::{LossError, Result};
pub use loss::Loss;
pub use metric::{
    IntensityLoss, LocalCorrelation2d, LocalCorrelation2dConfig, LocalCorrelation3d,
    LocalCorrelation3dConfig, OverlapLoss,
};
pub use regularization::{
    BoundaryLoss, BoundaryLossConfig, LatticePrecisionConfig, LatticePrecisionTerm,
    SmoothnessConfig, SmoothnessRegularizer,
};
pub use uncertainty::{UncertaintyLoss, UncertaintyLossConfig};

pub use regloss_core::{Penalty, PeriodicWeighting, WindowSpec};
