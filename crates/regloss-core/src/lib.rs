//! Field primitives shared by the registration losses.
//!
//! Fields are burn tensors laid out channels-first:
//! `[batch, channels, spatial_1, ..., spatial_k]`.

pub mod error;
pub mod field;
pub mod window;
pub mod filter;
pub mod difference;
pub mod lattice;

pub use error::{FieldError, Result};
pub use window::WindowSpec;
pub use filter::{BoxSumFilter, WindowSum};
pub use difference::{forward_difference, penalized_difference, Penalty};
pub use lattice::{degree_map, PeriodicWeighting};
