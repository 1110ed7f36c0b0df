//! Sliding-window filters.

pub mod box_sum;

pub use box_sum::{BoxSumFilter, WindowSum};
