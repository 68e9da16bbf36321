//! HN anti-phase CPMG experiment: data points and their collections.

pub mod data_point;
pub mod dataset;

pub use data_point::*;
pub use dataset::*;
