//! Physics models.
//!
//! The back-calculation is built once per data point from its pulse timing and
//! then evaluated many times with different exchange/relaxation parameters.

pub mod back_calculation;

pub use back_calculation::*;
