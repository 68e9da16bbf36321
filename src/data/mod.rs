//! Synthetic data generation.
//!
//! Profiles are back-calculated from known parameter values and perturbed with
//! seeded Gaussian noise, so the same inputs always give the same points.

pub mod sample;

pub use sample::*;
