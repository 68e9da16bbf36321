//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - typed experiment metadata (`ExperimentParameters`) and parsed resonances
//! - the parameter catalogue (`ParameterKind`, `Role`) and long names
//! - value containers consumed by the back-calculation

pub mod types;

pub use types::*;
