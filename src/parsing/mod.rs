//! Parsing helpers.
//!
//! - raw metadata → `ExperimentParameters` (`params`)
//! - assignment strings → resonances (`assignment`)

pub mod assignment;
pub mod params;

pub use assignment::*;
pub use params::*;
