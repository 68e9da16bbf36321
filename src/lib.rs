//! `cpmg-hn-ap` library crate.
//!
//! One data point of an amide HN anti-phase CPMG relaxation-dispersion
//! experiment: metadata parsing, long parameter naming with fitted/fixed
//! classification, and the Bloch–McConnell intensity back-calculation.
//!
//! The binary (`cpmg`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - a fitting engine can consume `Dataset` residuals directly

pub mod app;
pub mod cli;
pub mod constants;
pub mod data;
pub mod domain;
pub mod error;
pub mod experiment;
pub mod math;
pub mod models;
pub mod parsing;
pub mod report;
