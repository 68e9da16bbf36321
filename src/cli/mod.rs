//! Command-line parsing for the CPMG HN anti-phase tools.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! physics and data-point code.

use clap::{Args, Parser, Subcommand};

use crate::domain::{ExperimentParameters, ParameterKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cpmg", version, about = "HN anti-phase CPMG relaxation-dispersion data points")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the long parameter names of a data point and whether each is fitted or fixed.
    Describe(DescribeArgs),
    /// Back-calculate a dispersion profile, optionally with synthetic noise.
    Simulate(SimulateArgs),
}

/// Experimental settings of a data point.
#[derive(Debug, Args, Clone)]
pub struct PointArgs {
    /// Assignment of the N–H pair, e.g. `G23N-H`.
    #[arg(short = 'r', long)]
    pub resonance_id: String,

    /// 1H Larmor frequency (MHz).
    #[arg(long, default_value_t = 600.0)]
    pub h_larmor_frq: f64,

    /// Temperature (°C).
    #[arg(short = 't', long, default_value_t = 25.0)]
    pub temperature: f64,

    /// 1H carrier (ppm).
    #[arg(long, default_value_t = 8.3)]
    pub carrier: f64,

    /// Constant CPMG relaxation delay (s).
    #[arg(long, default_value_t = 0.04)]
    pub time_t2: f64,

    /// 1H 90° pulse width (s); 0 simulates ideal pulses.
    #[arg(long, default_value_t = 0.0)]
    pub pw: f64,

    /// Z-filter equilibration delay (s).
    #[arg(long, default_value_t = 0.0)]
    pub time_equil: f64,

    /// Experiment name used to key `i0`.
    #[arg(long, default_value = "cpmg_hn_ap")]
    pub experiment_name: String,
}

impl PointArgs {
    pub fn to_parameters(&self, ncyc: u32) -> ExperimentParameters {
        ExperimentParameters {
            resonance_id: self.resonance_id.clone(),
            h_larmor_frq: self.h_larmor_frq,
            temperature: self.temperature,
            carrier: self.carrier,
            time_t2: self.time_t2,
            pw: self.pw,
            time_equil: self.time_equil,
            ncyc,
            experiment_name: self.experiment_name.clone(),
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub point: PointArgs,

    /// Number of CPMG cycles.
    #[arg(long, default_value_t = 0)]
    pub ncyc: u32,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub point: PointArgs,

    /// CPMG cycle counts (comma-separated).
    #[arg(long, value_delimiter = ',', default_value = "0,1,2,3,4,6,8,10,15,20,30,40")]
    pub ncyc: Vec<u32>,

    /// Parameter value by short name, e.g. `--set kex=500` (repeatable).
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_parameter_value)]
    pub values: Vec<(ParameterKind, f64)>,

    /// Standard deviation of Gaussian noise added to each intensity.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Parse `name=value` where `name` is a parameter short name.
pub fn parse_parameter_value(s: &str) -> Result<(ParameterKind, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let kind = ParameterKind::from_short_name(name).ok_or_else(|| {
        let known: Vec<&str> = ParameterKind::ALL.iter().map(|k| k.short_name()).collect();
        format!("unknown parameter '{}' (expected one of: {})", name.trim(), known.join(", "))
    })?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{}': {e}", kind.short_name()))?;
    if !value.is_finite() {
        return Err(format!("value for '{}' must be finite", kind.short_name()));
    }
    Ok((kind, value))
}
