//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - builds data points and prints reports

use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, DescribeArgs, PointArgs, SimulateArgs};
use crate::data::{SampleConfig, generate_profile};
use crate::domain::{ParameterKind, ParameterValues, ProfileKey};
use crate::error::AppError;
use crate::experiment::DataPoint;

/// Entry point for the `cpmg` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Describe(args) => handle_describe(&args),
        Command::Simulate(args) => handle_simulate(&args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Serialize)]
struct PointSummary<'a> {
    resonance_id: &'a str,
    nucleus_name_1: &'a str,
    nucleus_name_2: &'a str,
    profile: &'a ProfileKey,
    ppm_to_rads: f64,
    fitted: Vec<String>,
    fixed: Vec<String>,
}

fn handle_describe(args: &DescribeArgs) -> Result<(), AppError> {
    let point = DataPoint::new(0.0, 1.0, args.point.to_parameters(args.ncyc))?;

    if args.json {
        let summary = PointSummary {
            resonance_id: &point.par.resonance_id,
            nucleus_name_1: &point.nucleus_name_1,
            nucleus_name_2: &point.nucleus_name_2,
            profile: &point.profile_id,
            ppm_to_rads: point.ppm_to_rads,
            fitted: point.fitting_parameter_names().iter().map(ToString::to_string).collect(),
            fixed: point.fixed_parameter_names().iter().map(ToString::to_string).collect(),
        };
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| AppError::new(4, format!("Failed to serialize summary: {e}")))?;
        println!("{json}");
    } else {
        print!("{}", crate::report::format_parameter_table(&point));
    }

    Ok(())
}

fn handle_simulate(args: &SimulateArgs) -> Result<(), AppError> {
    let template = args.point.to_parameters(0);
    let values = values_from_args(&args.point, &args.values)?;
    debug!(count = values.len(), "resolved parameter values");

    let config = SampleConfig {
        ncyc: args.ncyc.clone(),
        noise: args.noise,
        seed: args.seed,
    };
    let mut points = generate_profile(&template, &values, &config)?;

    println!("=== cpmg - HN anti-phase dispersion profile ===");
    if let Some(first) = points.first() {
        println!("Profile: {}", first.profile_id);
    }
    println!();
    print!("{}", crate::report::format_profile(&points, &values)?);

    println!();
    for point in &mut points {
        point.update_cal(&values)?;
        println!("{point}");
    }

    Ok(())
}

/// Key `--set` values by the long names of the simulated profile.
fn values_from_args(
    point: &PointArgs,
    pairs: &[(ParameterKind, f64)],
) -> Result<ParameterValues, AppError> {
    let template = DataPoint::new(0.0, 1.0, point.to_parameters(0))?;
    let mut values = ParameterValues::new();
    for &(kind, value) in pairs {
        if let Some(name) = template.long_name(kind) {
            values.insert(name.clone(), value);
        }
    }
    Ok(values)
}
