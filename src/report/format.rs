//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the physics and parsing code stays clean and testable
//! - output changes are localized

use crate::domain::{ParameterValues, Role};
use crate::error::Result;
use crate::experiment::DataPoint;
use crate::models::{nu_cpmg, r2_effective};

/// Short → long parameter names of one data point, with their roles.
pub fn format_parameter_table(point: &DataPoint) -> String {
    let mut out = String::new();

    out.push_str(&format!("Resonance: {}\n", point.par.resonance_id));
    out.push_str(&format!(
        "Nuclei: {} / {} | profile: {}\n",
        point.nucleus_name_1, point.nucleus_name_2, point.profile_id
    ));
    out.push_str(&format!("ppm_to_rads: {:.4}\n\n", point.ppm_to_rads));

    out.push_str(&format!("{:<8} {:<7} {}\n", "short", "role", "long name"));
    out.push_str(&format!("{:-<8} {:-<7} {:-<40}\n", "", "", ""));
    for (kind, name) in point.short_long_par_names() {
        let role = match kind.role() {
            Role::Fitted => "fit",
            Role::Fixed => "fix",
        };
        out.push_str(&format!("{:<8} {:<7} {}\n", kind.short_name(), role, name));
    }

    out
}

/// Dispersion profile table: one row per point, sorted by `ncyc`.
///
/// `R2,eff` is computed against the `ncyc = 0` reference when the profile has one.
pub fn format_profile(points: &[DataPoint], values: &ParameterValues) -> Result<String> {
    let mut rows: Vec<&DataPoint> = points.iter().collect();
    rows.sort_by_key(|p| p.ncyc());

    let reference = rows.iter().find(|p| p.ncyc() == 0).map(|p| p.val);

    let mut out = String::new();
    out.push_str(&format!(
        "{:>5} {:>10} {:>12} {:>10} {:>12} {:>10}\n",
        "ncyc", "nu_cpmg", "intensity", "error", "calc", "r2_eff"
    ));
    out.push_str(&format!(
        "{:->5} {:->10} {:->12} {:->10} {:->12} {:->10}\n",
        "", "", "", "", "", ""
    ));

    for p in rows {
        let calc = p.calc_observable(values)?;
        let r2 = match (p.ncyc(), reference) {
            (0, _) | (_, None) => None,
            (_, Some(i_ref)) => r2_effective(p.val, i_ref, p.par.time_t2),
        };
        out.push_str(&format!(
            "{:>5} {:>10.1} {:>12.5} {:>10.5} {:>12.5} {:>10}\n",
            p.ncyc(),
            nu_cpmg(p.ncyc(), p.par.time_t2),
            p.val,
            p.err,
            calc,
            r2.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string()),
        ));
    }

    Ok(out)
}

/// Scientific notation with a signed two-digit exponent (`4.0e-02`).
pub fn fmt_sci(value: f64, precision: usize) -> String {
    let raw = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return raw;
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExperimentParameters;

    fn point(ncyc: u32, val: f64) -> DataPoint {
        let par = ExperimentParameters {
            resonance_id: "V7N-H".to_string(),
            h_larmor_frq: 600.0,
            temperature: 25.0,
            carrier: 8.3,
            time_t2: 0.04,
            pw: 0.0,
            time_equil: 0.0,
            ncyc,
            experiment_name: "hn_ap".to_string(),
        };
        DataPoint::new(val, 0.01, par).unwrap()
    }

    #[test]
    fn sci_notation_pads_exponent() {
        assert_eq!(fmt_sci(0.04, 1), "4.0e-02");
        assert_eq!(fmt_sci(1234.0, 2), "1.23e+03");
        assert_eq!(fmt_sci(0.0, 1), "0.0e+00");
    }

    #[test]
    fn parameter_table_lists_every_parameter() {
        let table = format_parameter_table(&point(1, 1.0));
        assert!(table.contains("kex      fit     kex(T=25.0)"));
        assert!(table.contains("j_hn     fix     j_hn(V7N, V7H, T=25.0)"));
        let rows = table.lines().filter(|l| l.contains(" fit ") || l.contains(" fix ")).count();
        assert_eq!(rows, 13);
    }

    #[test]
    fn profile_reports_r2_eff_against_reference() {
        let points = vec![point(10, (-0.4_f64).exp()), point(0, 1.0)];
        let table = format_profile(&points, &ParameterValues::new()).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_start().starts_with('0'));
        assert!(lines[2].trim_end().ends_with('-'));
        assert!(lines[3].contains("250.0"));
        assert!(lines[3].trim_end().ends_with("10.000"));
    }
}
