//! Physical constants shared by the parser and the back-calculation.

use std::f64::consts::PI;

pub const TWO_PI: f64 = 2.0 * PI;

/// Gyromagnetic ratio of 1H relative to itself.
pub const XI_RATIO_H: f64 = 1.0;
/// Gyromagnetic ratio of 15N relative to 1H.
pub const XI_RATIO_N: f64 = 0.101_329_118;
/// Gyromagnetic ratio of 13C relative to 1H.
pub const XI_RATIO_C: f64 = 0.251_449_530;

/// Relative gyromagnetic ratio for a nucleus element symbol (`H`, `N`, `C`).
pub fn xi_ratio(element: char) -> Option<f64> {
    match element.to_ascii_uppercase() {
        'H' => Some(XI_RATIO_H),
        'N' => Some(XI_RATIO_N),
        'C' => Some(XI_RATIO_C),
        _ => None,
    }
}

/// Conversion factor from ppm to rad/s for 1H at the given Larmor frequency (MHz).
pub fn ppm_to_rads(h_larmor_frq: f64) -> f64 {
    TWO_PI * h_larmor_frq * XI_RATIO_H
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppm_to_rads_at_600_mhz() {
        let v = ppm_to_rads(600.0);
        assert!((v - 2.0 * PI * 600.0).abs() < 1e-9);
    }

    #[test]
    fn xi_ratio_known_elements() {
        assert_eq!(xi_ratio('h'), Some(1.0));
        assert_eq!(xi_ratio('N'), Some(XI_RATIO_N));
        assert!(xi_ratio('P').is_none());
    }
}
