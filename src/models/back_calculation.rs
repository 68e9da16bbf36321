//! Intensity back-calculation for the HN anti-phase CPMG experiment.
//!
//! The sequence simulated for one data point:
//!
//! 1. anti-phase 2HxNz at equilibrium populations of states A and B
//! 2. `ncyc` CPMG cycles `τcp – 180x – 2τcp – 180x – τcp` filling `time_t2`
//!    (skipped for the `ncyc = 0` reference plane)
//! 3. z-filter storing 2HxNz as 2HzNz, then `time_equil` of exchange and
//!    longitudinal relaxation
//! 4. detection of 2HzNz in state A, scaled by `i0`
//!
//! Pulses are simulated with a finite 1H rf field when `pw > 0` and as ideal
//! rotations otherwise.

use std::f64::consts::PI;

use crate::constants::ppm_to_rads;
use crate::domain::{ExchangeParameters, ExperimentParameters, ParameterKind};
use crate::error::{Error, Result};
use crate::math::{
    Component, Liouvillian, Magnetization, SiteTerms, State, free_liouvillian, ideal_180_x,
    matrix_power, propagator, rf_x, store_anti_phase_along_z,
};

/// Back-calculation bound to one data point's pulse timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackCalculation {
    pub time_t2: f64,
    pub ppm_to_rads: f64,
    pub carrier: f64,
    pub pw: f64,
    pub time_equil: f64,
}

/// Build the back-calculation for a data point's experimental settings.
pub fn make_calc_observable(par: &ExperimentParameters) -> BackCalculation {
    BackCalculation {
        time_t2: par.time_t2,
        ppm_to_rads: ppm_to_rads(par.h_larmor_frq),
        carrier: par.carrier,
        pw: par.pw,
        time_equil: par.time_equil,
    }
}

impl BackCalculation {
    /// Predicted intensity after `ncyc` CPMG cycles.
    pub fn calc_observable(&self, params: &ExchangeParameters, ncyc: u32) -> Result<f64> {
        validate(params)?;

        let l_free = self.liouvillian(params);

        let pa = 1.0 - params.pb;
        let mut mag = Magnetization::zeros();
        mag[Component::HxNz.index(State::A)] = pa;
        mag[Component::HxNz.index(State::B)] = params.pb;

        if ncyc > 0 {
            mag = self.cpmg_block(&l_free, ncyc)? * mag;
        }

        let stored = store_anti_phase_along_z() * mag;
        let detected = propagator(&l_free, self.time_equil) * stored;

        Ok(params.i0 * detected[Component::HzNz.index(State::A)])
    }

    fn liouvillian(&self, p: &ExchangeParameters) -> Liouvillian {
        let kab = p.kex * p.pb;
        let kba = p.kex * (1.0 - p.pb);
        let r_hz = (p.r_2hznz - p.r_nz).max(0.0);

        let site_a = SiteTerms {
            offset: (p.cs - self.carrier) * self.ppm_to_rads,
            pi_j: PI * p.j_hn,
            r_hxy: p.r_hxy,
            r_2hxynz: p.r_hxy + p.r_nz,
            r_hz,
            r_2hznz: p.r_2hznz,
            etaxy: p.etaxy,
            etaz: p.etaz,
        };
        let r_hxy_b = p.r_hxy + p.dr_hxy;
        let site_b = SiteTerms {
            offset: site_a.offset + p.dw * self.ppm_to_rads,
            pi_j: PI * (p.j_hn + p.dj_hn),
            r_hxy: r_hxy_b,
            r_2hxynz: r_hxy_b + p.r_nz,
            ..site_a
        };

        free_liouvillian(&site_a, &site_b, kab, kba)
    }

    fn cpmg_block(&self, l_free: &Liouvillian, ncyc: u32) -> Result<Liouvillian> {
        let quarter = self.time_t2 / (4.0 * f64::from(ncyc));
        if quarter < self.pw {
            return Err(Error::InvalidTiming(format!(
                "ncyc={ncyc} leaves {quarter:.3e} s per quarter cycle, shorter than pw={:.3e} s",
                self.pw
            )));
        }
        let tau_cp = quarter - self.pw;

        let p_delay = propagator(l_free, tau_cp);
        let p_double = propagator(l_free, 2.0 * tau_cp);
        let p_180 = if self.pw > 0.0 {
            let omega1 = PI / (2.0 * self.pw);
            propagator(&(l_free + rf_x(omega1)), 2.0 * self.pw)
        } else {
            ideal_180_x()
        };

        let cycle = p_delay * p_180 * p_double * p_180 * p_delay;
        Ok(matrix_power(&cycle, ncyc))
    }
}

fn validate(p: &ExchangeParameters) -> Result<()> {
    for kind in ParameterKind::ALL {
        let value = p.get(kind);
        if !value.is_finite() {
            return Err(Error::InvalidParameter {
                name: kind.short_name(),
                value,
                reason: "must be finite",
            });
        }
    }
    if !(0.0..1.0).contains(&p.pb) {
        return Err(Error::InvalidParameter {
            name: "pb",
            value: p.pb,
            reason: "must be in [0, 1)",
        });
    }
    if p.kex < 0.0 {
        return Err(Error::InvalidParameter {
            name: "kex",
            value: p.kex,
            reason: "must be >= 0",
        });
    }
    Ok(())
}

/// CPMG pulsing frequency `ν_cpmg = ncyc / time_t2` (Hz).
pub fn nu_cpmg(ncyc: u32, time_t2: f64) -> f64 {
    f64::from(ncyc) / time_t2
}

/// Effective transverse relaxation rate `-ln(I / I_ref) / time_t2`.
///
/// Returns `None` when either intensity is not strictly positive.
pub fn r2_effective(intensity: f64, reference: f64, time_t2: f64) -> Option<f64> {
    if !(intensity > 0.0 && reference > 0.0 && time_t2 > 0.0) {
        return None;
    }
    Some(-(intensity / reference).ln() / time_t2)
}
