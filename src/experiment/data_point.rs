//! A single HN anti-phase CPMG data point.
//!
//! Construction resolves everything that depends only on the experiment
//! metadata: the parsed assignment, the long parameter names, their fitted/fixed
//! classification and the back-calculation. Evaluation then only needs a set
//! of parameter values.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

use crate::domain::{
    ExchangeParameters, ExperimentParameters, ParameterKind, ParameterName, ParameterValues,
    ProfileKey, Quantity, Qualifier, Role,
};
use crate::error::{Error, Result};
use crate::models::{BackCalculation, make_calc_observable};
use crate::parsing::parse_assignment;
use crate::report::fmt_sci;

/// Intensity measured after a CPMG pulse train of `ncyc` cycles.
#[derive(Debug, Clone)]
pub struct DataPoint {
    pub val: f64,
    pub err: f64,
    pub par: ExperimentParameters,
    pub ppm_to_rads: f64,
    /// Nitrogen nucleus name (`G23N`).
    pub nucleus_name_1: String,
    /// Proton nucleus name (`G23H`).
    pub nucleus_name_2: String,
    pub profile_id: ProfileKey,
    /// Last back-calculated value.
    pub cal: Option<f64>,
    long_names: BTreeMap<ParameterKind, ParameterName>,
    fitting_parameter_names: BTreeSet<ParameterName>,
    fixed_parameter_names: BTreeSet<ParameterName>,
    calc: BackCalculation,
    ncyc: u32,
}

impl DataPoint {
    pub fn new(val: f64, err: f64, par: ExperimentParameters) -> Result<Self> {
        par.validate()?;
        if !val.is_finite() {
            return Err(Error::InvalidField {
                field: "val".to_string(),
                value: val.to_string(),
                reason: "must be finite".to_string(),
            });
        }
        if !(err.is_finite() && err > 0.0) {
            return Err(Error::InvalidUncertainty(err));
        }

        let resonances = parse_assignment(&par.resonance_id)?;
        let [first, second] = resonances.as_slice() else {
            return Err(Error::InvalidAssignment {
                assignment: par.resonance_id.clone(),
                reason: format!("expected an N-H pair, found {} nuclei", resonances.len()),
            });
        };
        if first.element() != 'N' || second.element() != 'H' {
            return Err(Error::InvalidAssignment {
                assignment: par.resonance_id.clone(),
                reason: format!(
                    "expected nitrogen then proton, found {} then {}",
                    first.element(),
                    second.element()
                ),
            });
        }
        let nucleus_name_1 = first.nucleus_name();
        let nucleus_name_2 = second.nucleus_name();

        let profile_id = ProfileKey {
            temperature: Quantity::new(par.temperature),
            nucleus: nucleus_name_2.clone(),
            h_larmor_frq: Quantity::new(par.h_larmor_frq),
        };

        let long_names: BTreeMap<ParameterKind, ParameterName> = ParameterKind::ALL
            .into_iter()
            .map(|kind| (kind, long_name_for(kind, &par, &nucleus_name_1, &nucleus_name_2)))
            .collect();

        let names_with_role = |role: Role| -> BTreeSet<ParameterName> {
            long_names
                .iter()
                .filter(|(kind, _)| kind.role() == role)
                .map(|(_, name)| name.clone())
                .collect()
        };
        let fitting_parameter_names = names_with_role(Role::Fitted);
        let fixed_parameter_names = names_with_role(Role::Fixed);

        let calc = make_calc_observable(&par);

        Ok(Self {
            val,
            err,
            ppm_to_rads: calc.ppm_to_rads,
            ncyc: par.ncyc,
            par,
            nucleus_name_1,
            nucleus_name_2,
            profile_id,
            cal: None,
            long_names,
            fitting_parameter_names,
            fixed_parameter_names,
            calc,
        })
    }

    /// Build a data point from raw text metadata.
    pub fn from_raw<K, V>(val: f64, err: f64, raw: &BTreeMap<K, V>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let par = ExperimentParameters::from_raw(raw)?;
        Self::new(val, err, par)
    }

    pub fn ncyc(&self) -> u32 {
        self.ncyc
    }

    pub fn long_name(&self, kind: ParameterKind) -> Option<&ParameterName> {
        self.long_names.get(&kind)
    }

    /// `(short, long)` name pairs for every parameter of this point.
    pub fn short_long_par_names(&self) -> impl Iterator<Item = (ParameterKind, &ParameterName)> {
        self.long_names.iter().map(|(kind, name)| (*kind, name))
    }

    pub fn fitting_parameter_names(&self) -> &BTreeSet<ParameterName> {
        &self.fitting_parameter_names
    }

    pub fn fixed_parameter_names(&self) -> &BTreeSet<ParameterName> {
        &self.fixed_parameter_names
    }

    pub fn back_calculation(&self) -> &BackCalculation {
        &self.calc
    }

    /// Resolve this point's parameters from `values`, defaulting what is absent.
    pub fn exchange_parameters(&self, values: &ParameterValues) -> ExchangeParameters {
        let mut params = ExchangeParameters::default();
        for (kind, name) in &self.long_names {
            match values.get(name) {
                Some(v) => params.set(*kind, v),
                None => debug!(parameter = %name, default = kind.default_value(), "using default"),
            }
        }
        params
    }

    /// Back-calculated intensity for `values`.
    pub fn calc_observable(&self, values: &ParameterValues) -> Result<f64> {
        let params = self.exchange_parameters(values);
        self.calc.calc_observable(&params, self.ncyc)
    }

    /// Back-calculate and cache the result in `cal`.
    pub fn update_cal(&mut self, values: &ParameterValues) -> Result<f64> {
        let cal = self.calc_observable(values)?;
        self.cal = Some(cal);
        Ok(cal)
    }

    /// Normalized residual `(val - cal) / err`.
    pub fn residual(&mut self, values: &ParameterValues) -> Result<f64> {
        let cal = self.update_cal(values)?;
        Ok((self.val - cal) / self.err)
    }
}

fn long_name_for(kind: ParameterKind, par: &ExperimentParameters, n1: &str, n2: &str) -> ParameterName {
    let nucleus = |n: &str| Qualifier::Nucleus(n.to_string());
    let t = Qualifier::Temperature(Quantity::new(par.temperature));
    let b0 = Qualifier::Field(Quantity::new(par.h_larmor_frq));

    let qualifiers = match kind {
        ParameterKind::Pb | ParameterKind::Kex => vec![t],
        ParameterKind::Dw => vec![nucleus(n2)],
        ParameterKind::Cs => vec![nucleus(n2), t],
        ParameterKind::I0 => vec![
            Qualifier::Resonance(par.resonance_id.clone()),
            Qualifier::Experiment(par.experiment_name.clone()),
        ],
        ParameterKind::RHxy | ParameterKind::DrHxy => vec![nucleus(n2), b0, t],
        ParameterKind::RNz | ParameterKind::EtaXy | ParameterKind::EtaZ => vec![nucleus(n1), b0, t],
        ParameterKind::R2HzNz => vec![nucleus(n1), nucleus(n2), b0, t],
        ParameterKind::JHn | ParameterKind::DjHn => vec![nucleus(n1), nucleus(n2), t],
    };

    ParameterName::new(kind, qualifiers)
}

impl fmt::Display for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6} {:6.1} {:>6} {:4} {:4.1} {:8.5} {:8.5}",
            self.par.resonance_id,
            self.par.h_larmor_frq,
            fmt_sci(self.par.time_t2, 1),
            self.par.ncyc,
            self.par.temperature,
            self.val,
            self.err,
        )?;
        if let Some(cal) = self.cal {
            write!(f, " {cal:8.3}")?;
        }
        Ok(())
    }
}
