//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - built from raw experiment metadata
//! - used in-memory while a fitting engine evaluates residuals
//! - printed or exported as JSON by the CLI

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-point experimental metadata after type conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParameters {
    pub resonance_id: String,
    /// 1H Larmor frequency (MHz).
    pub h_larmor_frq: f64,
    /// Sample temperature (°C).
    pub temperature: f64,
    /// 1H carrier position (ppm).
    pub carrier: f64,
    /// Constant CPMG relaxation delay (s).
    pub time_t2: f64,
    /// 1H 90° pulse width (s).
    pub pw: f64,
    /// Z-filter equilibration delay (s).
    pub time_equil: f64,
    /// Number of CPMG cycles; `0` is the reference plane.
    pub ncyc: u32,
    pub experiment_name: String,
}

/// One group of a parsed assignment, e.g. `G23N` → `(23, "G", "N")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resonance {
    pub index: u32,
    pub residue_type: String,
    pub nucleus_type: String,
}

impl Resonance {
    /// Residue type, index and nucleus type concatenated (`G23H`).
    pub fn nucleus_name(&self) -> String {
        format!("{}{}{}", self.residue_type, self.index, self.nucleus_type)
    }

    /// Element symbol, taken from the first letter of the nucleus type.
    pub fn element(&self) -> char {
        self.nucleus_type.chars().next().unwrap_or('?')
    }
}

/// Whether a parameter is varied by the fitting engine or held constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Fitted,
    Fixed,
}

/// Physical parameters of the HN anti-phase CPMG back-calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Pb,
    Kex,
    Dw,
    Cs,
    I0,
    RHxy,
    DrHxy,
    RNz,
    R2HzNz,
    EtaXy,
    EtaZ,
    JHn,
    DjHn,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 13] = [
        ParameterKind::Pb,
        ParameterKind::Kex,
        ParameterKind::Dw,
        ParameterKind::Cs,
        ParameterKind::I0,
        ParameterKind::RHxy,
        ParameterKind::DrHxy,
        ParameterKind::RNz,
        ParameterKind::R2HzNz,
        ParameterKind::EtaXy,
        ParameterKind::EtaZ,
        ParameterKind::JHn,
        ParameterKind::DjHn,
    ];

    /// Parameters varied by the fitting engine.
    pub const FIT: [ParameterKind; 5] = [
        ParameterKind::Pb,
        ParameterKind::Kex,
        ParameterKind::Dw,
        ParameterKind::I0,
        ParameterKind::RHxy,
    ];

    /// Parameters held constant.
    pub const FIX: [ParameterKind; 8] = [
        ParameterKind::RNz,
        ParameterKind::DrHxy,
        ParameterKind::R2HzNz,
        ParameterKind::EtaXy,
        ParameterKind::EtaZ,
        ParameterKind::Cs,
        ParameterKind::JHn,
        ParameterKind::DjHn,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            ParameterKind::Pb => "pb",
            ParameterKind::Kex => "kex",
            ParameterKind::Dw => "dw",
            ParameterKind::Cs => "cs",
            ParameterKind::I0 => "i0",
            ParameterKind::RHxy => "r_hxy",
            ParameterKind::DrHxy => "dr_hxy",
            ParameterKind::RNz => "r_nz",
            ParameterKind::R2HzNz => "r_2hznz",
            ParameterKind::EtaXy => "etaxy",
            ParameterKind::EtaZ => "etaz",
            ParameterKind::JHn => "j_hn",
            ParameterKind::DjHn => "dj_hn",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.short_name() == name)
    }

    pub fn role(self) -> Role {
        if Self::FIT.contains(&self) {
            Role::Fitted
        } else {
            Role::Fixed
        }
    }

    /// Value used by the back-calculation when none is supplied.
    pub fn default_value(self) -> f64 {
        ExchangeParameters::default().get(self)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A float qualifier compared at 1e-3 resolution so it can key ordered maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Quantity(i64);

impl Quantity {
    const SCALE: f64 = 1000.0;

    pub fn new(value: f64) -> Self {
        Quantity((value * Self::SCALE).round() as i64)
    }

    pub fn value(self) -> f64 {
        self.0 as f64 / Self::SCALE
    }
}

/// Prints at the comparison resolution, trailing zeros trimmed (`25.0`, `25.04`).
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = format!("{:.3}", self.value());
        let trimmed = text.trim_end_matches('0');
        if trimmed.ends_with('.') {
            write!(f, "{trimmed}0")
        } else {
            f.write_str(trimmed)
        }
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Quantity::new(value)
    }
}

impl From<Quantity> for f64 {
    fn from(value: Quantity) -> Self {
        value.value()
    }
}

/// One component of a long parameter name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    Nucleus(String),
    Resonance(String),
    Experiment(String),
    Field(Quantity),
    Temperature(Quantity),
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Nucleus(name) | Qualifier::Resonance(name) | Qualifier::Experiment(name) => {
                f.write_str(name)
            }
            Qualifier::Field(b0) => write!(f, "B0={b0}"),
            Qualifier::Temperature(t) => write!(f, "T={t}"),
        }
    }
}

/// Long parameter name: the short name plus the chemical identity it is keyed by.
///
/// Two data points that share a long name share one parameter value, e.g. all
/// points recorded at 25 °C see the same `kex(T=25.0)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParameterName {
    pub kind: ParameterKind,
    pub qualifiers: Vec<Qualifier>,
}

impl ParameterName {
    pub fn new(kind: ParameterKind, qualifiers: Vec<Qualifier>) -> Self {
        Self { kind, qualifiers }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.qualifiers.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.kind, parts.join(", "))
    }
}

/// Identity of a dispersion profile: `(temperature, proton nucleus, field)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileKey {
    pub temperature: Quantity,
    pub nucleus: String,
    pub h_larmor_frq: Quantity,
}

impl fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} MHz, {} C",
            self.nucleus, self.h_larmor_frq, self.temperature
        )
    }
}

/// Parameter values keyed by long name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterValues {
    values: BTreeMap<ParameterName, f64>,
}

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: ParameterName, value: f64) -> Option<f64> {
        self.values.insert(name, value)
    }

    pub fn get(&self, name: &ParameterName) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParameterName, f64)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }
}

impl FromIterator<(ParameterName, f64)> for ParameterValues {
    fn from_iter<I: IntoIterator<Item = (ParameterName, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Resolved inputs of the back-calculation, one field per `ParameterKind`.
///
/// Rates are in s⁻¹, `dw`/`cs` in ppm and couplings in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeParameters {
    pub pb: f64,
    pub kex: f64,
    pub dw: f64,
    pub cs: f64,
    pub i0: f64,
    pub r_hxy: f64,
    pub dr_hxy: f64,
    pub r_nz: f64,
    pub r_2hznz: f64,
    pub etaxy: f64,
    pub etaz: f64,
    pub j_hn: f64,
    pub dj_hn: f64,
}

impl Default for ExchangeParameters {
    fn default() -> Self {
        Self {
            pb: 0.0,
            kex: 0.0,
            dw: 0.0,
            cs: 0.0,
            i0: 1.0,
            r_hxy: 10.0,
            dr_hxy: 0.0,
            r_nz: 1.5,
            r_2hznz: 5.0,
            etaxy: 0.0,
            etaz: 0.0,
            j_hn: -93.0,
            dj_hn: 0.0,
        }
    }
}

impl ExchangeParameters {
    pub fn get(&self, kind: ParameterKind) -> f64 {
        match kind {
            ParameterKind::Pb => self.pb,
            ParameterKind::Kex => self.kex,
            ParameterKind::Dw => self.dw,
            ParameterKind::Cs => self.cs,
            ParameterKind::I0 => self.i0,
            ParameterKind::RHxy => self.r_hxy,
            ParameterKind::DrHxy => self.dr_hxy,
            ParameterKind::RNz => self.r_nz,
            ParameterKind::R2HzNz => self.r_2hznz,
            ParameterKind::EtaXy => self.etaxy,
            ParameterKind::EtaZ => self.etaz,
            ParameterKind::JHn => self.j_hn,
            ParameterKind::DjHn => self.dj_hn,
        }
    }

    pub fn set(&mut self, kind: ParameterKind, value: f64) {
        let slot = match kind {
            ParameterKind::Pb => &mut self.pb,
            ParameterKind::Kex => &mut self.kex,
            ParameterKind::Dw => &mut self.dw,
            ParameterKind::Cs => &mut self.cs,
            ParameterKind::I0 => &mut self.i0,
            ParameterKind::RHxy => &mut self.r_hxy,
            ParameterKind::DrHxy => &mut self.dr_hxy,
            ParameterKind::RNz => &mut self.r_nz,
            ParameterKind::R2HzNz => &mut self.r_2hznz,
            ParameterKind::EtaXy => &mut self.etaxy,
            ParameterKind::EtaZ => &mut self.etaz,
            ParameterKind::JHn => &mut self.j_hn,
            ParameterKind::DjHn => &mut self.dj_hn,
        };
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_partition_all_parameters() {
        let fitted = ParameterKind::ALL
            .iter()
            .filter(|k| k.role() == Role::Fitted)
            .count();
        let fixed = ParameterKind::ALL
            .iter()
            .filter(|k| k.role() == Role::Fixed)
            .count();
        assert_eq!(fitted, ParameterKind::FIT.len());
        assert_eq!(fixed, ParameterKind::FIX.len());
        assert_eq!(fitted + fixed, ParameterKind::ALL.len());
    }

    #[test]
    fn short_names_round_trip() {
        for kind in ParameterKind::ALL {
            assert_eq!(ParameterKind::from_short_name(kind.short_name()), Some(kind));
        }
        assert_eq!(ParameterKind::from_short_name(" R_HXY "), Some(ParameterKind::RHxy));
        assert!(ParameterKind::from_short_name("r1").is_none());
    }

    #[test]
    fn quantity_compares_at_millis() {
        assert_eq!(Quantity::new(25.0), Quantity::new(25.0004));
        assert_ne!(Quantity::new(25.0), Quantity::new(25.01));
        assert!((Quantity::new(599.9).value() - 599.9).abs() < 1e-9);
    }

    #[test]
    fn distinct_quantities_print_distinctly() {
        assert_eq!(Quantity::new(25.0).to_string(), "25.0");
        assert_eq!(Quantity::new(25.04).to_string(), "25.04");
        assert_eq!(Quantity::new(600.13).to_string(), "600.13");
        assert_eq!(Quantity::new(-5.0).to_string(), "-5.0");

        let t = |v| Qualifier::Temperature(Quantity::new(v)).to_string();
        assert_ne!(t(25.0), t(25.04));
        assert_eq!(t(25.04), "T=25.04");
    }

    #[test]
    fn parameter_name_display() {
        let name = ParameterName::new(
            ParameterKind::RHxy,
            vec![
                Qualifier::Nucleus("G23H".to_string()),
                Qualifier::Field(Quantity::new(600.0)),
                Qualifier::Temperature(Quantity::new(25.0)),
            ],
        );
        assert_eq!(name.to_string(), "r_hxy(G23H, B0=600.0, T=25.0)");
    }

    #[test]
    fn exchange_parameters_get_set() {
        let mut p = ExchangeParameters::default();
        p.set(ParameterKind::Kex, 450.0);
        assert_eq!(p.get(ParameterKind::Kex), 450.0);
        assert_eq!(ParameterKind::I0.default_value(), 1.0);
    }
}
