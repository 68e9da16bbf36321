//! Raw metadata conversion.
//!
//! Experiment readers hand over each data point's metadata as a text map
//! (`name -> value`). This module turns it into a typed `ExperimentParameters`:
//!
//! - **Strict schema** for required fields (clear errors naming the field)
//! - **Case-insensitive keys**, trimmed values
//! - **Physical checks** on timing after conversion

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::domain::ExperimentParameters;
use crate::error::{Error, Result};

/// String-typed fields.
pub const STR_FIELDS: [&str; 2] = ["resonance_id", "experiment_name"];
/// Float-typed fields.
pub const FLOAT_FIELDS: [&str; 6] = [
    "h_larmor_frq",
    "temperature",
    "carrier",
    "time_t2",
    "pw",
    "time_equil",
];
/// Integer-typed fields.
pub const INT_FIELDS: [&str; 1] = ["ncyc"];

impl ExperimentParameters {
    /// Convert a raw text map into typed parameters and validate the timing.
    pub fn from_raw<K, V>(raw: &BTreeMap<K, V>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = normalize_keys(raw);

        for key in fields.keys() {
            let key = key.as_str();
            let known = STR_FIELDS.contains(&key)
                || FLOAT_FIELDS.contains(&key)
                || INT_FIELDS.contains(&key);
            if !known {
                debug!(field = %key, "ignoring unknown experiment parameter");
            }
        }

        let par = ExperimentParameters {
            resonance_id: get_required(&fields, "resonance_id")?.to_string(),
            h_larmor_frq: parse_f64(&fields, "h_larmor_frq")?,
            temperature: parse_f64(&fields, "temperature")?,
            carrier: parse_f64(&fields, "carrier")?,
            time_t2: parse_f64(&fields, "time_t2")?,
            pw: parse_f64(&fields, "pw")?,
            time_equil: parse_f64(&fields, "time_equil")?,
            ncyc: parse_u32(&fields, "ncyc")?,
            experiment_name: get_required(&fields, "experiment_name")?.to_string(),
        };

        par.validate()?;
        Ok(par)
    }

    /// Check physical constraints that the type conversion cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.resonance_id.trim().is_empty() {
            return Err(Error::MissingField("resonance_id".to_string()));
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;

        ensure(positive(self.h_larmor_frq), "h_larmor_frq", self.h_larmor_frq, "must be > 0")?;
        ensure(self.temperature.is_finite(), "temperature", self.temperature, "must be finite")?;
        ensure(self.carrier.is_finite(), "carrier", self.carrier, "must be finite")?;
        ensure(positive(self.time_t2), "time_t2", self.time_t2, "must be > 0")?;
        ensure(non_negative(self.pw), "pw", self.pw, "must be >= 0")?;
        ensure(non_negative(self.time_equil), "time_equil", self.time_equil, "must be >= 0")?;

        if self.ncyc > 0 {
            let quarter = self.time_t2 / (4.0 * f64::from(self.ncyc));
            if quarter < self.pw {
                return Err(Error::InvalidTiming(format!(
                    "ncyc={} leaves {:.3e} s per quarter cycle, shorter than pw={:.3e} s",
                    self.ncyc, quarter, self.pw
                )));
            }
        }

        Ok(())
    }
}

fn ensure(ok: bool, field: &str, value: f64, reason: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        })
    }
}

fn normalize_keys<K, V>(raw: &BTreeMap<K, V>) -> HashMap<String, String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    raw.iter()
        .map(|(k, v)| (k.as_ref().trim().to_ascii_lowercase(), v.as_ref().trim().to_string()))
        .collect()
}

fn get_required<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    fields
        .get(name)
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MissingField(name.to_string()))
}

fn parse_f64(fields: &HashMap<String, String>, name: &str) -> Result<f64> {
    let raw = get_required(fields, name)?;
    let value = raw.parse::<f64>().map_err(|e| Error::InvalidField {
        field: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !value.is_finite() {
        return Err(Error::InvalidField {
            field: name.to_string(),
            value: raw.to_string(),
            reason: "not a finite number".to_string(),
        });
    }
    Ok(value)
}

fn parse_u32(fields: &HashMap<String, String>, name: &str) -> Result<u32> {
    let raw = get_required(fields, name)?;
    raw.parse::<u32>().map_err(|e| Error::InvalidField {
        field: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> BTreeMap<&'static str, &'static str> {
        BTreeMap::from([
            ("resonance_id", "G23N-H"),
            ("h_larmor_frq", "600.0"),
            ("temperature", "25.0"),
            ("carrier", "8.3"),
            ("time_t2", "0.04"),
            ("pw", "10e-6"),
            ("time_equil", "0.0"),
            ("ncyc", "4"),
            ("experiment_name", "cpmg_hn_ap_600"),
        ])
    }

    #[test]
    fn converts_all_fields() {
        let par = ExperimentParameters::from_raw(&raw()).unwrap();
        assert_eq!(par.resonance_id, "G23N-H");
        assert_eq!(par.ncyc, 4);
        assert!((par.h_larmor_frq - 600.0).abs() < 1e-12);
        assert!((par.pw - 1e-5).abs() < 1e-15);
        assert_eq!(par.experiment_name, "cpmg_hn_ap_600");
    }

    #[test]
    fn keys_are_case_insensitive() {
        let mut map: BTreeMap<String, String> = raw()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let v = map.remove("ncyc").unwrap();
        map.insert(" NCYC ".to_string(), format!(" {v} "));
        let par = ExperimentParameters::from_raw(&map).unwrap();
        assert_eq!(par.ncyc, 4);
    }

    #[test]
    fn missing_field_is_reported() {
        let mut map = raw();
        map.remove("time_t2");
        let err = ExperimentParameters::from_raw(&map).unwrap_err();
        assert_eq!(err, Error::MissingField("time_t2".to_string()));
    }

    #[test]
    fn non_integer_ncyc_is_rejected() {
        let mut map = raw();
        map.insert("ncyc", "2.5");
        let err = ExperimentParameters::from_raw(&map).unwrap_err();
        assert!(matches!(err, Error::InvalidField { ref field, .. } if field == "ncyc"));
    }

    #[test]
    fn pulse_longer_than_quarter_cycle_is_rejected() {
        let mut map = raw();
        map.insert("ncyc", "2000");
        let err = ExperimentParameters::from_raw(&map).unwrap_err();
        assert!(matches!(err, Error::InvalidTiming(_)));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for (field, text) in [("carrier", "nan"), ("time_t2", "inf"), ("temperature", "-inf")] {
            let mut map = raw();
            map.insert(field, text);
            let err = ExperimentParameters::from_raw(&map).unwrap_err();
            assert!(
                matches!(err, Error::InvalidField { field: ref f, .. } if f == field),
                "{field}={text}: {err:?}"
            );
        }
    }

    #[test]
    fn pulse_filling_the_quarter_cycle_is_accepted() {
        // 0.04 s / (4 * 2) is exactly 5 ms.
        let mut map = raw();
        map.insert("ncyc", "2");
        map.insert("pw", "0.005");
        let par = ExperimentParameters::from_raw(&map).unwrap();
        assert_eq!(par.ncyc, 2);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut map = raw();
        map.insert("spectrometer", "Bruker AV-III");
        map.insert("comment", "");
        let with_extra = ExperimentParameters::from_raw(&map).unwrap();
        let plain = ExperimentParameters::from_raw(&raw()).unwrap();
        assert_eq!(with_extra, plain);
    }

    #[test]
    fn reference_plane_skips_timing_check() {
        let mut map = raw();
        map.insert("ncyc", "0");
        map.insert("pw", "1.0");
        let par = ExperimentParameters::from_raw(&map).unwrap();
        assert_eq!(par.ncyc, 0);
    }
}
