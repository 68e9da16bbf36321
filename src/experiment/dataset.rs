//! Collections of data points: the surface a fitting engine evaluates.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::domain::{ParameterName, ParameterValues, ProfileKey};
use crate::error::Result;
use crate::experiment::DataPoint;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    points: Vec<DataPoint>,
}

impl Dataset {
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: DataPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn fitting_parameter_names(&self) -> BTreeSet<ParameterName> {
        self.points
            .iter()
            .flat_map(|p| p.fitting_parameter_names().iter().cloned())
            .collect()
    }

    pub fn fixed_parameter_names(&self) -> BTreeSet<ParameterName> {
        self.points
            .iter()
            .flat_map(|p| p.fixed_parameter_names().iter().cloned())
            .collect()
    }

    /// Points grouped by profile, each group sorted by `ncyc`.
    pub fn profiles(&self) -> BTreeMap<ProfileKey, Vec<&DataPoint>> {
        let mut groups: BTreeMap<ProfileKey, Vec<&DataPoint>> = BTreeMap::new();
        for point in &self.points {
            groups.entry(point.profile_id.clone()).or_default().push(point);
        }
        for group in groups.values_mut() {
            group.sort_by_key(|p| p.ncyc());
        }
        groups
    }

    /// Normalized residuals of every point, in insertion order.
    ///
    /// Each point's `cal` is refreshed as a side effect.
    pub fn residuals(&mut self, values: &ParameterValues) -> Result<Vec<f64>> {
        self.points
            .par_iter_mut()
            .map(|point| point.residual(values))
            .collect()
    }

    /// Sum of squared normalized residuals.
    pub fn chi2(&mut self, values: &ParameterValues) -> Result<f64> {
        Ok(self.residuals(values)?.iter().map(|r| r * r).sum())
    }
}

impl FromIterator<DataPoint> for Dataset {
    fn from_iter<I: IntoIterator<Item = DataPoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExperimentParameters, ParameterKind};

    fn point(resonance_id: &str, ncyc: u32, val: f64) -> DataPoint {
        let par = ExperimentParameters {
            resonance_id: resonance_id.to_string(),
            h_larmor_frq: 800.0,
            temperature: 15.0,
            carrier: 8.0,
            time_t2: 0.03,
            pw: 0.0,
            time_equil: 0.0,
            ncyc,
            experiment_name: "hn_ap_800".to_string(),
        };
        DataPoint::new(val, 0.05, par).unwrap()
    }

    #[test]
    fn profiles_group_and_sort_by_ncyc() {
        let data: Dataset = [
            point("A10N-H", 8, 0.6),
            point("A11N-H", 0, 1.0),
            point("A10N-H", 0, 1.0),
            point("A10N-H", 2, 0.5),
        ]
        .into_iter()
        .collect();

        let profiles = data.profiles();
        assert_eq!(profiles.len(), 2);
        let a10: Vec<u32> = profiles
            .iter()
            .find(|(key, _)| key.nucleus == "A10H")
            .map(|(_, pts)| pts.iter().map(|p| p.ncyc()).collect())
            .unwrap();
        assert_eq!(a10, vec![0, 2, 8]);
    }

    #[test]
    fn global_parameters_are_shared_across_residues() {
        let data = Dataset::new(vec![point("A10N-H", 1, 0.9), point("A11N-H", 1, 0.9)]);
        let fitted = data.fitting_parameter_names();
        // pb and kex are shared; dw, i0 and r_hxy are per residue.
        assert_eq!(fitted.len(), 2 + 3 * 2);
        assert_eq!(
            fitted.iter().filter(|n| n.kind == ParameterKind::Kex).count(),
            1
        );
        assert_eq!(data.fixed_parameter_names().len(), 8 * 2);
    }

    #[test]
    fn chi2_vanishes_at_the_generating_values() {
        let mut data = Dataset::new(vec![point("A10N-H", 0, 1.0), point("A10N-H", 0, 1.1)]);
        let i0 = data.points()[0].long_name(ParameterKind::I0).unwrap().clone();

        let values: ParameterValues = [(i0, 1.0)].into_iter().collect();
        let residuals = data.residuals(&values).unwrap();
        assert!(residuals[0].abs() < 1e-12);
        assert!((residuals[1] - 2.0).abs() < 1e-9);
        assert!((data.chi2(&values).unwrap() - 4.0).abs() < 1e-9);
        assert!(data.points().iter().all(|p| p.cal.is_some()));
    }
}
