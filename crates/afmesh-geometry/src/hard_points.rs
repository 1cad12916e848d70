// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hard point registry and panel partition

use crate::diagnostics::Diagnostic;
use afmesh_model::{HardPoint, Panel};

/// Two hard points closer than this are the same point
pub const HARD_POINT_TOLERANCE: f64 = 1e-9;

/// Sorted, named set of mandatory parametric break points
///
/// Always holds `t = 0` and `t = 1`. Panels are derived on demand from
/// consecutive entries.
#[derive(Debug, Clone)]
pub struct HardPointRegistry {
    points: Vec<HardPoint>,
    next_default: usize,
}

impl HardPointRegistry {
    /// Create a registry holding only the two profile ends, `t0` and `t1`
    pub fn new() -> Self {
        Self {
            points: vec![HardPoint::new(0.0, "t0"), HardPoint::new(1.0, "t1")],
            next_default: 2,
        }
    }

    /// Insert a hard point, keeping the set sorted
    ///
    /// Returns the insertion index, or the diagnostic explaining why `t` was
    /// rejected (not finite, outside [0, 1], or a duplicate within
    /// [`HARD_POINT_TOLERANCE`]). Without a name, `hp_<n>` is assigned; a
    /// name already in use gets a numeric suffix.
    pub fn insert(&mut self, t: f64, name: Option<&str>) -> Result<usize, Diagnostic> {
        if !(t.is_finite() && (0.0..=1.0).contains(&t)) {
            return Err(Diagnostic::HardPointOutOfRange { t });
        }
        if let Some(existing) = self.find(t) {
            return Err(Diagnostic::DuplicateHardPoint {
                t,
                existing: existing.name.clone(),
            });
        }

        let name = match name {
            Some(name) => self.unique_name(name),
            None => {
                let name = self.unique_name(&format!("hp_{}", self.next_default));
                self.next_default += 1;
                name
            }
        };

        let index = self.points.partition_point(|hp| hp.t < t);
        self.points.insert(index, HardPoint::new(t, name));
        Ok(index)
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.points.iter().any(|hp| hp.name == base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !self.points.iter().any(|hp| hp.name == *candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Hard points sorted by `t`
    pub fn as_slice(&self) -> &[HardPoint] {
        &self.points
    }

    /// Parametric values sorted ascending
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|hp| hp.t).collect()
    }

    /// Hard point within tolerance of `t`
    pub fn find(&self, t: f64) -> Option<&HardPoint> {
        self.points
            .iter()
            .find(|hp| (hp.t - t).abs() <= HARD_POINT_TOLERANCE)
    }

    /// Name of the hard point at `t`
    pub fn name_of(&self, t: f64) -> Option<&str> {
        self.find(t).map(|hp| hp.name.as_str())
    }

    /// Panels between consecutive hard points
    pub fn panels(&self) -> Vec<Panel> {
        self.points
            .windows(2)
            .enumerate()
            .map(|(index, w)| Panel::new(index, w[0].t, w[1].t))
            .collect()
    }
}

impl Default for HardPointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_ends() {
        let registry = HardPointRegistry::new();
        assert_eq!(registry.values(), vec![0.0, 1.0]);
        assert_eq!(registry.name_of(0.0), Some("t0"));
        assert_eq!(registry.name_of(1.0), Some("t1"));
        assert_eq!(registry.panels(), vec![Panel::new(0, 0.0, 1.0)]);
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut registry = HardPointRegistry::new();
        assert_eq!(registry.insert(0.7, None), Ok(1));
        assert_eq!(registry.insert(0.3, Some("spar_t1")), Ok(1));
        assert_eq!(registry.values(), vec![0.0, 0.3, 0.7, 1.0]);
        assert_eq!(registry.name_of(0.7), Some("hp_2"));
        assert_eq!(registry.name_of(0.3), Some("spar_t1"));
    }

    #[test]
    fn test_rejections() {
        let mut registry = HardPointRegistry::new();
        assert_eq!(
            registry.insert(1.2, None),
            Err(Diagnostic::HardPointOutOfRange { t: 1.2 })
        );
        assert!(matches!(
            registry.insert(f64::NAN, None),
            Err(Diagnostic::HardPointOutOfRange { .. })
        ));
        registry.insert(0.5, None).unwrap();
        assert_eq!(
            registry.insert(0.5 + 1e-12, None),
            Err(Diagnostic::DuplicateHardPoint {
                t: 0.5 + 1e-12,
                existing: "hp_2".into()
            })
        );
        assert_eq!(registry.as_slice().len(), 3);
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let mut registry = HardPointRegistry::new();
        registry.insert(0.2, Some("web")).unwrap();
        registry.insert(0.4, Some("web")).unwrap();
        assert_eq!(registry.name_of(0.4), Some("web_2"));
    }

    #[test]
    fn test_panels_partition_unit_interval() {
        let mut registry = HardPointRegistry::new();
        for t in [0.9, 0.1, 0.45, 0.5] {
            registry.insert(t, None).unwrap();
        }
        let panels = registry.panels();
        assert_eq!(panels.len(), registry.as_slice().len() - 1);
        assert_eq!(panels[0].t_start, 0.0);
        assert_eq!(panels.last().unwrap().t_end, 1.0);
        for pair in panels.windows(2) {
            assert_eq!(pair[0].t_end, pair[1].t_start);
        }
        let total: f64 = panels.iter().map(Panel::length).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
