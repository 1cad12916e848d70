// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remeshing engine
//!
//! Turns a panel partition and one discretization policy into a parametric
//! sample sequence. Every branch ends in [`merge_with_hard_points`], so hard
//! points survive any policy.
//!
//! Policies are resolved in a fixed priority order when a request carries
//! several:
//!
//! 1. explicit per-panel element counts (dense or sparse)
//! 2. explicit global `t` distribution
//! 3. total point count
//! 4. target element length
//! 5. relative refinement per panel
//! 6. nothing: keep the current samples

use crate::diagnostics::{Diagnostic, Report};
use crate::error::{Error, Result};
use afmesh_model::{ChordwiseConfig, Panel};
use rustc_hash::FxHashMap;

/// Minimum number of points a refined panel receives
pub const MIN_REFINED_POINTS: usize = 10;

/// Candidates closer than this to a kept sample are merged into it
pub const MERGE_TOLERANCE: f64 = 1e-12;

/// Largest number of samples a single remesh may generate
pub const MAX_SAMPLES: usize = 10_000_000;

/// Convert a requested sample count, rejecting anything above [`MAX_SAMPLES`]
fn bounded_count(count: f64, source: &str) -> Result<usize> {
    if count.is_finite() && count <= MAX_SAMPLES as f64 {
        Ok(count.max(0.0) as usize)
    } else {
        Err(Error::invalid_parameter(format!(
            "{} requests {} samples, above the limit of {}",
            source, count, MAX_SAMPLES
        )))
    }
}

/// Element counts per panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelElements {
    /// One count per panel, in panel order
    Dense(Vec<usize>),
    /// Counts keyed by panel index; absent panels get one element
    Sparse(FxHashMap<usize, usize>),
}

/// Discretization policy after priority resolution
#[derive(Debug, Clone, PartialEq)]
pub enum RemeshPolicy {
    PerPanel(PanelElements),
    Distribution(Vec<f64>),
    TotalPoints(usize),
    ElementLength(f64),
    Refinement(FxHashMap<usize, f64>),
    Keep,
}

impl RemeshPolicy {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            RemeshPolicy::PerPanel(_) => "per-panel",
            RemeshPolicy::Distribution(_) => "distribution",
            RemeshPolicy::TotalPoints(_) => "total-points",
            RemeshPolicy::ElementLength(_) => "element-length",
            RemeshPolicy::Refinement(_) => "refinement",
            RemeshPolicy::Keep => "keep",
        }
    }
}

/// Remesh request with any combination of policies
///
/// # Example
///
/// ```ignore
/// let request = RemeshRequest::new().with_total_points(120);
/// profile.remesh(request)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemeshRequest {
    pub panel_elements: Option<PanelElements>,
    pub t_distribution: Option<Vec<f64>>,
    pub total_points: Option<usize>,
    pub element_length: Option<f64>,
    pub relative_refinement: Option<FxHashMap<usize, f64>>,
}

impl RemeshRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Element counts for every panel, in panel order
    pub fn with_panel_elements(mut self, counts: Vec<usize>) -> Self {
        self.panel_elements = Some(PanelElements::Dense(counts));
        self
    }

    /// Element counts for some panels
    pub fn with_sparse_panel_elements(
        mut self,
        counts: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        self.panel_elements = Some(PanelElements::Sparse(counts.into_iter().collect()));
        self
    }

    /// Use these parametric values verbatim
    pub fn with_distribution(mut self, t_values: Vec<f64>) -> Self {
        self.t_distribution = Some(t_values);
        self
    }

    /// Share this many points between the panels
    pub fn with_total_points(mut self, total: usize) -> Self {
        self.total_points = Some(total);
        self
    }

    /// Target element length in posed units
    pub fn with_element_length(mut self, length: f64) -> Self {
        self.element_length = Some(length);
        self
    }

    /// Density multiplier for some panels
    pub fn with_refinement(mut self, factors: impl IntoIterator<Item = (usize, f64)>) -> Self {
        self.relative_refinement = Some(factors.into_iter().collect());
        self
    }

    /// Check whether no policy is requested
    pub fn is_empty(&self) -> bool {
        self.panel_elements.is_none()
            && self.t_distribution.is_none()
            && self.total_points.is_none()
            && self.element_length.is_none()
            && self.relative_refinement.is_none()
    }

    /// Pick the highest-priority policy present
    pub fn into_policy(self) -> RemeshPolicy {
        if let Some(elements) = self.panel_elements {
            RemeshPolicy::PerPanel(elements)
        } else if let Some(values) = self.t_distribution {
            RemeshPolicy::Distribution(values)
        } else if let Some(total) = self.total_points {
            RemeshPolicy::TotalPoints(total)
        } else if let Some(length) = self.element_length {
            RemeshPolicy::ElementLength(length)
        } else if let Some(factors) = self.relative_refinement {
            RemeshPolicy::Refinement(factors)
        } else {
            RemeshPolicy::Keep
        }
    }
}

impl From<&ChordwiseConfig> for RemeshRequest {
    fn from(config: &ChordwiseConfig) -> Self {
        let panel_elements = match (&config.n_elements_per_panel, &config.panel_elements) {
            (Some(dense), _) => Some(PanelElements::Dense(dense.clone())),
            (None, Some(sparse)) => Some(PanelElements::Sparse(
                sparse.iter().map(|(k, v)| (*k, *v)).collect(),
            )),
            (None, None) => None,
        };
        Self {
            panel_elements,
            t_distribution: config.t_distribution.clone(),
            total_points: config.total_points,
            element_length: config.element_length,
            relative_refinement: config
                .relative_refinement
                .as_ref()
                .map(|m| m.iter().map(|(k, v)| (*k, *v)).collect()),
        }
    }
}

/// `count` evenly spaced values from `start` to `stop`, both included
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            values[count - 1] = stop;
            values
        }
    }
}

/// Samples for explicit element counts per panel
///
/// Panel `i` with `n` elements contributes `n + 1` evenly spaced samples.
/// Zero counts are raised to one.
pub fn per_panel_samples(
    panels: &[Panel],
    elements: &PanelElements,
    report: &mut Report,
) -> Result<Vec<f64>> {
    let counts: Vec<usize> = match elements {
        PanelElements::Dense(counts) => {
            if counts.len() != panels.len() {
                return Err(Error::panel_count_mismatch(panels.len(), counts.len()));
            }
            counts.clone()
        }
        PanelElements::Sparse(map) => {
            let mut unknown: Vec<usize> = map
                .keys()
                .copied()
                .filter(|panel| *panel >= panels.len())
                .collect();
            unknown.sort_unstable();
            for panel in unknown {
                report.push(Diagnostic::UnknownPanel {
                    panel,
                    panel_count: panels.len(),
                });
            }
            (0..panels.len())
                .map(|i| map.get(&i).copied().unwrap_or(1))
                .collect()
        }
    };
    let requested: f64 = counts.iter().map(|n| (*n).max(1) as f64 + 1.0).sum();
    bounded_count(requested, "per-panel element counts")?;

    Ok(panels
        .iter()
        .zip(counts)
        .flat_map(|(panel, n)| linspace(panel.t_start, panel.t_end, n.max(1) + 1))
        .collect())
}

/// Keep the finite values inside [0, 1]; report the rest
pub fn distribution_samples(values: &[f64], report: &mut Report) -> Vec<f64> {
    let mut kept = Vec::with_capacity(values.len());
    for &t in values {
        if t.is_finite() && (0.0..=1.0).contains(&t) {
            kept.push(t);
        } else {
            report.push(Diagnostic::DistributionValueDropped { t });
        }
    }
    kept
}

/// Samples sharing `total` points between panels by parametric length
///
/// Each panel gets `round_half_even(length * (total - 1))` segments, at least
/// one. Rounding losses are handed back to the panels that lost the most, so
/// the result never has fewer than `total` points before the hard-point merge.
pub fn total_point_samples(
    panels: &[Panel],
    total: usize,
    report: &mut Report,
) -> Result<Vec<f64>> {
    if total < 2 {
        return Err(Error::invalid_parameter(format!(
            "total point count must be at least 2, got {}",
            total
        )));
    }
    bounded_count(total as f64, "total point count")?;
    let target = (total - 1) as f64;

    let mut segments = Vec::with_capacity(panels.len());
    let mut shortfall = Vec::with_capacity(panels.len());
    for panel in panels {
        let exact = panel.length() * target;
        let mut n = exact.round_ties_even() as usize;
        if n == 0 {
            report.push(Diagnostic::CoarsePanel {
                panel: panel.index,
                length: panel.length(),
            });
            n = 1;
        }
        shortfall.push(exact - n as f64);
        segments.push(n);
    }

    let allocated: usize = segments.iter().sum();
    let deficit = (total - 1).saturating_sub(allocated);
    if deficit > 0 && !panels.is_empty() {
        let mut order: Vec<usize> = (0..panels.len()).collect();
        order.sort_by(|a, b| shortfall[*b].total_cmp(&shortfall[*a]).then(a.cmp(b)));
        for k in 0..deficit {
            segments[order[k % order.len()]] += 1;
        }
    }

    Ok(panels
        .iter()
        .zip(segments)
        .flat_map(|(panel, n)| linspace(panel.t_start, panel.t_end, n + 1))
        .collect())
}

/// Samples uniform in `t` whose count follows a target element length
///
/// `arc_length` is the posed length of the whole profile. The point count is
/// `floor(arc_length / element_length)`, at most [`MAX_SAMPLES`].
pub fn element_length_samples(
    arc_length: f64,
    element_length: f64,
    report: &mut Report,
) -> Result<Vec<f64>> {
    if !(element_length.is_finite() && element_length > 0.0) {
        return Err(Error::invalid_parameter(format!(
            "element length must be positive and finite, got {}",
            element_length
        )));
    }
    if element_length > arc_length {
        report.push(Diagnostic::ElementLengthExceedsProfile {
            element_length,
            arc_length,
        });
    }
    let count = bounded_count((arc_length / element_length).floor(), "element length")?;
    Ok(linspace(0.0, 1.0, count))
}

/// Samples for per-panel density multipliers
///
/// Panel `i` gets `max(10, floor(base_count * factor_i / panel_count))`
/// evenly spaced points; panels absent from `factors` use a factor of one.
pub fn refinement_samples(
    panels: &[Panel],
    factors: &FxHashMap<usize, f64>,
    base_count: usize,
    report: &mut Report,
) -> Result<Vec<f64>> {
    if panels.is_empty() {
        return Ok(Vec::new());
    }
    let mut unknown: Vec<usize> = factors
        .keys()
        .copied()
        .filter(|panel| *panel >= panels.len())
        .collect();
    unknown.sort_unstable();
    for panel in unknown {
        report.push(Diagnostic::UnknownPanel {
            panel,
            panel_count: panels.len(),
        });
    }

    let mut shares = Vec::with_capacity(panels.len());
    for panel in panels {
        let factor = factors.get(&panel.index).copied().unwrap_or(1.0);
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::invalid_parameter(format!(
                "refinement factor for panel {} must be positive and finite, got {}",
                panel.index, factor
            )));
        }
        let share = (base_count as f64 * factor / panels.len() as f64).floor();
        shares.push(share.max(MIN_REFINED_POINTS as f64));
    }
    bounded_count(shares.iter().sum(), "refinement")?;

    Ok(panels
        .iter()
        .zip(shares)
        .flat_map(|(panel, share)| linspace(panel.t_start, panel.t_end, share as usize))
        .collect())
}

/// Panel factors implied by refining webs
///
/// `webs` holds `(t1, t2, factor)` for each web. A panel touched by several
/// webs takes the largest factor.
pub fn synthesize_refinement(panels: &[Panel], webs: &[(f64, f64, f64)]) -> FxHashMap<usize, f64> {
    let mut factors: FxHashMap<usize, f64> = FxHashMap::default();
    for &(t1, t2, factor) in webs {
        for panel in panels.iter().filter(|p| p.overlaps_span(t1, t2)) {
            factors
                .entry(panel.index)
                .and_modify(|f| *f = f.max(factor))
                .or_insert(factor);
        }
    }
    factors
}

/// Merge candidate samples with the hard points
///
/// Non-finite and out-of-range candidates are skipped. The result is sorted
/// and strictly increasing; hard points keep their exact values and absorb
/// candidates within [`MERGE_TOLERANCE`].
pub fn merge_with_hard_points<I>(candidates: I, hard_points: &[f64]) -> Vec<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut tagged: Vec<(f64, bool)> = hard_points.iter().map(|t| (*t, true)).collect();
    tagged.extend(
        candidates
            .into_iter()
            .filter(|t| t.is_finite() && (0.0..=1.0).contains(t))
            .map(|t| (t, false)),
    );
    tagged.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, bool)> = Vec::with_capacity(tagged.len());
    for (t, hard) in tagged {
        match merged.last_mut() {
            Some(last) if t - last.0 <= MERGE_TOLERANCE => {
                if hard && !last.1 {
                    *last = (t, true);
                }
            }
            _ => merged.push((t, hard)),
        }
    }
    merged.into_iter().map(|(t, _)| t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_panels() -> Vec<Panel> {
        vec![Panel::new(0, 0.0, 0.5), Panel::new(1, 0.5, 1.0)]
    }

    fn elements_in(samples: &[f64], panel: &Panel) -> usize {
        samples
            .windows(2)
            .filter(|w| panel.contains(w[0]))
            .count()
    }

    #[test]
    fn test_priority_order() {
        let request = RemeshRequest::new()
            .with_refinement([(0, 2.0)])
            .with_element_length(0.1)
            .with_total_points(40);
        assert!(matches!(request.clone().into_policy(), RemeshPolicy::TotalPoints(40)));

        let request = request.with_distribution(vec![0.2]).with_panel_elements(vec![3, 3]);
        assert!(matches!(request.into_policy(), RemeshPolicy::PerPanel(_)));

        assert_eq!(RemeshRequest::new().into_policy(), RemeshPolicy::Keep);
    }

    #[test]
    fn test_from_chordwise_config() {
        let mut config = ChordwiseConfig::default();
        config.panel_elements = Some([(0, 10), (1, 20)].into_iter().collect());
        config.total_points = Some(10);
        let request = RemeshRequest::from(&config);
        match request.into_policy() {
            RemeshPolicy::PerPanel(PanelElements::Sparse(map)) => {
                assert_eq!(map.get(&1), Some(&20));
            }
            other => panic!("unexpected policy {:?}", other),
        }
    }

    #[test]
    fn test_linspace_hits_ends() {
        let values = linspace(0.1, 0.7, 7);
        assert_eq!(values.len(), 7);
        assert_eq!(values[0], 0.1);
        assert_eq!(values[6], 0.7);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.3, 1.0, 1), vec![0.3]);
    }

    #[test]
    fn test_sparse_per_panel_counts() {
        let panels = two_panels();
        let mut report = Report::new();
        let elements = PanelElements::Sparse([(0, 10), (1, 20)].into_iter().collect());
        let samples = per_panel_samples(&panels, &elements, &mut report).unwrap();
        let merged = merge_with_hard_points(samples, &[0.0, 0.5, 1.0]);

        assert_eq!(elements_in(&merged, &panels[0]), 10);
        assert_eq!(elements_in(&merged, &panels[1]), 20);
        assert_eq!(merged.len(), 31);
        assert!(report.is_clean());
    }

    #[test]
    fn test_sparse_defaults_and_unknown_panels() {
        let panels = two_panels();
        let mut report = Report::new();
        let elements = PanelElements::Sparse([(1, 4), (7, 2)].into_iter().collect());
        let samples = per_panel_samples(&panels, &elements, &mut report).unwrap();
        let merged = merge_with_hard_points(samples, &[0.0, 0.5, 1.0]);

        assert_eq!(elements_in(&merged, &panels[0]), 1);
        assert_eq!(elements_in(&merged, &panels[1]), 4);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::UnknownPanel {
                panel: 7,
                panel_count: 2
            }]
        );
    }

    #[test]
    fn test_dense_length_mismatch() {
        let mut report = Report::new();
        let err = per_panel_samples(&two_panels(), &PanelElements::Dense(vec![5]), &mut report)
            .unwrap_err();
        assert_eq!(err, Error::panel_count_mismatch(2, 1));
    }

    #[test]
    fn test_distribution_drops_out_of_range() {
        let mut report = Report::new();
        let kept = distribution_samples(&[0.1, -0.2, f64::NAN, 0.9, 1.5], &mut report);
        assert_eq!(kept, vec![0.1, 0.9]);
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_total_points_reaches_target() {
        let panels = two_panels();
        let mut report = Report::new();
        let samples = total_point_samples(&panels, 50, &mut report).unwrap();
        let merged = merge_with_hard_points(samples, &[0.0, 0.5, 1.0]);
        assert_eq!(merged.len(), 50);
        assert!(report.is_clean());
    }

    #[test]
    fn test_total_points_keeps_tiny_panel() {
        let panels = vec![
            Panel::new(0, 0.0, 0.001),
            Panel::new(1, 0.001, 1.0),
        ];
        let mut report = Report::new();
        let samples = total_point_samples(&panels, 20, &mut report).unwrap();
        let merged = merge_with_hard_points(samples, &[0.0, 0.001, 1.0]);

        assert_eq!(elements_in(&merged, &panels[0]), 1);
        assert!(merged.len() >= 20);
        assert!(matches!(
            report.diagnostics.as_slice(),
            [Diagnostic::CoarsePanel { panel: 0, .. }]
        ));
    }

    #[test]
    fn test_total_points_rejects_single_point() {
        let mut report = Report::new();
        assert!(total_point_samples(&two_panels(), 1, &mut report).is_err());
    }

    #[test]
    fn test_element_length_count() {
        let mut report = Report::new();
        let samples = element_length_samples(2.0, 0.1, &mut report).unwrap();
        assert_eq!(samples.len(), 20);
        assert!(report.is_clean());

        let samples = element_length_samples(2.0, 5.0, &mut report).unwrap();
        assert!(samples.is_empty());
        assert_eq!(report.len(), 1);

        assert!(element_length_samples(2.0, 0.0, &mut report).is_err());
        assert!(element_length_samples(2.0, f64::NAN, &mut report).is_err());
    }

    #[test]
    fn test_sample_count_is_bounded() {
        let mut report = Report::new();
        for element_length in [1e-300, 1e-12] {
            assert!(matches!(
                element_length_samples(2.0, element_length, &mut report),
                Err(Error::InvalidParameter(_))
            ));
        }

        assert!(matches!(
            total_point_samples(&two_panels(), usize::MAX, &mut report),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            per_panel_samples(
                &two_panels(),
                &PanelElements::Dense(vec![usize::MAX, 1]),
                &mut report
            ),
            Err(Error::InvalidParameter(_))
        ));
        let factors: FxHashMap<usize, f64> = [(0, 1e300)].into_iter().collect();
        assert!(matches!(
            refinement_samples(&two_panels(), &factors, 100, &mut report),
            Err(Error::InvalidParameter(_))
        ));
        assert!(report.is_clean());
    }

    #[test]
    fn test_refinement_minimum_and_factor() {
        let panels = two_panels();
        let mut report = Report::new();
        let factors: FxHashMap<usize, f64> = [(1, 3.0)].into_iter().collect();
        let samples = refinement_samples(&panels, &factors, 40, &mut report).unwrap();
        let merged = merge_with_hard_points(samples, &[0.0, 0.5, 1.0]);

        // panel 0: max(10, 40 * 1 / 2) = 20 points; panel 1: 40 * 3 / 2 = 60 points
        assert_eq!(elements_in(&merged, &panels[0]), 19);
        assert_eq!(elements_in(&merged, &panels[1]), 59);

        let samples = refinement_samples(&panels, &FxHashMap::default(), 4, &mut report).unwrap();
        let merged = merge_with_hard_points(samples, &[0.0, 0.5, 1.0]);
        assert_eq!(elements_in(&merged, &panels[0]), MIN_REFINED_POINTS - 1);
    }

    #[test]
    fn test_synthesize_takes_max_factor() {
        let panels = vec![
            Panel::new(0, 0.0, 0.3),
            Panel::new(1, 0.3, 0.7),
            Panel::new(2, 0.7, 1.0),
        ];
        let factors = synthesize_refinement(&panels, &[(0.3, 0.7, 2.0), (0.0, 1.0, 1.5)]);
        assert_eq!(factors.get(&0), Some(&1.5));
        assert_eq!(factors.get(&1), Some(&2.0));
        assert_eq!(factors.get(&2), Some(&1.5));
    }

    #[test]
    fn test_merge_keeps_hard_points_exact() {
        let hard = [0.0, 1.0 / 3.0, 1.0];
        let merged = merge_with_hard_points(
            vec![0.5, 1.0 / 3.0 + 1e-14, 0.5, f64::NAN, -0.1, 2.0],
            &hard,
        );
        assert_eq!(merged, vec![0.0, 1.0 / 3.0, 0.5, 1.0]);
        assert!(merged.windows(2).all(|w| w[0] < w[1]));
    }
}
