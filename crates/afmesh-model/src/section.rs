// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Section source trait for exporters and viewers

use crate::{HardPoint, Panel, Result, WebSummary};

/// Meshed airfoil section as seen by export and visualization code
///
/// This is the whole data contract between the meshing core and anything that
/// draws, tags or serializes a section. Implementations keep `current_t`,
/// `current_points` and `tangents` index-aligned.
///
/// # Example
///
/// ```ignore
/// use afmesh_model::SectionSource;
///
/// fn describe(section: &dyn SectionSource) -> afmesh_model::Result<()> {
///     for panel in section.panels() {
///         println!("{}", panel);
///     }
///     for web in section.webs()? {
///         println!("{}: t1={:.4} t2={:.4}", web.name, web.t1, web.t2);
///     }
///     Ok(())
/// }
/// ```
pub trait SectionSource: Send + Sync {
    /// Parametric coordinates of the live mesh, strictly increasing
    fn current_t(&self) -> &[f64];

    /// Materialized points, one per entry of `current_t`
    fn current_points(&self) -> Vec<[f64; 3]>;

    /// Curve tangents `dP/dt` in the posed frame, one per entry of `current_t`
    fn tangents(&self) -> Vec<[f64; 3]>;

    /// Hard points sorted by `t`
    fn hard_points(&self) -> Vec<HardPoint>;

    /// Panel partition of [0, 1]
    fn panels(&self) -> Vec<Panel>;

    /// Attached shear webs in attachment order
    ///
    /// Crossings are recomputed from the current geometry, which can fail when
    /// the pose moved a profile away from one of its cutting planes.
    fn webs(&self) -> Result<Vec<WebSummary>>;

    /// Number of airfoil points
    fn point_count(&self) -> usize {
        self.current_t().len()
    }
}
