// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parallel processing of independent sections
//!
//! Profiles share no state, so a batch is a plain rayon map. Results always
//! come back in input order.

use crate::diagnostics::Report;
use crate::error::Result;
use crate::export::build_line_mesh;
use crate::profile::Profile;
use afmesh_model::{LineMesh, SectionConfig};
use nalgebra::Point3;
use rayon::prelude::*;

/// Boundary points and configuration of one section
#[derive(Debug, Clone)]
pub struct SectionInput {
    pub points: Vec<Point3<f64>>,
    pub config: SectionConfig,
}

impl SectionInput {
    /// Create a new section input
    pub fn new(points: Vec<Point3<f64>>, config: SectionConfig) -> Self {
        Self { points, config }
    }
}

/// Apply `f` to every item on the rayon pool, keeping input order
pub fn process_parallel<T, R, F>(items: Vec<T>, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
{
    items.into_par_iter().map(f).collect()
}

/// Build and mesh every section; one result per input, in input order
pub fn build_sections(inputs: &[SectionInput]) -> Vec<Result<(Profile, Report)>> {
    log::debug!("Building {} sections", inputs.len());
    inputs
        .par_iter()
        .map(|input| Profile::from_config(&input.points, &input.config))
        .collect()
}

/// Export every profile and merge the line meshes in input order
pub fn export_sections(profiles: &[Profile]) -> afmesh_model::Result<LineMesh> {
    let meshes = profiles
        .par_iter()
        .map(|profile| build_line_mesh(profile))
        .collect::<afmesh_model::Result<Vec<LineMesh>>>()?;

    let mut merged = LineMesh::new();
    for mesh in &meshes {
        merged.merge(mesh);
    }
    Ok(merged)
}
