// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # AFMesh Geometry
//!
//! One-dimensional structural meshing of airfoil cross-sections.
//!
//! ## Overview
//!
//! Given the ordered boundary points of a section, this crate produces a
//! discretized perimeter that always contains a set of mandatory hard points:
//!
//! - **Curve Model**: shape-preserving cubic fit over a chord-length parameter
//! - **Hard Points**: named break points splitting the perimeter into panels
//! - **Shear Webs**: planes and lines crossing the section, found with Brent's
//!   root finder and bounded minimizer
//! - **Remeshing**: per-panel counts, explicit distributions, total point
//!   counts, element lengths and web-driven refinement
//! - **Export**: tagged line meshes for downstream tools
//!
//! ## Architecture
//!
//! - [`Profile`]: the aggregate owning curve, hard points, webs and mesh
//! - `SectionSource`: read-only contract from `afmesh-model`, implemented by
//!   [`Profile`] and consumed by [`build_line_mesh`]
//! - [`Report`]: non-fatal diagnostics returned by mutating operations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use afmesh_geometry::{
//!     CuttingEntity, Placement, Profile, RemeshRequest, ShearWeb, WebOptions,
//! };
//!
//! let mut profile = Profile::from_xy(&points, Placement::default())?;
//! let spar = ShearWeb::new(CuttingEntity::plane([0.3, 0.0, 0.0], [1.0, 0.0, 0.0]))
//!     .with_name("spar");
//! profile.add_shear_web(spar, WebOptions::with_elements(10))?;
//! profile.remesh(RemeshRequest::new().with_total_points(200))?;
//!
//! let mesh = afmesh_geometry::build_line_mesh(&profile)?;
//! println!("{} cells", mesh.cell_count());
//! ```

pub mod batch;
pub mod curve;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod hard_points;
pub mod profile;
pub mod remesh;
pub mod shear_web;
pub mod solver;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

// Re-export main types
pub use batch::{build_sections, export_sections, process_parallel, SectionInput};
pub use curve::{MonotoneCubic, Placement, ProfileCurve, ARC_LENGTH_SAMPLES};
pub use diagnostics::{Diagnostic, Report};
pub use error::{Error, Result};
pub use export::build_line_mesh;
pub use hard_points::{HardPointRegistry, HARD_POINT_TOLERANCE};
pub use profile::{Profile, INITIAL_SAMPLES};
pub use remesh::{PanelElements, RemeshPolicy, RemeshRequest};
pub use shear_web::{Crossing, CuttingEntity, PointSampler, ShearWeb, WebOptions, WebRecord};
pub use solver::{find_root, minimize_bounded, MinimizeOptions, Minimum, RootOptions};
