// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AFMesh Model - Shared types and exchange contract for airfoil section meshing
//!
//! This crate holds the plain data that flows between the meshing core and
//! the code around it. It has no geometry dependencies, so exporters, viewers
//! and batch drivers can depend on it alone.
//!
//! # Architecture
//!
//! - [`SectionSource`] - Read-only view of a meshed section
//! - [`LineMesh`] - Tagged line-cell mesh produced by exporters
//! - [`SectionConfig`] - Serde description of a section (pose, webs, meshing)
//! - [`HardPoint`], [`Panel`], [`WebSummary`] - Values exposed by a section
//!
//! # Example
//!
//! ```ignore
//! use afmesh_model::{SectionConfig, SectionSource};
//!
//! let config: SectionConfig = serde_json::from_str(&text)?;
//! config.validate()?;
//!
//! fn count_cells(section: &dyn SectionSource) -> usize {
//!     section.point_count().saturating_sub(1)
//! }
//! ```

pub mod config;
pub mod error;
pub mod mesh;
pub mod section;
pub mod types;

// Re-export all public types
pub use config::*;
pub use error::*;
pub use mesh::*;
pub use section::*;
pub use types::*;
