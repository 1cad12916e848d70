// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line mesh data for export

use serde::{Deserialize, Serialize};

/// Owner of a line cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellTag {
    /// Airfoil boundary cell inside the panel with this index
    Panel(usize),
    /// Cell of the shear web at this position in attachment order
    Web(usize),
}

impl CellTag {
    /// Flat integer id: panel index for boundary cells, `-(i + 1)` for web `i`
    pub fn panel_id(&self) -> i64 {
        match *self {
            CellTag::Panel(index) => index as i64,
            CellTag::Web(index) => -(index as i64 + 1),
        }
    }
}

/// Named scalar field with one value per point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointField {
    pub name: String,
    pub values: Vec<f64>,
}

impl PointField {
    /// Create a new point field
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Polygonal line mesh of one or more sections
///
/// Points come first for the airfoil boundary, then for each web. Every cell
/// is a two-point line segment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineMesh {
    /// Point positions
    pub points: Vec<[f64; 3]>,
    /// Unit normals in the section plane, one per point
    pub normals: Vec<[f64; 3]>,
    /// Line cells as pairs of point indices
    pub lines: Vec<[u32; 2]>,
    /// Owner of each cell
    pub cell_tags: Vec<CellTag>,
    /// Scalar point data
    pub point_fields: Vec<PointField>,
}

impl LineMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mesh with pre-allocated capacity
    pub fn with_capacity(point_count: usize, cell_count: usize) -> Self {
        Self {
            points: Vec::with_capacity(point_count),
            normals: Vec::with_capacity(point_count),
            lines: Vec::with_capacity(cell_count),
            cell_tags: Vec::with_capacity(cell_count),
            point_fields: Vec::new(),
        }
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get point count
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Get cell count
    pub fn cell_count(&self) -> usize {
        self.lines.len()
    }

    /// Flattened panel ids, one per cell
    pub fn panel_ids(&self) -> Vec<i64> {
        self.cell_tags.iter().map(CellTag::panel_id).collect()
    }

    /// Number of cells carrying the given tag
    pub fn count_cells(&self, tag: CellTag) -> usize {
        self.cell_tags.iter().filter(|t| **t == tag).count()
    }

    /// Look up a point field by name
    pub fn field(&self, name: &str) -> Option<&PointField> {
        self.point_fields.iter().find(|f| f.name == name)
    }

    /// Append a point field
    pub fn add_field(&mut self, field: PointField) {
        self.point_fields.push(field);
    }

    /// Merge another mesh into this one
    ///
    /// Fields present on only one side are padded with NaN so every field keeps
    /// one value per point.
    pub fn merge(&mut self, other: &LineMesh) {
        let offset = self.point_count() as u32;
        let own_count = self.point_count();
        let other_count = other.point_count();

        for field in &mut self.point_fields {
            match other.field(&field.name) {
                Some(theirs) => field.values.extend_from_slice(&theirs.values),
                None => field.values.resize(own_count + other_count, f64::NAN),
            }
        }
        for theirs in &other.point_fields {
            if self.field(&theirs.name).is_none() {
                let mut values = vec![f64::NAN; own_count];
                values.extend_from_slice(&theirs.values);
                self.point_fields.push(PointField::new(theirs.name.clone(), values));
            }
        }

        self.points.extend_from_slice(&other.points);
        self.normals.extend_from_slice(&other.normals);
        self.lines
            .extend(other.lines.iter().map(|[a, b]| [a + offset, b + offset]));
        self.cell_tags.extend_from_slice(&other.cell_tags);
    }
}
