// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for airfoil section data
//!
//! These are the plain values exchanged between the meshing core and its
//! collaborators (exporters, batch drivers, viewers).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a shear web attached to a profile
///
/// Assigned when the web is attached and never reused within that profile.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize, Default)]
pub struct WebId(pub u32);

impl fmt::Display for WebId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "web#{}", self.0)
    }
}

impl From<u32> for WebId {
    fn from(id: u32) -> Self {
        WebId(id)
    }
}

/// A mandatory parametric break point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HardPoint {
    /// Parametric coordinate in [0, 1]
    pub t: f64,
    /// Display name, unique within a profile
    pub name: String,
}

impl HardPoint {
    /// Create a new hard point
    pub fn new(t: f64, name: impl Into<String>) -> Self {
        Self {
            t,
            name: name.into(),
        }
    }
}

/// Interval between two consecutive hard points
///
/// Panels are half-open, `[t_start, t_end)`, except that the last panel of a
/// profile also owns `t = 1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Position of the panel in the partition
    pub index: usize,
    pub t_start: f64,
    pub t_end: f64,
}

impl Panel {
    /// Create a new panel
    pub fn new(index: usize, t_start: f64, t_end: f64) -> Self {
        Self {
            index,
            t_start,
            t_end,
        }
    }

    /// Parametric length of the panel
    #[inline]
    pub fn length(&self) -> f64 {
        self.t_end - self.t_start
    }

    /// Check whether `t` falls in `[t_start, t_end)`
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.t_start <= t && t < self.t_end
    }

    /// Check whether a web crossing the profile at `(t1, t2)` touches this panel
    ///
    /// True when the first crossing lies in `[t_start, t_end)`, the second in
    /// `(t_start, t_end]`, or the crossings enclose the whole panel.
    pub fn overlaps_span(&self, t1: f64, t2: f64) -> bool {
        let (ts, te) = (self.t_start, self.t_end);
        (ts <= t1 && t1 < te) || (ts < t2 && t2 <= te) || (t1 <= ts && te <= t2)
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel {} [{:.6}, {:.6})", self.index, self.t_start, self.t_end)
    }
}

/// Read-only view of a shear web attached to a profile
///
/// Crossings and end points are computed at the moment the summary is taken,
/// so they follow the current pose of the profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebSummary {
    pub id: WebId,
    pub name: String,
    /// First crossing, on `[0, 0.5]`
    pub t1: f64,
    /// Second crossing, on `[0.5, 1]`
    pub t2: f64,
    /// Number of line elements used to mesh the web itself
    pub element_count: usize,
    pub refinement_factor: f64,
    /// Materialized point at `t1`
    pub start: [f64; 3],
    /// Materialized point at `t2`
    pub end: [f64; 3],
}

impl WebSummary {
    /// Number of points placed along the web
    #[inline]
    pub fn point_count(&self) -> usize {
        self.element_count + 1
    }
}
