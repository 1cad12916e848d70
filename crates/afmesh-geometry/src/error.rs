// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for section meshing

use afmesh_model::{ModelError, WebId};
use thiserror::Error;

/// Section meshing result type
pub type Result<T> = std::result::Result<T, Error>;

/// Section meshing errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Boundary points cannot define a curve
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A cutting plane does not cross one half of the profile
    #[error("Web `{web}` does not intersect the profile on t in [{t_min}, {t_max}]")]
    NoIntersection { web: String, t_min: f64, t_max: f64 },

    /// Dense per-panel element counts do not match the panels
    #[error("Expected element counts for {expected} panels, got {actual}")]
    PanelCountMismatch { expected: usize, actual: usize },

    /// A scalar or vector parameter is outside its domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Web handle not attached to this profile
    #[error("Unknown shear web {0}")]
    UnknownWeb(WebId),

    /// Configuration rejected by the model layer
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl Error {
    /// Create a degenerate geometry error
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Error::DegenerateGeometry(msg.into())
    }

    /// Create a missing intersection error
    pub fn no_intersection(web: impl Into<String>, t_min: f64, t_max: f64) -> Self {
        Error::NoIntersection {
            web: web.into(),
            t_min,
            t_max,
        }
    }

    /// Create a panel count mismatch error
    pub fn panel_count_mismatch(expected: usize, actual: usize) -> Self {
        Error::PanelCountMismatch { expected, actual }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }
}
