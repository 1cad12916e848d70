// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shear webs and their crossings with a profile
//!
//! A profile runs from the trailing edge at `t = 0`, around one surface to the
//! leading edge near `t = 0.5`, and back to the trailing edge at `t = 1`. A
//! web therefore crosses it once on each half, and each half is searched
//! independently.

use crate::error::{Error, Result};
use crate::solver::{find_root, minimize_bounded, MinimizeOptions, RootOptions};
use afmesh_model::{WebConfig, WebDefinition, WebId};
use nalgebra::{Point3, Vector3};

/// Parameter splitting the two surfaces of a profile
pub const SPLIT_T: f64 = 0.5;

/// Closest-approach distance, as a fraction of the posed arc length, above
/// which a line web is reported as missing the profile
pub const LINE_MISS_TOLERANCE: f64 = 1e-4;

/// Source of posed profile points
///
/// Implemented by the profile so that crossings follow its current pose.
pub trait PointSampler {
    /// Posed point at parameter `t`
    fn sample(&self, t: f64) -> Point3<f64>;
}

/// Geometric entity cutting a profile
#[derive(Debug, Clone, PartialEq)]
pub enum CuttingEntity {
    /// Plane through `origin` with the given normal
    Plane {
        origin: Point3<f64>,
        normal: Vector3<f64>,
    },
    /// Infinite line; crossings are the closest approaches on each half
    Line {
        point: Point3<f64>,
        direction: Vector3<f64>,
    },
    /// Closing segment between the two trailing-edge points
    TrailingEdge,
}

/// Parametric crossings of a cutting entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Crossing on `[0, 0.5]`
    pub t1: f64,
    /// Crossing on `[0.5, 1]`
    pub t2: f64,
    /// Distance from the entity at `t1` and `t2`; zero for exact crossings
    pub residual: [f64; 2],
}

impl Crossing {
    fn exact(t1: f64, t2: f64) -> Self {
        Self {
            t1,
            t2,
            residual: [0.0, 0.0],
        }
    }

    /// Crossings as a pair
    pub fn as_pair(&self) -> (f64, f64) {
        (self.t1, self.t2)
    }
}

impl CuttingEntity {
    /// Plane from plain coordinates
    pub fn plane(origin: [f64; 3], normal: [f64; 3]) -> Self {
        CuttingEntity::Plane {
            origin: Point3::from(origin),
            normal: Vector3::from(normal),
        }
    }

    /// Line from plain coordinates
    pub fn line(point: [f64; 3], direction: [f64; 3]) -> Self {
        CuttingEntity::Line {
            point: Point3::from(point),
            direction: Vector3::from(direction),
        }
    }

    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            CuttingEntity::Plane { .. } => "plane",
            CuttingEntity::Line { .. } => "line",
            CuttingEntity::TrailingEdge => "trailing_edge",
        }
    }

    /// Reject zero or non-finite normals and directions
    pub fn validate(&self) -> Result<()> {
        let (anchor, axis, what) = match self {
            CuttingEntity::Plane { origin, normal } => (origin, normal, "plane normal"),
            CuttingEntity::Line { point, direction } => (point, direction, "line direction"),
            CuttingEntity::TrailingEdge => return Ok(()),
        };
        if !anchor.coords.iter().all(|c| c.is_finite()) {
            return Err(Error::invalid_parameter(format!(
                "{} anchor has non-finite components",
                self.kind()
            )));
        }
        let norm = axis.norm();
        if !(norm.is_finite() && norm > 0.0) {
            return Err(Error::invalid_parameter(format!(
                "{} must be a non-zero finite vector",
                what
            )));
        }
        Ok(())
    }

    /// Crossings with the profile behind `sampler`
    ///
    /// Planes fail with [`Error::NoIntersection`] when either half has no sign
    /// change. Lines always return the closest approaches, whether or not the
    /// line actually touches the profile.
    pub fn intersect<S: PointSampler + ?Sized>(&self, sampler: &S) -> Result<Crossing> {
        self.intersect_labeled(sampler, self.kind())
    }

    pub(crate) fn intersect_labeled<S: PointSampler + ?Sized>(
        &self,
        sampler: &S,
        label: &str,
    ) -> Result<Crossing> {
        match self {
            CuttingEntity::TrailingEdge => Ok(Crossing::exact(0.0, 1.0)),
            CuttingEntity::Plane { origin, normal } => {
                let f = |t: f64| (sampler.sample(t) - origin).dot(normal);
                let t1 = find_root(f, 0.0, SPLIT_T, RootOptions::default())
                    .ok_or_else(|| Error::no_intersection(label, 0.0, SPLIT_T))?;
                let t2 = find_root(f, SPLIT_T, 1.0, RootOptions::default())
                    .ok_or_else(|| Error::no_intersection(label, SPLIT_T, 1.0))?;
                Ok(Crossing::exact(t1, t2))
            }
            CuttingEntity::Line { point, direction } => {
                let dd = direction.dot(direction);
                let distance = |t: f64| {
                    let v = sampler.sample(t) - point;
                    let along = v.dot(direction) / dd;
                    (v - direction * along).norm()
                };
                let first = minimize_bounded(distance, 0.0, SPLIT_T, MinimizeOptions::default());
                let second = minimize_bounded(distance, SPLIT_T, 1.0, MinimizeOptions::default());
                Ok(Crossing {
                    t1: first.x,
                    t2: second.x,
                    residual: [first.value, second.value],
                })
            }
        }
    }
}

impl From<&WebDefinition> for CuttingEntity {
    fn from(definition: &WebDefinition) -> Self {
        match definition {
            WebDefinition::Plane { origin, normal } => CuttingEntity::plane(*origin, *normal),
            WebDefinition::Line { point, direction } => CuttingEntity::line(*point, *direction),
            WebDefinition::TrailingEdge => CuttingEntity::TrailingEdge,
        }
    }
}

/// Shear web definition: a cutting entity and an optional display name
#[derive(Debug, Clone, PartialEq)]
pub struct ShearWeb {
    pub entity: CuttingEntity,
    pub name: Option<String>,
}

impl ShearWeb {
    /// Create an unnamed web
    pub fn new(entity: CuttingEntity) -> Self {
        Self { entity, name: None }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Trailing-edge closing web
    pub fn trailing_edge() -> Self {
        Self::new(CuttingEntity::TrailingEdge)
    }
}

/// Meshing settings of a web
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebOptions {
    /// Density multiplier for panels the web touches
    pub refinement_factor: f64,
    /// Number of line elements along the web itself
    pub element_count: usize,
}

impl Default for WebOptions {
    fn default() -> Self {
        Self {
            refinement_factor: DEFAULT_REFINEMENT_FACTOR,
            element_count: 1,
        }
    }
}

/// Refinement factor that leaves panel density unchanged
pub const DEFAULT_REFINEMENT_FACTOR: f64 = 1.0;

impl WebOptions {
    /// Options with the given element count
    pub fn with_elements(element_count: usize) -> Self {
        Self {
            element_count,
            ..Self::default()
        }
    }

    /// Set the refinement factor
    pub fn refined(mut self, factor: f64) -> Self {
        self.refinement_factor = factor;
        self
    }

    /// Check the values against their domain
    pub fn validate(&self) -> Result<()> {
        if !(self.refinement_factor.is_finite() && self.refinement_factor > 0.0) {
            return Err(Error::invalid_parameter(format!(
                "refinement factor must be positive and finite, got {}",
                self.refinement_factor
            )));
        }
        if self.element_count == 0 {
            return Err(Error::invalid_parameter("web element count must be at least 1"));
        }
        Ok(())
    }
}

impl ShearWeb {
    /// Web definition and meshing settings from configuration
    pub fn from_config(config: &WebConfig) -> (ShearWeb, WebOptions) {
        let web = ShearWeb {
            entity: CuttingEntity::from(&config.definition),
            name: config.name.clone(),
        };
        let options = WebOptions {
            refinement_factor: config.refinement_factor,
            element_count: config.element_count,
        };
        (web, options)
    }
}

/// Shear web attached to a profile
#[derive(Debug, Clone, PartialEq)]
pub struct WebRecord {
    pub id: WebId,
    pub name: String,
    pub entity: CuttingEntity,
    pub refinement_factor: f64,
    pub element_count: usize,
}

impl WebRecord {
    /// Crossings against the current pose of the profile
    pub fn intersect<S: PointSampler + ?Sized>(&self, sampler: &S) -> Result<Crossing> {
        self.entity.intersect_labeled(sampler, &self.name)
    }

    /// Check whether the web changes panel density
    pub fn is_refining(&self) -> bool {
        self.refinement_factor != DEFAULT_REFINEMENT_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Unit circle starting and ending at (1, 0), counter-clockwise
    struct Circle;

    impl PointSampler for Circle {
        fn sample(&self, t: f64) -> Point3<f64> {
            let a = 2.0 * std::f64::consts::PI * t;
            Point3::new(a.cos(), a.sin(), 0.0)
        }
    }

    #[test]
    fn test_trailing_edge_is_fixed() {
        let crossing = CuttingEntity::TrailingEdge.intersect(&Circle).unwrap();
        assert_eq!(crossing.as_pair(), (0.0, 1.0));
    }

    #[test]
    fn test_plane_crossings() {
        // x = 0 crosses the circle at a quarter and three quarters
        let plane = CuttingEntity::plane([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let crossing = plane.intersect(&Circle).unwrap();
        assert_relative_eq!(crossing.t1, 0.25, epsilon = 1e-10);
        assert_relative_eq!(crossing.t2, 0.75, epsilon = 1e-10);
        assert_eq!(crossing.residual, [0.0, 0.0]);
    }

    #[test]
    fn test_plane_missing_profile() {
        let plane = CuttingEntity::plane([5.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let err = plane.intersect(&Circle).unwrap_err();
        assert!(matches!(err, Error::NoIntersection { t_max, .. } if t_max == SPLIT_T));
    }

    #[test]
    fn test_line_closest_approach() {
        let line = CuttingEntity::line([0.0, -3.0, 0.0], [0.0, 1.0, 0.0]);
        let crossing = line.intersect(&Circle).unwrap();
        assert_relative_eq!(crossing.t1, 0.25, epsilon = 1e-4);
        assert_relative_eq!(crossing.t2, 0.75, epsilon = 1e-4);
        assert!(crossing.residual[0] < 1e-3);
    }

    #[test]
    fn test_line_missing_profile_still_answers() {
        let line = CuttingEntity::line([3.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let crossing = line.intersect(&Circle).unwrap();
        // nearest points are the start and end at (1, 0)
        assert!(crossing.t1 < 1e-3);
        assert!(crossing.t2 > 1.0 - 1e-3);
        assert!(crossing.residual[0] > 1.9);
    }

    #[test]
    fn test_validate_rejects_zero_axis() {
        assert!(CuttingEntity::plane([0.0; 3], [0.0; 3]).validate().is_err());
        assert!(CuttingEntity::line([0.0; 3], [0.0, 0.0, 1.0]).validate().is_ok());
        assert!(CuttingEntity::TrailingEdge.validate().is_ok());
    }

    #[test]
    fn test_from_config() {
        let config = WebConfig::new(WebDefinition::Plane {
            origin: [0.3, 0.0, 0.0],
            normal: [1.0, 0.0, 0.0],
        })
        .with_name("spar")
        .with_element_count(8);
        let (web, options) = ShearWeb::from_config(&config);
        assert_eq!(web.name.as_deref(), Some("spar"));
        assert_eq!(web.entity.kind(), "plane");
        assert_eq!(options.element_count, 8);
        assert_eq!(options.refinement_factor, 1.0);
    }

    #[test]
    fn test_options_validation() {
        assert!(WebOptions::default().validate().is_ok());
        assert!(WebOptions::with_elements(0).validate().is_err());
        assert!(WebOptions::default().refined(0.0).validate().is_err());
    }
}
