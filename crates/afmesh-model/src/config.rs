// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Section configuration
//!
//! Serde types describing how one airfoil section is posed, which shear webs
//! cut it and how its boundary is discretized. Reading the configuration from
//! disk is left to the caller; any serde format works.
//!
//! ```ignore
//! let config: SectionConfig = serde_json::from_str(r#"{
//!     "chord": 2.0,
//!     "webs": [
//!         { "name": "spar", "type": "plane", "origin": [0.3, 0, 0], "normal": [1, 0, 0] },
//!         { "type": "trailing_edge", "element_count": 5 }
//!     ],
//!     "mesh": { "total_points": 120 }
//! }"#)?;
//! config.validate()?;
//! ```

use crate::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn default_chord() -> f64 {
    1.0
}

fn default_refinement() -> f64 {
    1.0
}

fn default_element_count() -> usize {
    1
}

/// Geometric definition of a shear web
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebDefinition {
    /// Plane through `origin` with the given normal
    Plane {
        origin: [f64; 3],
        #[serde(alias = "orientation")]
        normal: [f64; 3],
    },
    /// Infinite line through `point` along `direction`
    Line { point: [f64; 3], direction: [f64; 3] },
    /// Closing segment between the two trailing-edge points
    TrailingEdge,
}

/// One shear web of a section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub definition: WebDefinition,
    #[serde(default = "default_refinement")]
    pub refinement_factor: f64,
    #[serde(default = "default_element_count", alias = "n_elements")]
    pub element_count: usize,
}

impl WebConfig {
    /// Create a web with default refinement and a single element
    pub fn new(definition: WebDefinition) -> Self {
        Self {
            name: None,
            definition,
            refinement_factor: default_refinement(),
            element_count: default_element_count(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the refinement factor
    pub fn with_refinement_factor(mut self, factor: f64) -> Self {
        self.refinement_factor = factor;
        self
    }

    /// Set the element count
    pub fn with_element_count(mut self, count: usize) -> Self {
        self.element_count = count;
        self
    }

    fn validate(&self, index: usize) -> Result<()> {
        let field = |name: &str| format!("webs[{}].{}", index, name);

        if !(self.refinement_factor.is_finite() && self.refinement_factor > 0.0) {
            return Err(ModelError::invalid_config(
                field("refinement_factor"),
                "must be a positive finite number",
            ));
        }
        if self.element_count == 0 {
            return Err(ModelError::invalid_config(
                field("element_count"),
                "must be at least 1",
            ));
        }

        match &self.definition {
            WebDefinition::Plane { origin, normal } => {
                check_finite(&field("origin"), origin)?;
                check_nonzero(&field("normal"), normal)
            }
            WebDefinition::Line { point, direction } => {
                check_finite(&field("point"), point)?;
                check_nonzero(&field("direction"), direction)
            }
            WebDefinition::TrailingEdge => Ok(()),
        }
    }
}

/// Chordwise discretization request
///
/// At most one policy is applied; when several are given the first in field
/// order wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordwiseConfig {
    /// Element count for each panel, in panel order
    pub n_elements_per_panel: Option<Vec<usize>>,
    /// Element count keyed by panel index; absent panels get one element
    pub panel_elements: Option<BTreeMap<usize, usize>>,
    /// Explicit parametric distribution
    pub t_distribution: Option<Vec<f64>>,
    /// Total point count, shared between panels by parametric length
    pub total_points: Option<usize>,
    /// Target element length in posed units
    pub element_length: Option<f64>,
    /// Density multiplier keyed by panel index
    pub relative_refinement: Option<BTreeMap<usize, f64>>,
}

impl ChordwiseConfig {
    /// Check whether any policy is requested
    pub fn is_empty(&self) -> bool {
        self.n_elements_per_panel.is_none()
            && self.panel_elements.is_none()
            && self.t_distribution.is_none()
            && self.total_points.is_none()
            && self.element_length.is_none()
            && self.relative_refinement.is_none()
    }

    fn validate(&self) -> Result<()> {
        if let Some(length) = self.element_length {
            if !(length.is_finite() && length > 0.0) {
                return Err(ModelError::invalid_config(
                    "mesh.element_length",
                    "must be a positive finite number",
                ));
            }
        }
        if let Some(refinement) = &self.relative_refinement {
            if let Some((panel, _)) = refinement
                .iter()
                .find(|(_, factor)| !(factor.is_finite() && **factor > 0.0))
            {
                return Err(ModelError::invalid_config(
                    format!("mesh.relative_refinement[{}]", panel),
                    "must be a positive finite number",
                ));
            }
        }
        Ok(())
    }
}

/// Configuration of one airfoil section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Boundary points are given for a unit chord
    #[serde(default = "default_true")]
    pub is_normalized: bool,
    #[serde(default = "default_chord")]
    pub chord: f64,
    #[serde(default)]
    pub position: [f64; 3],
    /// Degrees about the section normal (z)
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub webs: Vec<WebConfig>,
    #[serde(default)]
    pub mesh: ChordwiseConfig,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            is_normalized: true,
            chord: default_chord(),
            position: [0.0; 3],
            rotation: 0.0,
            webs: Vec::new(),
            mesh: ChordwiseConfig::default(),
        }
    }
}

impl SectionConfig {
    /// Check every value against its domain
    pub fn validate(&self) -> Result<()> {
        if !(self.chord.is_finite() && self.chord > 0.0) {
            return Err(ModelError::invalid_config(
                "chord",
                "must be a positive finite number",
            ));
        }
        check_finite("position", &self.position)?;
        if !self.rotation.is_finite() {
            return Err(ModelError::invalid_config("rotation", "must be finite"));
        }
        for (index, web) in self.webs.iter().enumerate() {
            web.validate(index)?;
        }
        self.mesh.validate()
    }
}

fn check_finite(field: &str, v: &[f64; 3]) -> Result<()> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::invalid_config(field, "components must be finite"))
    }
}

fn check_nonzero(field: &str, v: &[f64; 3]) -> Result<()> {
    check_finite(field, v)?;
    if v.iter().all(|c| *c == 0.0) {
        Err(ModelError::invalid_config(field, "must not be the zero vector"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: SectionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SectionConfig::default());
        assert!(config.is_normalized);
        assert_eq!(config.chord, 1.0);
        assert!(config.mesh.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_tagged_web_definitions() {
        let json = r#"{
            "chord": 2.5,
            "webs": [
                { "name": "spar", "type": "plane", "origin": [0.3, 0.0, 0.0], "orientation": [1.0, 0.0, 0.0], "n_elements": 10 },
                { "type": "line", "point": [0.6, 0.0, 0.0], "direction": [0.0, 1.0, 0.0], "refinement_factor": 2.0 },
                { "type": "trailing_edge" }
            ],
            "mesh": { "panel_elements": { "0": 10, "2": 4 } }
        }"#;
        let config: SectionConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();

        assert_eq!(config.webs.len(), 3);
        assert_eq!(config.webs[0].name.as_deref(), Some("spar"));
        assert_eq!(config.webs[0].element_count, 10);
        assert_eq!(
            config.webs[0].definition,
            WebDefinition::Plane {
                origin: [0.3, 0.0, 0.0],
                normal: [1.0, 0.0, 0.0]
            }
        );
        assert_eq!(config.webs[1].refinement_factor, 2.0);
        assert_eq!(config.webs[1].element_count, 1);
        assert_eq!(config.webs[2].definition, WebDefinition::TrailingEdge);

        let sparse = config.mesh.panel_elements.unwrap();
        assert_eq!(sparse.get(&0), Some(&10));
        assert_eq!(sparse.get(&2), Some(&4));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = SectionConfig {
            chord: 0.0,
            ..SectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidConfig { ref field, .. }) if field == "chord"
        ));

        config.chord = 1.0;
        config.webs.push(WebConfig::new(WebDefinition::Plane {
            origin: [0.5, 0.0, 0.0],
            normal: [0.0, 0.0, 0.0],
        }));
        assert!(matches!(
            config.validate(),
            Err(ModelError::InvalidConfig { ref field, .. }) if field == "webs[0].normal"
        ));

        config.webs[0] = WebConfig::new(WebDefinition::TrailingEdge).with_element_count(0);
        assert!(config.validate().is_err());

        config.webs.clear();
        config.mesh.element_length = Some(-0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_keeps_tag() {
        let web = WebConfig::new(WebDefinition::TrailingEdge)
            .with_name("te")
            .with_element_count(5);
        let json = serde_json::to_string(&web).unwrap();
        assert!(json.contains("\"type\":\"trailing_edge\""));
        let back: WebConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, web);
    }
}
