// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Airfoil section profile
//!
//! [`Profile`] owns the fitted curve, the hard point registry, the attached
//! shear webs and the live parametric mesh. Every mutation leaves the mesh a
//! sorted, strictly increasing superset of the hard points.

use crate::curve::{Placement, ProfileCurve, ARC_LENGTH_SAMPLES};
use crate::diagnostics::{Diagnostic, Report};
use crate::error::{Error, Result};
use crate::hard_points::HardPointRegistry;
use crate::remesh::{
    distribution_samples, element_length_samples, linspace, merge_with_hard_points,
    per_panel_samples, refinement_samples, synthesize_refinement, total_point_samples,
    RemeshPolicy, RemeshRequest,
};
use crate::shear_web::{
    CuttingEntity, PointSampler, ShearWeb, WebOptions, WebRecord, LINE_MISS_TOLERANCE,
};
use afmesh_model::{
    HardPoint, ModelError, Panel, SectionConfig, SectionSource, WebId, WebSummary,
};
use nalgebra::{Point3, Vector3};

/// Number of evenly spaced samples in a freshly built profile
pub const INITIAL_SAMPLES: usize = 100;

/// Meshed airfoil cross-section
///
/// # Example
///
/// ```ignore
/// let mut profile = Profile::new(&points, Placement::default())?;
/// let spar = ShearWeb::new(CuttingEntity::plane([0.3, 0.0, 0.0], [1.0, 0.0, 0.0]));
/// let (id, _) = profile.add_shear_web(spar, WebOptions::with_elements(8))?;
/// profile.remesh(RemeshRequest::new().with_total_points(120))?;
/// let (t1, t2) = profile.web_intersections(id)?;
/// ```
#[derive(Debug, Clone)]
pub struct Profile {
    curve: ProfileCurve,
    placement: Placement,
    hard_points: HardPointRegistry,
    webs: Vec<WebRecord>,
    next_web_id: u32,
    current_t: Vec<f64>,
    current_points: Vec<Point3<f64>>,
    /// Sample count that relative refinement scales from
    base_count: usize,
}

impl Profile {
    /// Build a profile from ordered boundary points
    pub fn new(points: &[Point3<f64>], placement: Placement) -> Result<Self> {
        if !(placement.chord.is_finite() && placement.chord > 0.0) {
            return Err(Error::invalid_parameter(format!(
                "chord must be positive and finite, got {}",
                placement.chord
            )));
        }
        let curve = ProfileCurve::build(points)?;
        let hard_points = HardPointRegistry::new();
        let current_t =
            merge_with_hard_points(linspace(0.0, 1.0, INITIAL_SAMPLES), &hard_points.values());

        let mut profile = Self {
            curve,
            placement,
            hard_points,
            webs: Vec::new(),
            next_web_id: 0,
            base_count: current_t.len(),
            current_t,
            current_points: Vec::new(),
        };
        profile.materialize();
        Ok(profile)
    }

    /// Build a profile from planar points (z = 0)
    pub fn from_xy(points: &[[f64; 2]], placement: Placement) -> Result<Self> {
        let points: Vec<Point3<f64>> = points
            .iter()
            .map(|p| Point3::new(p[0], p[1], 0.0))
            .collect();
        Self::new(&points, placement)
    }

    /// Build, attach webs and mesh a profile from its configuration
    ///
    /// Webs are attached in order, each with its own refinement remesh; the
    /// chordwise request, if any, runs last.
    pub fn from_config(points: &[Point3<f64>], config: &SectionConfig) -> Result<(Self, Report)> {
        config.validate()?;
        let placement = Placement {
            is_normalized: config.is_normalized,
            chord: config.chord,
            rotation: config.rotation,
            position: Vector3::from(config.position),
        };
        let mut profile = Self::new(points, placement)?;
        let mut report = Report::new();

        for web in &config.webs {
            let (web, options) = ShearWeb::from_config(web);
            let (_, web_report) = profile.add_shear_web(web, options)?;
            report.extend(web_report);
        }
        if !config.mesh.is_empty() {
            report.extend(profile.remesh(RemeshRequest::from(&config.mesh))?);
        }
        Ok((profile, report))
    }

    /// Boundary points the curve was fitted to, in the local frame
    pub fn boundary_points(&self) -> &[Point3<f64>] {
        self.curve.points()
    }

    /// Fitted curve
    pub fn curve(&self) -> &ProfileCurve {
        &self.curve
    }

    /// Current pose
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Parametric coordinates of the live mesh
    pub fn current_t(&self) -> &[f64] {
        &self.current_t
    }

    /// Posed points, index-aligned with [`Profile::current_t`]
    pub fn current_points(&self) -> &[Point3<f64>] {
        &self.current_points
    }

    /// Hard points sorted by `t`
    pub fn hard_points(&self) -> &[HardPoint] {
        self.hard_points.as_slice()
    }

    /// Name of the hard point at `t`
    pub fn hard_point_name(&self, t: f64) -> Option<&str> {
        self.hard_points.name_of(t)
    }

    /// Panels between consecutive hard points
    pub fn panels(&self) -> Vec<Panel> {
        self.hard_points.panels()
    }

    /// Attached shear webs in attachment order
    pub fn shear_webs(&self) -> &[WebRecord] {
        &self.webs
    }

    /// Look up an attached web
    pub fn web(&self, id: WebId) -> Result<&WebRecord> {
        self.webs
            .iter()
            .find(|w| w.id == id)
            .ok_or(Error::UnknownWeb(id))
    }

    /// Crossings of an attached web under the current pose
    pub fn web_intersections(&self, id: WebId) -> Result<(f64, f64)> {
        Ok(self.web(id)?.intersect(self)?.as_pair())
    }

    /// Posed point at `t`
    #[inline]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.placement.apply_point(&self.curve.evaluate(t))
    }

    /// Posed tangent `dP/dt` at `t`
    #[inline]
    pub fn tangent_at(&self, t: f64) -> Vector3<f64> {
        self.placement.apply_vector(&self.curve.derivative(t))
    }

    /// Posed arc length of the whole profile
    pub fn arc_length(&self) -> f64 {
        self.curve
            .arc_length(&self.placement, 0.0, 1.0, ARC_LENGTH_SAMPLES)
    }

    /// Add a hard point and remesh
    ///
    /// A value outside [0, 1], non-finite, or coinciding with an existing
    /// hard point is ignored and reported; the mesh is then left untouched.
    /// If the remesh fails the hard point is removed again.
    pub fn add_hard_point(&mut self, t: f64, name: Option<&str>) -> Result<Report> {
        let saved_hard_points = self.hard_points.clone();
        match self.hard_points.insert(t, name) {
            Ok(_) => self.remesh(RemeshRequest::new()).inspect_err(|_| {
                self.hard_points = saved_hard_points;
            }),
            Err(diagnostic) => {
                let mut report = Report::new();
                report.push(diagnostic);
                Ok(report)
            }
        }
    }

    /// Attach a shear web
    ///
    /// Both crossings become hard points named `<web>_t1` and `<web>_t2`, then
    /// the profile is remeshed with web-driven refinement. On error the
    /// profile is left unchanged.
    pub fn add_shear_web(&mut self, web: ShearWeb, options: WebOptions) -> Result<(WebId, Report)> {
        self.add_shear_web_with_remesh(web, options, RemeshRequest::new())
    }

    /// Attach a shear web and remesh with `request` instead of web refinement
    pub fn add_shear_web_with_remesh(
        &mut self,
        web: ShearWeb,
        options: WebOptions,
        request: RemeshRequest,
    ) -> Result<(WebId, Report)> {
        web.entity.validate()?;
        options.validate()?;

        let id = WebId(self.next_web_id);
        let record = WebRecord {
            id,
            name: web.name.unwrap_or_else(|| format!("web_{}", id.0)),
            entity: web.entity,
            refinement_factor: options.refinement_factor,
            element_count: options.element_count,
        };
        let crossing = record.intersect(&*self)?;

        let mut report = Report::new();
        if let CuttingEntity::Line { .. } = record.entity {
            let tolerance = LINE_MISS_TOLERANCE * self.arc_length();
            for (t, distance) in [crossing.t1, crossing.t2].into_iter().zip(crossing.residual) {
                if distance > tolerance {
                    report.push(Diagnostic::LineMissesProfile { web: id, t, distance });
                }
            }
        }

        let saved_hard_points = self.hard_points.clone();
        for (t, suffix) in [(crossing.t1, "t1"), (crossing.t2, "t2")] {
            if let Some(existing) = self.hard_points.find(t) {
                log::debug!(
                    "Web `{}` crossing t={} reuses hard point `{}`",
                    record.name,
                    t,
                    existing.name
                );
                continue;
            }
            let name = format!("{}_{}", record.name, suffix);
            if let Err(diagnostic) = self.hard_points.insert(t, Some(&name)) {
                report.push(diagnostic);
            }
        }

        log::debug!(
            "Attached {} `{}` ({}) at t1={:.6} t2={:.6}",
            id,
            record.name,
            record.entity.kind(),
            crossing.t1,
            crossing.t2
        );
        self.webs.push(record);
        self.next_web_id += 1;

        match self.remesh(request) {
            Ok(remesh_report) => {
                report.extend(remesh_report);
                Ok((id, report))
            }
            Err(err) => {
                self.webs.pop();
                self.next_web_id -= 1;
                // remesh fails before touching the mesh
                self.hard_points = saved_hard_points;
                Err(err)
            }
        }
    }

    /// Rebuild the parametric mesh
    ///
    /// The highest-priority policy in `request` wins. An empty request applies
    /// the refinement implied by webs with a non-default factor, or keeps the
    /// current samples when there are none.
    pub fn remesh(&mut self, request: RemeshRequest) -> Result<Report> {
        let mut report = Report::new();
        let panels = self.panels();
        let policy = match request.into_policy() {
            RemeshPolicy::Keep => self.implied_refinement(&panels)?,
            policy => policy,
        };

        let candidates = match &policy {
            RemeshPolicy::PerPanel(elements) => per_panel_samples(&panels, elements, &mut report)?,
            RemeshPolicy::Distribution(values) => distribution_samples(values, &mut report),
            RemeshPolicy::TotalPoints(total) => total_point_samples(&panels, *total, &mut report)?,
            RemeshPolicy::ElementLength(length) => {
                element_length_samples(self.arc_length(), *length, &mut report)?
            }
            RemeshPolicy::Refinement(factors) => {
                refinement_samples(&panels, factors, self.base_count, &mut report)?
            }
            RemeshPolicy::Keep => self.current_t.clone(),
        };

        self.current_t = merge_with_hard_points(candidates, &self.hard_points.values());
        if !matches!(policy, RemeshPolicy::Refinement(_)) {
            self.base_count = self.current_t.len();
        }
        self.materialize();

        log::debug!(
            "Remeshed with {} policy: {} points over {} panels",
            policy.name(),
            self.current_t.len(),
            panels.len()
        );
        Ok(report)
    }

    /// Refinement synthesized from the attached webs
    fn implied_refinement(&self, panels: &[Panel]) -> Result<RemeshPolicy> {
        if !self.webs.iter().any(WebRecord::is_refining) {
            return Ok(RemeshPolicy::Keep);
        }
        let spans = self
            .webs
            .iter()
            .map(|web| {
                let crossing = web.intersect(self)?;
                Ok((crossing.t1, crossing.t2, web.refinement_factor))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RemeshPolicy::Refinement(synthesize_refinement(panels, &spans)))
    }

    /// Rotate about z by `degrees`; the parametric mesh is unchanged
    pub fn rotate(&mut self, degrees: f64) {
        self.placement.rotation += degrees;
        self.materialize();
    }

    /// Translate the section; the parametric mesh is unchanged
    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.placement.position += Vector3::new(dx, dy, dz);
        self.materialize();
    }

    fn materialize(&mut self) {
        let local = self.curve.evaluate_many(&self.current_t);
        self.current_points = self.placement.transform(&local);
    }

    /// Snapshot of one web under the current pose
    pub fn web_summary(&self, web: &WebRecord) -> Result<WebSummary> {
        let crossing = web.intersect(self)?;
        Ok(WebSummary {
            id: web.id,
            name: web.name.clone(),
            t1: crossing.t1,
            t2: crossing.t2,
            element_count: web.element_count,
            refinement_factor: web.refinement_factor,
            start: self.point_at(crossing.t1).into(),
            end: self.point_at(crossing.t2).into(),
        })
    }
}

impl PointSampler for Profile {
    #[inline]
    fn sample(&self, t: f64) -> Point3<f64> {
        self.point_at(t)
    }
}

impl SectionSource for Profile {
    fn current_t(&self) -> &[f64] {
        &self.current_t
    }

    fn current_points(&self) -> Vec<[f64; 3]> {
        self.current_points.iter().map(|p| (*p).into()).collect()
    }

    fn tangents(&self) -> Vec<[f64; 3]> {
        self.current_t
            .iter()
            .map(|&t| self.tangent_at(t).into())
            .collect()
    }

    fn hard_points(&self) -> Vec<HardPoint> {
        self.hard_points.as_slice().to_vec()
    }

    fn panels(&self) -> Vec<Panel> {
        self.hard_points.panels()
    }

    fn webs(&self) -> afmesh_model::Result<Vec<WebSummary>> {
        self.webs
            .iter()
            .map(|web| {
                self.web_summary(web)
                    .map_err(|e| ModelError::section(e.to_string()))
            })
            .collect()
    }
}
