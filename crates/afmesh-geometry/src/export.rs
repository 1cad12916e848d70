// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line mesh export
//!
//! Builds a [`LineMesh`] from any [`SectionSource`]: the airfoil boundary as a
//! chain of line cells tagged with their panel, followed by each shear web
//! meshed as a straight chain between its two crossings.

use afmesh_model::{CellTag, LineMesh, PointField, Result, SectionSource};
use nalgebra::{Point3, Vector3};

/// Normal used where the in-plane direction vanishes
const OUT_OF_PLANE: [f64; 3] = [0.0, 0.0, 1.0];

/// Unit in-plane normal `(-dy, dx, 0)` of a direction
fn in_plane_normal(direction: &Vector3<f64>) -> [f64; 3] {
    let normal = Vector3::new(-direction.y, direction.x, 0.0);
    match normal.try_normalize(f64::EPSILON) {
        Some(n) => n.into(),
        None => OUT_OF_PLANE,
    }
}

/// Index of the panel owning `t`, given sorted panel starts
fn owning_panel(starts: &[f64], t: f64) -> usize {
    starts
        .partition_point(|s| *s <= t)
        .saturating_sub(1)
}

/// Build the line mesh of a section
///
/// Point fields:
/// - `t`: parametric coordinate, NaN on web points
/// - `w`: position along a web in [0, 1], NaN on airfoil points
/// - `z`: out-of-plane coordinate
/// - `abs_dist_<hp>`: arc distance along the airfoil to hard point `<hp>`,
///   0 on web points
/// - `rel_dist_<hp>`: parametric distance `|t - t_hp|`, 0 on web points
///
/// Fails when a web can no longer be intersected under the current pose.
pub fn build_line_mesh(section: &dyn SectionSource) -> Result<LineMesh> {
    let t = section.current_t();
    let points = section.current_points();
    let tangents = section.tangents();
    let webs = section.webs()?;
    let panel_starts: Vec<f64> = section.panels().iter().map(|p| p.t_start).collect();

    let airfoil_count = points.len();
    let web_point_count: usize = webs.iter().map(|w| w.point_count()).sum();
    let web_cell_count: usize = webs.iter().map(|w| w.element_count).sum();
    let mut mesh = LineMesh::with_capacity(
        airfoil_count + web_point_count,
        airfoil_count.saturating_sub(1) + web_cell_count,
    );

    // Airfoil boundary
    mesh.points.extend_from_slice(&points);
    mesh.normals
        .extend(tangents.iter().map(|d| in_plane_normal(&Vector3::from(*d))));
    for i in 1..airfoil_count {
        mesh.lines.push([(i - 1) as u32, i as u32]);
        mesh.cell_tags
            .push(CellTag::Panel(owning_panel(&panel_starts, t[i - 1])));
    }

    let mut t_field: Vec<f64> = t.to_vec();
    let mut w_field: Vec<f64> = vec![f64::NAN; airfoil_count];

    // Webs
    for (index, web) in webs.iter().enumerate() {
        let start = Point3::from(web.start);
        let end = Point3::from(web.end);
        let normal = in_plane_normal(&(end - start));
        let first = mesh.points.len() as u32;
        let n = web.element_count;

        for j in 0..=n {
            let w = j as f64 / n as f64;
            let p = if j == n { end } else { start + (end - start) * w };
            mesh.points.push(p.into());
            mesh.normals.push(normal);
            t_field.push(f64::NAN);
            w_field.push(w);
        }
        for j in 0..n as u32 {
            mesh.lines.push([first + j, first + j + 1]);
            mesh.cell_tags.push(CellTag::Web(index));
        }
    }

    let total = mesh.points.len();
    let z_field: Vec<f64> = mesh.points.iter().map(|p| p[2]).collect();
    mesh.add_field(PointField::new("t", t_field));
    mesh.add_field(PointField::new("w", w_field));
    mesh.add_field(PointField::new("z", z_field));

    // Cumulative arc length along the airfoil
    let mut arc = Vec::with_capacity(airfoil_count);
    let mut s = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            s += (Point3::from(*p) - Point3::from(points[i - 1])).norm();
        }
        arc.push(s);
    }

    for hp in section.hard_points() {
        let anchor = t.partition_point(|v| *v < hp.t).min(airfoil_count.saturating_sub(1));
        let anchor_arc = arc.get(anchor).copied().unwrap_or(0.0);

        let mut abs_dist = vec![0.0; total];
        let mut rel_dist = vec![0.0; total];
        for i in 0..airfoil_count {
            abs_dist[i] = (arc[i] - anchor_arc).abs();
            rel_dist[i] = (t[i] - hp.t).abs();
        }
        mesh.add_field(PointField::new(format!("abs_dist_{}", hp.name), abs_dist));
        mesh.add_field(PointField::new(format!("rel_dist_{}", hp.name), rel_dist));
    }

    log::debug!(
        "Exported line mesh: {} points, {} cells ({} on webs)",
        mesh.point_count(),
        mesh.cell_count(),
        web_cell_count
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Placement;
    use crate::profile::Profile;
    use crate::remesh::RemeshRequest;
    use crate::shear_web::{CuttingEntity, ShearWeb, WebOptions};
    use approx::assert_relative_eq;

    fn triangle() -> Profile {
        Profile::from_xy(&[[0.0, 0.0], [0.5, 0.1], [1.0, 0.0]], Placement::default()).unwrap()
    }

    #[test]
    fn test_web_cells_are_tagged() {
        let mut profile = triangle();
        let web = ShearWeb::new(CuttingEntity::plane([0.5, 0.05, 0.0], [0.0, 1.0, 0.0]));
        profile.add_shear_web(web, WebOptions::with_elements(5)).unwrap();

        let mesh = build_line_mesh(&profile).unwrap();
        let airfoil_points = profile.current_t().len();

        assert_eq!(mesh.count_cells(CellTag::Web(0)), 5);
        assert_eq!(mesh.point_count(), airfoil_points + 6);
        assert_eq!(mesh.cell_count(), airfoil_points - 1 + 5);
        assert_eq!(mesh.panel_ids().iter().filter(|id| **id == -1).count(), 5);
        assert!(mesh.panel_ids().iter().take(airfoil_points - 1).all(|id| *id >= 0));

        // web points lie on the cutting plane
        for p in &mesh.points[airfoil_points..] {
            assert_relative_eq!(p[1], 0.05, epsilon = 1e-9);
        }
        let w = &mesh.field("w").unwrap().values;
        assert!(w[0].is_nan());
        assert_eq!(w[airfoil_points], 0.0);
        assert_eq!(w[airfoil_points + 5], 1.0);
        assert!(mesh.field("t").unwrap().values[airfoil_points].is_nan());
    }

    #[test]
    fn test_panel_tags_follow_hard_points() {
        let mut profile = triangle();
        profile.add_hard_point(0.5, None).unwrap();
        profile
            .remesh(RemeshRequest::new().with_sparse_panel_elements([(0, 10), (1, 20)]))
            .unwrap();

        let mesh = build_line_mesh(&profile).unwrap();
        assert_eq!(mesh.count_cells(CellTag::Panel(0)), 10);
        assert_eq!(mesh.count_cells(CellTag::Panel(1)), 20);
        assert_eq!(mesh.cell_count(), 30);
    }

    #[test]
    fn test_distance_fields() {
        let mut profile = triangle();
        profile.add_hard_point(0.5, Some("apex")).unwrap();
        let mesh = build_line_mesh(&profile).unwrap();
        let t = profile.current_t();
        let apex = t.iter().position(|v| *v == 0.5).unwrap();

        let abs_dist = &mesh.field("abs_dist_apex").unwrap().values;
        let rel_dist = &mesh.field("rel_dist_apex").unwrap().values;
        assert_eq!(abs_dist[apex], 0.0);
        assert_eq!(rel_dist[apex], 0.0);
        assert_relative_eq!(rel_dist[0], 0.5);
        // y = 0.4 t - 0.4 t^2 on the first half, x = t
        assert_relative_eq!(abs_dist[0], 0.51303, epsilon = 1e-3);
        assert!(mesh.field("abs_dist_t0").is_some());
        assert!(mesh.field("rel_dist_t1").is_some());
    }

    #[test]
    fn test_distance_fields_are_zero_on_webs() {
        let mut profile = triangle();
        let web = ShearWeb::new(CuttingEntity::plane([0.5, 0.05, 0.0], [0.0, 1.0, 0.0]));
        profile.add_shear_web(web, WebOptions::with_elements(3)).unwrap();
        let mesh = build_line_mesh(&profile).unwrap();
        let airfoil_points = profile.current_t().len();

        for hp in profile.hard_points() {
            for prefix in ["abs_dist", "rel_dist"] {
                let values = &mesh.field(&format!("{}_{}", prefix, hp.name)).unwrap().values;
                assert_eq!(values.len(), airfoil_points + 4);
                assert!(values[..airfoil_points].iter().all(|v| v.is_finite()));
                assert!(values[airfoil_points..].iter().all(|v| *v == 0.0));
            }
        }
    }

    #[test]
    fn test_normals_are_in_plane_units() {
        let mesh = build_line_mesh(&triangle()).unwrap();
        for n in &mesh.normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert_relative_eq!(len, 1.0, epsilon = 1e-12);
            assert_eq!(n[2], 0.0);
        }
        // the boundary starts heading up-right, so the normal points up-left
        assert!(mesh.normals[0][0] < 0.0 && mesh.normals[0][1] > 0.0);
    }

    #[test]
    fn test_in_plane_normal_fallback() {
        assert_eq!(in_plane_normal(&Vector3::new(0.0, 0.0, 2.0)), OUT_OF_PLANE);
        assert_eq!(in_plane_normal(&Vector3::new(2.0, 0.0, 0.0)), [0.0, 1.0, 0.0]);
    }
}
