// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric curve model
//!
//! A profile boundary is fitted with one shape-preserving piecewise cubic
//! (PCHIP) per axis over a normalized cumulative chord-length parameter. The
//! fitted curve lives in the section's local frame; [`Placement`] maps it to
//! the posed frame (chord scaling, rotation about z, translation).

use crate::error::{Error, Result};
use nalgebra::{Point3, Rotation3, Vector3};

/// Default number of samples used for arc-length estimates
pub const ARC_LENGTH_SAMPLES: usize = 1000;

/// Monotone piecewise cubic Hermite interpolant of one scalar
///
/// Slopes follow Fritsch-Carlson: weighted harmonic mean at interior knots,
/// zero at local extrema, and a one-sided three-point estimate at both ends,
/// so the interpolant never overshoots the data between knots.
#[derive(Debug, Clone)]
pub struct MonotoneCubic {
    knots: Vec<f64>,
    values: Vec<f64>,
    slopes: Vec<f64>,
}

impl MonotoneCubic {
    /// Fit the interpolant
    ///
    /// `knots` must be strictly increasing and have the same length as
    /// `values`, with at least two entries.
    pub fn new(knots: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        let n = knots.len();
        if n < 2 || values.len() != n {
            return Err(Error::degenerate(format!(
                "interpolant needs matching knots and values (got {} and {})",
                n,
                values.len()
            )));
        }
        if knots.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(Error::degenerate("interpolant knots are not strictly increasing"));
        }

        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
        let m: Vec<f64> = values
            .windows(2)
            .zip(&h)
            .map(|(w, hk)| (w[1] - w[0]) / hk)
            .collect();

        let mut slopes = vec![0.0; n];
        if n == 2 {
            slopes[0] = m[0];
            slopes[1] = m[0];
        } else {
            for k in 1..n - 1 {
                let (m0, m1) = (m[k - 1], m[k]);
                if m0 == 0.0 || m1 == 0.0 || m0.signum() != m1.signum() {
                    continue;
                }
                let w1 = 2.0 * h[k] + h[k - 1];
                let w2 = h[k] + 2.0 * h[k - 1];
                slopes[k] = (w1 + w2) / (w1 / m0 + w2 / m1);
            }
            slopes[0] = end_slope(h[0], h[1], m[0], m[1]);
            slopes[n - 1] = end_slope(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
        }

        Ok(Self {
            knots,
            values,
            slopes,
        })
    }

    /// Index of the cubic piece covering `x`; out-of-range values use the end pieces
    #[inline]
    fn segment(&self, x: f64) -> usize {
        let upper = self.knots.partition_point(|k| *k <= x);
        upper.saturating_sub(1).min(self.knots.len() - 2)
    }

    /// Hermite coefficients of piece `k` as (c0, c1, c2, c3) in powers of `x - x_k`
    #[inline]
    fn coefficients(&self, k: usize) -> (f64, f64, f64, f64) {
        let h = self.knots[k + 1] - self.knots[k];
        let m = (self.values[k + 1] - self.values[k]) / h;
        let (d0, d1) = (self.slopes[k], self.slopes[k + 1]);
        (
            self.values[k],
            d0,
            (3.0 * m - 2.0 * d0 - d1) / h,
            (d0 + d1 - 2.0 * m) / (h * h),
        )
    }

    /// Evaluate at `x`
    pub fn value(&self, x: f64) -> f64 {
        let k = self.segment(x);
        let s = x - self.knots[k];
        let (c0, c1, c2, c3) = self.coefficients(k);
        c0 + s * (c1 + s * (c2 + s * c3))
    }

    /// First derivative at `x`
    pub fn derivative(&self, x: f64) -> f64 {
        let k = self.segment(x);
        let s = x - self.knots[k];
        let (_, c1, c2, c3) = self.coefficients(k);
        c1 + s * (2.0 * c2 + 3.0 * s * c3)
    }
}

/// One-sided three-point end slope, limited to keep the end piece monotone
fn end_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

#[inline]
fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Smooth parametric curve through a profile's boundary points
#[derive(Debug, Clone)]
pub struct ProfileCurve {
    /// Boundary points used for the fit (consecutive duplicates removed)
    points: Vec<Point3<f64>>,
    /// Normalized chord-length parameter of each point
    params: Vec<f64>,
    x: MonotoneCubic,
    y: MonotoneCubic,
    z: MonotoneCubic,
}

impl ProfileCurve {
    /// Fit the curve to ordered boundary points
    ///
    /// Fails with [`Error::DegenerateGeometry`] for fewer than two points or a
    /// zero total length.
    pub fn build(points: &[Point3<f64>]) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::degenerate(format!(
                "at least 2 boundary points are required, got {}",
                points.len()
            )));
        }

        // Zero-length segments would repeat a parameter value
        let mut kept: Vec<Point3<f64>> = Vec::with_capacity(points.len());
        for p in points {
            if kept.last().map_or(true, |last| (p - last).norm() > 0.0) {
                kept.push(*p);
            }
        }
        if kept.len() < points.len() {
            log::debug!(
                "Dropped {} repeated boundary points",
                points.len() - kept.len()
            );
        }

        let mut cumulative = Vec::with_capacity(kept.len());
        cumulative.push(0.0);
        let mut total = 0.0;
        for w in kept.windows(2) {
            total += (w[1] - w[0]).norm();
            cumulative.push(total);
        }
        if !(total > 0.0 && total.is_finite()) {
            return Err(Error::degenerate(format!(
                "boundary has no usable arc length ({})",
                total
            )));
        }

        let mut params: Vec<f64> = cumulative.iter().map(|c| c / total).collect();
        // Pin the end exactly; division can leave it one ulp short
        if let Some(last) = params.last_mut() {
            *last = 1.0;
        }

        let axis = |i: usize| kept.iter().map(|p| p[i]).collect::<Vec<f64>>();
        let x = MonotoneCubic::new(params.clone(), axis(0))?;
        let y = MonotoneCubic::new(params.clone(), axis(1))?;
        let z = MonotoneCubic::new(params.clone(), axis(2))?;

        log::debug!(
            "Built profile curve from {} points, chord-length {}",
            kept.len(),
            total
        );

        Ok(Self {
            points: kept,
            params,
            x,
            y,
            z,
        })
    }

    /// Boundary points used for the fit
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Parameter value of each fitted point
    pub fn parameters(&self) -> &[f64] {
        &self.params
    }

    /// Point on the curve in the local frame
    #[inline]
    pub fn evaluate(&self, t: f64) -> Point3<f64> {
        Point3::new(self.x.value(t), self.y.value(t), self.z.value(t))
    }

    /// Points on the curve in the local frame
    pub fn evaluate_many(&self, t_values: &[f64]) -> Vec<Point3<f64>> {
        t_values.iter().map(|&t| self.evaluate(t)).collect()
    }

    /// Derivative `dP/dt` in the local frame
    #[inline]
    pub fn derivative(&self, t: f64) -> Vector3<f64> {
        Vector3::new(
            self.x.derivative(t),
            self.y.derivative(t),
            self.z.derivative(t),
        )
    }

    /// Length of the posed curve between `t0` and `t1`
    ///
    /// Sums the chords of `samples` points spaced uniformly in `t`.
    pub fn arc_length(&self, placement: &Placement, t0: f64, t1: f64, samples: usize) -> f64 {
        let samples = samples.max(2);
        let step = (t1 - t0) / (samples - 1) as f64;
        let mut previous = placement.apply_point(&self.evaluate(t0));
        let mut length = 0.0;
        for i in 1..samples {
            let t = if i == samples - 1 { t1 } else { t0 + step * i as f64 };
            let current = placement.apply_point(&self.evaluate(t));
            length += (current - previous).norm();
            previous = current;
        }
        length
    }
}

/// Pose of a section: chord scaling, rotation about z, translation
///
/// Applied whenever points are materialized. Chord scaling, rotation and
/// translation apply regardless of `is_normalized`, which only records
/// whether the boundary was given at unit chord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub is_normalized: bool,
    pub chord: f64,
    /// Degrees about the section normal (z)
    pub rotation: f64,
    pub position: Vector3<f64>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            is_normalized: true,
            chord: 1.0,
            rotation: 0.0,
            position: Vector3::zeros(),
        }
    }
}

impl Placement {
    /// Scale applied to local coordinates
    #[inline]
    pub fn scale(&self) -> f64 {
        self.chord
    }

    /// Rotation about z by `rotation` degrees
    #[inline]
    pub fn rotation_matrix(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::z_axis(), self.rotation.to_radians())
    }

    /// Map a local point to the posed frame: scale, rotate, translate
    #[inline]
    pub fn apply_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let scaled = p.coords * self.scale();
        Point3::from(self.rotation_matrix() * scaled + self.position)
    }

    /// Map a local direction to the posed frame (no translation)
    #[inline]
    pub fn apply_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation_matrix() * (v * self.scale())
    }

    /// Map local points to the posed frame
    pub fn transform(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        let rotation = self.rotation_matrix();
        let scale = self.scale();
        points
            .iter()
            .map(|p| Point3::from(rotation * (p.coords * scale) + self.position))
            .collect()
    }
}
