// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Per-segment correction of linearly blended bounds.
//!
//! A segment's true motion is `interp(xfm0, xfm1, t) * lerp(p0, p1, t)` for
//! every corner pair `(p0, p1)` of the object boxes. The naive linear bounds
//! `lerp(bbox0, bbox1, t)` only match it at the endpoints; in between the
//! corner can bulge out. The correction finds the parameters where the
//! deviation from the linear bound is stationary, evaluates the deviation
//! there, and returns the worst case per axis.

use motion_core::math::{Affine3, Vec3};

use crate::settings::{BoundsSettings, MAX_ROOTS};
use crate::temporal::derivative::{MotionDerivative, MotionDerivativeCoefficients};
use crate::temporal::time_range::TimeRange;
use crate::types::aabb::Aabb;
use crate::types::decomposition::QuaternionDecomposition;

/// Inputs describing one segment to correct.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SegmentQuery {
    /// Object-space bounds at the segment start.
    pub object0: Aabb,
    /// Object-space bounds at the segment end.
    pub object1: Aabb,
    /// Linear world bound evaluated at the segment start (t = 0).
    pub linear0: Aabb,
    /// Linear world bound evaluated at the segment end (t = 1).
    pub linear1: Aabb,
    /// Portion of the segment, within `[0, 1]`, that must be covered.
    pub window: TimeRange,
}

/// Per-axis correction to add to a linear bound: `lower ≤ 0 ≤ upper`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundsDelta {
    /// Added to the lower corner of both endpoint boxes.
    pub lower: Vec3,
    /// Added to the upper corner of both endpoint boxes.
    pub upper: Vec3,
}

impl BoundsDelta {
    /// No correction.
    pub const ZERO: Self = Self {
        lower: Vec3::ZERO,
        upper: Vec3::ZERO,
    };

    /// Worst case of two corrections.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.min(&other.lower),
            upper: self.upper.max(&other.upper),
        }
    }

    /// Applies the correction to `bounds`.
    #[must_use]
    pub fn apply(&self, bounds: &Aabb) -> Aabb {
        bounds.widened(&self.lower, &self.upper)
    }

    fn fold_lower(&mut self, dim: usize, deviation: f32) {
        if deviation < self.lower.get(dim) {
            self.lower = self.lower.with(dim, deviation);
        }
    }

    fn fold_upper(&mut self, dim: usize, deviation: f32) {
        if deviation > self.upper.get(dim) {
            self.upper = self.upper.with(dim, deviation);
        }
    }
}

impl Default for BoundsDelta {
    fn default() -> Self {
        Self::ZERO
    }
}

fn corner_pairs(query: &SegmentQuery) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
    let (start, end) = (&query.object0, &query.object1);
    (0..8).map(move |i| (start.corner(i), end.corner(i)))
}

/// Correction for a segment whose affine matrices are blended linearly.
///
/// The blended corner moves on `(A0 + tΔA)(p0 + tΔp)`, a quadratic in `t`, so
/// its deviation from a linear reference has a single stationary point:
///
/// ```text
/// t* = ((b1 - b0) - ΔL p0 - ΔT - L0 Δp) / (2 ΔL Δp)
/// ```
///
/// where `L` is the linear part, `T` the translation and `b0/b1` the
/// reference bound on that axis. A zero (or NaN) denominator means the
/// deviation is linear and its extremes are the endpoints, which the linear
/// bound already covers.
#[must_use]
pub fn bound_segment_linear(xfm0: &Affine3, xfm1: &Affine3, query: &SegmentQuery) -> BoundsDelta {
    let mut delta = BoundsDelta::ZERO;
    let dl = xfm1.linear().sub(&xfm0.linear());
    let dt = xfm1.translation().sub(&xfm0.translation());

    for (p0, p1) in corner_pairs(query) {
        let dp = p1.sub(&p0);
        let denom = dl.transform(&dp).scale(2.0);
        let base = dl
            .transform(&p0)
            .add(&dt)
            .add(&xfm0.linear().transform(&dp));

        for dim in 0..3 {
            let den = denom.get(dim);
            if den.is_nan() || den == 0.0 {
                continue;
            }
            let deviation_at = |t: f32, reference: f32| {
                let pos = xfm0.lerp(xfm1, t).transform_point(&p0.lerp(&p1, t));
                pos.get(dim) - reference
            };

            let b0 = query.linear0.min().get(dim);
            let b1 = query.linear1.min().get(dim);
            let tl = ((b1 - b0) - base.get(dim)) / den;
            if query.window.contains(tl) {
                delta.fold_lower(dim, deviation_at(tl, b0 + tl * (b1 - b0)));
            }

            let b0 = query.linear0.max().get(dim);
            let b1 = query.linear1.max().get(dim);
            let tu = ((b1 - b0) - base.get(dim)) / den;
            if query.window.contains(tu) {
                delta.fold_upper(dim, deviation_at(tu, b0 + tu * (b1 - b0)));
            }
        }
    }
    delta
}

/// Correction for a segment interpolated through quaternion decompositions.
///
/// Same structure as [`bound_segment_linear`], but the stationary points of
/// the deviation come from [`MotionDerivative::find_roots_with`], targeting
/// the negated slope of the lower and upper reference bounds.
#[must_use]
pub fn bound_segment_nonlinear(
    coeffs: &MotionDerivativeCoefficients,
    qd0: &QuaternionDecomposition,
    qd1: &QuaternionDecomposition,
    query: &SegmentQuery,
    settings: &BoundsSettings,
) -> BoundsDelta {
    let mut delta = BoundsDelta::ZERO;
    let mut roots = [0.0f32; MAX_ROOTS];
    let cap = settings.root_cap();

    for (p0, p1) in corner_pairs(query) {
        for dim in 0..3 {
            let motion = MotionDerivative::new(coeffs, dim, &p0, &p1);
            let deviation_at = |t: f32, bound0: f32, bound1: f32| {
                let pos = qd0.interpolate(qd1, t).transform_point(&p0.lerp(&p1, t));
                pos.get(dim) - (bound0 + t * (bound1 - bound0))
            };

            let b0 = query.linear0.min().get(dim);
            let b1 = query.linear1.min().get(dim);
            let n = motion.find_roots_with(query.window, b0 - b1, &mut roots[..cap], settings);
            for &t in &roots[..n] {
                delta.fold_lower(dim, deviation_at(t, b0, b1));
            }

            let b0 = query.linear0.max().get(dim);
            let b1 = query.linear1.max().get(dim);
            let n = motion.find_roots_with(query.window, b0 - b1, &mut roots[..cap], settings);
            for &t in &roots[..n] {
                delta.fold_upper(dim, deviation_at(t, b0, b1));
            }
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;
    use motion_core::math::Mat3;

    fn unit_box() -> Aabb {
        Aabb::from_center_half_extents(Vec3::ZERO, 1.0, 1.0, 1.0)
    }

    #[test]
    fn pure_translation_needs_no_correction() {
        let xfm0 = Affine3::identity();
        let xfm1 = Affine3::from_translation(Vec3::new(4.0, -2.0, 1.0));
        let obox = unit_box();
        let query = SegmentQuery {
            object0: obox,
            object1: obox,
            linear0: obox.transformed(&xfm0),
            linear1: obox.transformed(&xfm1),
            window: TimeRange::UNIT,
        };
        let delta = bound_segment_linear(&xfm0, &xfm1, &query);
        assert_eq!(delta, BoundsDelta::ZERO);
    }

    #[test]
    fn collapsing_scale_bulges_past_upper_bound() {
        // Scale 1 → -1 on x collapses the box through zero; a growing object
        // box makes the corner path quadratic with an interior extremum.
        let xfm0 = Affine3::identity();
        let xfm1 = Affine3::new(Mat3::scale(-1.0, 1.0, 1.0), Vec3::ZERO);
        let object0 = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let object1 = Aabb::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(4.0, 1.0, 1.0));
        let query = SegmentQuery {
            object0,
            object1,
            linear0: object0.transformed(&xfm0),
            linear1: object1.transformed(&xfm1),
            window: TimeRange::UNIT,
        };
        let delta = bound_segment_linear(&xfm0, &xfm1, &query);
        for d in 0..3 {
            assert!(delta.lower.get(d) <= 0.0);
            assert!(delta.upper.get(d) >= 0.0);
        }
        // Corner x(t) = (1 - 2t)(2 + 2t) peaks above the linear upper bound.
        assert!(delta.upper.x() > 0.0, "{delta:?}");
    }

    #[test]
    fn merge_keeps_worst_case() {
        let a = BoundsDelta {
            lower: Vec3::new(-1.0, 0.0, -0.5),
            upper: Vec3::new(0.0, 2.0, 0.0),
        };
        let b = BoundsDelta {
            lower: Vec3::new(0.0, -3.0, -0.25),
            upper: Vec3::new(1.0, 0.0, 0.5),
        };
        let m = a.merge(&b);
        assert_eq!(m.lower.to_array(), [-1.0, -3.0, -0.5]);
        assert_eq!(m.upper.to_array(), [1.0, 2.0, 0.5]);
    }

    #[test]
    fn rotating_cube_gets_outward_correction() {
        let qd0 = QuaternionDecomposition::identity();
        let qd1 = QuaternionDecomposition::from_trs(
            Vec3::ZERO,
            motion_core::math::Quat::from_axis_angle(Vec3::UNIT_Z, core::f32::consts::FRAC_PI_2),
            Vec3::splat(1.0),
        );
        let obox = unit_box();
        let query = SegmentQuery {
            object0: obox,
            object1: obox,
            linear0: obox.transformed(&qd0.to_affine()),
            linear1: obox.transformed(&qd1.to_affine()),
            window: TimeRange::UNIT,
        };
        let coeffs = MotionDerivativeCoefficients::new(&qd0, &qd1);
        let settings = BoundsSettings::default();
        let delta = bound_segment_nonlinear(&coeffs, &qd0, &qd1, &query, &settings);
        // At 45 degrees the cube's corners reach √2 on x and y.
        let bulge = core::f32::consts::SQRT_2 - 1.0;
        for d in 0..2 {
            assert!(delta.upper.get(d) > bulge - 1e-3, "{delta:?}");
            assert!(delta.lower.get(d) < -bulge + 1e-3, "{delta:?}");
        }
        assert!(delta.upper.z().abs() < 1e-5);
        assert!(delta.lower.z().abs() < 1e-5);
    }
}
