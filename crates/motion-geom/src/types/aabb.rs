// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use motion_core::math::{Affine3, Vec3};

/// Axis-aligned bounding box.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components for boxes
///   built through [`Aabb::new`]. Extrapolated blends ([`Aabb::lerp`] with
///   `t` outside `[0, 1]`) are not re-validated.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners.
    ///
    /// # Panics
    /// Panics if any component of `min` is greater than its counterpart in `max`.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let a = min.to_array();
        let b = max.to_array();
        assert!(
            a[0] <= b[0] && a[1] <= b[1] && a[2] <= b[2],
            "invalid AABB: min > max"
        );
        Self { min, max }
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Builds an AABB centered at `center` with half-extents `hx, hy, hz`.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, hx: f32, hy: f32, hz: f32) -> Self {
        let he = Vec3::new(hx, hy, hz);
        Self::new(center.sub(&he), center.add(&he))
    }

    /// Returns the union of two AABBs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    /// Returns `true` if `other` lies inside this box, allowing `eps` slack.
    #[must_use]
    pub fn contains(&self, other: &Self, eps: f32) -> bool {
        (0..3).all(|d| {
            self.min.get(d) - eps <= other.min.get(d) && other.max.get(d) <= self.max.get(d) + eps
        })
    }

    /// Corner `index` in `0..8`; bit 2 selects x, bit 1 selects y, bit 0
    /// selects z (clear = min, set = max).
    #[must_use]
    pub fn corner(&self, index: usize) -> Vec3 {
        let pick = |bit: usize, axis: usize| {
            if index & bit == 0 {
                self.min.get(axis)
            } else {
                self.max.get(axis)
            }
        };
        Vec3::new(pick(4, 0), pick(2, 1), pick(1, 2))
    }

    /// Linearly blends the corners of two boxes by `t`.
    ///
    /// `t` may lie outside `[0, 1]` to extrapolate a linear bound.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            min: self.min.lerp(&other.min, t),
            max: self.max.lerp(&other.max, t),
        }
    }

    /// Shifts the lower corner by `lower` and the upper corner by `upper`.
    #[must_use]
    pub fn widened(&self, lower: &Vec3, upper: &Vec3) -> Self {
        Self {
            min: self.min.add(lower),
            max: self.max.add(upper),
        }
    }

    /// Computes the AABB that bounds this box after transformation by `xfm`.
    ///
    /// This evaluates the eight corners under the affine transform and builds a
    /// new axis-aligned box containing them.
    #[must_use]
    pub fn transformed(&self, xfm: &Affine3) -> Self {
        let first = xfm.transform_point(&self.corner(0));
        let mut out = Self {
            min: first,
            max: first,
        };
        for i in 1..8 {
            let p = xfm.transform_point(&self.corner(i));
            out.min = out.min.min(&p);
            out.max = out.max.max(&p);
        }
        out
    }
}
