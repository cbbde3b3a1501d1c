// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Mat3, Quat, Vec3};

/// Affine transform: a 3×3 linear part followed by a translation.
///
/// Points map as `p' = L * p + t`; vectors ignore the translation.
/// `Default` is the identity transform.
///
/// # Examples
/// ```
/// use motion_core::math::{Affine3, Vec3};
/// let t = Affine3::from_translation(Vec3::new(5.0, -3.0, 2.0));
/// let p = Vec3::new(2.0, 4.0, -1.0);
/// assert_eq!(t.transform_point(&p).to_array(), [7.0, 1.0, 1.0]);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Affine3 {
    linear: Mat3,
    translation: Vec3,
}

impl Affine3 {
    /// Identity transform.
    pub const fn identity() -> Self {
        Self {
            linear: Mat3::identity(),
            translation: Vec3::ZERO,
        }
    }

    /// Creates a transform from its linear part and translation.
    pub const fn new(linear: Mat3, translation: Vec3) -> Self {
        Self {
            linear,
            translation,
        }
    }

    /// Pure translation.
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(Mat3::identity(), translation)
    }

    /// Pure rotation.
    pub fn from_quat(q: &Quat) -> Self {
        Self::new(q.to_mat3(), Vec3::ZERO)
    }

    /// Linear (rotation/scale/shear) part.
    pub fn linear(&self) -> Mat3 {
        self.linear
    }

    /// Translation part.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Transforms a point (translation applied).
    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        self.linear.transform(p).add(&self.translation)
    }

    /// Composition `self * rhs` (apply `rhs` first).
    pub fn multiply(&self, rhs: &Self) -> Self {
        Self::new(
            self.linear.multiply(&rhs.linear),
            self.transform_point(&rhs.translation),
        )
    }

    /// Element-wise blend of both parts; exact at `t = 0` and `t = 1`.
    pub fn lerp(&self, rhs: &Self, t: f32) -> Self {
        Self::new(
            self.linear.lerp(&rhs.linear, t),
            self.translation.lerp(&rhs.translation, t),
        )
    }

    /// Inverse transform, or `None` when the linear part is singular.
    pub fn inverse(&self) -> Option<Self> {
        let inv = self.linear.inverse()?;
        let translation = inv.transform(&self.translation).scale(-1.0);
        Some(Self::new(inv, translation))
    }
}

impl core::ops::Mul for Affine3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}
