// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use motion_core::math::{lerp, Affine3, Mat3, Quat, Vec3, EPSILON};

/// Rigid-plus-scale transform split into interpolation-friendly parts.
///
/// The represented affine map is `T(translation) * R(rotation) * M`, where
/// `M` is the upper-triangular scale/skew matrix
///
/// ```text
/// | scale.x  skew[0]  skew[1] |        shift.x
/// |   0      scale.y  skew[2] |   +    shift.y
/// |   0        0      scale.z |        shift.z
/// ```
///
/// Interpolation blends every part linearly except `rotation`, which is
/// slerped along the shortest arc, so a spinning instance keeps its shape
/// instead of shrinking through the middle of a segment.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuaternionDecomposition {
    /// Diagonal scale factors.
    pub scale: Vec3,
    /// Off-diagonal skew terms `(xy, xz, yz)`.
    pub skew: [f32; 3],
    /// Offset applied before rotation (e.g. a pivot).
    pub shift: Vec3,
    /// Unit rotation quaternion.
    pub rotation: Quat,
    /// Offset applied after rotation.
    pub translation: Vec3,
}

impl QuaternionDecomposition {
    /// Identity decomposition (unit scale, no skew, no offsets).
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            scale: Vec3::splat(1.0),
            skew: [0.0; 3],
            shift: Vec3::ZERO,
            rotation: Quat::identity(),
            translation: Vec3::ZERO,
        }
    }

    /// Translation, rotation, and non-uniform scale without skew or shift.
    #[must_use]
    pub const fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            scale,
            skew: [0.0; 3],
            shift: Vec3::ZERO,
            rotation,
            translation,
        }
    }

    /// Upper-triangular scale/skew matrix `M` without the shift.
    #[must_use]
    pub fn scale_skew(&self) -> Mat3 {
        Mat3::from_cols(
            Vec3::new(self.scale.x(), 0.0, 0.0),
            Vec3::new(self.skew[0], self.scale.y(), 0.0),
            Vec3::new(self.skew[1], self.skew[2], self.scale.z()),
        )
    }

    /// Equivalent affine transform `T * R * M`.
    #[must_use]
    pub fn to_affine(&self) -> Affine3 {
        let m = Affine3::new(self.scale_skew(), self.shift);
        let r = Affine3::from_quat(&self.rotation);
        Affine3::from_translation(self.translation) * r * m
    }

    /// Affine transform at parameter `t` between `self` (t = 0) and `other`
    /// (t = 1): slerped rotation, linearly blended remaining parts.
    #[must_use]
    pub fn interpolate(&self, other: &Self, t: f32) -> Affine3 {
        let blended = Self {
            scale: self.scale.lerp(&other.scale, t),
            skew: [
                lerp(self.skew[0], other.skew[0], t),
                lerp(self.skew[1], other.skew[1], t),
                lerp(self.skew[2], other.skew[2], t),
            ],
            shift: self.shift.lerp(&other.shift, t),
            rotation: self.rotation.slerp(&other.rotation, t),
            translation: self.translation.lerp(&other.translation, t),
        };
        blended.to_affine()
    }

    /// Recovers a decomposition from an affine transform.
    ///
    /// The linear part is factored as `R * M` by Gram–Schmidt (QR) on its
    /// columns; the translation lands in `translation` and `shift` is zero
    /// because the two offsets cannot be told apart from the matrix alone.
    /// Reflections are folded into a negative `scale.z`. Returns `None` for
    /// singular transforms.
    #[must_use]
    pub fn from_affine(xfm: &Affine3) -> Option<Self> {
        let l = xfm.linear();
        let (a0, a1, a2) = (l.col(0), l.col(1), l.col(2));

        let sx = a0.length();
        if sx <= EPSILON {
            return None;
        }
        let e0 = a0.scale(1.0 / sx);

        let xy = e0.dot(&a1);
        let u1 = a1.sub(&e0.scale(xy));
        let sy = u1.length();
        if sy <= EPSILON {
            return None;
        }
        let e1 = u1.scale(1.0 / sy);

        let xz = e0.dot(&a2);
        let yz = e1.dot(&a2);
        let u2 = a2.sub(&e0.scale(xz)).sub(&e1.scale(yz));
        if u2.length() <= EPSILON {
            return None;
        }
        // Keep the orthonormal frame right-handed; the sign goes into scale.z.
        let e2 = e0.cross(&e1);
        let sz = e2.dot(&a2);

        let rotation = Quat::from_mat3(&Mat3::from_cols(e0, e1, e2));
        Some(Self {
            scale: Vec3::new(sx, sy, sz),
            skew: [xy, xz, yz],
            shift: Vec3::ZERO,
            rotation,
            translation: xfm.translation(),
        })
    }
}

impl Default for QuaternionDecomposition {
    fn default() -> Self {
        Self::identity()
    }
}
