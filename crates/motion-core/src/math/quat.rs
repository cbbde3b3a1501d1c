// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{lerp, Mat3, Vec3, EPSILON};

/// Above this cosine, [`Quat::slerp`] blends linearly and renormalises.
pub const SLERP_PARALLEL_COS: f32 = 0.9995;

/// Quaternion stored as `(x, y, z, w)` with `w` the scalar part.
///
/// * All angles are expressed in radians.
/// * Rotation conversions normalise first, so callers may pass slightly
///   denormalised quaternions.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    data: [f32; 4],
}

impl Quat {
    /// Creates a quaternion from components.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// Returns the identity quaternion.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Returns the quaternion as an array `(x, y, z, w)`.
    pub fn to_array(self) -> [f32; 4] {
        self.data
    }

    /// Returns component `idx` of `(x, y, z, w)`.
    pub fn get(&self, idx: usize) -> f32 {
        self.data[idx]
    }

    /// Constructs a quaternion from a rotation axis and angle in radians.
    ///
    /// Returns the identity quaternion when the axis length is ≤ `EPSILON`.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let len_sq = axis.length_squared();
        if len_sq <= EPSILON * EPSILON {
            return Self::identity();
        }
        let norm_axis = axis.scale(1.0 / len_sq.sqrt());
        let (sin_half, cos_half) = (angle * 0.5).sin_cos();
        let scaled = norm_axis.scale(sin_half);
        Self::new(scaled.x(), scaled.y(), scaled.z(), cos_half)
    }

    /// Hamilton product of two quaternions (`self * other`).
    pub fn multiply(&self, other: &Self) -> Self {
        let [ax, ay, az, aw] = self.data;
        let [bx, by, bz, bw] = other.data;
        Self::new(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Four-component dot product.
    pub fn dot(&self, other: &Self) -> f32 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    /// Scales every component by `s`.
    pub fn scale(&self, s: f32) -> Self {
        let [x, y, z, w] = self.data;
        Self::new(x * s, y * s, z * s, w * s)
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Self) -> Self {
        let [ax, ay, az, aw] = self.data;
        let [bx, by, bz, bw] = other.data;
        Self::new(ax + bx, ay + by, az + bz, aw + bw)
    }

    /// Normalises the quaternion; returns identity when norm is ~0.
    pub fn normalize(&self) -> Self {
        let len = self.dot(self).sqrt();
        if len <= EPSILON {
            return Self::identity();
        }
        self.scale(1.0 / len)
    }

    /// Spherical interpolation along the shortest arc.
    ///
    /// `other` is negated when the quaternions lie in opposite hemispheres.
    /// Nearly parallel inputs fall back to normalised linear blending, which
    /// keeps the result well defined when `sin θ` vanishes.
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        let q0 = self.normalize();
        let mut q1 = other.normalize();
        let mut cos_theta = q0.dot(&q1);
        if cos_theta < 0.0 {
            q1 = q1.scale(-1.0);
            cos_theta = -cos_theta;
        }
        if cos_theta > SLERP_PARALLEL_COS {
            let [ax, ay, az, aw] = q0.data;
            let [bx, by, bz, bw] = q1.data;
            return Self::new(
                lerp(ax, bx, t),
                lerp(ay, by, t),
                lerp(az, bz, t),
                lerp(aw, bw, t),
            )
            .normalize();
        }
        let perp = q1.add(&q0.scale(-cos_theta)).normalize();
        let (sin_phi, cos_phi) = (t * cos_theta.acos()).sin_cos();
        q0.scale(cos_phi).add(&perp.scale(sin_phi))
    }

    /// Converts the (normalised) quaternion to a 3×3 rotation matrix.
    pub fn to_mat3(&self) -> Mat3 {
        let q = self.normalize();
        let [x, y, z, w] = q.data;

        let xx = x * x;
        let yy = y * y;
        let zz = z * z;
        let xy = x * y;
        let xz = x * z;
        let yz = y * z;
        let wx = w * x;
        let wy = w * y;
        let wz = w * z;

        Mat3::from_cols(
            Vec3::new(1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy)),
            Vec3::new(2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx)),
            Vec3::new(2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy)),
        )
    }

    /// Extracts a unit quaternion from an orthonormal rotation matrix.
    ///
    /// Uses the largest-diagonal branch to stay accurate for rotations near
    /// 180°. The result has a non-negative scalar part.
    pub fn from_mat3(m: &Mat3) -> Self {
        let (m00, m11, m22) = (m.at(0, 0), m.at(1, 1), m.at(2, 2));
        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(
                (m.at(2, 1) - m.at(1, 2)) / s,
                (m.at(0, 2) - m.at(2, 0)) / s,
                (m.at(1, 0) - m.at(0, 1)) / s,
                0.25 * s,
            )
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Self::new(
                0.25 * s,
                (m.at(0, 1) + m.at(1, 0)) / s,
                (m.at(0, 2) + m.at(2, 0)) / s,
                (m.at(2, 1) - m.at(1, 2)) / s,
            )
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Self::new(
                (m.at(0, 1) + m.at(1, 0)) / s,
                0.25 * s,
                (m.at(1, 2) + m.at(2, 1)) / s,
                (m.at(0, 2) - m.at(2, 0)) / s,
            )
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Self::new(
                (m.at(0, 2) + m.at(2, 0)) / s,
                (m.at(1, 2) + m.at(2, 1)) / s,
                0.25 * s,
                (m.at(1, 0) - m.at(0, 1)) / s,
            )
        };
        let q = q.normalize();
        if q.data[3] < 0.0 {
            q.scale(-1.0)
        } else {
            q
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

/// Converts a 4‑element `[f32; 4]` array `(x, y, z, w)` into a `Quat`.
/// The components are taken verbatim; normalization is not enforced.
impl From<[f32; 4]> for Quat {
    fn from(value: [f32; 4]) -> Self {
        Self { data: value }
    }
}
