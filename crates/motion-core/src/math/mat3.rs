// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::math::{Vec3, EPSILON};

/// Column‑major 3×3 matrix holding the linear part of an affine transform.
///
/// # Examples
/// ```
/// use motion_core::math::{Mat3, Vec3};
/// let s = Mat3::scale(2.0, 3.0, 4.0);
/// assert_eq!(s.transform(&Vec3::new(1.0, 1.0, 1.0)).to_array(), [2.0, 3.0, 4.0]);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mat3 {
    cols: [Vec3; 3],
}

impl Mat3 {
    /// Returns the identity matrix.
    pub const fn identity() -> Self {
        Self {
            cols: [Vec3::UNIT_X, Vec3::UNIT_Y, Vec3::UNIT_Z],
        }
    }

    /// Builds a matrix from its three columns.
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    /// Builds a non-uniform scale matrix.
    pub const fn scale(sx: f32, sy: f32, sz: f32) -> Self {
        Self::from_cols(
            Vec3::new(sx, 0.0, 0.0),
            Vec3::new(0.0, sy, 0.0),
            Vec3::new(0.0, 0.0, sz),
        )
    }

    /// Returns column `idx`.
    pub fn col(&self, idx: usize) -> Vec3 {
        self.cols[idx]
    }

    /// Returns row `idx`.
    pub fn row(&self, idx: usize) -> Vec3 {
        Vec3::new(
            self.cols[0].get(idx),
            self.cols[1].get(idx),
            self.cols[2].get(idx),
        )
    }

    /// Returns the element at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.cols[col].get(row)
    }

    /// Returns the matrix as a column‑major array.
    pub fn to_array(self) -> [f32; 9] {
        let [a, b, c] = self.cols.map(Vec3::to_array);
        [a[0], a[1], a[2], b[0], b[1], b[2], c[0], c[1], c[2]]
    }

    /// Applies the matrix to a vector (`self * v`).
    pub fn transform(&self, v: &Vec3) -> Vec3 {
        self.cols[0]
            .scale(v.x())
            .add(&self.cols[1].scale(v.y()))
            .add(&self.cols[2].scale(v.z()))
    }

    /// Matrix product `self * rhs`.
    pub fn multiply(&self, rhs: &Self) -> Self {
        Self::from_cols(
            self.transform(&rhs.cols[0]),
            self.transform(&rhs.cols[1]),
            self.transform(&rhs.cols[2]),
        )
    }

    /// Element-wise difference.
    pub fn sub(&self, rhs: &Self) -> Self {
        Self::from_cols(
            self.cols[0].sub(&rhs.cols[0]),
            self.cols[1].sub(&rhs.cols[1]),
            self.cols[2].sub(&rhs.cols[2]),
        )
    }

    /// Element-wise blend; exact at `t = 0` and `t = 1`.
    pub fn lerp(&self, rhs: &Self, t: f32) -> Self {
        Self::from_cols(
            self.cols[0].lerp(&rhs.cols[0], t),
            self.cols[1].lerp(&rhs.cols[1], t),
            self.cols[2].lerp(&rhs.cols[2], t),
        )
    }

    /// Transposed matrix.
    pub fn transpose(&self) -> Self {
        Self::from_cols(self.row(0), self.row(1), self.row(2))
    }

    /// Determinant.
    pub fn determinant(&self) -> f32 {
        self.cols[0].dot(&self.cols[1].cross(&self.cols[2]))
    }

    /// Inverse, or `None` when `|det| ≤ EPSILON`.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.is_nan() || det.abs() <= EPSILON {
            return None;
        }
        let [c0, c1, c2] = self.cols;
        // Rows of the inverse are the cofactor cross products scaled by 1/det.
        let inv = 1.0 / det;
        let r0 = c1.cross(&c2).scale(inv);
        let r1 = c2.cross(&c0).scale(inv);
        let r2 = c0.cross(&c1).scale(inv);
        Some(Self::from_cols(r0, r1, r2).transpose())
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl core::ops::Mul for Mat3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}
