// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::f32::consts::{FRAC_PI_2, PI, TAU};
use core::ops::{Add, Mul, Sub};

/// Closed interval `[lo, hi]` used for conservative range evaluation.
///
/// Every operation returns an interval that contains all results of applying
/// the operation to members of the inputs (up to `f32` rounding).
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    /// Lower bound.
    pub lo: f32,
    /// Upper bound.
    pub hi: f32,
}

impl Interval {
    /// Creates an interval; debug builds assert `lo ≤ hi`.
    pub fn new(lo: f32, hi: f32) -> Self {
        debug_assert!(lo <= hi, "invalid interval: {lo} > {hi}");
        Self { lo, hi }
    }

    /// Interval width.
    pub fn width(&self) -> f32 {
        self.hi - self.lo
    }

    /// Midpoint.
    pub fn midpoint(&self) -> f32 {
        0.5 * (self.lo + self.hi)
    }

    /// Returns `true` when `0` lies in the closed interval.
    pub fn contains_zero(&self) -> bool {
        self.lo <= 0.0 && 0.0 <= self.hi
    }

    /// Range of `cos(x)` for `x` in the interval.
    pub fn cos(self) -> Self {
        if self.width() >= TAU {
            return Self::new(-1.0, 1.0);
        }
        let a = self.lo.cos();
        let b = self.hi.cos();
        let mut lo = a.min(b);
        let mut hi = a.max(b);
        // Maxima sit at 2kπ, minima at (2k+1)π.
        let first_max = (self.lo / TAU).ceil() * TAU;
        if first_max <= self.hi {
            hi = 1.0;
        }
        let first_min = ((self.lo - PI) / TAU).ceil() * TAU + PI;
        if first_min <= self.hi {
            lo = -1.0;
        }
        Self::new(lo, hi)
    }

    /// Range of `sin(x)` for `x` in the interval.
    pub fn sin(self) -> Self {
        (self - FRAC_PI_2).cos()
    }
}

impl Add for Interval {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.lo + rhs.lo, self.hi + rhs.hi)
    }
}

impl Sub<f32> for Interval {
    type Output = Self;
    fn sub(self, rhs: f32) -> Self {
        Self::new(self.lo - rhs, self.hi - rhs)
    }
}

impl Add<f32> for Interval {
    type Output = Self;
    fn add(self, rhs: f32) -> Self {
        Self::new(self.lo + rhs, self.hi + rhs)
    }
}

impl Mul for Interval {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let a = self.lo * rhs.lo;
        let b = self.lo * rhs.hi;
        let c = self.hi * rhs.lo;
        let d = self.hi * rhs.hi;
        Self::new(a.min(b).min(c).min(d), a.max(b).max(c).max(d))
    }
}

impl Mul<f32> for Interval {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        if rhs >= 0.0 {
            Self::new(self.lo * rhs, self.hi * rhs)
        } else {
            Self::new(self.hi * rhs, self.lo * rhs)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;

    #[test]
    fn cos_range_covers_interior_extrema() {
        let r = Interval::new(-0.5, 0.5).cos();
        assert!((r.hi - 1.0).abs() < 1e-6);
        assert!((r.lo - 0.5f32.cos()).abs() < 1e-6);

        let r = Interval::new(3.0, 3.5).cos();
        assert_eq!(r.lo, -1.0);
    }

    #[test]
    fn sin_range_is_monotone_away_from_extrema() {
        let r = Interval::new(0.0, 1.0).sin();
        assert!(r.lo.abs() < 1e-6);
        assert!((r.hi - 1.0f32.sin()).abs() < 1e-6);
    }

    #[test]
    fn mul_by_negative_scalar_swaps_bounds() {
        let r = Interval::new(1.0, 2.0) * -2.0;
        assert_eq!(r, Interval::new(-4.0, -2.0));
    }
}
