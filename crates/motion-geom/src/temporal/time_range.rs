// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::cmp::Ordering;

/// Closed time interval `[lower, upper]`.
///
/// Used both for global shutter ranges and for per-segment restriction
/// windows in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeRange {
    /// Start of the range.
    pub lower: f32,
    /// End of the range.
    pub upper: f32,
}

impl TimeRange {
    /// The unit range `[0, 1]`.
    pub const UNIT: Self = Self::new(0.0, 1.0);

    /// Creates a range from its endpoints.
    #[must_use]
    pub const fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    /// `upper - lower`.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.upper - self.lower
    }

    /// Returns `true` when `lower <= upper`; `false` if either end is NaN.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        matches!(
            self.lower.partial_cmp(&self.upper),
            Some(Ordering::Less | Ordering::Equal)
        )
    }

    /// Returns `true` when `t` lies in the closed range.
    #[must_use]
    pub fn contains(&self, t: f32) -> bool {
        self.lower <= t && t <= self.upper
    }

    /// Maps `time` into this range's normalized `[0, 1]` parameterization
    /// (values outside the range map outside `[0, 1]`).
    #[must_use]
    pub fn normalize(&self, time: f32) -> f32 {
        (time - self.lower) / self.size()
    }

    /// Re-expresses `other` in this range's normalized parameterization.
    #[must_use]
    pub fn relative(&self, other: &Self) -> Self {
        Self::new(self.normalize(other.lower), self.normalize(other.upper))
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::UNIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_rejects_reversed_and_nan_ends() {
        assert!(TimeRange::UNIT.is_ordered());
        assert!(TimeRange::new(0.5, 0.5).is_ordered());
        assert!(!TimeRange::new(1.0, 0.0).is_ordered());
        assert!(!TimeRange::new(f32::NAN, 1.0).is_ordered());
        assert!(!TimeRange::new(0.0, f32::NAN).is_ordered());
    }
}
