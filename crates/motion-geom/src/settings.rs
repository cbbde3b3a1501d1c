// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tunables for the nonlinear bounds solver.

/// Hard upper bound on roots reported per solve.
pub const MAX_ROOTS: usize = 8;

/// Root-solver settings used by nonlinear segment correction.
///
/// Defaults match the values the bounds tests are written against; callers
/// normally keep them.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoundsSettings {
    /// Roots collected per solve; clamped to [`MAX_ROOTS`].
    pub max_roots: usize,
    /// Maximum interval subdivision depth.
    pub max_depth: u32,
    /// Interval width below which a candidate is accepted without further
    /// refinement.
    pub tolerance: f32,
}

impl BoundsSettings {
    /// Effective root cap (`max_roots` clamped to `1..=MAX_ROOTS`).
    pub fn root_cap(&self) -> usize {
        self.max_roots.clamp(1, MAX_ROOTS)
    }
}

impl Default for BoundsSettings {
    fn default() -> Self {
        Self {
            max_roots: MAX_ROOTS,
            max_depth: 24,
            tolerance: 1e-6,
        }
    }
}
