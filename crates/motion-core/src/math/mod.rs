// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Float32 math helpers covering scalar utilities, linear algebra primitives,
//! quaternions, and interval arithmetic.
//!
//! All operations round to `f32`; interpolation helpers use the
//! `a * (1 - t) + b * t` form so that `t = 0` and `t = 1` reproduce the
//! endpoints exactly.

mod affine;
mod interval;
mod mat3;
mod quat;
mod vec3;

pub use affine::Affine3;
pub use interval::Interval;
pub use mat3::Mat3;
pub use quat::{Quat, SLERP_PARALLEL_COS};
pub use vec3::Vec3;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;

/// Linearly blends `a` and `b` by `t` (`t = 0` yields `a`, `t = 1` yields `b`).
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
