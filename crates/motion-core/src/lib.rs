// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! motion-core: float32 math used by motion-blurred instancing.
//!
//! The crate is intentionally small: vectors, quaternions with shortest-arc
//! slerp, column-major 3×3/affine transforms, and a closed-interval type used
//! for conservative range evaluation by the motion bound solvers.
#![forbid(unsafe_code)]

pub mod math;

pub use math::{Affine3, Interval, Mat3, Quat, Vec3};
