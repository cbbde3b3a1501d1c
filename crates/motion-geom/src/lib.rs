// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![forbid(unsafe_code)]
#![doc = r"Motion-blurred instances and their conservative bounds.

This crate provides:
- Axis-aligned bounding boxes (`Aabb`) and quaternion decompositions.
- Keyframe storage with linear or quaternion (slerp) interpolation.
- Per-segment correction of linear bounds, closed-form for linear motion and
  root-finding based for rotational motion.
- A multi-segment assembler producing two-endpoint linear bounds for any
  query time range.
- The `Instance` entity tying these together behind a commit cycle.

Design notes:
- Float32 throughout; bounds are conservative, not tight.
- Bounds queries are read-only and can run from many threads at once through
  a shared `CommitScope`.
"]

/// Scene statistics contributions.
pub mod counts;
/// Error types.
pub mod error;
/// Instance entity and commit scope.
pub mod instance;
/// Bounds solver settings.
pub mod settings;
/// Keyframed motion and time-bounded bounds.
pub mod temporal;
/// Foundational geometric types.
pub mod types;

pub use counts::{GeometryCounts, InstanceCost};
pub use error::{ErrorKind, InstanceError};
pub use instance::{
    CommitScope, Instance, InstancedScene, SceneHandle, DEFAULT_MASK, MAX_TIME_STEPS,
};
pub use settings::{BoundsSettings, MAX_ROOTS};
pub use temporal::assembler::{linear_bounds, LinearBounds, MotionSegments};
pub use temporal::derivative::{MotionDerivative, MotionDerivativeCoefficients};
pub use temporal::keyframes::{Interpolation, KeyframeStore};
pub use temporal::segment::{
    bound_segment_linear, bound_segment_nonlinear, BoundsDelta, SegmentQuery,
};
pub use temporal::time_range::TimeRange;
pub use types::aabb::Aabb;
pub use types::decomposition::QuaternionDecomposition;
