// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Errors reported by instance setters and commit.

use thiserror::Error;

/// Host error category an [`InstanceError`] is reported under.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller asked for something the instance cannot do in its state.
    InvalidOperation,
}

/// Errors emitted by [`crate::Instance`] and its keyframe store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstanceError {
    /// A setter addressed a time step outside `0..num_time_steps`.
    #[error("invalid time step {time_step} (instance has {num_time_steps} time steps)")]
    InvalidTimeStep {
        /// Requested index.
        time_step: usize,
        /// Current number of time steps.
        num_time_steps: usize,
    },
    /// The requested time-step count is zero or above [`crate::MAX_TIME_STEPS`].
    #[error("invalid time step count {0}")]
    InvalidTimeStepCount(usize),
    /// A time range with `lower > upper` (or a NaN endpoint) was supplied.
    #[error("invalid time range [{lower}, {upper}]")]
    InvalidTimeRange {
        /// Requested start.
        lower: f32,
        /// Requested end.
        upper: f32,
    },
    /// Some keyframes carry a quaternion decomposition and others only an
    /// affine transform.
    #[error(
        "all transformations have to be set either as affine transforms or as quaternion \
         decompositions; mixing both is not allowed"
    )]
    MixedInterpolation,
    /// Classification found the keyframes both fully linear and fully
    /// nonlinear. Indicates a logic defect rather than caller misuse.
    #[error("internal error: interpolation classified as both linear and nonlinear")]
    InvariantViolation,
    /// Bounds were requested before a sub-scene was attached.
    #[error("no instanced scene attached")]
    MissingScene,
}

impl InstanceError {
    /// Host error category; every variant maps to
    /// [`ErrorKind::InvalidOperation`].
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidOperation
    }

    /// Returns `true` for errors that signal an internal logic defect.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::InvariantViolation)
    }
}
