// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use motion_core::math::Affine3;

use crate::error::InstanceError;
use crate::types::decomposition::QuaternionDecomposition;

/// How transforms are blended between adjacent keyframes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    /// Element-wise lerp of the affine matrices.
    Linear,
    /// Slerp of rotation plus lerp of the remaining decomposition parts.
    Nonlinear,
}

/// Per-time-step transforms of an instance.
///
/// Holds one affine transform per time step and, once the first quaternion
/// decomposition is set, a parallel sequence of optional decompositions.
/// A `None` slot means "this time step was last set as a plain affine
/// transform". Consistency across slots is checked by [`Self::classify`],
/// not by the setters, so callers may switch representations one time step
/// at a time before committing.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeStore {
    local_to_world: Vec<Affine3>,
    decompositions: Option<Vec<Option<QuaternionDecomposition>>>,
}

impl KeyframeStore {
    /// Creates `num_time_steps` identity keyframes without decompositions.
    #[must_use]
    pub fn new(num_time_steps: usize) -> Self {
        Self {
            local_to_world: vec![Affine3::identity(); num_time_steps],
            decompositions: None,
        }
    }

    /// Number of time steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.local_to_world.len()
    }

    /// Returns `true` when the store has no time steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local_to_world.is_empty()
    }

    /// Number of segments between adjacent keyframes.
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.len().saturating_sub(1)
    }

    fn check_index(&self, time_step: usize) -> Result<(), InstanceError> {
        if time_step >= self.len() {
            return Err(InstanceError::InvalidTimeStep {
                time_step,
                num_time_steps: self.len(),
            });
        }
        Ok(())
    }

    /// Stores an affine transform at `time_step` and invalidates that step's
    /// decomposition, reverting it to affine-only.
    ///
    /// # Errors
    /// [`InstanceError::InvalidTimeStep`] when `time_step >= len()`; nothing is
    /// modified in that case.
    pub fn set_transform(&mut self, xfm: Affine3, time_step: usize) -> Result<(), InstanceError> {
        self.check_index(time_step)?;
        if let Some(decompositions) = self.decompositions.as_mut() {
            decompositions[time_step] = None;
        }
        self.local_to_world[time_step] = xfm;
        Ok(())
    }

    /// Stores a quaternion decomposition at `time_step` together with its
    /// equivalent affine transform.
    ///
    /// The decomposition sequence is allocated on first use with every slot
    /// unset.
    ///
    /// # Errors
    /// [`InstanceError::InvalidTimeStep`] when `time_step >= len()`; nothing is
    /// modified in that case.
    pub fn set_quaternion_decomposition(
        &mut self,
        qd: QuaternionDecomposition,
        time_step: usize,
    ) -> Result<(), InstanceError> {
        self.set_transform(qd.to_affine(), time_step)?;
        let len = self.len();
        let decompositions = self.decompositions.get_or_insert_with(|| vec![None; len]);
        decompositions[time_step] = Some(qd);
        Ok(())
    }

    /// Affine transform at `time_step`, if in range.
    #[must_use]
    pub fn transform(&self, time_step: usize) -> Option<&Affine3> {
        self.local_to_world.get(time_step)
    }

    /// Decomposition at `time_step`, if the sequence exists and the slot is set.
    #[must_use]
    pub fn decomposition(&self, time_step: usize) -> Option<&QuaternionDecomposition> {
        self.decompositions.as_ref()?.get(time_step)?.as_ref()
    }

    /// Returns `true` once any decomposition has been set.
    #[must_use]
    pub fn has_decompositions(&self) -> bool {
        self.decompositions.is_some()
    }

    /// All affine keyframes.
    #[must_use]
    pub fn transforms(&self) -> &[Affine3] {
        &self.local_to_world
    }

    /// Resizes both sequences, keeping overlapping indices.
    ///
    /// New affine entries are identity and new decomposition slots are unset.
    pub fn resize(&mut self, num_time_steps: usize) {
        self.local_to_world.resize(num_time_steps, Affine3::identity());
        if let Some(decompositions) = self.decompositions.as_mut() {
            decompositions.resize(num_time_steps, None);
        }
    }

    /// Determines the interpolation mode from the stored data.
    ///
    /// # Errors
    /// - [`InstanceError::MixedInterpolation`] when some but not all time steps
    ///   carry a decomposition.
    /// - [`InstanceError::InvariantViolation`] when the data reads as both
    ///   fully linear and fully nonlinear.
    pub fn classify(&self) -> Result<Interpolation, InstanceError> {
        let Some(decompositions) = self.decompositions.as_ref() else {
            return Ok(Interpolation::Linear);
        };
        let nonlinear = decompositions.iter().all(Option::is_some);
        let linear = decompositions.iter().all(Option::is_none);
        match (linear, nonlinear) {
            (true, true) => Err(InstanceError::InvariantViolation),
            (false, false) => Err(InstanceError::MixedInterpolation),
            (true, false) => Ok(Interpolation::Linear),
            (false, true) => Ok(Interpolation::Nonlinear),
        }
    }

    /// Transform between keyframes `i0` (f = 0) and `i1` (f = 1) under `mode`.
    ///
    /// In nonlinear mode a pair with a missing decomposition falls back to the
    /// affine blend; a committed store never has one.
    #[must_use]
    pub fn interpolate(&self, i0: usize, i1: usize, f: f32, mode: Interpolation) -> Affine3 {
        if mode == Interpolation::Nonlinear {
            if let (Some(q0), Some(q1)) = (self.decomposition(i0), self.decomposition(i1)) {
                return q0.interpolate(q1, f);
            }
        }
        self.local_to_world[i0].lerp(&self.local_to_world[i1], f)
    }
}
