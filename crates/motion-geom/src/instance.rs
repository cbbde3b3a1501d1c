// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Instances of a sub-scene under a keyframed, motion-blurred transform.
//!
//! Lifecycle per build:
//!
//! 1. Mutate through the setters (`&mut self`).
//! 2. [`Instance::commit`] validates the keyframes and fixes the
//!    interpolation mode.
//! 3. [`Instance::pre_commit`] hands out a [`CommitScope`] holding the
//!    per-segment derivative coefficients; build threads share `&CommitScope`
//!    for bounds queries.
//! 4. Dropping the scope releases the coefficients; [`Instance::post_commit`]
//!    then clears the modified flag.

use std::fmt;
use std::sync::Arc;

use motion_core::math::Affine3;
use tracing::{debug, instrument, trace, warn};

use crate::counts::{GeometryCounts, InstanceCost};
use crate::error::InstanceError;
use crate::settings::BoundsSettings;
use crate::temporal::assembler::{self, LinearBounds, MotionSegments};
use crate::temporal::derivative::MotionDerivativeCoefficients;
use crate::temporal::keyframes::{Interpolation, KeyframeStore};
use crate::temporal::segment::{
    bound_segment_linear, bound_segment_nonlinear, BoundsDelta, SegmentQuery,
};
use crate::temporal::time_range::TimeRange;
use crate::types::aabb::Aabb;
use crate::types::decomposition::QuaternionDecomposition;

/// Upper limit on time steps per instance.
pub const MAX_TIME_STEPS: usize = 129;

/// Relative distance (in segments) within which a time snaps to a keyframe.
const KEYFRAME_SNAP: f32 = 4.0 * f32::EPSILON;

/// Ray mask assigned to new instances (all bits set).
pub const DEFAULT_MASK: u32 = u32::MAX;

/// The scene an instance places into the world.
pub trait InstancedScene: Send + Sync {
    /// Object-space bounds of the scene's contents at global `time`.
    fn object_bounds(&self, time: f32) -> Aabb;
}

/// Shared handle to an instanced scene.
pub type SceneHandle = Arc<dyn InstancedScene>;

/// A sub-scene placed in the world by per-time-step transforms.
#[derive(Clone)]
pub struct Instance {
    keyframes: KeyframeStore,
    interpolation: Option<Interpolation>,
    scene: Option<SceneHandle>,
    world_to_local0: Option<Affine3>,
    time_range: TimeRange,
    mask: u32,
    cost: InstanceCost,
    settings: BoundsSettings,
    modified: bool,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("num_time_steps", &self.keyframes.len())
            .field("interpolation", &self.interpolation)
            .field("has_scene", &self.scene.is_some())
            .field("time_range", &self.time_range)
            .field("mask", &self.mask)
            .field("cost", &self.cost)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

fn check_time_step_count(num_time_steps: usize) -> Result<(), InstanceError> {
    if num_time_steps == 0 || num_time_steps > MAX_TIME_STEPS {
        return Err(InstanceError::InvalidTimeStepCount(num_time_steps));
    }
    Ok(())
}

impl Instance {
    /// Creates an instance of `scene` with `num_time_steps` identity
    /// keyframes and default settings.
    ///
    /// # Errors
    /// [`InstanceError::InvalidTimeStepCount`] unless
    /// `1 <= num_time_steps <= MAX_TIME_STEPS`.
    pub fn new(scene: Option<SceneHandle>, num_time_steps: usize) -> Result<Self, InstanceError> {
        Self::with_settings(scene, num_time_steps, BoundsSettings::default())
    }

    /// [`Self::new`] with explicit bounds solver settings.
    ///
    /// # Errors
    /// Same as [`Self::new`].
    pub fn with_settings(
        scene: Option<SceneHandle>,
        num_time_steps: usize,
        settings: BoundsSettings,
    ) -> Result<Self, InstanceError> {
        check_time_step_count(num_time_steps)?;
        Ok(Self {
            keyframes: KeyframeStore::new(num_time_steps),
            interpolation: None,
            scene,
            world_to_local0: Some(Affine3::identity()),
            time_range: TimeRange::UNIT,
            mask: DEFAULT_MASK,
            cost: InstanceCost::default(),
            settings,
            modified: true,
        })
    }

    /// Sets the affine transform of `time_step`, reverting that step to
    /// affine-only.
    ///
    /// # Errors
    /// [`InstanceError::InvalidTimeStep`] when `time_step` is out of range;
    /// the instance is left untouched.
    pub fn set_transform(&mut self, xfm: Affine3, time_step: usize) -> Result<(), InstanceError> {
        self.keyframes.set_transform(xfm, time_step)?;
        self.modified = true;
        Ok(())
    }

    /// Sets `time_step` from a quaternion decomposition.
    ///
    /// # Errors
    /// [`InstanceError::InvalidTimeStep`] when `time_step` is out of range;
    /// the instance is left untouched.
    pub fn set_quaternion_decomposition(
        &mut self,
        qd: QuaternionDecomposition,
        time_step: usize,
    ) -> Result<(), InstanceError> {
        self.keyframes.set_quaternion_decomposition(qd, time_step)?;
        self.modified = true;
        Ok(())
    }

    /// Changes the number of time steps, keeping overlapping keyframes.
    ///
    /// # Errors
    /// [`InstanceError::InvalidTimeStepCount`] unless
    /// `1 <= num_time_steps <= MAX_TIME_STEPS`.
    pub fn set_num_time_steps(&mut self, num_time_steps: usize) -> Result<(), InstanceError> {
        check_time_step_count(num_time_steps)?;
        if num_time_steps == self.keyframes.len() {
            return Ok(());
        }
        trace!(
            from = self.keyframes.len(),
            to = num_time_steps,
            "resizing instance keyframes"
        );
        self.keyframes.resize(num_time_steps);
        self.modified = true;
        Ok(())
    }

    /// Replaces the instanced scene. The previous handle is released after
    /// the new one is stored.
    pub fn set_instanced_scene(&mut self, scene: Option<SceneHandle>) {
        self.scene = scene;
        self.modified = true;
    }

    /// Sets the ray mask.
    pub fn set_mask(&mut self, mask: u32) {
        self.mask = mask;
        self.modified = true;
    }

    /// Sets the global time range the keyframes are spread over.
    ///
    /// # Errors
    /// [`InstanceError::InvalidTimeRange`] when `lower > upper` or either end
    /// is NaN.
    pub fn set_time_range(&mut self, range: TimeRange) -> Result<(), InstanceError> {
        if !range.is_ordered() {
            return Err(InstanceError::InvalidTimeRange {
                lower: range.lower,
                upper: range.upper,
            });
        }
        self.time_range = range;
        self.modified = true;
        Ok(())
    }

    /// Sets the cost category reported to scene statistics.
    pub fn set_cost(&mut self, cost: InstanceCost) {
        self.cost = cost;
        self.modified = true;
    }

    /// Validates the keyframes and fixes the interpolation mode.
    ///
    /// On success the inverse of keyframe 0 is cached (cleared when that
    /// transform is singular) and the instance is marked modified.
    ///
    /// # Errors
    /// - [`InstanceError::MixedInterpolation`] when only some time steps
    ///   carry a quaternion decomposition.
    /// - [`InstanceError::InvariantViolation`] when classification is
    ///   self-contradictory.
    ///
    /// On error nothing is changed.
    #[instrument(skip(self), fields(time_steps = self.keyframes.len()))]
    pub fn commit(&mut self) -> Result<(), InstanceError> {
        let mode = self.keyframes.classify()?;
        self.interpolation = Some(mode);
        self.world_to_local0 = self.keyframes.transform(0).and_then(Affine3::inverse);
        if self.world_to_local0.is_none() {
            warn!("keyframe 0 is singular; inverse cache cleared");
        }
        self.modified = true;
        debug!(?mode, "instance committed");
        Ok(())
    }

    /// Opens the build phase: samples the scene bounds at every keyframe and,
    /// for nonlinear interpolation, derives per-segment motion coefficients.
    ///
    /// # Errors
    /// - [`InstanceError::MissingScene`] without an instanced scene.
    /// - Classification errors as in [`Self::commit`].
    pub fn pre_commit(&self) -> Result<CommitScope<'_>, InstanceError> {
        let mode = self.keyframes.classify()?;
        let scene = self.scene.as_deref().ok_or(InstanceError::MissingScene)?;
        let object_bounds = (0..self.keyframes.len())
            .map(|i| scene.object_bounds(self.keyframe_time(i)))
            .collect();
        let coefficients: Vec<_> = match mode {
            Interpolation::Linear => Vec::new(),
            Interpolation::Nonlinear => (0..self.keyframes.num_segments())
                .filter_map(|i| {
                    let q0 = self.keyframes.decomposition(i)?;
                    let q1 = self.keyframes.decomposition(i + 1)?;
                    Some(MotionDerivativeCoefficients::new(q0, q1))
                })
                .collect(),
        };
        if !coefficients.is_empty() {
            debug!(segments = coefficients.len(), "coefficients built");
        }
        Ok(CommitScope {
            instance: self,
            mode,
            object_bounds,
            coefficients,
        })
    }

    /// Closes the build phase.
    pub fn post_commit(&mut self) {
        self.modified = false;
    }

    /// Transform at global `time`.
    ///
    /// Times outside the instance's time range clamp to the first or last
    /// keyframe; times landing exactly on a keyframe return it unchanged.
    /// Before the first commit the keyframes are blended linearly.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn transform_at(&self, time: f32) -> Affine3 {
        let segments = self.keyframes.num_segments();
        let keyframe = |i: usize| self.keyframes.transform(i).copied().unwrap_or_default();
        if segments == 0 {
            return keyframe(0);
        }
        let s = self.time_range.normalize(time);
        let s = if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) };
        let segs = segments as f32;
        let pos = s * segs;
        let nearest = pos.round();
        if (pos - nearest).abs() <= KEYFRAME_SNAP * segs {
            return keyframe(nearest as usize);
        }
        let i = (pos.floor() as usize).min(segments - 1);
        let f = pos - i as f32;
        let mode = self.interpolation.unwrap_or(Interpolation::Linear);
        self.keyframes.interpolate(i, i + 1, f, mode)
    }

    /// Adds this instance to the matching cost/motion-blur counter.
    pub fn add_elements_to_count(&self, counts: &mut GeometryCounts) {
        counts.add_instances(self.cost, self.is_motion_blurred(), 1);
    }

    #[allow(clippy::cast_precision_loss)]
    fn keyframe_time(&self, i: usize) -> f32 {
        let segments = self.keyframes.num_segments();
        if segments == 0 {
            return self.time_range.lower;
        }
        self.time_range.lower + self.time_range.size() * (i as f32 / segments as f32)
    }

    /// Number of time steps.
    pub fn num_time_steps(&self) -> usize {
        self.keyframes.len()
    }

    /// Returns `true` with more than one time step.
    pub fn is_motion_blurred(&self) -> bool {
        self.keyframes.len() > 1
    }

    /// Stored keyframes.
    pub fn keyframes(&self) -> &KeyframeStore {
        &self.keyframes
    }

    /// Mode fixed by the last successful commit, `None` before the first.
    pub fn interpolation(&self) -> Option<Interpolation> {
        self.interpolation
    }

    /// Cached inverse of keyframe 0, refreshed by [`Self::commit`].
    pub fn world_to_local0(&self) -> Option<Affine3> {
        self.world_to_local0
    }

    /// The instanced scene, if attached.
    pub fn instanced_scene(&self) -> Option<&SceneHandle> {
        self.scene.as_ref()
    }

    /// Global time range of the keyframes.
    pub fn time_range(&self) -> TimeRange {
        self.time_range
    }

    /// Ray mask.
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Cost category.
    pub fn cost(&self) -> InstanceCost {
        self.cost
    }

    /// Bounds solver settings.
    pub fn settings(&self) -> &BoundsSettings {
        &self.settings
    }

    /// Returns `true` when the instance changed since the last
    /// [`Self::post_commit`].
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// Read-only view of an instance for the duration of one build.
///
/// Owns the scene bounds sampled at each keyframe and, for nonlinear
/// interpolation, one [`MotionDerivativeCoefficients`] per segment. The
/// scope borrows the instance, so it cannot outlive the build phase.
pub struct CommitScope<'a> {
    instance: &'a Instance,
    mode: Interpolation,
    object_bounds: Vec<Aabb>,
    coefficients: Vec<MotionDerivativeCoefficients>,
}

impl fmt::Debug for CommitScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitScope")
            .field("mode", &self.mode)
            .field("object_bounds", &self.object_bounds)
            .field("segments", &self.coefficients.len())
            .finish_non_exhaustive()
    }
}

impl CommitScope<'_> {
    /// Interpolation mode the scope was built for.
    pub fn mode(&self) -> Interpolation {
        self.mode
    }

    /// Number of segments.
    pub fn num_segments(&self) -> usize {
        self.instance.keyframes.num_segments()
    }

    /// Correction for segment `segment` (keyframes `segment` and
    /// `segment + 1`) against the linear reference in `query`.
    ///
    /// Out-of-range segments need no correction.
    pub fn bound_segment(&self, segment: usize, query: &SegmentQuery) -> BoundsDelta {
        let keyframes = &self.instance.keyframes;
        if segment >= keyframes.num_segments() {
            return BoundsDelta::ZERO;
        }
        if self.mode == Interpolation::Nonlinear {
            if let (Some(coeffs), Some(qd0), Some(qd1)) = (
                self.coefficients.get(segment),
                keyframes.decomposition(segment),
                keyframes.decomposition(segment + 1),
            ) {
                return bound_segment_nonlinear(coeffs, qd0, qd1, query, &self.instance.settings);
            }
        }
        match (keyframes.transform(segment), keyframes.transform(segment + 1)) {
            (Some(xfm0), Some(xfm1)) => bound_segment_linear(xfm0, xfm1, query),
            _ => BoundsDelta::ZERO,
        }
    }

    /// Conservative linear bounds over the global time range `query`.
    pub fn linear_bounds(&self, query: TimeRange) -> LinearBounds {
        assembler::linear_bounds(self, query, self.instance.time_range, self.num_segments())
    }

    /// Union of the bounds over `query`.
    pub fn bounds(&self, query: TimeRange) -> Aabb {
        self.linear_bounds(query).hull()
    }
}

impl MotionSegments for CommitScope<'_> {
    fn blended_bounds(&self, i0: usize, i1: usize, f: f32) -> Aabb {
        let object = self.object_bounds[i0].lerp(&self.object_bounds[i1], f);
        let xfm = self.instance.keyframes.interpolate(i0, i1, f, self.mode);
        object.transformed(&xfm)
    }

    fn object_bounds(&self, i: usize) -> Aabb {
        self.object_bounds[i]
    }

    fn bound_segment(&self, segment: usize, query: &SegmentQuery) -> BoundsDelta {
        CommitScope::bound_segment(self, segment, query)
    }
}
