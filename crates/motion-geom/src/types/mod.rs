// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used by motion bounds (AABB, quaternion decomposition).
//!
//! Affine math uses `f32`; keyframe transforms themselves are
//! [`motion_core::math::Affine3`].

#[doc = "Axis-aligned bounding boxes."]
pub mod aabb;
#[doc = "Rotation/translation/scale-skew split of a keyframe transform."]
pub mod decomposition;
