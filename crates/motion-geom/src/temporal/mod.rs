// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Keyframed motion and the machinery that bounds it over time.

#[doc = "Bounds over a query range from per-segment corrections."]
pub mod assembler;
#[doc = "Closed-form motion of a blended point under decomposition interpolation."]
pub mod derivative;
#[doc = "Per-time-step transforms and interpolation mode classification."]
pub mod keyframes;
#[doc = "Correction of linear bounds within one segment."]
pub mod segment;
#[doc = "Closed `[lower, upper]` time intervals."]
pub mod time_range;
