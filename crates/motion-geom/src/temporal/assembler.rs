// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Conservative linear bounds over an arbitrary query time range.
//!
//! The result is a pair of boxes `(bounds0, bounds1)` such that the linear
//! blend `lerp(bounds0, bounds1, s)` contains the instance at every time of
//! the query, with `s` normalized to the query range. Building it takes two
//! passes over the covered keyframes:
//!
//! 1. Seed the pair with the transformed bounds at the (possibly fractional)
//!    query endpoints, then widen it until every interior keyframe box fits
//!    under the blend.
//! 2. Ask each covered segment for the bulge of its true motion past the
//!    widened blend ([`MotionSegments::bound_segment`]) and apply the worst
//!    case to both endpoints.

use crate::temporal::segment::{BoundsDelta, SegmentQuery};
use crate::temporal::time_range::TimeRange;
use crate::types::aabb::Aabb;
use motion_core::Vec3;

/// Per-keyframe data the assembler pulls from a committed instance.
///
/// Keyframe indices run over `0..=segments`; segment `i` spans keyframes
/// `i` and `i + 1`.
pub trait MotionSegments {
    /// World bounds of the object interpolated from keyframe `i0` (f = 0)
    /// towards keyframe `i1` (f = 1).
    fn blended_bounds(&self, i0: usize, i1: usize, f: f32) -> Aabb;

    /// Object-space bounds sampled at keyframe `i`.
    fn object_bounds(&self, i: usize) -> Aabb;

    /// Correction for segment `segment` against the linear reference in
    /// `query`.
    fn bound_segment(&self, segment: usize, query: &SegmentQuery) -> BoundsDelta;

    /// World bounds at keyframe `i`.
    fn keyframe_bounds(&self, i: usize) -> Aabb {
        self.blended_bounds(i, i, 0.0)
    }
}

/// Endpoint boxes of a conservative linear bound.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearBounds {
    /// Box at the start of the query range.
    pub bounds0: Aabb,
    /// Box at the end of the query range.
    pub bounds1: Aabb,
}

impl LinearBounds {
    /// A bound that does not move.
    #[must_use]
    pub fn fixed(bounds: Aabb) -> Self {
        Self {
            bounds0: bounds,
            bounds1: bounds,
        }
    }

    /// Blended box at normalized query time `s`.
    #[must_use]
    pub fn interpolate(&self, s: f32) -> Aabb {
        self.bounds0.lerp(&self.bounds1, s)
    }

    /// Union of both endpoint boxes.
    #[must_use]
    pub fn hull(&self) -> Aabb {
        self.bounds0.union(&self.bounds1)
    }

    fn widened(&self, delta: &BoundsDelta) -> Self {
        Self {
            bounds0: delta.apply(&self.bounds0),
            bounds1: delta.apply(&self.bounds1),
        }
    }
}

/// Query range expressed in segment units, plus the derived keyframe indices.
#[derive(Debug, Copy, Clone)]
struct SegmentSpan {
    /// `[0, 1]`-normalized query relative to the geometry time range.
    relative: TimeRange,
    segs: f32,
    lower: f32,
    upper: f32,
    /// `floor(lower)` and `ceil(upper)` clamped to `0..=segments`.
    lower_clamped: f32,
    upper_clamped: f32,
    ilower: usize,
    iupper: usize,
    /// Loop bounds: `floor(lower)` clamped to `>= -1`, `ceil(upper)` to
    /// `<= segments + 1`.
    ilower_iter: i64,
    iupper_iter: i64,
}

impl SegmentSpan {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn new(relative: TimeRange, segments: usize) -> Self {
        let segs = segments as f32;
        let lower = relative.lower * segs;
        let upper = relative.upper * segs;
        let lowerf = lower.floor();
        let upperf = upper.ceil();
        let lower_clamped = lowerf.max(0.0);
        let upper_clamped = upperf.min(segs);
        Self {
            relative,
            segs,
            lower,
            upper,
            lower_clamped,
            upper_clamped,
            ilower: lower_clamped as usize,
            iupper: upper_clamped.max(0.0) as usize,
            ilower_iter: lowerf.max(-1.0) as i64,
            iupper_iter: upperf.min(segs + 1.0) as i64,
        }
    }

    /// Normalized query time of keyframe `i`.
    #[allow(clippy::cast_precision_loss)]
    fn keyframe_time(&self, i: usize) -> f32 {
        (i as f32 / self.segs - self.relative.lower) / self.relative.size()
    }

    /// Fraction of the first covered segment that lies before the query.
    fn head(&self) -> f32 {
        (self.lower - self.lower_clamped).max(0.0)
    }

    /// Fraction of the last covered segment that lies after the query.
    fn tail(&self) -> f32 {
        (self.upper_clamped - self.upper).max(0.0)
    }

    fn is_single_segment(&self) -> bool {
        self.iupper_iter - self.ilower_iter == 1
    }
}

/// Computes conservative linear bounds of `source` over `query`.
///
/// `geom_range` is the time range the keyframes are spread over and
/// `segments` the number of segments (`keyframes - 1`). Queries that do not
/// overlap the geometry range, or that are empty, collapse to the static
/// bounds at the nearest covered time.
pub fn linear_bounds<S>(
    source: &S,
    query: TimeRange,
    geom_range: TimeRange,
    segments: usize,
) -> LinearBounds
where
    S: MotionSegments + ?Sized,
{
    let relative = geom_range.relative(&query);
    if segments == 0 {
        return LinearBounds::fixed(source.keyframe_bounds(0));
    }
    let size = relative.size();
    if size.is_nan() || size <= 0.0 {
        return static_bounds(source, relative.lower, segments);
    }
    let span = SegmentSpan::new(relative, segments);
    if span.iupper <= span.ilower {
        return static_bounds(source, span.lower, segments);
    }
    if span.is_single_segment() {
        single_segment(source, &span)
    } else {
        multi_segment(source, &span)
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn static_bounds<S>(source: &S, position: f32, segments: usize) -> LinearBounds
where
    S: MotionSegments + ?Sized,
{
    let segs = segments as f32;
    let s = if position.is_nan() {
        0.0
    } else {
        position.clamp(0.0, segs)
    };
    let i = (s.floor() as usize).min(segments - 1);
    let b = source.blended_bounds(i, i + 1, s - i as f32);
    LinearBounds::fixed(b)
}

/// Query inside a single segment: blend the endpoint boxes and correct once.
fn single_segment<S>(source: &S, span: &SegmentSpan) -> LinearBounds
where
    S: MotionSegments + ?Sized,
{
    let (i0, i1) = (span.ilower, span.iupper);
    let (head, tail) = (span.head(), span.tail());
    let seed = LinearBounds {
        bounds0: source.blended_bounds(i0, i1, head),
        bounds1: source.blended_bounds(i1, i0, tail),
    };
    let query = SegmentQuery {
        object0: source.object_bounds(i0),
        object1: source.object_bounds(i1),
        linear0: seed.interpolate(span.keyframe_time(i0)),
        linear1: seed.interpolate(span.keyframe_time(i1)),
        window: TimeRange::new(head, 1.0 - tail),
    };
    seed.widened(&source.bound_segment(i0, &query))
}

/// Query across several segments: fit interior keyframes, then correct each
/// covered segment against the fitted blend.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn multi_segment<S>(source: &S, span: &SegmentSpan) -> LinearBounds
where
    S: MotionSegments + ?Sized,
{
    let (ilower, iupper) = (span.ilower, span.iupper);
    let mut fit = LinearBounds {
        bounds0: source.blended_bounds(ilower, ilower + 1, span.head()),
        bounds1: source.blended_bounds(iupper, iupper - 1, span.tail()),
    };

    // Interior keyframes, as at most `segments + 1` in-range indices.
    for i in (span.ilower_iter + 1)..span.iupper_iter {
        let i = i as usize;
        let reference = fit.interpolate(span.keyframe_time(i));
        let actual = source.keyframe_bounds(i);
        let lower = actual.min().sub(&reference.min()).min(&Vec3::ZERO);
        let upper = actual.max().sub(&reference.max()).max(&Vec3::ZERO);
        fit = fit.widened(&BoundsDelta { lower, upper });
    }

    let mut delta = BoundsDelta::ZERO;
    for i in ilower + 1..=iupper {
        let window = TimeRange::new(
            if i == ilower + 1 { span.head() } else { 0.0 },
            if i == iupper { 1.0 - span.tail() } else { 1.0 },
        );
        let query = SegmentQuery {
            object0: source.object_bounds(i - 1),
            object1: source.object_bounds(i),
            linear0: fit.interpolate(span.keyframe_time(i - 1)),
            linear1: fit.interpolate(span.keyframe_time(i)),
            window,
        };
        delta = delta.merge(&source.bound_segment(i - 1, &query));
    }
    fit.widened(&delta)
}
