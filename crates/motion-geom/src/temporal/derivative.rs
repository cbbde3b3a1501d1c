// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Closed-form motion of a point under quaternion-decomposed interpolation.
//!
//! Between two decomposed keyframes the world position of a blended object
//! point `lerp(p0, p1, t)` is
//!
//! ```text
//! x(t) = lerp(T0, T1, t) + R(t) * (lerp(M0, M1, t) * lerp(p0, p1, t) + lerp(s0, s1, t))
//! ```
//!
//! With `q(t) = q0 cos(θt) + q⊥ sin(θt)` every entry of `R(t)` is
//! `k + c cos(ωt) + s sin(ωt)` with `ω = 2θ`, and the bracketed term is
//! quadratic in `t`. Each coordinate is therefore
//! `A(t) + B(t) cos(ωt) + C(t) sin(ωt)` with quadratic `A`, `B`, `C`, a shape
//! that is closed under differentiation. Roots of the derivative are found
//! with interval arithmetic plus bisection.

use motion_core::math::{Interval, Mat3, Quat, Vec3, EPSILON};
use tracing::trace;

use crate::settings::{BoundsSettings, MAX_ROOTS};
use crate::temporal::time_range::TimeRange;
use crate::types::decomposition::QuaternionDecomposition;

const BISECTION_STEPS: u32 = 32;

/// `c0 + c1 t + c2 t²`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
struct Quadratic([f32; 3]);

impl Quadratic {
    fn eval(&self, t: f32) -> f32 {
        let [c0, c1, c2] = self.0;
        c0 + t * (c1 + t * c2)
    }

    fn eval_interval(&self, t: Interval) -> Interval {
        let [c0, c1, c2] = self.0;
        t * (t * c2 + c1) + c0
    }

    fn derivative(&self) -> Self {
        let [_, c1, c2] = self.0;
        Self([c1, 2.0 * c2, 0.0])
    }

    fn add(&self, other: &Self) -> Self {
        let [a0, a1, a2] = self.0;
        let [b0, b1, b2] = other.0;
        Self([a0 + b0, a1 + b1, a2 + b2])
    }

    fn scale(&self, s: f32) -> Self {
        let [c0, c1, c2] = self.0;
        Self([c0 * s, c1 * s, c2 * s])
    }

    fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }
}

/// `a(t) + b(t) cos(ωt) + c(t) sin(ωt)` with quadratic `a`, `b`, `c`.
#[derive(Debug, Copy, Clone, PartialEq)]
struct TrigPoly {
    a: Quadratic,
    b: Quadratic,
    c: Quadratic,
    omega: f32,
}

impl TrigPoly {
    fn eval(&self, t: f32) -> f32 {
        let (sin, cos) = (self.omega * t).sin_cos();
        self.a.eval(t) + self.b.eval(t) * cos + self.c.eval(t) * sin
    }

    fn eval_interval(&self, t: Interval) -> Interval {
        let phase = t * self.omega;
        self.a.eval_interval(t)
            + self.b.eval_interval(t) * phase.cos()
            + self.c.eval_interval(t) * phase.sin()
    }

    fn derivative(&self) -> Self {
        // (b cos)' = b' cos - ω b sin ; (c sin)' = c' sin + ω c cos
        Self {
            a: self.a.derivative(),
            b: self.b.derivative().add(&self.c.scale(self.omega)),
            c: self.c.derivative().add(&self.b.scale(-self.omega)),
            omega: self.omega,
        }
    }

    fn offset(&self, value: f32) -> Self {
        let mut out = *self;
        out.a.0[0] += value;
        out
    }

    fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite() && self.omega.is_finite()
    }
}

/// One rotation-matrix entry `k + c cos(ωt) + s sin(ωt)`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
struct RotationTerm {
    k: f32,
    c: f32,
    s: f32,
}

impl RotationTerm {
    const ONE: Self = Self {
        k: 1.0,
        c: 0.0,
        s: 0.0,
    };

    fn add(self, other: Self) -> Self {
        Self {
            k: self.k + other.k,
            c: self.c + other.c,
            s: self.s + other.s,
        }
    }

    fn scale(self, f: f32) -> Self {
        Self {
            k: self.k * f,
            c: self.c * f,
            s: self.s * f,
        }
    }
}

/// Segment-wide data for [`MotionDerivative`], derived from the two
/// decompositions bounding one segment.
///
/// Built once per segment per commit cycle and shared by every corner and
/// axis evaluated on that segment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionDerivativeCoefficients {
    rotation: [[RotationTerm; 3]; 3],
    omega: f32,
    translation: [Vec3; 2],
    scale_skew: [Mat3; 2],
    shift: [Vec3; 2],
}

impl MotionDerivativeCoefficients {
    /// Precomputes the trigonometric form of the slerped rotation and the
    /// endpoint linear parts for the segment `qd0 → qd1`.
    #[must_use]
    pub fn new(qd0: &QuaternionDecomposition, qd1: &QuaternionDecomposition) -> Self {
        let q0 = qd0.rotation.normalize();
        let mut q1 = qd1.rotation.normalize();
        let mut cos_theta = q0.dot(&q1);
        if cos_theta < 0.0 {
            q1 = q1.scale(-1.0);
            cos_theta = -cos_theta;
        }
        let cos_theta = cos_theta.min(1.0);
        let perp = q1.add(&q0.scale(-cos_theta));
        let (perp, omega) = if perp.dot(&perp).sqrt() <= EPSILON {
            (Quat::new(0.0, 0.0, 0.0, 0.0), 0.0)
        } else {
            (perp.normalize(), 2.0 * cos_theta.acos())
        };

        Self {
            rotation: rotation_terms(&q0, &perp),
            omega,
            translation: [qd0.translation, qd1.translation],
            scale_skew: [qd0.scale_skew(), qd1.scale_skew()],
            shift: [qd0.shift, qd1.shift],
        }
    }

    /// Twice the slerp half-angle between the keyframe rotations.
    #[must_use]
    pub fn omega(&self) -> f32 {
        self.omega
    }
}

/// Rotation matrix of `q0 cos(θt) + perp sin(θt)` expressed per entry.
fn rotation_terms(q0: &Quat, perp: &Quat) -> [[RotationTerm; 3]; 3] {
    // q_a q_b = ½(q0a q0b + pa pb) + ½(q0a q0b − pa pb) cos 2θt + ½(q0a pb + pa q0b) sin 2θt
    let prod = |a: usize, b: usize| {
        let (qa, qb, pa, pb) = (q0.get(a), q0.get(b), perp.get(a), perp.get(b));
        RotationTerm {
            k: 0.5 * (qa * qb + pa * pb),
            c: 0.5 * (qa * qb - pa * pb),
            s: 0.5 * (qa * pb + pa * qb),
        }
    };
    let (x, y, z, w) = (0, 1, 2, 3);
    let (xx, yy, zz) = (prod(x, x), prod(y, y), prod(z, z));
    let (xy, xz, yz) = (prod(x, y), prod(x, z), prod(y, z));
    let (wx, wy, wz) = (prod(w, x), prod(w, y), prod(w, z));
    let diag = |a: RotationTerm, b: RotationTerm| RotationTerm::ONE.add(a.add(b).scale(-2.0));
    let off = |a: RotationTerm, b: RotationTerm, sign: f32| a.add(b.scale(sign)).scale(2.0);
    [
        [diag(yy, zz), off(xy, wz, -1.0), off(xz, wy, 1.0)],
        [off(xy, wz, 1.0), diag(xx, zz), off(yz, wx, -1.0)],
        [off(xz, wy, -1.0), off(yz, wx, 1.0), diag(xx, yy)],
    ]
}

/// Motion of one coordinate of one blended object point over a segment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MotionDerivative {
    position: TrigPoly,
    velocity: TrigPoly,
    acceleration: TrigPoly,
}

impl MotionDerivative {
    /// Builds the motion of world coordinate `dim` of the point that blends
    /// from object-space `p0` (t = 0) to `p1` (t = 1).
    #[must_use]
    pub fn new(coeffs: &MotionDerivativeCoefficients, dim: usize, p0: &Vec3, p1: &Vec3) -> Self {
        let dp = p1.sub(p0);
        let [m0, m1] = coeffs.scale_skew;
        let dm = m1.sub(&m0);
        let [s0, s1] = coeffs.shift;
        let [t0, t1] = coeffs.translation;

        let v0 = m0.transform(p0).add(&s0);
        let v1 = dm.transform(p0).add(&m0.transform(&dp)).add(&s1.sub(&s0));
        let v2 = dm.transform(&dp);

        let mut a = Quadratic([t0.get(dim), t1.get(dim) - t0.get(dim), 0.0]);
        let mut b = Quadratic::default();
        let mut c = Quadratic::default();
        for (j, term) in coeffs.rotation[dim].iter().enumerate() {
            let v = Quadratic([v0.get(j), v1.get(j), v2.get(j)]);
            a = a.add(&v.scale(term.k));
            b = b.add(&v.scale(term.c));
            c = c.add(&v.scale(term.s));
        }

        let position = TrigPoly {
            a,
            b,
            c,
            omega: coeffs.omega,
        };
        let velocity = position.derivative();
        Self {
            position,
            velocity,
            acceleration: velocity.derivative(),
        }
    }

    /// World coordinate at parameter `t`.
    #[must_use]
    pub fn position(&self, t: f32) -> f32 {
        self.position.eval(t)
    }

    /// Rate of change of the world coordinate at parameter `t`.
    #[must_use]
    pub fn velocity(&self, t: f32) -> f32 {
        self.velocity.eval(t)
    }

    /// Finds parameters in `interval` where `velocity(t) + target == 0`,
    /// using default [`BoundsSettings`].
    ///
    /// Writes at most `min(roots.len(), MAX_ROOTS)` values and returns how
    /// many were written; slots past `MAX_ROOTS` in a longer buffer are left
    /// untouched. Order is unspecified and near-duplicates may occur. An
    /// unordered or NaN `interval` yields no roots.
    pub fn find_roots(&self, interval: TimeRange, target: f32, roots: &mut [f32]) -> usize {
        self.find_roots_with(interval, target, roots, &BoundsSettings::default())
    }

    /// [`Self::find_roots`] with explicit solver settings.
    pub fn find_roots_with(
        &self,
        interval: TimeRange,
        target: f32,
        roots: &mut [f32],
        settings: &BoundsSettings,
    ) -> usize {
        let g = self.velocity.offset(target);
        if !g.is_finite() || !interval.is_ordered() {
            return 0;
        }
        let cap = roots.len().min(MAX_ROOTS);
        let mut solver = RootSolver {
            g,
            h: self.acceleration,
            settings,
            roots: &mut roots[..cap],
            found: 0,
        };
        solver.solve(interval.lower, interval.upper, 0);
        solver.found
    }
}

struct RootSolver<'a> {
    g: TrigPoly,
    h: TrigPoly,
    settings: &'a BoundsSettings,
    roots: &'a mut [f32],
    found: usize,
}

impl RootSolver<'_> {
    fn push(&mut self, t: f32) {
        if self.found < self.roots.len() {
            self.roots[self.found] = t;
            self.found += 1;
        }
    }

    fn solve(&mut self, lo: f32, hi: f32, depth: u32) {
        if self.found >= self.roots.len() {
            trace!(lo, hi, "root cap reached; remaining subinterval skipped");
            return;
        }
        let span = Interval::new(lo, hi);
        if !self.g.eval_interval(span).contains_zero() {
            return;
        }
        if !self.h.eval_interval(span).contains_zero() {
            // Monotone on the span: at most one root, present iff the sign flips.
            let (glo, ghi) = (self.g.eval(lo), self.g.eval(hi));
            if glo * ghi <= 0.0 {
                let t = self.bisect(lo, hi, glo);
                self.push(t);
            }
            return;
        }
        if depth >= self.settings.max_depth || span.width() <= self.settings.tolerance {
            self.push(span.midpoint());
            return;
        }
        let mid = span.midpoint();
        self.solve(lo, mid, depth + 1);
        self.solve(mid, hi, depth + 1);
    }

    fn bisect(&self, mut lo: f32, mut hi: f32, mut glo: f32) -> f32 {
        for _ in 0..BISECTION_STEPS {
            if hi - lo <= self.settings.tolerance {
                break;
            }
            let mid = 0.5 * (lo + hi);
            let gmid = self.g.eval(mid);
            if glo * gmid <= 0.0 {
                hi = mid;
            } else {
                lo = mid;
                glo = gmid;
            }
        }
        0.5 * (lo + hi)
    }
}
