// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::float_cmp)]
use core::f32::consts::{FRAC_PI_2, PI};
use motion_core::math::{Affine3, Mat3, Quat, Vec3};
use proptest::prelude::*;

fn approx_eq(a: f32, b: f32, eps: f32) {
    let diff = (a - b).abs();
    assert!(diff <= eps, "expected {b}, got {a} (diff {diff})");
}

fn approx_eq3(a: Vec3, b: Vec3, eps: f32) {
    for i in 0..3 {
        approx_eq(a.get(i), b.get(i), eps);
    }
}

#[test]
fn quat_identity_maps_to_identity_matrix() {
    assert_eq!(Quat::identity().to_mat3(), Mat3::identity());
    let composed = Quat::identity().multiply(&Quat::identity());
    assert_eq!(composed.to_array(), Quat::identity().to_array());
}

#[test]
fn quat_rotation_about_z_turns_x_into_y() {
    let q = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2);
    let v = q.to_mat3().transform(&Vec3::UNIT_X);
    approx_eq3(v, Vec3::UNIT_Y, 1e-6);
}

#[test]
fn slerp_hits_endpoints_and_midpoint() {
    let q0 = Quat::identity();
    let q1 = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2);
    assert_eq!(q0.slerp(&q1, 0.0), q0);
    let end = q0.slerp(&q1, 1.0);
    for i in 0..4 {
        approx_eq(end.get(i), q1.get(i), 1e-5);
    }
    let mid = q0.slerp(&q1, 0.5);
    let expected = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2 * 0.5);
    for i in 0..4 {
        approx_eq(mid.get(i), expected.get(i), 1e-5);
    }
}

#[test]
fn slerp_takes_the_short_arc() {
    // 350° about Z is the same orientation as -10°; the blend must not spin
    // through 180°.
    let q0 = Quat::identity();
    let q1 = Quat::from_axis_angle(Vec3::UNIT_Z, 2.0 * PI - 0.1745);
    let mid = q0.slerp(&q1, 0.5);
    let v = mid.to_mat3().transform(&Vec3::UNIT_X);
    assert!(v.x() > 0.99, "short arc should stay near +X: {v:?}");
}

#[test]
fn slerp_of_parallel_quaternions_is_stable() {
    let q = Quat::from_axis_angle(Vec3::UNIT_Y, 0.3);
    let r = q.slerp(&q, 0.37);
    for i in 0..4 {
        approx_eq(r.get(i), q.get(i), 1e-6);
    }
}

#[test]
fn quat_from_mat3_recovers_rotation() {
    for angle in [0.0f32, 0.5, FRAC_PI_2, 2.5, PI - 1e-3] {
        let axis = Vec3::new(1.0, -2.0, 0.5).normalize();
        let q = Quat::from_axis_angle(axis, angle);
        let back = Quat::from_mat3(&q.to_mat3());
        let sign = if q.dot(&back) < 0.0 { -1.0 } else { 1.0 };
        for i in 0..4 {
            approx_eq(back.get(i) * sign, q.get(i), 1e-4);
        }
    }
}

#[test]
fn affine_lerp_is_exact_at_endpoints() {
    let a = Affine3::new(Mat3::scale(0.3, 1.7, 2.9), Vec3::new(0.1, 0.2, 0.7));
    let b = Affine3::from_quat(&Quat::from_axis_angle(Vec3::UNIT_X, 1.1));
    assert_eq!(a.lerp(&b, 0.0), a);
    assert_eq!(a.lerp(&b, 1.0), b);
}

#[test]
fn singular_affine_has_no_inverse() {
    let flat = Affine3::new(Mat3::scale(1.0, 0.0, 1.0), Vec3::ZERO);
    assert!(flat.inverse().is_none());
}

#[test]
fn non_finite_linear_part_has_no_inverse() {
    let nan = Mat3::scale(f32::NAN, 1.0, 1.0);
    assert!(nan.inverse().is_none());
    assert!(Affine3::new(nan, Vec3::ZERO).inverse().is_none());
}

proptest! {
    #[test]
    fn affine_inverse_round_trips_points(
        angle in -3.0f32..3.0,
        sx in 0.5f32..4.0,
        sy in 0.5f32..4.0,
        sz in 0.5f32..4.0,
        tx in -10.0f32..10.0,
        px in -5.0f32..5.0,
        py in -5.0f32..5.0,
    ) {
        let r = Affine3::from_quat(&Quat::from_axis_angle(Vec3::new(0.3, 1.0, -0.2), angle));
        let s = Affine3::new(Mat3::scale(sx, sy, sz), Vec3::new(tx, -tx, 0.5 * tx));
        let xfm = r * s;
        let inv = xfm.inverse();
        prop_assert!(inv.is_some());
        if let Some(inv) = inv {
            let p = Vec3::new(px, py, 1.0);
            let back = inv.transform_point(&xfm.transform_point(&p));
            for i in 0..3 {
                prop_assert!((back.get(i) - p.get(i)).abs() < 1e-3);
            }
        }
    }
}
