// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::cast_precision_loss)]
//! Keyframe storage, resizing, and commit-time classification.

use motion_core::math::{Affine3, Mat3, Quat, Vec3};
use motion_geom::{
    ErrorKind, GeometryCounts, Instance, InstanceCost, InstanceError, Interpolation,
    QuaternionDecomposition, TimeRange, MAX_TIME_STEPS,
};
use proptest::prelude::*;

fn arb_vec3(range: f32) -> impl Strategy<Value = Vec3> {
    (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_affine() -> impl Strategy<Value = Affine3> {
    (arb_vec3(10.0), arb_vec3(10.0), arb_vec3(10.0), arb_vec3(100.0))
        .prop_map(|(a, b, c, t)| Affine3::new(Mat3::from_cols(a, b, c), t))
}

fn arb_decomposition() -> impl Strategy<Value = QuaternionDecomposition> {
    (
        arb_vec3(1.0),
        -3.0f32..3.0,
        arb_vec3(50.0),
        (0.25f32..4.0, 0.25f32..4.0, 0.25f32..4.0),
        arb_vec3(0.5),
    )
        .prop_filter("rotation axis must not vanish", |(axis, ..)| {
            axis.length() > 0.1
        })
        .prop_map(|(axis, angle, translation, (sx, sy, sz), skew)| {
            QuaternionDecomposition {
                scale: Vec3::new(sx, sy, sz),
                skew: skew.to_array(),
                shift: Vec3::ZERO,
                rotation: Quat::from_axis_angle(axis, angle),
                translation,
            }
        })
}

/// Global time of keyframe `i` under the default unit time range.
fn keyframe_time(i: usize, n: usize) -> f32 {
    if n == 1 {
        0.0
    } else {
        i as f32 / (n - 1) as f32
    }
}

proptest! {
    #[test]
    fn stored_transform_is_returned_at_its_keyframe_time(
        n in 1usize..=MAX_TIME_STEPS,
        xfms in prop::collection::vec(arb_affine(), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut inst = Instance::new(None, n).unwrap();
        let t = pick.index(n);
        let xfm = xfms[t % xfms.len()];
        inst.set_transform(xfm, t).unwrap();
        prop_assert_eq!(inst.transform_at(keyframe_time(t, n)), xfm);
        inst.commit().unwrap();
        prop_assert_eq!(inst.transform_at(keyframe_time(t, n)), xfm);
    }

    #[test]
    fn resize_preserves_overlap_and_fills_identity(
        n in 1usize..24,
        m in 1usize..24,
        xfms in prop::collection::vec(arb_affine(), 24),
        with_decomposition in any::<bool>(),
    ) {
        let mut inst = Instance::new(None, n).unwrap();
        for (i, xfm) in xfms.iter().take(n).enumerate() {
            inst.set_transform(*xfm, i).unwrap();
        }
        if with_decomposition {
            inst.set_quaternion_decomposition(QuaternionDecomposition::identity(), 0).unwrap();
        }
        let before = inst.keyframes().clone();
        inst.set_num_time_steps(m).unwrap();

        let kf = inst.keyframes();
        prop_assert_eq!(kf.len(), m);
        prop_assert_eq!(kf.has_decompositions(), with_decomposition);
        for i in 0..n.min(m) {
            prop_assert_eq!(kf.transform(i), before.transform(i));
            prop_assert_eq!(kf.decomposition(i), before.decomposition(i));
        }
        for i in n..m {
            prop_assert_eq!(kf.transform(i), Some(&Affine3::identity()));
            prop_assert!(kf.decomposition(i).is_none());
        }
    }

    #[test]
    fn decomposition_is_recoverable_from_its_affine(qd in arb_decomposition()) {
        let mut inst = Instance::new(None, 1).unwrap();
        inst.set_quaternion_decomposition(qd, 0).unwrap();
        let affine = *inst.keyframes().transform(0).unwrap();
        let back = QuaternionDecomposition::from_affine(&affine).unwrap();

        for d in 0..3 {
            prop_assert!((back.scale.get(d) - qd.scale.get(d)).abs() < 1e-3);
            prop_assert!((back.skew[d] - qd.skew[d]).abs() < 1e-3);
            prop_assert!((back.translation.get(d) - qd.translation.get(d)).abs() < 1e-3);
        }
        // q and -q are the same rotation.
        let q0 = qd.rotation.normalize();
        prop_assert!((back.rotation.dot(&q0).abs() - 1.0).abs() < 1e-3);
    }
}

#[test]
fn new_instance_is_identity_and_unclassified() {
    let inst = Instance::new(None, 3).unwrap();
    assert_eq!(inst.num_time_steps(), 3);
    assert!(!inst.keyframes().is_empty());
    assert!(inst.instanced_scene().is_none());
    assert!(!inst.keyframes().has_decompositions());
    assert_eq!(inst.interpolation(), None);
    let identity = Affine3::identity();
    assert!(inst.keyframes().transforms().iter().all(|x| *x == identity));
    assert_eq!(inst.time_range(), TimeRange::UNIT);
}

#[test]
fn time_step_count_is_validated() {
    for n in [0, MAX_TIME_STEPS + 1] {
        let err = Instance::new(None, n).unwrap_err();
        assert_eq!(err, InstanceError::InvalidTimeStepCount(n));
    }
    let mut inst = Instance::new(None, 2).unwrap();
    assert!(inst.set_num_time_steps(0).is_err());
    assert_eq!(inst.num_time_steps(), 2);
}

#[test]
fn out_of_range_setters_fail_without_side_effects() {
    let mut inst = Instance::new(None, 2).unwrap();
    inst.set_transform(Affine3::from_translation(Vec3::new(1.0, 2.0, 3.0)), 1)
        .unwrap();
    let before = inst.keyframes().clone();

    let err = inst.set_transform(Affine3::identity(), 2).unwrap_err();
    assert_eq!(
        err,
        InstanceError::InvalidTimeStep {
            time_step: 2,
            num_time_steps: 2
        }
    );
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    let err = inst
        .set_quaternion_decomposition(QuaternionDecomposition::identity(), 2)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);

    assert_eq!(inst.keyframes(), &before);
    assert!(!inst.keyframes().has_decompositions());
}

#[test]
fn mixed_representations_fail_to_commit() {
    let mut inst = Instance::new(None, 2).unwrap();
    inst.set_quaternion_decomposition(QuaternionDecomposition::identity(), 0)
        .unwrap();
    inst.set_transform(Affine3::from_translation(Vec3::UNIT_X), 1)
        .unwrap();

    let err = inst.commit().unwrap_err();
    assert_eq!(err, InstanceError::MixedInterpolation);
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    assert!(!err.is_internal());
    assert_eq!(inst.interpolation(), None);
    assert!(inst.pre_commit().is_err());
}

#[test]
fn classification_follows_the_latest_setter_per_time_step() {
    let qd = QuaternionDecomposition::from_trs(
        Vec3::new(0.0, 1.0, 0.0),
        Quat::from_axis_angle(Vec3::UNIT_Y, 0.5),
        Vec3::splat(1.0),
    );
    let mut inst = Instance::new(None, 2).unwrap();
    inst.set_quaternion_decomposition(qd, 0).unwrap();
    inst.set_quaternion_decomposition(qd, 1).unwrap();
    inst.commit().unwrap();
    assert_eq!(inst.interpolation(), Some(Interpolation::Nonlinear));

    // Overwriting one step with an affine transform makes the data mixed.
    inst.set_transform(Affine3::identity(), 0).unwrap();
    assert_eq!(inst.commit(), Err(InstanceError::MixedInterpolation));
    assert_eq!(inst.interpolation(), Some(Interpolation::Nonlinear));

    inst.set_transform(Affine3::identity(), 1).unwrap();
    inst.commit().unwrap();
    assert_eq!(inst.interpolation(), Some(Interpolation::Linear));
}

#[test]
fn commit_caches_inverse_of_first_keyframe() {
    let mut inst = Instance::new(None, 2).unwrap();
    let xfm = Affine3::new(Mat3::scale(2.0, 4.0, 0.5), Vec3::new(1.0, -1.0, 3.0));
    inst.set_transform(xfm, 0).unwrap();
    inst.commit().unwrap();
    let inv = inst.world_to_local0().unwrap();
    let p = Vec3::new(0.25, 7.0, -2.0);
    let back = inv.transform_point(&xfm.transform_point(&p));
    assert!(back.sub(&p).length() < 1e-5);

    inst.set_transform(Affine3::new(Mat3::scale(0.0, 1.0, 1.0), Vec3::ZERO), 0)
        .unwrap();
    inst.commit().unwrap();
    assert_eq!(inst.world_to_local0(), None);
}

#[test]
fn transform_at_clamps_and_interpolates() {
    let mut inst = Instance::new(None, 3).unwrap();
    inst.set_time_range(TimeRange::new(10.0, 20.0)).unwrap();
    inst.set_transform(Affine3::from_translation(Vec3::new(2.0, 0.0, 0.0)), 1)
        .unwrap();
    inst.set_transform(Affine3::from_translation(Vec3::new(2.0, 4.0, 0.0)), 2)
        .unwrap();
    inst.commit().unwrap();

    let at = |t: f32| inst.transform_at(t).translation();
    assert_eq!(at(0.0), Vec3::ZERO);
    assert_eq!(at(99.0), Vec3::new(2.0, 4.0, 0.0));
    assert!(at(12.5).sub(&Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    assert!(at(17.5).sub(&Vec3::new(2.0, 2.0, 0.0)).length() < 1e-5);
}

#[test]
fn invalid_time_range_is_rejected() {
    let mut inst = Instance::new(None, 2).unwrap();
    let err = inst.set_time_range(TimeRange::new(1.0, 0.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    let nan_lower = TimeRange::new(f32::NAN, 1.0);
    assert!(inst.set_time_range(nan_lower).is_err());
    let nan_upper = TimeRange::new(0.0, f32::NAN);
    assert!(inst.set_time_range(nan_upper).is_err());
    assert_eq!(inst.time_range(), TimeRange::UNIT);
}

#[test]
fn setters_mark_modified_until_post_commit() {
    let mut inst = Instance::new(None, 1).unwrap();
    inst.commit().unwrap();
    inst.post_commit();
    assert!(!inst.is_modified());

    inst.set_mask(0b1010);
    assert!(inst.is_modified());
    assert_eq!(inst.mask(), 0b1010);
    inst.post_commit();

    inst.set_cost(InstanceCost::Expensive);
    assert!(inst.is_modified());
}

#[test]
fn geometry_counts_bucket_by_cost_and_motion() {
    let mut counts = GeometryCounts::default();
    let still = Instance::new(None, 1).unwrap();
    let moving = Instance::new(None, 4).unwrap();
    let mut heavy = Instance::new(None, 2).unwrap();
    heavy.set_cost(InstanceCost::Expensive);
    let mut heavy_still = Instance::new(None, 1).unwrap();
    heavy_still.set_cost(InstanceCost::Expensive);

    for inst in [&still, &moving, &moving, &heavy, &heavy_still] {
        inst.add_elements_to_count(&mut counts);
    }
    assert_eq!(
        counts,
        GeometryCounts {
            instances_cheap: 1,
            instances_expensive: 1,
            mb_instances_cheap: 2,
            mb_instances_expensive: 1,
        }
    );
    assert_eq!(counts.total(), 5);
}
