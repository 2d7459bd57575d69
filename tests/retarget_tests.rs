//! Retargeting Engine Tests
//!
//! Tests for:
//! - Bone name mapping (Mixamo table, custom tables, namespaced names)
//! - Hips height scaling of position tracks
//! - Rotation re-expression across differing rest orientations
//! - Dropping of unmapped / unbound tracks
//! - Whole-clip failures (missing root track, incompatible skeletons)

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use glam::{Quat, Vec3};

use avatar::animation::{
    AnimationAction, AnimationClip, KeyframeTrack, RETARGETED_CLIP_NAME, Retargeter, SourceAnimationClip, Track,
    TrackProperty, retarget,
};
use avatar::errors::AvatarError;
use avatar::humanoid::{BoneNameMap, HumanBone, HumanoidPose, HumanoidSkeleton, map_bone};
use avatar::scene::{BoneKey, SkeletonGraph, Transform};

const EPSILON: f32 = 1e-4;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

/// Same orientation, allowing for quaternion double cover.
fn same_rotation(a: Quat, b: Quat) -> bool {
    a.normalize().dot(b.normalize()).abs() > 1.0 - EPSILON
}

// ============================================================================
// Rig builders
// ============================================================================

/// Mixamo-named source rig: hips at `hips_y` under an armature root, with a
/// spine and head chain. Returns the graph and the hips/spine keys.
fn source_rig(hips_y: f32, hips_rest: Quat, spine_rest: Quat) -> (SkeletonGraph, BoneKey, BoneKey) {
    let mut graph = SkeletonGraph::new();
    let armature = graph.add_bone("Armature", None, Transform::IDENTITY);
    let hips = graph.add_bone(
        "mixamorigHips",
        Some(armature),
        Transform::from_position_rotation(Vec3::new(0.0, hips_y, 0.0), hips_rest),
    );
    let spine = graph.add_bone(
        "mixamorigSpine",
        Some(hips),
        Transform::from_position_rotation(Vec3::new(0.0, 0.1, 0.0), spine_rest),
    );
    graph.add_bone(
        "mixamorigHead",
        Some(spine),
        Transform::from_position(Vec3::new(0.0, 0.4, 0.0)),
    );
    (graph, hips, spine)
}

/// Canonical target skeleton with hips at `hips_y` and a spine.
fn target_skeleton(hips_y: f32, hips_rest: Quat, spine_rest: Quat) -> HumanoidSkeleton {
    let mut graph = SkeletonGraph::new();
    let root = graph.add_bone("Root", None, Transform::IDENTITY);
    let hips = graph.add_bone(
        "J_Bip_C_Hips",
        Some(root),
        Transform::from_position_rotation(Vec3::new(0.0, hips_y, 0.0), hips_rest),
    );
    let spine = graph.add_bone(
        "J_Bip_C_Spine",
        Some(hips),
        Transform::from_position_rotation(Vec3::new(0.0, 0.05, 0.0), spine_rest),
    );
    HumanoidSkeleton::new(
        "target",
        graph,
        [(HumanBone::Hips, hips), (HumanBone::Spine, spine)],
    )
    .expect("target has hips")
}

fn rotation_clip(name: &str, hips: Quat, spine: Quat) -> SourceAnimationClip {
    AnimationClip::new(
        name,
        vec![
            Track::rotation(
                "mixamorigHips".to_string(),
                KeyframeTrack::linear(vec![0.0, 1.0], vec![Quat::IDENTITY, hips]),
            ),
            Track::rotation(
                "mixamorigSpine".to_string(),
                KeyframeTrack::linear(vec![0.0, 1.0], vec![Quat::IDENTITY, spine]),
            ),
        ],
    )
}

// ============================================================================
// Bone Name Mapper
// ============================================================================

#[test]
fn mapper_covers_mixamo_vocabulary() {
    let map = BoneNameMap::mixamo();
    assert_eq!(map.len(), 52);
    assert_eq!(map_bone("mixamorigHips"), Some(HumanBone::Hips));
    assert_eq!(map_bone("mixamorigSpine2"), Some(HumanBone::UpperChest));
    assert_eq!(map_bone("mixamorigRightToeBase"), Some(HumanBone::RightToes));
    assert_eq!(map_bone("mixamorigLeftHandPinky3"), Some(HumanBone::LeftLittleDistal));
}

#[test]
fn mapper_unknown_names_are_none() {
    assert_eq!(map_bone("mixamorigTail"), None);
    assert_eq!(map_bone(""), None);
    assert_eq!(map_bone("Hips"), None);
}

#[test]
fn mapper_accepts_namespaced_names() {
    assert_eq!(map_bone("mixamorig:Hips"), Some(HumanBone::Hips));
    assert_eq!(map_bone("mixamorig:LeftForeArm"), Some(HumanBone::LeftLowerArm));
}

#[test]
fn mapper_custom_table_first_entry_wins() {
    let map = BoneNameMap::from_pairs([
        ("pelvis", HumanBone::Hips),
        ("pelvis", HumanBone::Spine),
        ("spine_01", HumanBone::Spine),
    ]);
    assert_eq!(map.len(), 2);
    assert_eq!(map.map_bone("pelvis"), Some(HumanBone::Hips));
    assert_eq!(map.map_bone("spine_01"), Some(HumanBone::Spine));
    assert_eq!(map.map_bone("mixamorigHips"), None);
}

// ============================================================================
// Hips scale
// ============================================================================

#[test]
fn position_scaling_is_exact() {
    let (graph, _, _) = source_rig(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let target = target_skeleton(0.5, Quat::IDENTITY, Quat::IDENTITY);

    let clip = AnimationClip::new(
        "walk",
        vec![Track::position(
            "mixamorigHips".to_string(),
            KeyframeTrack::linear(vec![0.0], vec![Vec3::new(0.0, 2.0, 0.0)]),
        )],
    );

    let out = retarget(&clip, &graph, &target).unwrap();
    let track = out.track(&HumanBone::Hips, TrackProperty::Position).unwrap();
    let avatar::animation::TrackData::Position(keys) = &track.data else {
        panic!("expected a position track");
    };
    assert!(approx_vec3(keys.values[0], Vec3::new(0.0, 1.0, 0.0)));
}

#[test]
fn hips_scale_measures_from_hierarchy_root() {
    let mut graph = SkeletonGraph::new();
    let root = graph.add_bone("Armature", None, Transform::from_position(Vec3::new(0.0, 0.5, 0.0)));
    graph.add_bone(
        "mixamorigHips",
        Some(root),
        Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
    );
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let scale = Retargeter::mixamo().hips_scale(&graph, &target).unwrap();
    assert!((scale - 0.5).abs() < EPSILON, "got {scale}");
}

#[test]
fn hips_scale_of_root_hips_uses_origin() {
    let mut graph = SkeletonGraph::new();
    graph.add_bone(
        "mixamorigHips",
        None,
        Transform::from_position(Vec3::new(0.0, 0.9, 0.0)),
    );
    let target = target_skeleton(0.9, Quat::IDENTITY, Quat::IDENTITY);

    let scale = Retargeter::mixamo().hips_scale(&graph, &target).unwrap();
    assert!((scale - 1.0).abs() < EPSILON, "got {scale}");
}

#[test]
fn hips_scale_prefers_exact_table_name() {
    let mut graph = SkeletonGraph::new();
    let root = graph.add_bone("Armature", None, Transform::IDENTITY);
    graph.add_bone(
        "mixamorig:Hips",
        Some(root),
        Transform::from_position(Vec3::new(0.0, 3.0, 0.0)),
    );
    graph.add_bone(
        "mixamorigHips",
        Some(root),
        Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
    );
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let scale = Retargeter::mixamo().hips_scale(&graph, &target).unwrap();
    assert!((scale - 1.0).abs() < EPSILON, "got {scale}");
}

#[test]
fn hips_scale_falls_back_to_namespaced_hips() {
    let mut graph = SkeletonGraph::new();
    graph.add_bone(
        "mixamorig:Hips",
        None,
        Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
    );
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let scale = Retargeter::mixamo().hips_scale(&graph, &target).unwrap();
    assert!((scale - 0.5).abs() < EPSILON, "got {scale}");
}

// ============================================================================
// Rotation re-expression
// ============================================================================

/// World rotation of each bone relative to its world rest rotation, with
/// `hips` and `spine` as local rotations applied directly to the source rig.
fn source_world_deltas(graph: &SkeletonGraph, hips_key: BoneKey, spine_key: BoneKey, hips: Quat, spine: Quat) -> (Quat, Quat) {
    let hips_world = graph.world_rest_rotation(graph.get(hips_key).unwrap().parent()) * hips;
    let spine_world = hips_world * spine;
    (
        hips_world * graph.world_rest_rotation(Some(hips_key)).inverse(),
        spine_world * graph.world_rest_rotation(Some(spine_key)).inverse(),
    )
}

/// Plays `clip` at its last keyframe on `target` and returns the world
/// rotation of hips and spine relative to their world rest rotations.
fn target_world_deltas(clip: &avatar::animation::RetargetedClip, target: &HumanoidSkeleton) -> (Quat, Quat) {
    let mut pose = HumanoidPose::rest(target);
    for track in &clip.tracks {
        if let avatar::animation::TrackData::Rotation(keys) = &track.data {
            pose.set_rotation(track.bone, keys.sample(clip.duration).unwrap());
        }
    }
    let resolved = target.resolve_pose(&pose);

    let delta = |bone: HumanBone| {
        let key = target.raw_key(bone).unwrap();
        resolved.world_rotation(key).unwrap() * target.world_rest_rotation(bone).unwrap().inverse()
    };
    (delta(HumanBone::Hips), delta(HumanBone::Spine))
}

fn check_round_trip(test_rotation: Quat, offset: Quat) {
    let source_hips_rest = Quat::from_rotation_x(-FRAC_PI_2);
    let source_spine_rest = Quat::from_rotation_z(0.3);
    let (graph, hips_key, spine_key) = source_rig(1.0, source_hips_rest, source_spine_rest);

    // Target rest orientations differ from the source's by `offset`.
    let target = target_skeleton(0.8, offset * source_hips_rest, source_spine_rest * offset);

    let hips_anim = test_rotation * source_hips_rest;
    let spine_anim = source_spine_rest * test_rotation;
    let clip = rotation_clip("wave", hips_anim, spine_anim);

    let out = retarget(&clip, &graph, &target).unwrap();
    let expected = source_world_deltas(&graph, hips_key, spine_key, hips_anim, spine_anim);
    let actual = target_world_deltas(&out, &target);

    assert!(
        same_rotation(expected.0, actual.0),
        "hips: expected {:?}, got {:?}",
        expected.0,
        actual.0
    );
    assert!(
        same_rotation(expected.1, actual.1),
        "spine: expected {:?}, got {:?}",
        expected.1,
        actual.1
    );
}

#[test]
fn rotation_round_trip_90_degrees_each_axis() {
    let offset = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(0.4);
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        check_round_trip(Quat::from_axis_angle(axis, FRAC_PI_2), offset);
    }
}

#[test]
fn rotation_round_trip_180_degrees_each_axis() {
    let offset = Quat::from_rotation_z(-FRAC_PI_2);
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        check_round_trip(Quat::from_axis_angle(axis, PI), offset);
    }
}

#[test]
fn rest_pose_clip_leaves_target_at_rest() {
    let source_hips_rest = Quat::from_rotation_y(0.7);
    let (graph, _, _) = source_rig(1.0, source_hips_rest, Quat::IDENTITY);
    let target = target_skeleton(1.0, Quat::from_rotation_x(1.1), Quat::from_rotation_z(0.2));

    // Keys equal to the source's rest locals.
    let clip = rotation_clip("idle", source_hips_rest, Quat::IDENTITY);
    let out = retarget(&clip, &graph, &target).unwrap();
    let (hips, spine) = target_world_deltas(&out, &target);

    assert!(same_rotation(hips, Quat::IDENTITY));
    assert!(same_rotation(spine, Quat::IDENTITY));
}

#[test]
fn rotation_formula_applies_parent_and_inverse_rest() {
    let hips_rest = Quat::from_rotation_x(0.5);
    let spine_rest = Quat::from_rotation_y(0.25);
    let (graph, _, _) = source_rig(1.0, hips_rest, spine_rest);
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let q = Quat::from_rotation_z(0.8);
    let clip = rotation_clip("single", q, q);
    let out = retarget(&clip, &graph, &target).unwrap();

    let sample = |bone| {
        let track = out.track(&bone, TrackProperty::Rotation).unwrap();
        match &track.data {
            avatar::animation::TrackData::Rotation(keys) => keys.values[1],
            avatar::animation::TrackData::Position(_) => panic!("expected rotation"),
        }
    };
    // Hips parent (armature) rest is identity.
    assert!(same_rotation(sample(HumanBone::Hips), q * hips_rest.inverse()));
    assert!(same_rotation(
        sample(HumanBone::Spine),
        hips_rest * q * (hips_rest * spine_rest).inverse()
    ));
}

// ============================================================================
// Output shape
// ============================================================================

#[test]
fn unmapped_tracks_are_dropped_others_kept() {
    let (graph, _, _) = source_rig(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let mut clip = rotation_clip("walk", Quat::from_rotation_y(0.3), Quat::from_rotation_x(0.2));
    clip.tracks.push(Track::rotation(
        "mixamorigTail".to_string(),
        KeyframeTrack::linear(vec![0.0], vec![Quat::IDENTITY]),
    ));
    clip.tracks.push(Track::position(
        "mixamorigHips".to_string(),
        KeyframeTrack::linear(vec![0.0], vec![Vec3::new(0.0, 1.0, 0.0)]),
    ));

    let out = retarget(&clip, &graph, &target).unwrap();
    assert_eq!(out.tracks.len(), 3);
    assert!(out.tracks.len() <= clip.tracks.len());
    assert!(out.track(&HumanBone::Hips, TrackProperty::Rotation).is_some());
    assert!(out.track(&HumanBone::Hips, TrackProperty::Position).is_some());
    assert!(out.track(&HumanBone::Spine, TrackProperty::Rotation).is_some());
}

#[test]
fn tracks_for_bones_target_lacks_are_dropped() {
    let (graph, _, _) = source_rig(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let mut clip = rotation_clip("nod", Quat::IDENTITY, Quat::IDENTITY);
    clip.tracks.push(Track::rotation(
        "mixamorigHead".to_string(),
        KeyframeTrack::linear(vec![0.0], vec![Quat::from_rotation_x(0.1)]),
    ));

    let out = retarget(&clip, &graph, &target).unwrap();
    assert!(out.track(&HumanBone::Head, TrackProperty::Rotation).is_none());
    for track in &out.tracks {
        assert!(target.has_bone(track.bone), "dangling track for {}", track.bone);
    }
}

#[test]
fn rotation_track_without_source_node_is_dropped() {
    let (graph, _, _) = source_rig(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let mut clip = rotation_clip("walk", Quat::IDENTITY, Quat::IDENTITY);
    // Mapped name, but the source rig has no such node.
    clip.tracks[1].bone = "mixamorig:Spine".to_string();

    let out = retarget(&clip, &graph, &target).unwrap();
    assert_eq!(out.tracks.len(), 1);
    assert_eq!(out.tracks[0].bone, HumanBone::Hips);
}

#[test]
fn malformed_tracks_are_dropped() {
    let (graph, _, _) = source_rig(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let mut clip = rotation_clip("walk", Quat::IDENTITY, Quat::from_rotation_x(0.4));
    clip.tracks.push(Track::position(
        "mixamorigHips".to_string(),
        KeyframeTrack::linear(vec![0.0, 0.5, 1.0], vec![Vec3::new(0.0, 1.0, 0.0)]),
    ));
    assert!(!clip.tracks[2].is_well_formed());

    let out = retarget(&clip, &graph, &target).unwrap();
    assert_eq!(out.tracks.len(), 2);
    assert!(out.track(&HumanBone::Hips, TrackProperty::Position).is_none());

    let mut action = AnimationAction::new(Arc::new(out));
    let mut pose = HumanoidPose::default();
    for _ in 0..4 {
        action.update(0.3);
        action.sample_pose(&mut pose);
    }
}

#[test]
fn malformed_root_track_alone_fails() {
    let (graph, _, _) = source_rig(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let clip = AnimationClip::new(
        "walk",
        vec![Track::rotation(
            "mixamorigHips".to_string(),
            KeyframeTrack::linear(vec![0.0, 1.0], vec![Quat::IDENTITY]),
        )],
    );
    assert!(matches!(
        retarget(&clip, &graph, &target),
        Err(AvatarError::MissingRootBone { .. })
    ));
}

#[test]
fn output_keeps_duration_and_fixed_name() {
    let (graph, _, _) = source_rig(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let clip = SourceAnimationClip::with_duration(
        "mixamo.com",
        3.5,
        rotation_clip("x", Quat::IDENTITY, Quat::IDENTITY).tracks,
    );
    let out = retarget(&clip, &graph, &target).unwrap();
    assert_eq!(out.name, RETARGETED_CLIP_NAME);
    assert!((out.duration - 3.5).abs() < EPSILON);
}

#[test]
fn retargeting_is_deterministic() {
    let (graph, _, _) = source_rig(1.2, Quat::from_rotation_x(0.3), Quat::from_rotation_y(-0.6));
    let target = target_skeleton(0.7, Quat::from_rotation_z(1.0), Quat::IDENTITY);

    let mut clip = rotation_clip("run", Quat::from_rotation_y(1.3), Quat::from_rotation_x(0.9));
    clip.tracks.push(Track::position(
        "mixamorigHips".to_string(),
        KeyframeTrack::linear(vec![0.0, 0.5], vec![Vec3::new(0.1, 1.2, 0.0), Vec3::new(0.2, 1.1, 0.3)]),
    ));

    let a = retarget(&clip, &graph, &target).unwrap();
    let b = retarget(&clip, &graph, &target).unwrap();
    assert_eq!(a, b);
}

#[test]
fn retargeting_leaves_inputs_untouched() {
    let (graph, _, _) = source_rig(1.0, Quat::from_rotation_x(0.3), Quat::IDENTITY);
    let target = target_skeleton(0.5, Quat::IDENTITY, Quat::IDENTITY);
    let clip = rotation_clip("walk", Quat::from_rotation_y(0.3), Quat::IDENTITY);

    let clip_before = clip.clone();
    let hips_height_before = target.hips_height();
    let _ = retarget(&clip, &graph, &target).unwrap();

    assert_eq!(clip, clip_before);
    assert!((target.hips_height() - hips_height_before).abs() < f32::EPSILON);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn missing_root_track_fails() {
    let (graph, _, _) = source_rig(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);

    let clip = AnimationClip::new(
        "arms_only",
        vec![Track::rotation(
            "mixamorigSpine".to_string(),
            KeyframeTrack::linear(vec![0.0], vec![Quat::IDENTITY]),
        )],
    );

    let err = retarget(&clip, &graph, &target).unwrap_err();
    assert!(
        matches!(&err, AvatarError::MissingRootBone { clip } if clip == "arms_only"),
        "got {err:?}"
    );
}

#[test]
fn degenerate_source_height_fails() {
    let (graph, _, _) = source_rig(0.0, Quat::IDENTITY, Quat::IDENTITY);
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let clip = rotation_clip("walk", Quat::IDENTITY, Quat::IDENTITY);

    let err = retarget(&clip, &graph, &target).unwrap_err();
    assert!(matches!(err, AvatarError::IncompatibleSkeleton(_)), "got {err:?}");
}

#[test]
fn source_without_hips_fails() {
    let mut graph = SkeletonGraph::new();
    graph.add_bone("mixamorigSpine", None, Transform::from_position(Vec3::Y));
    let target = target_skeleton(1.0, Quat::IDENTITY, Quat::IDENTITY);
    let clip = rotation_clip("walk", Quat::IDENTITY, Quat::IDENTITY);

    let err = retarget(&clip, &graph, &target).unwrap_err();
    assert!(matches!(err, AvatarError::IncompatibleSkeleton(_)), "got {err:?}");
}

#[test]
fn target_without_hips_cannot_be_built() {
    let mut graph = SkeletonGraph::new();
    let spine = graph.add_bone("Spine", None, Transform::IDENTITY);

    let err = HumanoidSkeleton::new("broken", graph, [(HumanBone::Spine, spine)]).unwrap_err();
    assert!(matches!(err, AvatarError::IncompatibleSkeleton(_)), "got {err:?}");
}
