//! Drives an [`AvatarStage`] without a renderer.
//!
//! A synthetic VRM-like avatar and a Mixamo-named motion are "loaded" through
//! the async loader traits, an outfit change is issued halfway through, and the
//! resulting frames are logged. Run with `RUST_LOG=debug` to follow the load
//! lifecycle.

use std::time::Duration;

use anyhow::Context;
use glam::{Quat, Vec2, Vec3};

use avatar::animation::{AnimationClip, KeyframeTrack, Track};
use avatar::humanoid::{BoneNameMap, HumanBone, HumanoidSkeleton};
use avatar::procedural::{Expression, ExpressionSink, ManualOverrides};
use avatar::scene::{BoneKey, SkeletonGraph, Transform};
use avatar::stage::{AvatarStage, HumanoidLoader, MotionAsset, MotionLoader, SkeletonInstance};
use avatar::{AvatarError, Result, StageSettings, Timer};

const FRAME: Duration = Duration::from_millis(16);
const FRAMES: u32 = 240;

/// Builds a small humanoid whose bones use VRM-style names.
struct SyntheticAvatars;

impl HumanoidLoader for SyntheticAvatars {
    async fn load_humanoid(&self, source: &str) -> Result<HumanoidSkeleton> {
        let height = match source {
            "avatar_casual.vrm" => 0.95,
            "avatar_formal.vrm" => 1.05,
            other => return Err(AvatarError::load(other, "unknown avatar")),
        };

        let mut graph = SkeletonGraph::new();
        let root = graph.add_bone("Root", None, Transform::IDENTITY);
        let chain = [
            (HumanBone::Hips, "J_Bip_C_Hips", Vec3::new(0.0, height, 0.0)),
            (HumanBone::Spine, "J_Bip_C_Spine", Vec3::new(0.0, 0.08, 0.0)),
            (HumanBone::Chest, "J_Bip_C_Chest", Vec3::new(0.0, 0.12, 0.0)),
            (HumanBone::UpperChest, "J_Bip_C_UpperChest", Vec3::new(0.0, 0.12, 0.0)),
            (HumanBone::Neck, "J_Bip_C_Neck", Vec3::new(0.0, 0.15, 0.0)),
            (HumanBone::Head, "J_Bip_C_Head", Vec3::new(0.0, 0.08, 0.0)),
        ];

        let mut parent = root;
        let mut bindings = Vec::new();
        for (bone, name, offset) in chain {
            parent = graph.add_bone(name, Some(parent), Transform::from_position(offset));
            bindings.push((bone, parent));
        }
        for (bone, name, x) in [
            (HumanBone::LeftUpperArm, "J_Bip_L_UpperArm", 0.18),
            (HumanBone::RightUpperArm, "J_Bip_R_UpperArm", -0.18),
        ] {
            let chest = bindings[3].1;
            let key = graph.add_bone(name, Some(chest), Transform::from_position(Vec3::new(x, 0.1, 0.0)));
            bindings.push((bone, key));
        }

        HumanoidSkeleton::new(source, graph, bindings)
    }
}

/// A two-second idle authored on a Mixamo rig with a tilted hips rest.
struct SyntheticMotions;

impl MotionLoader for SyntheticMotions {
    async fn load_motion(&self, source: &str) -> Result<MotionAsset> {
        let map = BoneNameMap::mixamo();
        let name = |bone| map.source_name(bone).unwrap_or_default().to_string();

        let mut graph = SkeletonGraph::new();
        let hips_rest = Quat::from_rotation_x(-0.1);
        let hips = graph.add_bone(
            name(HumanBone::Hips),
            None,
            Transform::from_position_rotation(Vec3::new(0.0, 1.04, 0.0), hips_rest),
        );
        graph.add_bone(name(HumanBone::Spine), Some(hips), Transform::from_position(Vec3::new(0.0, 0.1, 0.0)));

        let times = vec![0.0, 1.0, 2.0];
        let clip = AnimationClip::new(
            "mixamo.com",
            vec![
                Track::position(
                    name(HumanBone::Hips),
                    KeyframeTrack::linear(
                        times.clone(),
                        vec![Vec3::new(0.0, 1.04, 0.0), Vec3::new(0.0, 1.02, 0.0), Vec3::new(0.0, 1.04, 0.0)],
                    ),
                ),
                Track::rotation(
                    name(HumanBone::Hips),
                    KeyframeTrack::linear(times.clone(), vec![hips_rest, Quat::from_rotation_y(0.1) * hips_rest, hips_rest]),
                ),
                Track::rotation(
                    name(HumanBone::Spine),
                    KeyframeTrack::linear(times, vec![Quat::IDENTITY, Quat::from_rotation_z(0.05), Quat::IDENTITY]),
                ),
            ],
        );

        log::debug!("Synthesized motion for '{source}'");
        Ok(MotionAsset::new(vec![clip], graph))
    }
}

/// Stands in for a skinned mesh and its blend-shape manager.
#[derive(Default)]
struct LoggingInstance {
    bones_written: usize,
    blink: f32,
}

impl SkeletonInstance for LoggingInstance {
    fn set_root_transform(&mut self, _transform: &Transform) {
        self.bones_written = 0;
    }

    fn set_bone_local(&mut self, _bone: BoneKey, _transform: &Transform) {
        self.bones_written += 1;
    }
}

impl ExpressionSink for LoggingInstance {
    fn set(&mut self, name: &str, weight: f32) {
        if name == Expression::Blink.name() {
            self.blink = weight;
        }
    }
}

fn report(results: Vec<Result<avatar::stage::LoadStatus>>) {
    for result in results {
        match result {
            Ok(status) => log::info!("Load completion: {status:?}"),
            Err(e) => log::error!("Load failed: {e}"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            StageSettings::from_json_str(&json)?
        }
        None => StageSettings::default(),
    };

    let mut stage = AvatarStage::new().with_settings(settings);

    let avatar = stage.request_avatar("avatar_casual.vrm");
    let motion = stage.request_motion("idle.fbx");
    pollster::block_on(async {
        motion.run(&SyntheticMotions).await;
        avatar.run(&SyntheticAvatars).await;
    });
    report(stage.pump_loads());

    let mut timer = Timer::new();
    let mut instance = LoggingInstance::default();
    let mut pending_outfit = None;

    for frame in 0..FRAMES {
        timer.advance(FRAME);

        if frame == FRAMES / 2 {
            pending_outfit = Some(stage.change_outfit("avatar_formal.vrm"));
        }
        if frame == FRAMES / 2 + 30
            && let Some(load) = pending_outfit.take()
        {
            pollster::block_on(load.run(&SyntheticAvatars));
        }
        report(stage.pump_loads());

        let t = timer.elapsed_seconds();
        stage.on_pointer_move(Vec2::new((t * 0.5).sin(), 0.2));

        let mut params = stage.procedural_params();
        params.overrides = ManualOverrides {
            head_yaw: Some(0.2 * t.sin()),
            ..Default::default()
        };

        let output = stage.update(t, timer.dt_seconds(), &params);
        if let Some(frame_out) = &output.avatar {
            frame_out.write_to(&mut instance);
        }
        output.expressions.apply_to(&mut instance);

        if frame % 30 == 0 {
            log::info!(
                "t={t:.2}s avatar={:?} bones={} blink={:.2} platform_yaw={:.2} camera={:?}",
                stage.displayed_source(),
                instance.bones_written,
                instance.blink,
                output.platform_rotation.y,
                output.camera_offset,
            );
        }
    }

    Ok(())
}
