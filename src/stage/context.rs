//! The playback context.
//!
//! [`AvatarStage`] owns everything that outlives a single frame: the
//! displayed avatar and its clip action, the latest motion asset, the rotation
//! transitions and the pointer-follow camera. Load results are applied between
//! frames through [`AvatarStage::pump_loads`], so [`AvatarStage::update`]
//! never observes a half-swapped avatar.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::animation::{AnimationAction, Retargeter};
use crate::errors::{AvatarError, Result};
use crate::humanoid::{BoneNameMap, HumanoidPose, HumanoidSkeleton, ResolvedPose};
use crate::procedural::{self, ExpressionWeights, ProceduralParams};
use crate::scene::{BoneKey, Transform};
use crate::settings::StageSettings;
use crate::transition::{PointerFollowCamera, RotationTransitions};

use super::loading::{AvatarLoad, Generation, LoadCompletion, LoadPayload, LoadStatus, MotionAsset, MotionLoad};

/// Objects the stage reorients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageObject {
    /// The turntable the avatar stands on.
    Platform,
    /// The avatar root.
    Avatar,
}

/// Receives a resolved frame. Implemented by whatever owns the skinned mesh.
pub trait SkeletonInstance {
    fn set_root_transform(&mut self, transform: &Transform);
    fn set_bone_local(&mut self, bone: BoneKey, transform: &Transform);
}

/// The displayed avatar's state for one frame.
#[derive(Debug, Clone)]
pub struct AvatarFrame {
    pub generation: Generation,
    pub root: Transform,
    /// Normalized pose after the procedural layer.
    pub pose: HumanoidPose,
    /// Raw local and world transforms of the avatar's rig.
    pub resolved: ResolvedPose,
    /// Playback time of the retargeted clip, `None` while in rest pose.
    pub clip_time: Option<f32>,
}

impl AvatarFrame {
    pub fn write_to(&self, instance: &mut impl SkeletonInstance) {
        instance.set_root_transform(&self.root);
        for (key, local) in self.resolved.iter() {
            instance.set_bone_local(key, local);
        }
    }
}

/// Everything [`AvatarStage::update`] produced for one frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub avatar: Option<AvatarFrame>,
    pub expressions: ExpressionWeights,
    /// Euler XYZ rotation of the platform.
    pub platform_rotation: Vec3,
    /// Camera offset, `None` while the follow camera is suspended.
    pub camera_offset: Option<Vec3>,
}

struct DisplayedAvatar {
    generation: Generation,
    source: String,
    skeleton: Arc<HumanoidSkeleton>,
    rest: HumanoidPose,
    action: Option<AnimationAction>,
}

/// Playback coordinator for a single avatar.
pub struct AvatarStage {
    settings: StageSettings,
    bone_map: BoneNameMap,

    next_generation: Generation,
    awaited_avatar: Option<Generation>,
    awaited_motion: Option<Generation>,

    motion: Option<Arc<MotionAsset>>,
    displayed: Option<DisplayedAvatar>,

    transitions: RotationTransitions<StageObject>,
    camera: PointerFollowCamera,
    rotation_pending: Rc<Cell<bool>>,

    sender: flume::Sender<LoadCompletion>,
    receiver: flume::Receiver<LoadCompletion>,
}

impl Default for AvatarStage {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarStage {
    #[must_use]
    pub fn new() -> Self {
        let settings = StageSettings::default();
        let (sender, receiver) = flume::unbounded();
        let mut stage = Self {
            transitions: RotationTransitions::new(settings.transition.duration, settings.transition.easing),
            camera: PointerFollowCamera::new(settings.camera),
            settings,
            bone_map: BoneNameMap::mixamo().clone(),
            next_generation: 0,
            awaited_avatar: None,
            awaited_motion: None,
            motion: None,
            displayed: None,
            rotation_pending: Rc::new(Cell::new(false)),
            sender,
            receiver,
        };
        stage.reset_owners();
        stage
    }

    /// Replaces the settings. Transitions and the follow camera restart.
    #[must_use]
    pub fn with_settings(mut self, settings: StageSettings) -> Self {
        self.transitions = RotationTransitions::new(settings.transition.duration, settings.transition.easing);
        self.camera = PointerFollowCamera::new(settings.camera);
        self.settings = settings;
        self.reset_owners();
        if let Some(displayed) = &mut self.displayed
            && let Some(action) = &mut displayed.action
        {
            action.loop_mode = self.settings.loop_mode;
        }
        self
    }

    /// Uses `map` instead of the Mixamo table for subsequent retargets.
    #[must_use]
    pub fn with_bone_map(mut self, map: BoneNameMap) -> Self {
        self.bone_map = map;
        self
    }

    fn reset_owners(&mut self) {
        self.transitions.insert_owner(StageObject::Platform, Vec3::ZERO);
        self.transitions.insert_owner(StageObject::Avatar, Vec3::ZERO);
    }

    fn issue(&mut self) -> Generation {
        self.next_generation += 1;
        self.next_generation
    }

    // ========================================================================
    // Load requests
    // ========================================================================

    /// Issues an avatar load. Any earlier avatar load still in flight is
    /// superseded and its result will be discarded.
    pub fn request_avatar(&mut self, source: impl Into<String>) -> AvatarLoad {
        let generation = self.issue();
        if let Some(previous) = self.awaited_avatar.replace(generation) {
            log::debug!("Avatar load {previous} superseded by {generation}");
        }
        let source = source.into();
        log::debug!("Requesting avatar '{source}' (generation {generation})");
        AvatarLoad::new(generation, source, self.sender.clone())
    }

    /// Issues a motion load, superseding any earlier one still in flight.
    pub fn request_motion(&mut self, source: impl Into<String>) -> MotionLoad {
        let generation = self.issue();
        if let Some(previous) = self.awaited_motion.replace(generation) {
            log::debug!("Motion load {previous} superseded by {generation}");
        }
        let source = source.into();
        log::debug!("Requesting motion '{source}' (generation {generation})");
        MotionLoad::new(generation, source, self.sender.clone())
    }

    /// Loads a different avatar and spins the platform a full turn while it
    /// arrives.
    pub fn change_outfit(&mut self, source: impl Into<String>) -> AvatarLoad {
        self.rotation_pending.set(true);
        let pending = Rc::clone(&self.rotation_pending);
        let turn = Vec3::new(0.0, self.settings.transition.outfit_turn, 0.0);
        self.transitions
            .trigger(StageObject::Platform, turn, move || pending.set(false));
        self.request_avatar(source)
    }

    /// Turns the avatar by a horizontal drag of `delta_x` normalized units.
    pub fn on_drag(&mut self, delta_x: f32) {
        let yaw = delta_x * self.settings.transition.drag_sensitivity;
        self.transitions
            .trigger(StageObject::Avatar, Vec3::new(0.0, yaw, 0.0), || {});
    }

    /// Pointer position in normalized device coordinates.
    pub fn on_pointer_move(&mut self, pointer: Vec2) {
        self.camera.on_pointer_move(pointer);
    }

    // ========================================================================
    // Completions
    // ========================================================================

    /// Applies every completion that has arrived since the last call.
    pub fn pump_loads(&mut self) -> Vec<Result<LoadStatus>> {
        let completions: Vec<_> = self.receiver.try_iter().collect();
        completions
            .into_iter()
            .map(|completion| self.apply_completion(completion))
            .collect()
    }

    /// Applies one load result.
    ///
    /// Results whose generation is no longer awaited are discarded without
    /// touching playback state. A failed avatar load keeps the current avatar;
    /// a failed motion load or retarget leaves the avatar in its rest pose.
    pub fn apply_completion(&mut self, completion: LoadCompletion) -> Result<LoadStatus> {
        let LoadCompletion {
            generation,
            source,
            payload,
        } = completion;

        let slot = match payload {
            LoadPayload::Avatar(_) => &mut self.awaited_avatar,
            LoadPayload::Motion(_) => &mut self.awaited_motion,
        };
        if *slot != Some(generation) {
            let stale = AvatarError::StaleResultDiscarded {
                generation,
                current: slot.unwrap_or(self.next_generation),
            };
            log::debug!("{stale} ('{source}')");
            return Ok(LoadStatus::Discarded);
        }
        *slot = None;

        match payload {
            LoadPayload::Avatar(result) => {
                let skeleton = result.inspect_err(|e| log::warn!("{e}"))?;
                self.swap_avatar(generation, source, skeleton)?;
            }
            LoadPayload::Motion(result) => {
                let asset = match result {
                    Ok(asset) => asset,
                    Err(e) => {
                        log::warn!("{e}");
                        self.motion = None;
                        self.clear_action();
                        return Err(e);
                    }
                };
                log::debug!("Motion '{source}' loaded with {} clip(s)", asset.clips.len());
                self.motion = Some(Arc::new(asset));
                self.rebuild_action()?;
            }
        }
        Ok(LoadStatus::Applied)
    }

    fn swap_avatar(&mut self, generation: Generation, source: String, skeleton: HumanoidSkeleton) -> Result<()> {
        if let Some(previous) = self.displayed.take() {
            log::info!(
                "Detaching avatar '{}' (generation {})",
                previous.source,
                previous.generation
            );
        }
        self.transitions.remove_owner(StageObject::Avatar);
        self.transitions.insert_owner(StageObject::Avatar, Vec3::ZERO);

        let rest = HumanoidPose::rest(&skeleton);
        log::info!("Attaching avatar '{source}' (generation {generation})");
        self.displayed = Some(DisplayedAvatar {
            generation,
            source,
            skeleton: Arc::new(skeleton),
            rest,
            action: None,
        });
        self.rebuild_action()
    }

    fn clear_action(&mut self) {
        if let Some(displayed) = &mut self.displayed {
            displayed.action = None;
        }
    }

    /// Joins the displayed avatar with the current motion asset. Until both
    /// are present the avatar stays in its rest pose.
    fn rebuild_action(&mut self) -> Result<()> {
        let (Some(displayed), Some(motion)) = (&mut self.displayed, &self.motion) else {
            return Ok(());
        };
        displayed.action = None;

        let clip = motion.select_clip(&self.settings.motion_clip)?;
        let retargeted = Retargeter::new(&self.bone_map)
            .retarget(clip, &motion.graph, &displayed.skeleton)
            .inspect_err(|e| log::warn!("Retargeting onto '{}' failed: {e}", displayed.source))?;

        displayed.action =
            Some(AnimationAction::new(Arc::new(retargeted)).with_loop_mode(self.settings.loop_mode));
        Ok(())
    }

    /// Removes the displayed avatar. Its in-flight yaw transition is aborted.
    pub fn unload_avatar(&mut self) -> bool {
        let Some(previous) = self.displayed.take() else {
            return false;
        };
        log::info!(
            "Detaching avatar '{}' (generation {})",
            previous.source,
            previous.generation
        );
        self.transitions.remove_owner(StageObject::Avatar);
        self.transitions.insert_owner(StageObject::Avatar, Vec3::ZERO);
        true
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Procedural parameters taken from the settings, with no overrides or
    /// expressions set.
    #[must_use]
    pub fn procedural_params(&self) -> ProceduralParams {
        ProceduralParams {
            blink: self.settings.blink,
            sway: self.settings.sway,
            ..Default::default()
        }
    }

    /// Evaluates one frame at elapsed time `t`, `dt` seconds after the last.
    pub fn update(&mut self, t: f32, dt: f32, params: &ProceduralParams) -> FrameOutput {
        self.transitions.update(dt);
        let camera_offset = self.camera.update(dt);
        let platform_rotation = self
            .transitions
            .rotation(StageObject::Platform)
            .unwrap_or(Vec3::ZERO);
        let avatar_rotation = self
            .transitions
            .rotation(StageObject::Avatar)
            .unwrap_or(Vec3::ZERO);

        let Some(displayed) = &mut self.displayed else {
            return FrameOutput {
                avatar: None,
                expressions: procedural::evaluate(t, params).expressions,
                platform_rotation,
                camera_offset,
            };
        };

        let mut base = displayed.rest.clone();
        let clip_time = displayed.action.as_mut().map(|action| {
            action.update(dt);
            action.sample_pose(&mut base);
            action.time
        });

        let (pose, expressions) = procedural::compose(&base, t, params);
        let resolved = displayed.skeleton.resolve_pose(&pose);

        let placement = &self.settings.placement;
        let mut root = Transform::from_position(placement.position);
        root.set_rotation_euler(
            avatar_rotation.x,
            placement.facing_yaw + avatar_rotation.y,
            avatar_rotation.z,
        );

        FrameOutput {
            avatar: Some(AvatarFrame {
                generation: displayed.generation,
                root,
                pose,
                resolved,
                clip_time,
            }),
            expressions,
            platform_rotation,
            camera_offset,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn settings(&self) -> &StageSettings {
        &self.settings
    }

    #[must_use]
    pub fn bone_map(&self) -> &BoneNameMap {
        &self.bone_map
    }

    /// Generation of the displayed avatar.
    #[must_use]
    pub fn displayed_generation(&self) -> Option<Generation> {
        self.displayed.as_ref().map(|d| d.generation)
    }

    #[must_use]
    pub fn displayed_source(&self) -> Option<&str> {
        self.displayed.as_ref().map(|d| d.source.as_str())
    }

    #[must_use]
    pub fn displayed_skeleton(&self) -> Option<&Arc<HumanoidSkeleton>> {
        self.displayed.as_ref().map(|d| &d.skeleton)
    }

    #[must_use]
    pub fn action(&self) -> Option<&AnimationAction> {
        self.displayed.as_ref().and_then(|d| d.action.as_ref())
    }

    pub fn action_mut(&mut self) -> Option<&mut AnimationAction> {
        self.displayed.as_mut().and_then(|d| d.action.as_mut())
    }

    #[must_use]
    pub fn motion(&self) -> Option<&Arc<MotionAsset>> {
        self.motion.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.awaited_avatar.is_some() || self.awaited_motion.is_some()
    }

    /// Whether the outfit-change turn is still running.
    #[must_use]
    pub fn rotation_pending(&self) -> bool {
        self.rotation_pending.get()
    }

    #[must_use]
    pub fn transitions(&self) -> &RotationTransitions<StageObject> {
        &self.transitions
    }

    #[must_use]
    pub fn camera(&self) -> &PointerFollowCamera {
        &self.camera
    }
}
