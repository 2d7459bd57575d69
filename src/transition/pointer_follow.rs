use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::transition::controller::TransitionController;
use crate::transition::easing::Easing;

/// Pointer-follow camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraFollowSettings {
    /// Rest offset the camera springs back to.
    pub origin: Vec3,
    /// Offset reached at the pointer's extremes (normalized device coordinates ±1).
    pub range: Vec2,
    /// Time to catch up with a new pointer position.
    pub follow_duration: f32,
    /// Seconds without pointer movement before springing back.
    pub idle_timeout: f32,
    pub springback_duration: f32,
    pub easing: Easing,
}

impl Default for CameraFollowSettings {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 1.3, -1.1),
            range: Vec2::new(0.3, 0.2),
            follow_duration: 0.25,
            idle_timeout: 2.0,
            springback_duration: 0.8,
            easing: Easing::QuadOut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowPhase {
    /// No per-frame updates until the pointer moves.
    Suspended,
    Following,
    SpringingBack,
}

/// Camera offset that chases the pointer while the user interacts and
/// springs back to its origin once they stop.
#[derive(Debug)]
pub struct PointerFollowCamera {
    settings: CameraFollowSettings,
    controller: TransitionController<Vec3>,
    phase: FollowPhase,
    idle: f32,
}

impl PointerFollowCamera {
    #[must_use]
    pub fn new(settings: CameraFollowSettings) -> Self {
        Self {
            controller: TransitionController::new(
                settings.origin,
                settings.follow_duration,
                settings.easing,
            ),
            settings,
            phase: FollowPhase::Suspended,
            idle: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> Vec3 {
        self.controller.current()
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> FollowPhase {
        self.phase
    }

    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.phase == FollowPhase::Following
    }

    #[must_use]
    pub fn settings(&self) -> &CameraFollowSettings {
        &self.settings
    }

    /// Offset the camera heads to for a pointer at `pointer` (NDC).
    #[must_use]
    pub fn follow_target(&self, pointer: Vec2) -> Vec3 {
        let p = pointer.clamp(Vec2::NEG_ONE, Vec2::ONE) * self.settings.range;
        self.settings.origin + Vec3::new(p.x, p.y, 0.0)
    }

    /// Pointer moved: (re)start following and reset the idle timer.
    pub fn on_pointer_move(&mut self, pointer: Vec2) {
        let target = self.follow_target(pointer);
        self.idle = 0.0;
        self.phase = FollowPhase::Following;
        self.controller
            .retarget(target, self.settings.follow_duration, None);
    }

    /// Advances one frame. Returns `None` while suspended.
    pub fn update(&mut self, dt: f32) -> Option<Vec3> {
        match self.phase {
            FollowPhase::Suspended => None,
            FollowPhase::Following => {
                let offset = self.controller.update(dt);
                self.idle += dt;
                if self.idle >= self.settings.idle_timeout {
                    log::trace!("Pointer idle, springing camera back");
                    self.phase = FollowPhase::SpringingBack;
                    self.controller.retarget(
                        self.settings.origin,
                        self.settings.springback_duration,
                        None,
                    );
                }
                Some(offset)
            }
            FollowPhase::SpringingBack => {
                let offset = self.controller.update(dt);
                if !self.controller.is_active() {
                    self.phase = FollowPhase::Suspended;
                }
                Some(offset)
            }
        }
    }
}
