use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::clip::{RetargetedClip, TrackData};
use crate::animation::tracks::KeyframeCursor;
use crate::humanoid::HumanoidPose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    Once,
    #[default]
    Loop,
    PingPong,
}

/// Playback state of one retargeted clip.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<RetargetedClip>,

    pub time: f32,
    pub time_scale: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,

    /// Ping-pong playback direction, `1.0` forward or `-1.0` backward.
    direction: f32,
    track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<RetargetedClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            direction: 1.0,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<RetargetedClip> {
        &self.clip
    }

    /// Advances playback time by `dt` scaled by `time_scale`.
    pub fn update(&mut self, dt: f32) {
        if self.paused {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        let step = dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                self.time += step;
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                self.time = (self.time + step).rem_euclid(duration);
            }
            LoopMode::PingPong => {
                // Unfold onto [0, 2 * duration), where the second half plays backward.
                let double_duration = duration * 2.0;
                let phase = if self.direction < 0.0 {
                    double_duration - self.time
                } else {
                    self.time
                };
                let phase = (phase + step).rem_euclid(double_duration);
                if phase > duration {
                    self.time = double_duration - phase;
                    self.direction = -1.0;
                } else {
                    self.time = phase;
                    self.direction = 1.0;
                }
            }
        }
    }

    /// Writes every track's value at the current time into `pose`.
    ///
    /// Bones without a track keep whatever `pose` already holds.
    pub fn sample_pose(&mut self, pose: &mut HumanoidPose) {
        let time = self.time;
        for (track, cursor) in self.clip.tracks.iter().zip(self.track_cursors.iter_mut()) {
            match &track.data {
                TrackData::Rotation(keys) => {
                    if let Some(rotation) = keys.sample_with_cursor(time, cursor) {
                        pose.set_rotation(track.bone, rotation);
                    }
                }
                TrackData::Position(keys) => {
                    if let Some(position) = keys.sample_with_cursor(time, cursor) {
                        pose.set_translation(track.bone, position);
                    }
                }
            }
        }
    }
}
