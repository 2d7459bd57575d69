use glam::{Quat, Vec3};

use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::humanoid::HumanBone;

/// Bone property animated by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackProperty {
    Rotation,
    Position,
}

impl TrackProperty {
    /// Parses the property suffix of a `"<bone>.<property>"` track name.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "quaternion" | "rotation" => Some(Self::Rotation),
            "position" | "translation" => Some(Self::Position),
            _ => None,
        }
    }

    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Rotation => "quaternion",
            Self::Position => "position",
        }
    }
}

/// Keyframe data, tagged by property when the clip is built.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackData {
    Rotation(KeyframeTrack<Quat>),
    Position(KeyframeTrack<Vec3>),
}

impl TrackData {
    #[must_use]
    pub fn property(&self) -> TrackProperty {
        match self {
            Self::Rotation(_) => TrackProperty::Rotation,
            Self::Position(_) => TrackProperty::Position,
        }
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            Self::Rotation(t) => t.end_time(),
            Self::Position(t) => t.end_time(),
        }
    }
}

/// The bone and property a source track is bound to, parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackBinding {
    pub bone: String,
    pub property: TrackProperty,
}

impl TrackBinding {
    /// Splits `"mixamorigHips.quaternion"` at the last `.`.
    ///
    /// Returns `None` for names without a property or with an unsupported one
    /// (scale tracks, morph weights).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let (bone, suffix) = name.rsplit_once('.')?;
        if bone.is_empty() {
            return None;
        }
        Some(Self {
            bone: bone.to_string(),
            property: TrackProperty::from_suffix(suffix)?,
        })
    }
}

/// One animated property of one bone.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<B> {
    pub bone: B,
    pub data: TrackData,
}

impl<B> Track<B> {
    #[must_use]
    pub fn rotation(bone: B, track: KeyframeTrack<Quat>) -> Self {
        Self {
            bone,
            data: TrackData::Rotation(track),
        }
    }

    #[must_use]
    pub fn position(bone: B, track: KeyframeTrack<Vec3>) -> Self {
        Self {
            bone,
            data: TrackData::Position(track),
        }
    }

    #[inline]
    #[must_use]
    pub fn property(&self) -> TrackProperty {
        self.data.property()
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match &self.data {
            TrackData::Rotation(keys) => keys.is_well_formed(),
            TrackData::Position(keys) => keys.is_well_formed(),
        }
    }
}

impl Track<String> {
    /// Builds a source track from a named, flat sample buffer.
    ///
    /// Rotation tracks carry 4 floats (`x, y, z, w`) per sample and position
    /// tracks 3. A buffer whose length does not match `times` is rejected.
    #[must_use]
    pub fn from_flat(name: &str, times: Vec<f32>, values: &[f32]) -> Option<Self> {
        let binding = TrackBinding::parse(name)?;
        let stride = match binding.property {
            TrackProperty::Rotation => 4,
            TrackProperty::Position => 3,
        };
        if values.len() != times.len() * stride {
            log::warn!(
                "Track '{name}' has {} values for {} keyframes, skipping",
                values.len(),
                times.len()
            );
            return None;
        }

        let data = match binding.property {
            TrackProperty::Rotation => TrackData::Rotation(KeyframeTrack::new(
                times,
                values.chunks_exact(4).map(Quat::from_slice).collect(),
                InterpolationMode::Linear,
            )),
            TrackProperty::Position => TrackData::Position(KeyframeTrack::new(
                times,
                values.chunks_exact(3).map(Vec3::from_slice).collect(),
                InterpolationMode::Linear,
            )),
        };
        Some(Self {
            bone: binding.bone,
            data,
        })
    }
}

/// A named set of tracks with a playback duration.
///
/// `B` is the bone identifier: authored bone names for source clips,
/// canonical [`HumanBone`]s once retargeted.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip<B> {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track<B>>,
}

/// A clip as authored for a source rig.
pub type SourceAnimationClip = AnimationClip<String>;

/// A clip playable on the canonical humanoid skeleton.
pub type RetargetedClip = AnimationClip<HumanBone>;

impl<B> AnimationClip<B> {
    /// Creates a clip whose duration is the latest keyframe of any track.
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track<B>>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);
        Self::with_duration(name, duration, tracks)
    }

    #[must_use]
    pub fn with_duration(name: impl Into<String>, duration: f32, tracks: Vec<Track<B>>) -> Self {
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }
}

impl<B: PartialEq> AnimationClip<B> {
    /// First track bound to `bone` for `property`.
    #[must_use]
    pub fn track(&self, bone: &B, property: TrackProperty) -> Option<&Track<B>> {
        self.tracks
            .iter()
            .find(|t| &t.bone == bone && t.property() == property)
    }
}
