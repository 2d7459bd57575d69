//! Retargeting Engine
//!
//! Re-expresses a clip authored for a source rig (bone names, proportions and
//! rest orientations of that rig) as a clip for the canonical humanoid
//! skeleton.
//!
//! # Algorithm
//!
//! 1. `hips_scale = target hips height / source hips height`, both measured
//!    from the respective skeleton root at rest.
//! 2. Each source track is mapped to a canonical bone; unmapped bones,
//!    bones the target does not bind and malformed tracks are dropped.
//! 3. Rotation samples `q` become `parent_rest · q · rest⁻¹`, where `rest` and
//!    `parent_rest` are the source bone's and its parent's world rest
//!    rotations. The result is a rotation in the normalized (identity rest)
//!    convention, independent of either rig's T-pose.
//! 4. Position samples are scaled by `hips_scale`.
//!
//! The transform is pure: neither skeleton is mutated and identical inputs
//! yield identical output.

use crate::animation::clip::{RetargetedClip, SourceAnimationClip, Track, TrackData};
use crate::errors::{AvatarError, Result};
use crate::humanoid::{BoneNameMap, HumanBone, HumanoidSkeleton};
use crate::scene::SkeletonGraph;

/// Name given to every retargeted clip.
pub const RETARGETED_CLIP_NAME: &str = "humanoidAnimation";

/// Source heights below this are treated as a degenerate rig.
const MIN_SOURCE_HIPS_HEIGHT: f32 = 1e-6;

/// Retargets clips using a fixed bone name table.
#[derive(Debug, Clone, Copy)]
pub struct Retargeter<'a> {
    map: &'a BoneNameMap,
}

impl Default for Retargeter<'static> {
    fn default() -> Self {
        Self::mixamo()
    }
}

impl<'a> Retargeter<'a> {
    #[must_use]
    pub fn new(map: &'a BoneNameMap) -> Self {
        Self { map }
    }

    #[must_use]
    pub fn map(&self) -> &'a BoneNameMap {
        self.map
    }

    /// Ratio between target and source hips heights.
    pub fn hips_scale(&self, source: &SkeletonGraph, target: &HumanoidSkeleton) -> Result<f32> {
        let source_hips = self
            .map
            .source_name(HumanBone::Hips)
            .and_then(|name| source.find(name))
            .or_else(|| {
                source
                    .iter()
                    .find(|(_, node)| self.map.map_bone(&node.name) == Some(HumanBone::Hips))
                    .map(|(key, _)| key)
            })
            .ok_or_else(|| {
                AvatarError::IncompatibleSkeleton("source rig has no hips bone".to_string())
            })?;

        if !target.has_bone(HumanBone::Hips) {
            return Err(AvatarError::IncompatibleSkeleton(format!(
                "target skeleton '{}' has no hips bone",
                target.name
            )));
        }

        let source_height = source.height_above_root(source_hips);
        if source_height < MIN_SOURCE_HIPS_HEIGHT {
            return Err(AvatarError::IncompatibleSkeleton(format!(
                "source hips height is degenerate ({source_height})"
            )));
        }

        Ok(target.hips_height() / source_height)
    }

    /// Retargets `clip`, authored against `source`, onto `target`.
    pub fn retarget(
        &self,
        clip: &SourceAnimationClip,
        source: &SkeletonGraph,
        target: &HumanoidSkeleton,
    ) -> Result<RetargetedClip> {
        let hips_scale = self.hips_scale(source, target)?;

        let has_root_track = clip
            .tracks
            .iter()
            .any(|t| t.is_well_formed() && self.map.map_bone(&t.bone) == Some(HumanBone::Hips));
        if !has_root_track {
            return Err(AvatarError::MissingRootBone {
                clip: clip.name.clone(),
            });
        }

        let mut tracks = Vec::with_capacity(clip.tracks.len());
        let mut dropped = 0_usize;

        for track in &clip.tracks {
            if !track.is_well_formed() {
                log::warn!(
                    "Track '{}' has mismatched keyframe and value counts, dropping",
                    track.bone
                );
                dropped += 1;
                continue;
            }
            let Some(bone) = self.map.map_bone(&track.bone) else {
                log::debug!("Dropping track for unmapped bone '{}'", track.bone);
                dropped += 1;
                continue;
            };
            if !target.has_bone(bone) {
                log::debug!("Target '{}' does not bind {bone}, dropping track", target.name);
                dropped += 1;
                continue;
            }

            match &track.data {
                TrackData::Rotation(keys) => {
                    let Some(key) = source.find(&track.bone) else {
                        log::warn!(
                            "Rotation track '{}' has no node in the source rig, dropping",
                            track.bone
                        );
                        dropped += 1;
                        continue;
                    };
                    let parent = source.get(key).and_then(|n| n.parent());
                    let rest_inv = source.world_rest_rotation(Some(key)).inverse();
                    let parent_rest = source.world_rest_rotation(parent);

                    tracks.push(Track::rotation(
                        bone,
                        keys.map_values(|q| parent_rest * q * rest_inv),
                    ));
                }
                TrackData::Position(keys) => {
                    tracks.push(Track::position(bone, keys.map_values(|v| v * hips_scale)));
                }
            }
        }

        log::info!(
            "Retargeted '{}' onto '{}': {} tracks kept, {dropped} dropped, hips scale {hips_scale:.4}",
            clip.name,
            target.name,
            tracks.len()
        );

        Ok(RetargetedClip::with_duration(
            RETARGETED_CLIP_NAME,
            clip.duration,
            tracks,
        ))
    }
}

impl Retargeter<'static> {
    /// Retargeter over the built-in Mixamo table.
    #[must_use]
    pub fn mixamo() -> Self {
        Self::new(BoneNameMap::mixamo())
    }
}

/// Retargets a Mixamo-rigged clip onto `target`.
pub fn retarget(
    clip: &SourceAnimationClip,
    source: &SkeletonGraph,
    target: &HumanoidSkeleton,
) -> Result<RetargetedClip> {
    Retargeter::mixamo().retarget(clip, source, target)
}
