use glam::{Affine3A, Quat, Vec3};
use slotmap::SecondaryMap;

use crate::errors::{AvatarError, Result};
use crate::humanoid::bone::HumanBone;
use crate::humanoid::mapper::BoneNameMap;
use crate::humanoid::pose::HumanoidPose;
use crate::scene::{BoneKey, BoneNode, SkeletonGraph, Transform};

/// Normalized view of a humanoid bone.
///
/// Normalized bones have an identity rest rotation and sit at the raw bone's
/// rest position, so rotations can be assigned directly without knowing how
/// the rig was authored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBone {
    pub bone: HumanBone,
    /// Nearest bound canonical ancestor.
    pub parent: Option<HumanBone>,
    /// Rest offset from the normalized parent (from the skeleton origin for the root).
    pub rest_position: Vec3,
}

/// Raw transforms produced by resolving a [`HumanoidPose`] against a skeleton.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPose {
    locals: SecondaryMap<BoneKey, Transform>,
    worlds: SecondaryMap<BoneKey, Affine3A>,
    world_rotations: SecondaryMap<BoneKey, Quat>,
}

impl ResolvedPose {
    /// Local transform to assign to a raw bone node.
    #[must_use]
    pub fn local(&self, key: BoneKey) -> Option<&Transform> {
        self.locals.get(key)
    }

    #[must_use]
    pub fn world_matrix(&self, key: BoneKey) -> Option<&Affine3A> {
        self.worlds.get(key)
    }

    #[must_use]
    pub fn world_rotation(&self, key: BoneKey) -> Option<Quat> {
        self.world_rotations.get(key).copied()
    }

    #[must_use]
    pub fn world_position(&self, key: BoneKey) -> Option<Vec3> {
        self.worlds.get(key).map(|m| m.translation.into())
    }

    /// Every raw bone with its resolved local transform.
    pub fn iter(&self) -> impl Iterator<Item = (BoneKey, &Transform)> {
        self.locals.iter()
    }
}

/// Canonical humanoid skeleton over an authored bone graph.
///
/// Exposes each canonical bone two ways: the *raw* node (authored rest
/// transform, for world-space math) and the *normalized* node (identity rest
/// rotation, for direct rotation assignment). Every mandatory bone resolves in
/// both forms, otherwise construction fails.
#[derive(Debug, Clone)]
pub struct HumanoidSkeleton {
    pub name: String,
    graph: SkeletonGraph,
    raw: [Option<BoneKey>; HumanBone::COUNT],
    normalized: [Option<NormalizedBone>; HumanBone::COUNT],
}

impl HumanoidSkeleton {
    /// Binds canonical bones to nodes of `graph`.
    ///
    /// Bindings to keys outside the graph are ignored; a later binding of the
    /// same canonical bone replaces an earlier one.
    pub fn new(
        name: impl Into<String>,
        graph: SkeletonGraph,
        bindings: impl IntoIterator<Item = (HumanBone, BoneKey)>,
    ) -> Result<Self> {
        let name = name.into();
        let mut raw = [None; HumanBone::COUNT];
        for (bone, key) in bindings {
            if graph.get(key).is_some() {
                raw[bone.index()] = Some(key);
            } else {
                log::warn!("Skeleton '{name}': binding for {bone} points outside the bone graph");
            }
        }

        if let Some(missing) = HumanBone::MANDATORY.iter().find(|b| raw[b.index()].is_none()) {
            return Err(AvatarError::IncompatibleSkeleton(format!(
                "skeleton '{name}' has no {missing} bone"
            )));
        }

        let mut normalized = [None; HumanBone::COUNT];
        for &bone in HumanBone::ALL {
            let Some(key) = raw[bone.index()] else {
                continue;
            };
            let parent = nearest_bound_ancestor(&raw, bone);
            let world = graph.world_rest_position(key);
            let parent_world = parent
                .and_then(|p| raw[p.index()])
                .map_or(Vec3::ZERO, |pk| graph.world_rest_position(pk));
            normalized[bone.index()] = Some(NormalizedBone {
                bone,
                parent,
                rest_position: world - parent_world,
            });
        }

        log::debug!(
            "Humanoid skeleton '{name}': {} of {} canonical bones bound",
            raw.iter().flatten().count(),
            HumanBone::COUNT
        );

        Ok(Self {
            name,
            graph,
            raw,
            normalized,
        })
    }

    /// Binds every graph bone whose name is known to `map`.
    pub fn from_name_map(
        name: impl Into<String>,
        graph: SkeletonGraph,
        map: &BoneNameMap,
    ) -> Result<Self> {
        let bindings: Vec<_> = graph
            .iter()
            .filter_map(|(key, node)| map.map_bone(&node.name).map(|bone| (bone, key)))
            .collect();
        Self::new(name, graph, bindings)
    }

    #[inline]
    #[must_use]
    pub fn graph(&self) -> &SkeletonGraph {
        &self.graph
    }

    #[inline]
    #[must_use]
    pub fn raw_key(&self, bone: HumanBone) -> Option<BoneKey> {
        self.raw[bone.index()]
    }

    /// Authored bone node bound to `bone`.
    #[must_use]
    pub fn raw_bone(&self, bone: HumanBone) -> Option<&BoneNode> {
        self.raw_key(bone).and_then(|k| self.graph.get(k))
    }

    /// Normalized view of `bone`.
    #[inline]
    #[must_use]
    pub fn normalized_bone(&self, bone: HumanBone) -> Option<&NormalizedBone> {
        self.normalized[bone.index()].as_ref()
    }

    pub fn normalized_bones(&self) -> impl Iterator<Item = &NormalizedBone> {
        self.normalized.iter().flatten()
    }

    /// True when `bone` resolves in both the raw and normalized forms.
    #[must_use]
    pub fn has_bone(&self, bone: HumanBone) -> bool {
        self.raw_bone(bone).is_some() && self.normalized_bone(bone).is_some()
    }

    /// World-space rest position of a canonical bone.
    #[must_use]
    pub fn world_rest_position(&self, bone: HumanBone) -> Option<Vec3> {
        self.raw_key(bone).map(|k| self.graph.world_rest_position(k))
    }

    /// World-space rest rotation of a canonical bone.
    #[must_use]
    pub fn world_rest_rotation(&self, bone: HumanBone) -> Option<Quat> {
        self.raw_key(bone)
            .map(|k| self.graph.world_rest_rotation(Some(k)))
    }

    /// Distance from the skeleton root to the hips at rest.
    #[must_use]
    pub fn hips_height(&self) -> f32 {
        self.raw_key(HumanBone::Hips)
            .map_or(0.0, |k| self.graph.height_above_root(k))
    }

    /// Converts a normalized pose into raw local and world transforms.
    ///
    /// For a bound bone with raw parent world rest rotation `P`, normalized
    /// rotation `n` and authored rest rotation `r`, the raw local rotation is
    /// `P⁻¹ · n · P · r`. Translation offsets from the normalized rest are
    /// carried into the raw parent's rest space. Unbound raw bones keep their
    /// rest transform.
    #[must_use]
    pub fn resolve_pose(&self, pose: &HumanoidPose) -> ResolvedPose {
        let mut bound: SecondaryMap<BoneKey, HumanBone> = SecondaryMap::new();
        for normalized in self.normalized_bones() {
            if let Some(key) = self.raw_key(normalized.bone) {
                bound.insert(key, normalized.bone);
            }
        }

        let mut resolved = ResolvedPose::default();
        let mut stack: Vec<(BoneKey, Affine3A, Quat)> = self
            .graph
            .roots()
            .iter()
            .rev()
            .map(|&k| (k, Affine3A::IDENTITY, Quat::IDENTITY))
            .collect();

        while let Some((key, parent_world, parent_rotation)) = stack.pop() {
            let Some(node) = self.graph.get(key) else {
                continue;
            };

            let mut local = node.rest;
            if let Some(&bone) = bound.get(key) {
                let bone_pose = pose.get(bone);
                let parent_rest = self.graph.world_rest_rotation(node.parent);
                local.rotation =
                    (parent_rest.inverse() * bone_pose.rotation * parent_rest * node.rest.rotation)
                        .normalize();

                if let Some(normalized) = self.normalized_bone(bone) {
                    let delta = bone_pose.translation - normalized.rest_position;
                    if delta != Vec3::ZERO {
                        let parent_rest_inv = self.graph.world_rest_matrix(node.parent).inverse();
                        local.position += parent_rest_inv.transform_vector3(delta);
                    }
                }
            }

            let world = parent_world * local.local_matrix();
            let world_rotation = (parent_rotation * local.rotation).normalize();
            resolved.locals.insert(key, local);
            resolved.worlds.insert(key, world);
            resolved.world_rotations.insert(key, world_rotation);

            for &child in node.children().iter().rev() {
                stack.push((child, world, world_rotation));
            }
        }

        resolved
    }
}

fn nearest_bound_ancestor(
    raw: &[Option<BoneKey>; HumanBone::COUNT],
    bone: HumanBone,
) -> Option<HumanBone> {
    let mut current = bone.parent();
    while let Some(candidate) = current {
        if raw[candidate.index()].is_some() {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}
