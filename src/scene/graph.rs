use glam::{Affine3A, Quat, Vec3};
use rustc_hash::FxHashMap;
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use crate::errors::{AvatarError, Result};
use crate::scene::transform::Transform;

new_key_type! {
    /// Stable handle of a bone inside a [`SkeletonGraph`].
    pub struct BoneKey;
}

/// A single bone of a skeleton hierarchy.
///
/// # Hierarchy
///
/// - `parent`: Optional handle to the parent bone (None for root bones)
/// - `children`: Child bone handles, in insertion order
///
/// The rest transform is the authored, unposed local transform.
#[derive(Debug, Clone)]
pub struct BoneNode {
    pub name: String,
    pub(crate) parent: Option<BoneKey>,
    pub(crate) children: Vec<BoneKey>,
    pub rest: Transform,
}

impl BoneNode {
    /// Returns the parent bone handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<BoneKey> {
        self.parent
    }

    /// Returns a read-only slice of child bone handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[BoneKey] {
        &self.children
    }
}

#[derive(Debug, Clone, Copy)]
struct WorldRest {
    matrix: Affine3A,
    rotation: Quat,
}

/// Arena-backed bone hierarchy with cached world-space rest transforms.
///
/// Bones can only be attached to a parent that already exists, so the graph
/// is acyclic by construction. Rest transforms are immutable once inserted,
/// which keeps the world rest cache valid for the lifetime of the graph.
#[derive(Debug, Clone, Default)]
pub struct SkeletonGraph {
    bones: SlotMap<BoneKey, BoneNode>,
    roots: Vec<BoneKey>,
    by_name: FxHashMap<String, BoneKey>,
    world_rest: SecondaryMap<BoneKey, WorldRest>,
}

impl SkeletonGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a bone under `parent` (or as a root when `None`).
    ///
    /// A parent handle that does not belong to this graph is ignored and the
    /// bone becomes a root. Duplicate names keep the first bone for lookups.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<BoneKey>,
        rest: Transform,
    ) -> BoneKey {
        let name = name.into();
        let parent = parent.filter(|p| self.bones.contains_key(*p));

        let parent_world = parent.and_then(|p| self.world_rest.get(p).copied());
        let world = match parent_world {
            Some(pw) => WorldRest {
                matrix: pw.matrix * rest.local_matrix(),
                rotation: (pw.rotation * rest.rotation).normalize(),
            },
            None => WorldRest {
                matrix: rest.local_matrix(),
                rotation: rest.rotation,
            },
        };

        let key = self.bones.insert(BoneNode {
            name: name.clone(),
            parent,
            children: Vec::new(),
            rest,
        });

        match parent {
            Some(p) => self.bones[p].children.push(key),
            None => self.roots.push(key),
        }
        self.by_name.entry(name).or_insert(key);
        self.world_rest.insert(key, world);
        key
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: BoneKey) -> Option<&BoneNode> {
        self.bones.get(key)
    }

    /// Looks up a bone by its authored name.
    #[inline]
    #[must_use]
    pub fn find(&self, name: &str) -> Option<BoneKey> {
        self.by_name.get(name).copied()
    }

    /// Like [`find`](Self::find), but reports a missing bone as an error.
    pub fn require(&self, name: &str) -> Result<BoneKey> {
        self.find(name)
            .ok_or_else(|| AvatarError::UnknownBone(name.to_string()))
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[BoneKey] {
        &self.roots
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoneKey, &BoneNode)> {
        self.bones.iter()
    }

    /// Topmost ancestor of `key` (the bone itself when it is a root).
    #[must_use]
    pub fn root_of(&self, key: BoneKey) -> BoneKey {
        let mut current = key;
        while let Some(parent) = self.bones.get(current).and_then(|b| b.parent) {
            current = parent;
        }
        current
    }

    /// World-space rest rotation. Identity for `None` or an unknown key.
    #[must_use]
    pub fn world_rest_rotation(&self, key: Option<BoneKey>) -> Quat {
        key.and_then(|k| self.world_rest.get(k))
            .map_or(Quat::IDENTITY, |w| w.rotation)
    }

    /// World-space rest matrix. Identity for `None` or an unknown key.
    #[must_use]
    pub fn world_rest_matrix(&self, key: Option<BoneKey>) -> Affine3A {
        key.and_then(|k| self.world_rest.get(k))
            .map_or(Affine3A::IDENTITY, |w| w.matrix)
    }

    #[must_use]
    pub fn world_rest_position(&self, key: BoneKey) -> Vec3 {
        self.world_rest_matrix(Some(key)).translation.into()
    }

    /// Vertical distance between a bone and the origin of its hierarchy.
    ///
    /// The origin is the topmost ancestor's world position, or the graph
    /// origin when the bone is itself a root.
    #[must_use]
    pub fn height_above_root(&self, key: BoneKey) -> f32 {
        let root = self.root_of(key);
        let root_y = if root == key {
            0.0
        } else {
            self.world_rest_position(root).y
        };
        (self.world_rest_position(key).y - root_y).abs()
    }
}
