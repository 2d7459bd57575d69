//! Asset load requests and their completions.
//!
//! Loads run outside the frame loop. Each request carries a generation token
//! from the stage; results travel back over a channel and are applied between
//! frames, where a result whose generation is no longer awaited is dropped.

use std::future::Future;

use crate::animation::SourceAnimationClip;
use crate::errors::{AvatarError, Result};
use crate::humanoid::HumanoidSkeleton;
use crate::scene::SkeletonGraph;

/// Monotonically increasing load request token.
pub type Generation = u64;

/// Output of a skinned-animation loader: clips plus the rig they were authored on.
#[derive(Debug, Clone, Default)]
pub struct MotionAsset {
    pub clips: Vec<SourceAnimationClip>,
    pub graph: SkeletonGraph,
}

impl MotionAsset {
    #[must_use]
    pub fn new(clips: Vec<SourceAnimationClip>, graph: SkeletonGraph) -> Self {
        Self { clips, graph }
    }

    /// Clip called `name`, or the first clip when none matches.
    pub fn select_clip(&self, name: &str) -> Result<&SourceAnimationClip> {
        self.clips
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.clips.first())
            .ok_or_else(|| AvatarError::load(name, "motion asset contains no clips"))
    }
}

/// Loads a humanoid skeleton (e.g. from a VRM file).
pub trait HumanoidLoader {
    fn load_humanoid(&self, source: &str) -> impl Future<Output = Result<HumanoidSkeleton>>;
}

/// Loads clips and their source rig (e.g. from an FBX file).
pub trait MotionLoader {
    fn load_motion(&self, source: &str) -> impl Future<Output = Result<MotionAsset>>;
}

#[derive(Debug)]
pub enum LoadPayload {
    Avatar(Result<HumanoidSkeleton>),
    Motion(Result<MotionAsset>),
}

/// A finished load, tagged with the generation of its request.
#[derive(Debug)]
pub struct LoadCompletion {
    pub generation: Generation,
    pub source: String,
    pub payload: LoadPayload,
}

/// What applying a completion did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Applied,
    /// A newer request superseded this one; playback state is untouched.
    Discarded,
}

#[derive(Debug)]
struct Ticket {
    generation: Generation,
    source: String,
    sender: flume::Sender<LoadCompletion>,
}

impl Ticket {
    fn send(self, payload: LoadPayload) {
        let completion = LoadCompletion {
            generation: self.generation,
            source: self.source,
            payload,
        };
        if self.sender.send(completion).is_err() {
            log::debug!("Stage dropped before load {} finished", self.generation);
        }
    }
}

/// Pending avatar (humanoid skeleton) load.
#[derive(Debug)]
#[must_use = "a load request does nothing until it is run or completed"]
pub struct AvatarLoad(Ticket);

impl AvatarLoad {
    pub(crate) fn new(generation: Generation, source: String, sender: flume::Sender<LoadCompletion>) -> Self {
        Self(Ticket {
            generation,
            source,
            sender,
        })
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.0.generation
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.0.source
    }

    /// Hands a result produced elsewhere back to the stage.
    pub fn complete(self, result: Result<HumanoidSkeleton>) {
        self.0.send(LoadPayload::Avatar(result));
    }

    /// Runs `loader` and hands its result back to the stage.
    pub async fn run(self, loader: &impl HumanoidLoader) {
        let result = loader.load_humanoid(&self.0.source).await;
        self.complete(result);
    }
}

/// Pending motion (clip + source rig) load.
#[derive(Debug)]
#[must_use = "a load request does nothing until it is run or completed"]
pub struct MotionLoad(Ticket);

impl MotionLoad {
    pub(crate) fn new(generation: Generation, source: String, sender: flume::Sender<LoadCompletion>) -> Self {
        Self(Ticket {
            generation,
            source,
            sender,
        })
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.0.generation
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.0.source
    }

    pub fn complete(self, result: Result<MotionAsset>) {
        self.0.send(LoadPayload::Motion(result));
    }

    pub async fn run(self, loader: &impl MotionLoader) {
        let result = loader.load_motion(&self.0.source).await;
        self.complete(result);
    }
}
