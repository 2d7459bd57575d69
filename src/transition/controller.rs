use std::hash::Hash;
use std::ops::Add;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::animation::Interpolatable;
use crate::transition::easing::Easing;
use crate::transition::tween::Tween;

/// Invoked once when a transition reaches its target.
pub type CompletionCallback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    Transitioning,
}

struct ActiveTransition<T> {
    tween: Tween<T>,
    on_complete: Option<CompletionCallback>,
}

/// Interruptible tween state machine for one owned value.
///
/// A new trigger while transitioning restarts from the current interpolated
/// value toward the new target. The interrupted transition's callback is
/// dropped without being invoked: the last trigger wins and nothing queues.
pub struct TransitionController<T> {
    current: T,
    duration: f32,
    easing: Easing,
    active: Option<ActiveTransition<T>>,
}

impl<T> std::fmt::Debug for TransitionController<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionController")
            .field("current", &self.current)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("active", &self.active.as_ref().map(|a| &a.tween.target))
            .finish()
    }
}

impl<T: Interpolatable + Add<Output = T>> TransitionController<T> {
    #[must_use]
    pub fn new(initial: T, duration: f32, easing: Easing) -> Self {
        Self {
            current: initial,
            duration,
            easing,
            active: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> T {
        self.current
    }

    #[must_use]
    pub fn state(&self) -> TransitionState {
        if self.active.is_some() {
            TransitionState::Transitioning
        } else {
            TransitionState::Idle
        }
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Target of the in-flight transition.
    #[must_use]
    pub fn target(&self) -> Option<T> {
        self.active.as_ref().map(|a| a.tween.target)
    }

    /// Moves by `delta` from the current value over the default duration.
    pub fn trigger(&mut self, delta: T, on_complete: impl FnOnce() + 'static) {
        let target = self.current + delta;
        self.start(target, self.duration, Some(Box::new(on_complete)));
    }

    /// Moves to an absolute `target` over `duration`.
    pub fn retarget(&mut self, target: T, duration: f32, on_complete: Option<CompletionCallback>) {
        self.start(target, duration, on_complete);
    }

    fn start(&mut self, target: T, duration: f32, on_complete: Option<CompletionCallback>) {
        if let Some(previous) = self.active.take()
            && previous.on_complete.is_some()
        {
            log::debug!("Transition interrupted, discarding its completion callback");
        }
        self.active = Some(ActiveTransition {
            tween: Tween::new(self.current, target, duration, self.easing),
            on_complete,
        });
    }

    /// Advances the in-flight transition and returns the current value.
    ///
    /// On the frame the transition completes, the value snaps to the target,
    /// the controller returns to `Idle` and the callback runs.
    pub fn update(&mut self, dt: f32) -> T {
        let Some(active) = self.active.as_mut() else {
            return self.current;
        };

        self.current = active.tween.advance(dt);
        if active.tween.is_finished() {
            self.current = active.tween.target;
            if let Some(done) = self.active.take().and_then(|a| a.on_complete) {
                done();
            }
        }
        self.current
    }

    /// Aborts the in-flight transition without invoking its callback.
    /// The value stays where it is. Returns whether anything was aborted.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Jumps to `value`, aborting any transition.
    pub fn set_current(&mut self, value: T) {
        self.cancel();
        self.current = value;
    }
}

/// Euler-angle reorientation transitions keyed by owner.
///
/// Each owner has its own [`TransitionController`]; removing an owner aborts
/// its transition silently.
pub struct RotationTransitions<K> {
    controllers: FxHashMap<K, TransitionController<Vec3>>,
    duration: f32,
    easing: Easing,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> RotationTransitions<K> {
    #[must_use]
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            controllers: FxHashMap::default(),
            duration,
            easing,
        }
    }

    /// Registers `owner` at `rotation`, replacing (and silently aborting) any
    /// previous registration.
    pub fn insert_owner(&mut self, owner: K, rotation: Vec3) {
        self.controllers.insert(
            owner,
            TransitionController::new(rotation, self.duration, self.easing),
        );
    }

    /// Forgets `owner`. An in-flight transition is dropped without its callback.
    pub fn remove_owner(&mut self, owner: K) -> Option<Vec3> {
        let controller = self.controllers.remove(&owner)?;
        if controller.is_active() {
            log::debug!("Owner {owner:?} removed mid-transition, aborting");
        }
        Some(controller.current())
    }

    /// Starts rotating `owner` by `delta` (Euler XYZ radians). Unknown owners
    /// start from zero rotation.
    pub fn trigger(&mut self, owner: K, delta: Vec3, on_complete: impl FnOnce() + 'static) {
        let (duration, easing) = (self.duration, self.easing);
        self.controllers
            .entry(owner)
            .or_insert_with(|| TransitionController::new(Vec3::ZERO, duration, easing))
            .trigger(delta, on_complete);
    }

    /// Aborts `owner`'s transition without invoking its callback.
    pub fn cancel(&mut self, owner: K) -> bool {
        self.controllers
            .get_mut(&owner)
            .is_some_and(TransitionController::cancel)
    }

    /// Advances every in-flight transition.
    pub fn update(&mut self, dt: f32) {
        for controller in self.controllers.values_mut() {
            controller.update(dt);
        }
    }

    #[must_use]
    pub fn rotation(&self, owner: K) -> Option<Vec3> {
        self.controllers.get(&owner).map(TransitionController::current)
    }

    #[must_use]
    pub fn is_transitioning(&self, owner: K) -> bool {
        self.controllers
            .get(&owner)
            .is_some_and(TransitionController::is_active)
    }
}
