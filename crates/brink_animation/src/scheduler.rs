//! Transition scheduler
//!
//! Drives every in-flight [`Tween`] once per frame. Transitions are started
//! through a [`SchedulerHandle`], which holds only a weak reference so
//! containers and controllers can keep one without extending the scheduler's
//! lifetime.
//!
//! Everything runs on the UI thread. Callbacks are never invoked while the
//! scheduler is borrowed: [`AnimationScheduler::tick`] collects the work for
//! the frame first and runs it afterwards, so an update or completion
//! callback may start or cancel transitions freely.
//!
//! Every started transition completes exactly once. Completion reports
//! `true` when the tween ran to its target and `false` when it was cancelled
//! or superseded. Completions of cancelled transitions are queued and
//! delivered on the next tick, never from inside `cancel`.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use brink_animation::{AnimationScheduler, Easing, Tween};
//!
//! let scheduler = AnimationScheduler::new();
//! let value = Rc::new(Cell::new(0.0));
//!
//! let v = Rc::clone(&value);
//! scheduler.handle().start(
//!     Tween::new(0.0, 60.0, 0.3, Easing::EaseInOut),
//!     move |x| v.set(x),
//!     |finished| assert!(finished),
//! );
//!
//! scheduler.run_until_idle(1.0 / 60.0, 120);
//! assert_eq!(value.get(), 60.0);
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::tween::Tween;

new_key_type! {
    /// Handle to a running transition
    pub struct TransitionId;
}

/// Per-frame value callback
pub type UpdateCallback = Rc<dyn Fn(f32)>;

/// Called once when a transition ends; the flag is `true` if it finished
pub type CompletionCallback = Box<dyn FnOnce(bool)>;

struct ActiveTransition {
    tween: Tween,
    on_update: UpdateCallback,
    on_complete: Option<CompletionCallback>,
}

#[derive(Default)]
struct SchedulerInner {
    transitions: SlotMap<TransitionId, ActiveTransition>,
    /// Completions of cancelled transitions, delivered on the next tick
    cancelled: Vec<(TransitionId, CompletionCallback)>,
    frame: u64,
}

/// Owner of all in-flight transitions
///
/// Typically held by the application's frame loop, which calls [`tick`]
/// once per frame.
///
/// [`tick`]: AnimationScheduler::tick
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner::default())),
        }
    }

    /// Get a handle for starting and cancelling transitions
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Advance every transition by `dt` seconds
    ///
    /// Returns true if work remains for a later frame.
    pub fn tick(&self, dt: f32) -> bool {
        type Completion = (TransitionId, CompletionCallback, bool);

        let (updates, completions) = {
            let mut inner = self.inner.borrow_mut();
            inner.frame += 1;

            let mut completions: SmallVec<[Completion; 4]> = inner
                .cancelled
                .drain(..)
                .map(|(id, callback)| (id, callback, false))
                .collect();

            let mut updates: SmallVec<[(UpdateCallback, f32); 4]> = SmallVec::new();
            let mut done: SmallVec<[TransitionId; 4]> = SmallVec::new();
            for (id, transition) in inner.transitions.iter_mut() {
                let value = transition.tween.step(dt);
                updates.push((Rc::clone(&transition.on_update), value));
                if transition.tween.is_finished() {
                    done.push(id);
                }
            }

            for id in done {
                if let Some(mut transition) = inner.transitions.remove(id) {
                    if let Some(callback) = transition.on_complete.take() {
                        completions.push((id, callback, true));
                    }
                }
            }

            (updates, completions)
        };

        for (callback, value) in updates {
            callback(value);
        }
        for (id, callback, finished) in completions {
            tracing::trace!(?id, finished, "transition completed");
            callback(finished);
        }

        self.has_pending_work()
    }

    /// Tick at a fixed step until idle or `max_frames` is reached
    ///
    /// Returns the number of frames ticked.
    pub fn run_until_idle(&self, dt: f32, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.has_pending_work() {
            self.tick(dt);
            frames += 1;
        }
        frames
    }

    /// True while a transition is running or a completion is queued
    pub fn has_pending_work(&self) -> bool {
        let inner = self.inner.borrow();
        !inner.transitions.is_empty() || !inner.cancelled.is_empty()
    }

    /// Number of running transitions
    pub fn active_count(&self) -> usize {
        self.inner.borrow().transitions.len()
    }

    /// Frames ticked so far
    pub fn frame(&self) -> u64 {
        self.inner.borrow().frame
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak handle to an [`AnimationScheduler`]
///
/// All operations are no-ops once the scheduler has been dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// A handle that is not connected to any scheduler
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Start a transition
    ///
    /// `on_update` receives the tween's value every frame, `on_complete`
    /// runs exactly once when the transition ends. Returns `None` (and drops
    /// both callbacks) if the scheduler is gone.
    pub fn start<U, F>(&self, tween: Tween, on_update: U, on_complete: F) -> Option<TransitionId>
    where
        U: Fn(f32) + 'static,
        F: FnOnce(bool) + 'static,
    {
        let inner = self.inner.upgrade()?;
        let id = inner.borrow_mut().transitions.insert(ActiveTransition {
            tween,
            on_update: Rc::new(on_update),
            on_complete: Some(Box::new(on_complete)),
        });
        tracing::trace!(
            ?id,
            from = tween.from(),
            to = tween.target(),
            duration = tween.duration(),
            "transition started"
        );
        Some(id)
    }

    /// Stop a transition where it is
    ///
    /// Its completion is queued with `finished = false` for the next tick.
    /// Returns false if the transition already ended.
    pub fn cancel(&self, id: TransitionId) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let mut inner = inner.borrow_mut();
        match inner.transitions.remove(id) {
            Some(mut transition) => {
                if let Some(callback) = transition.on_complete.take() {
                    inner.cancelled.push((id, callback));
                }
                tracing::trace!(?id, "transition cancelled");
                true
            }
            None => false,
        }
    }

    /// Is the transition still running?
    pub fn is_active(&self, id: TransitionId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().transitions.contains_key(id))
            .unwrap_or(false)
    }
}
