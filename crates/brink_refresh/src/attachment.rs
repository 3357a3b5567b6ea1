//! Observation lifecycle of an edge controller
//!
//! Holds the [`ObserverId`]s a controller has registered on its container.
//! A controller observes exactly while it is attached and visible; the inset
//! subscription is additionally paused while the controller's own inset
//! writes are in flight. Subscribing twice or unsubscribing when nothing is
//! registered is a no-op.

use brink_core::{ChangeCallback, ContainerProperty, ObserverId};
use smallvec::SmallVec;

use crate::container::ScrollContainer;

/// Properties every controller follows, besides the content inset
const TRACKED: [ContainerProperty; 3] = [
    ContainerProperty::ContentOffset,
    ContainerProperty::ContentSize,
    ContainerProperty::Frame,
];

#[derive(Debug, Default)]
pub struct Attachment {
    tracked: SmallVec<[ObserverId; 3]>,
    inset: Option<ObserverId>,
}

impl Attachment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset, size, and frame subscriptions are live
    pub fn is_observing(&self) -> bool {
        !self.tracked.is_empty()
    }

    /// Inset subscription is live
    pub fn is_inset_observing(&self) -> bool {
        self.inset.is_some()
    }

    /// All live observer ids
    pub fn observer_ids(&self) -> SmallVec<[ObserverId; 4]> {
        self.tracked.iter().copied().chain(self.inset).collect()
    }

    /// Register the controller's observers
    ///
    /// `with_inset` is false while an inset write is pending; the inset
    /// subscription is then added by [`resume_inset`](Self::resume_inset).
    /// Returns false if already observing.
    pub fn subscribe<C, F>(&mut self, container: &C, make_callback: F, with_inset: bool) -> bool
    where
        C: ScrollContainer + ?Sized,
        F: Fn(ContainerProperty) -> ChangeCallback,
    {
        if self.is_observing() {
            return false;
        }
        for property in TRACKED {
            self.tracked
                .push(container.observe(property, make_callback(property)));
        }
        if with_inset {
            self.resume_inset(container, make_callback);
        }
        true
    }

    /// Remove every registered observer; returns false if none were live
    pub fn unsubscribe<C: ScrollContainer + ?Sized>(&mut self, container: &C) -> bool {
        let was_observing = self.is_observing() || self.is_inset_observing();
        for id in self.tracked.drain(..) {
            container.unobserve(id);
        }
        self.pause_inset(container);
        was_observing
    }

    /// Drop the inset subscription; false if it was not live
    pub fn pause_inset<C: ScrollContainer + ?Sized>(&mut self, container: &C) -> bool {
        match self.inset.take() {
            Some(id) => {
                container.unobserve(id);
                true
            }
            None => false,
        }
    }

    /// Restore the inset subscription; false if it was already live
    pub fn resume_inset<C, F>(&mut self, container: &C, make_callback: F) -> bool
    where
        C: ScrollContainer + ?Sized,
        F: Fn(ContainerProperty) -> ChangeCallback,
    {
        if self.inset.is_some() {
            return false;
        }
        let property = ContainerProperty::ContentInset;
        self.inset = Some(container.observe(property, make_callback(property)));
        true
    }

    /// Forget the ids without unregistering them
    ///
    /// For containers that are already gone.
    pub fn forget(&mut self) {
        self.tracked.clear();
        self.inset = None;
    }
}
