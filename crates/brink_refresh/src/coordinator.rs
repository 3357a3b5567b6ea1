//! Inset coordinator
//!
//! Writes one edge's content inset as an animated transition. Only the
//! controlled edge is touched: each frame re-reads the container's inset and
//! replaces that single side, so the opposite edge's controller can animate
//! concurrently without either overwriting the other.
//!
//! A new write supersedes the one in flight, starting from wherever the
//! inset currently is. Every write is tracked as pending until its own
//! completion arrives (finished or superseded); the controller keeps its
//! inset observation paused while anything is pending, so its own writes are
//! never mistaken for external inset changes.

use std::cell::Cell;
use std::rc::Rc;

use brink_animation::{Easing, TransitionId, Tween};
use brink_core::Edge;
use rustc_hash::FxHashSet;

use crate::container::ScrollContainer;

#[derive(Debug)]
pub struct InsetCoordinator {
    edge: Edge,
    duration: f32,
    easing: Easing,
    in_flight: Option<TransitionId>,
    pending: FxHashSet<TransitionId>,
}

/// How a write was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsetWrite {
    /// Running on the container's scheduler; completion will follow
    Animated(TransitionId),
    /// The scheduler is gone; the caller writes the target with
    /// [`write_edge_inset`]
    Immediate,
}

/// Replace one side of the container's inset
pub fn write_edge_inset<C: ScrollContainer + ?Sized>(container: &C, edge: Edge, value: f32) {
    let inset = container.content_inset().with_edge(edge, value);
    container.set_content_inset(inset);
}

impl InsetCoordinator {
    pub fn new(edge: Edge, duration: f32, easing: Easing) -> Self {
        Self {
            edge,
            duration,
            easing,
            in_flight: None,
            pending: FxHashSet::default(),
        }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Transition that will land last, if any
    pub fn in_flight(&self) -> Option<TransitionId> {
        self.in_flight
    }

    /// Are any of this coordinator's writes still awaiting completion?
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Animate the edge's inset to `target`
    ///
    /// `on_complete` runs exactly once for the returned transition, from a
    /// later scheduler tick. If the scheduler has been dropped nothing is
    /// written, [`InsetWrite::Immediate`] is returned and `on_complete` is
    /// never called.
    pub fn animate<C, F>(&mut self, container: &Rc<C>, target: f32, on_complete: F) -> InsetWrite
    where
        C: ScrollContainer,
        F: FnOnce(TransitionId, bool) + 'static,
    {
        let scheduler = container.scheduler();
        if let Some(previous) = self.in_flight.take() {
            // Still pending until its own completion is delivered
            scheduler.cancel(previous);
        }

        let edge = self.edge;
        let from = container.content_inset().edge(edge);
        let tween = Tween::new(from, target, self.duration, self.easing);

        let weak = Rc::downgrade(container);
        let started: Rc<Cell<Option<TransitionId>>> = Rc::new(Cell::new(None));
        let started_id = Rc::clone(&started);

        let id = scheduler.start(
            tween,
            move |value| {
                if let Some(container) = weak.upgrade() {
                    write_edge_inset(&*container, edge, value);
                }
            },
            move |finished| {
                if let Some(id) = started_id.get() {
                    on_complete(id, finished);
                }
            },
        );

        match id {
            Some(id) => {
                started.set(Some(id));
                self.pending.insert(id);
                self.in_flight = Some(id);
                tracing::trace!(%edge, from, target, ?id, "inset transition");
                InsetWrite::Animated(id)
            }
            None => {
                tracing::trace!(%edge, target, "no scheduler for inset transition");
                InsetWrite::Immediate
            }
        }
    }

    /// Record a completion; false for ids that are not pending
    pub fn complete(&mut self, id: TransitionId) -> bool {
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
        self.pending.remove(&id)
    }

    /// Forget every pending write
    ///
    /// Used when the controller detaches; late completions are then ignored.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.pending.clear();
    }
}
