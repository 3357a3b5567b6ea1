//! Edge state machine
//!
//! ```text
//!            drag past threshold              release
//!   Idle ─────────────────────────▶ Armed ─────────────▶ Loading
//!    ▲  ◀─────────────────────────   │                     │
//!    │      back inside threshold    │ start_animating()   │
//!    │                               ▼                     │
//!    │◀──────────────── stop_animating() ◀─────────────────┘
//! ```
//!
//! `start_animating()` may also jump straight from Idle to Loading.
//!
//! The machine is pure: it decides transitions and reports them as a
//! [`Transition`] whose [`effects`](Transition::effects) the controller then
//! applies. Offset samples are ignored while Loading; only an explicit stop
//! leaves that state.

use brink_core::Edge;
use smallvec::{smallvec, SmallVec};

use crate::error::{RefreshError, Result};

/// Interaction state of one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeState {
    /// Nothing in progress; the edge's inset is the original one
    #[default]
    Idle,
    /// Dragged past the threshold; releasing now starts loading
    Armed,
    /// Action running, indicator spinning, inset reserved
    Loading,
}

impl EdgeState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EdgeState::Idle)
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, EdgeState::Armed)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, EdgeState::Loading)
    }

    /// Every move except Loading -> Armed is allowed
    pub fn can_transition_to(&self, to: EdgeState) -> bool {
        !matches!((self, to), (EdgeState::Loading, EdgeState::Armed))
    }
}

/// One offset-change observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetSample {
    pub offset_y: f32,
    pub dragging: bool,
    pub threshold: f32,
}

/// Side effect of a transition, in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Grow the edge's inset to make room for the indicator
    ReserveInset,
    /// Put the edge's inset back to its original value
    RestoreInset,
    /// Indicator needs a layout pass
    InvalidateLayout,
    /// Invoke the action handler
    FireAction,
}

/// A state change that happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: EdgeState,
    pub to: EdgeState,
    /// Whether the loading session entered or ended here was started
    /// through `start_animating`
    pub triggered_by_user: bool,
}

impl Transition {
    /// The action fires only on the Armed -> Loading edge
    pub fn fires_action(&self) -> bool {
        self.from == EdgeState::Armed && self.to == EdgeState::Loading
    }

    pub fn effects(&self) -> SmallVec<[Effect; 3]> {
        let mut effects: SmallVec<[Effect; 3]> = match self.to {
            EdgeState::Loading => smallvec![Effect::ReserveInset],
            EdgeState::Idle => smallvec![Effect::RestoreInset],
            EdgeState::Armed => SmallVec::new(),
        };
        effects.push(Effect::InvalidateLayout);
        if self.fires_action() {
            effects.push(Effect::FireAction);
        }
        effects
    }
}

/// Transition rules for one edge
#[derive(Debug, Clone)]
pub struct EdgeStateMachine {
    edge: Edge,
    state: EdgeState,
    triggered_by_user: bool,
}

impl EdgeStateMachine {
    pub fn new(edge: Edge) -> Self {
        Self {
            edge,
            state: EdgeState::Idle,
            triggered_by_user: false,
        }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn state(&self) -> EdgeState {
        self.state
    }

    /// Did the current loading session start through `start_animating`?
    pub fn triggered_by_user(&self) -> bool {
        self.triggered_by_user
    }

    /// Move to `to` as one step
    ///
    /// Returns `Ok(None)` when already in `to`, and an error for moves the
    /// machine does not allow.
    pub fn transition(&mut self, to: EdgeState) -> Result<Option<Transition>> {
        let from = self.state;
        if from == to {
            return Ok(None);
        }
        if !from.can_transition_to(to) {
            return Err(RefreshError::InvalidTransition {
                edge: self.edge,
                from,
                to,
            });
        }

        let transition = Transition {
            from,
            to,
            triggered_by_user: self.triggered_by_user,
        };
        self.state = to;
        if to == EdgeState::Idle {
            self.triggered_by_user = false;
        }

        tracing::debug!(edge = %self.edge, ?from, ?to, "edge transition");
        Ok(Some(transition))
    }

    /// Classify an offset sample
    pub fn on_sample(&mut self, sample: OffsetSample) -> Option<Transition> {
        if self.state == EdgeState::Loading {
            return None;
        }

        let target = if !sample.dragging && self.state == EdgeState::Armed {
            // Released past the threshold
            self.triggered_by_user = false;
            EdgeState::Loading
        } else if sample.dragging
            && self.state == EdgeState::Idle
            && self.edge.is_past(sample.offset_y, sample.threshold)
        {
            EdgeState::Armed
        } else if self.state != EdgeState::Idle
            && self.edge.has_returned(sample.offset_y, sample.threshold)
        {
            // Older releases compared the state here instead of assigning
            // it, so an armed edge dragged back never disarmed.
            EdgeState::Idle
        } else {
            return None;
        };

        // Sample-driven moves never leave Loading, so they are always valid
        self.transition(target).ok().flatten()
    }

    /// Programmatic arm, used by `trigger`
    pub fn arm(&mut self) -> Result<Option<Transition>> {
        self.transition(EdgeState::Armed)
    }

    /// Enter Loading without a drag
    pub fn start(&mut self) -> Option<Transition> {
        if self.state == EdgeState::Loading {
            return None;
        }
        self.triggered_by_user = true;
        self.transition(EdgeState::Loading).ok().flatten()
    }

    /// Return to Idle from any state
    pub fn stop(&mut self) -> Option<Transition> {
        self.transition(EdgeState::Idle).ok().flatten()
    }
}
