//! Container-side API
//!
//! A container opts in by owning an [`EdgeSlots`] and implementing
//! [`RefreshHost`]. [`RefreshExt`] then provides the per-container
//! operations on `Rc<Container>`: attaching handlers, showing and hiding the
//! affordances, and starting or stopping a load programmatically.
//!
//! Every operation addressed to an edge without a controller is a no-op.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use brink_core::Edge;

use crate::config::RefreshConfig;
use crate::container::ScrollContainer;
use crate::controller::{EdgeController, EdgeHandle};
use crate::indicator::IndicatorAppearance;
use crate::state::EdgeState;

/// At most one controller per edge, owned by the container
pub struct EdgeSlots<C: ScrollContainer> {
    top: RefCell<Option<EdgeHandle<C>>>,
    bottom: RefCell<Option<EdgeHandle<C>>>,
    config: Cell<RefreshConfig>,
}

impl<C: ScrollContainer> EdgeSlots<C> {
    pub fn new() -> Self {
        Self::with_config(RefreshConfig::default())
    }

    pub fn with_config(config: RefreshConfig) -> Self {
        Self {
            top: RefCell::new(None),
            bottom: RefCell::new(None),
            config: Cell::new(config),
        }
    }

    /// Configuration used for controllers created from now on
    pub fn config(&self) -> RefreshConfig {
        self.config.get()
    }

    pub fn set_config(&self, config: RefreshConfig) {
        self.config.set(config);
    }

    fn slot(&self, edge: Edge) -> &RefCell<Option<EdgeHandle<C>>> {
        match edge {
            Edge::Top => &self.top,
            Edge::Bottom => &self.bottom,
        }
    }

    pub fn get(&self, edge: Edge) -> Option<EdgeHandle<C>> {
        self.slot(edge).borrow().clone()
    }

    /// Store a controller, returning the one it replaces
    pub fn insert(&self, edge: Edge, handle: EdgeHandle<C>) -> Option<EdgeHandle<C>> {
        self.slot(edge).borrow_mut().replace(handle)
    }

    pub fn take(&self, edge: Edge) -> Option<EdgeHandle<C>> {
        self.slot(edge).borrow_mut().take()
    }
}

impl<C: ScrollContainer> Default for EdgeSlots<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A container that owns its edge controllers
pub trait RefreshHost: ScrollContainer + Sized {
    fn edge_slots(&self) -> &EdgeSlots<Self>;
}

/// Pull-to-refresh and infinite-scroll operations on a shared container
pub trait RefreshExt {
    type Container: ScrollContainer;

    /// Attach (or replace) the action handler for an edge
    ///
    /// Creates the edge's controller on first use, makes it visible and
    /// starts observing. Later calls only swap the handler and re-read the
    /// origin inset while Idle.
    fn attach_handler<F>(&self, edge: Edge, handler: F) -> EdgeHandle<Self::Container>
    where
        F: Fn() + 'static;

    fn add_pull_to_refresh_handler<F>(&self, handler: F) -> EdgeHandle<Self::Container>
    where
        F: Fn() + 'static,
    {
        self.attach_handler(Edge::Top, handler)
    }

    fn add_infinite_scrolling_handler<F>(&self, handler: F) -> EdgeHandle<Self::Container>
    where
        F: Fn() + 'static,
    {
        self.attach_handler(Edge::Bottom, handler)
    }

    fn edge_controller(&self, edge: Edge) -> Option<EdgeHandle<Self::Container>>;

    fn edge_state(&self, edge: Edge) -> Option<EdgeState> {
        self.edge_controller(edge).map(|c| c.state())
    }

    /// Show or hide an edge's affordance
    fn set_visible(&self, edge: Edge, visible: bool) {
        if let Some(controller) = self.edge_controller(edge) {
            controller.set_visible(visible);
        }
    }

    /// Is the edge's affordance shown?
    fn shows(&self, edge: Edge) -> bool {
        self.edge_controller(edge)
            .map(|c| c.is_visible())
            .unwrap_or(false)
    }

    /// Arm and start loading as if the user had released past the threshold
    fn trigger(&self, edge: Edge) {
        if let Some(controller) = self.edge_controller(edge) {
            controller.trigger();
        }
    }

    fn start_animating(&self, edge: Edge) {
        if let Some(controller) = self.edge_controller(edge) {
            controller.start_animating();
        }
    }

    fn stop_animating(&self, edge: Edge) {
        if let Some(controller) = self.edge_controller(edge) {
            controller.stop_animating();
        }
    }

    fn set_indicator_appearance<A>(&self, edge: Edge, appearance: A)
    where
        A: Into<IndicatorAppearance>,
    {
        if let Some(controller) = self.edge_controller(edge) {
            controller.set_indicator_appearance(appearance.into());
        }
    }

    /// Tear down an edge's controller before the container goes away
    fn detach(&self, edge: Edge);

    /// Run pending layout passes of both edges
    fn layout_edges(&self) {
        for edge in Edge::ALL {
            if let Some(controller) = self.edge_controller(edge) {
                controller.layout_if_needed();
            }
        }
    }
}

impl<H: RefreshHost> RefreshExt for Rc<H> {
    type Container = H;

    fn attach_handler<F>(&self, edge: Edge, handler: F) -> EdgeHandle<H>
    where
        F: Fn() + 'static,
    {
        let slots = self.edge_slots();
        let controller = match slots.get(edge) {
            Some(existing) => existing,
            None => {
                let created = EdgeController::create(edge, self, slots.config().for_edge(edge));
                slots.insert(edge, created.clone());
                created
            }
        };

        controller.set_action_handler(Rc::new(handler));
        controller.set_visible(true);
        controller.capture_origin_inset();
        controller
    }

    fn edge_controller(&self, edge: Edge) -> Option<EdgeHandle<H>> {
        self.edge_slots().get(edge)
    }

    fn detach(&self, edge: Edge) {
        if let Some(controller) = self.edge_slots().take(edge) {
            controller.detach();
            tracing::debug!(%edge, "edge controller detached");
        }
    }
}
