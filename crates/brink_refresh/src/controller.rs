//! Edge controller
//!
//! One controller watches one edge of one container. It turns the
//! container's change notifications into state-machine samples, applies the
//! resulting transition effects (inset reservation, layout invalidation, the
//! action callback), and owns the affordance's frame and indicator.
//!
//! Controllers live behind [`EdgeHandle`], a cheap `Rc` handle. Every
//! operation borrows the controller only for the state update itself; the
//! action callback and auto-scroll writes run after the borrow is released,
//! so a handler may call straight back into the controller (for example to
//! stop a load that finished synchronously).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use brink_animation::TransitionId;
use brink_core::{ChangeCallback, ContainerChange, ContainerProperty, Edge, Point, Rect, SubviewId};

use crate::attachment::Attachment;
use crate::config::EdgeConfig;
use crate::container::ScrollContainer;
use crate::coordinator::{write_edge_inset, InsetCoordinator, InsetWrite};
use crate::error::{RefreshError, Result};
use crate::indicator::{ActivityIndicator, IndicatorAppearance};
use crate::state::{Effect, EdgeState, EdgeStateMachine, OffsetSample, Transition};
use crate::threshold::{threshold, EdgeGeometry};

/// Callback fired when an edge starts loading after being armed
pub type ActionHandler = Rc<dyn Fn()>;

pub struct EdgeController<C: ScrollContainer> {
    edge: Edge,
    config: EdgeConfig,
    machine: EdgeStateMachine,
    container: Weak<C>,
    this: Weak<RefCell<EdgeController<C>>>,
    /// Container inset on this edge before any reservation
    origin_inset: f32,
    /// Inset value written for this edge while Loading, 0 otherwise
    reserved_inset: f32,
    /// Affordance frame in content coordinates
    frame: Rect,
    subview: Option<SubviewId>,
    indicator: ActivityIndicator,
    hidden: bool,
    needs_layout: bool,
    attachment: Attachment,
    coordinator: InsetCoordinator,
    action_handler: Option<ActionHandler>,
}

/// Inset write that could not be animated, along with the controller whose
/// inset observation resumes after it
struct ImmediateInset<C: ScrollContainer> {
    handle: EdgeHandle<C>,
    container: Rc<C>,
    target: f32,
}

/// Callouts that run once the controller borrow is released
#[must_use]
struct Deferred<C: ScrollContainer> {
    inset: Option<ImmediateInset<C>>,
    scroll: Option<(Rc<C>, Point)>,
    action: Option<ActionHandler>,
}

impl<C: ScrollContainer> Deferred<C> {
    fn none() -> Self {
        Self {
            inset: None,
            scroll: None,
            action: None,
        }
    }

    /// Combine with callouts produced later in the same update
    fn then(self, later: Deferred<C>) -> Self {
        Self {
            inset: later.inset.or(self.inset),
            scroll: later.scroll.or(self.scroll),
            action: later.action.or(self.action),
        }
    }

    fn run(self) {
        if let Some(write) = self.inset {
            write_edge_inset(&*write.container, write.handle.edge, write.target);
            write.handle.resume_inset_observation();
        }
        if let Some((container, offset)) = self.scroll {
            container.set_content_offset(offset, true);
        }
        if let Some(action) = self.action {
            action();
        }
    }
}

/// Where the affordance rests when it is not in use
fn parked_frame<C: ScrollContainer + ?Sized>(edge: Edge, container: &C, height: f32) -> Rect {
    let width = container.bounds().width();
    match edge {
        Edge::Top => Rect::new(0.0, -height, width, height),
        Edge::Bottom => Rect::new(0.0, container.content_size().height, width, height),
    }
}

impl<C: ScrollContainer> EdgeController<C> {
    /// Create a controller and attach its affordance to the container
    ///
    /// The controller starts hidden and unobserved; call
    /// [`EdgeHandle::set_visible`] to start following the container.
    pub fn create(edge: Edge, container: &Rc<C>, config: EdgeConfig) -> EdgeHandle<C> {
        let frame = parked_frame(edge, &**container, config.indicator_height);
        let subview = container.add_subview(frame);
        container.set_subview_hidden(subview, true);
        let origin_inset = container.content_inset().edge(edge);

        let inner = Rc::new_cyclic(|this| {
            RefCell::new(EdgeController {
                edge,
                config,
                machine: EdgeStateMachine::new(edge),
                container: Rc::downgrade(container),
                this: this.clone(),
                origin_inset,
                reserved_inset: 0.0,
                frame,
                subview: Some(subview),
                // The pull-to-refresh spinner stays drawn above the content;
                // the load-more one only shows while in use.
                indicator: ActivityIndicator::new(edge == Edge::Bottom),
                hidden: true,
                needs_layout: true,
                attachment: Attachment::new(),
                coordinator: InsetCoordinator::new(edge, config.inset_duration, config.easing),
                action_handler: None,
            })
        });

        tracing::debug!(%edge, origin_inset, "edge controller created");
        EdgeHandle { edge, inner }
    }

    fn container(&self) -> Result<Rc<C>> {
        self.container
            .upgrade()
            .ok_or(RefreshError::ContainerDetached(self.edge))
    }

    fn observer_callback(&self) -> impl Fn(ContainerProperty) -> ChangeCallback {
        let this = self.this.clone();
        let edge = self.edge;
        move |_property| {
            let this = this.clone();
            let callback: ChangeCallback = Rc::new(move |change: &ContainerChange| {
                if let Some(inner) = this.upgrade() {
                    EdgeHandle { edge, inner }.handle_change(change);
                }
            });
            callback
        }
    }

    fn set_visible(&mut self, visible: bool) -> Result<Deferred<C>> {
        let container = self.container()?;
        self.hidden = !visible;
        if let Some(id) = self.subview {
            container.set_subview_hidden(id, self.hidden);
        }

        if visible {
            if !self.attachment.is_observing() {
                let make_callback = self.observer_callback();
                let with_inset = !self.coordinator.has_pending();
                self.attachment
                    .subscribe(&*container, make_callback, with_inset);
                tracing::debug!(edge = %self.edge, "observing container");
            }
        } else {
            if self.attachment.unsubscribe(&*container) {
                tracing::debug!(edge = %self.edge, "stopped observing container");
            }
        }

        self.frame = parked_frame(self.edge, &*container, self.config.indicator_height);
        self.needs_layout = true;
        Ok(Deferred::none())
    }

    fn capture_origin_inset(&mut self) -> Result<Deferred<C>> {
        let container = self.container()?;
        // Mid-transition values are not an origin
        if self.machine.state().is_idle() && !self.coordinator.has_pending() {
            self.origin_inset = container.content_inset().edge(self.edge);
        }
        Ok(Deferred::none())
    }

    fn trigger(&mut self) -> Result<Deferred<C>> {
        let container = self.container()?;
        let armed = match self.machine.arm()? {
            Some(transition) => self.apply(transition, container.content_offset().y, &container),
            None => Deferred::none(),
        };
        Ok(armed.then(self.start_animating()?))
    }

    fn start_animating(&mut self) -> Result<Deferred<C>> {
        let container = self.container()?;
        let Some(transition) = self.machine.start() else {
            return Ok(Deferred::none());
        };

        let current = container.content_offset();
        let scroll_target = match self.edge {
            Edge::Top => Some(current.with_y(-(self.origin_inset + self.config.indicator_height))),
            Edge::Bottom => None,
        };
        // Reserve for where the content is headed, not where it starts
        let offset_y = scroll_target.map_or(current.y, |target| target.y);

        let mut deferred = self.apply(transition, offset_y, &container);
        deferred.scroll = scroll_target.map(|target| (container, target));
        Ok(deferred)
    }

    fn stop_animating(&mut self) -> Result<Deferred<C>> {
        let container = self.container()?;
        let Some(transition) = self.machine.stop() else {
            return Ok(Deferred::none());
        };

        let current = container.content_offset();
        let mut deferred = self.apply(transition, current.y, &container);
        if self.edge == Edge::Top && transition.triggered_by_user {
            deferred.scroll = Some((container, current.with_y(-self.origin_inset)));
        }
        Ok(deferred)
    }

    /// Apply a transition's effects in order
    fn apply(&mut self, transition: Transition, offset_y: f32, container: &Rc<C>) -> Deferred<C> {
        let mut deferred = Deferred::none();
        for effect in transition.effects() {
            match effect {
                Effect::ReserveInset => {
                    let target = self.loading_inset(offset_y);
                    self.reserved_inset = target;
                    deferred.inset = self.write_inset(container, target);
                }
                Effect::RestoreInset => {
                    self.reserved_inset = 0.0;
                    deferred.inset = self.write_inset(container, self.origin_inset);
                }
                Effect::InvalidateLayout => self.needs_layout = true,
                Effect::FireAction => deferred.action = self.action_handler.clone(),
            }
        }
        deferred
    }

    /// Inset to hold while Loading
    ///
    /// The top edge reserves what the user has actually pulled into view,
    /// capped at the original inset plus the indicator height.
    fn loading_inset(&self, offset_y: f32) -> f32 {
        let full = self.origin_inset + self.config.indicator_height;
        match self.edge {
            Edge::Top => (-offset_y).max(0.0).min(full),
            Edge::Bottom => full,
        }
    }

    /// Start an inset transition
    ///
    /// Without a scheduler the write is handed back to run once the borrow
    /// is released.
    fn write_inset(&mut self, container: &Rc<C>, target: f32) -> Option<ImmediateInset<C>> {
        self.attachment.pause_inset(&**container);

        let this = self.this.clone();
        let edge = self.edge;
        let write = self
            .coordinator
            .animate(container, target, move |id, finished| {
                if let Some(inner) = this.upgrade() {
                    EdgeHandle { edge, inner }.finish_inset_write(id, finished);
                }
            });

        match write {
            InsetWrite::Animated(_) => None,
            InsetWrite::Immediate => self.this.upgrade().map(|inner| ImmediateInset {
                handle: EdgeHandle { edge, inner },
                container: Rc::clone(container),
                target,
            }),
        }
    }

    fn finish_inset_write(&mut self, id: TransitionId, finished: bool) -> Result<Deferred<C>> {
        if !self.coordinator.complete(id) {
            return Ok(Deferred::none());
        }
        tracing::trace!(edge = %self.edge, ?id, finished, "inset write settled");
        self.resume_inset()
    }

    fn resume_inset(&mut self) -> Result<Deferred<C>> {
        let container = self.container()?;
        self.resume_inset_if_settled(&*container);
        Ok(Deferred::none())
    }

    fn resume_inset_if_settled(&mut self, container: &C) {
        if self.coordinator.has_pending() || self.hidden || !self.attachment.is_observing() {
            return;
        }
        let make_callback = self.observer_callback();
        self.attachment.resume_inset(container, make_callback);
    }

    fn handle_change(&mut self, change: &ContainerChange) -> Result<Deferred<C>> {
        match *change {
            ContainerChange::ContentOffset(offset) => return self.scroll_view_did_scroll(offset),
            ContainerChange::ContentSize(size) => {
                if self.edge == Edge::Bottom {
                    self.frame.origin.y = size.height;
                }
                self.needs_layout = true;
            }
            ContainerChange::Frame(frame) => {
                self.frame.size.width = frame.width();
                self.needs_layout = true;
            }
            ContainerChange::ContentInset(inset) => {
                // While Loading the edge's inset belongs to the coordinator
                if !self.machine.state().is_loading() {
                    self.origin_inset = inset.edge(self.edge);
                }
            }
        }
        Ok(Deferred::none())
    }

    fn scroll_view_did_scroll(&mut self, offset: Point) -> Result<Deferred<C>> {
        let container = self.container()?;
        if self.machine.state().is_loading() {
            return Ok(Deferred::none());
        }

        let geometry = EdgeGeometry::sample(
            &*container,
            self.origin_inset,
            self.frame.y(),
            self.config.slack,
        );
        let dragging = container.is_dragging();

        if self.edge == Edge::Bottom {
            let hides = !(dragging && geometry.overflows());
            if self.indicator.hides_when_stopped() != hides {
                self.indicator.set_hides_when_stopped(hides);
                self.needs_layout = true;
            }
        }

        let sample = OffsetSample {
            offset_y: offset.y,
            dragging,
            threshold: threshold(self.edge, &geometry),
        };
        tracing::trace!(edge = %self.edge, ?sample, state = ?self.machine.state(), "offset sample");

        Ok(match self.machine.on_sample(sample) {
            Some(transition) => self.apply(transition, offset.y, &container),
            None => Deferred::none(),
        })
    }

    fn layout_subviews(&mut self) -> Result<Deferred<C>> {
        if !self.needs_layout {
            return Ok(Deferred::none());
        }
        let container = self.container()?;
        self.needs_layout = false;

        self.indicator.set_center(self.frame.bounds().center());
        match self.machine.state() {
            EdgeState::Idle => self.indicator.stop_animating(),
            EdgeState::Loading => self.indicator.start_animating(),
            EdgeState::Armed => {}
        }
        if let Some(id) = self.subview {
            container.set_subview_frame(id, self.frame);
            container.set_subview_hidden(id, self.hidden);
        }
        Ok(Deferred::none())
    }

    /// Release everything held on the container
    fn teardown(&mut self) {
        match self.container.upgrade() {
            Some(container) => {
                if self.attachment.unsubscribe(&*container) {
                    tracing::debug!(edge = %self.edge, "stopped observing before detach");
                }
                if let Some(id) = self.subview.take() {
                    container.remove_subview(id);
                }
            }
            None => self.attachment.forget(),
        }
        self.subview = None;
        self.coordinator.reset();
        self.container = Weak::new();
        self.hidden = true;
    }
}

impl<C: ScrollContainer> Drop for EdgeController<C> {
    fn drop(&mut self) {
        if self.container.strong_count() > 0 {
            self.teardown();
        }
    }
}

/// Shared handle to an edge controller
pub struct EdgeHandle<C: ScrollContainer> {
    edge: Edge,
    inner: Rc<RefCell<EdgeController<C>>>,
}

impl<C: ScrollContainer> Clone for EdgeHandle<C> {
    fn clone(&self) -> Self {
        Self {
            edge: self.edge,
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C: ScrollContainer> EdgeHandle<C> {
    /// Borrow, update, release, then run the deferred callouts
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut EdgeController<C>) -> Result<Deferred<C>>,
    {
        let deferred = {
            let mut controller = self
                .inner
                .try_borrow_mut()
                .map_err(|_| RefreshError::Busy(self.edge))?;
            f(&mut *controller)?
        };
        deferred.run();
        Ok(())
    }

    fn run<F>(&self, operation: &'static str, f: F)
    where
        F: FnOnce(&mut EdgeController<C>) -> Result<Deferred<C>>,
    {
        match self.update(f) {
            Ok(()) => {}
            Err(err @ RefreshError::InvalidTransition { .. }) => {
                tracing::warn!(edge = %self.edge, operation, %err, "transition rejected");
            }
            Err(err) => {
                tracing::debug!(edge = %self.edge, operation, %err, "edge operation skipped");
            }
        }
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub fn state(&self) -> EdgeState {
        self.inner.borrow().machine.state()
    }

    pub fn origin_inset(&self) -> f32 {
        self.inner.borrow().origin_inset
    }

    /// Inset value reserved for this edge while Loading, 0 otherwise
    pub fn reserved_inset(&self) -> f32 {
        self.inner.borrow().reserved_inset
    }

    pub fn indicator_height(&self) -> f32 {
        self.inner.borrow().config.indicator_height
    }

    pub fn config(&self) -> EdgeConfig {
        self.inner.borrow().config
    }

    pub fn triggered_by_user(&self) -> bool {
        self.inner.borrow().machine.triggered_by_user()
    }

    pub fn is_observing(&self) -> bool {
        self.inner.borrow().attachment.is_observing()
    }

    pub fn is_inset_observing(&self) -> bool {
        self.inner.borrow().attachment.is_inset_observing()
    }

    /// Is an inset transition of this controller still awaiting completion?
    pub fn has_pending_inset_write(&self) -> bool {
        self.inner.borrow().coordinator.has_pending()
    }

    pub fn is_visible(&self) -> bool {
        !self.inner.borrow().hidden
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().container.strong_count() > 0
    }

    pub fn frame(&self) -> Rect {
        self.inner.borrow().frame
    }

    pub fn subview(&self) -> Option<SubviewId> {
        self.inner.borrow().subview
    }

    pub fn indicator(&self) -> ActivityIndicator {
        self.inner.borrow().indicator.clone()
    }

    pub fn needs_layout(&self) -> bool {
        self.inner.borrow().needs_layout
    }

    /// Replace the action callback
    pub fn set_action_handler(&self, handler: ActionHandler) {
        self.run("set_action_handler", |c| {
            c.action_handler = Some(handler);
            Ok(Deferred::none())
        });
    }

    /// Show or hide the affordance, subscribing or unsubscribing accordingly
    pub fn set_visible(&self, visible: bool) {
        self.run("set_visible", |c| c.set_visible(visible));
    }

    /// Re-read the origin inset from the container (only while Idle)
    pub fn capture_origin_inset(&self) {
        self.run("capture_origin_inset", |c| c.capture_origin_inset());
    }

    /// Arm, then start loading; fires the action handler
    pub fn trigger(&self) {
        self.run("trigger", |c| c.trigger());
    }

    /// Enter Loading directly
    ///
    /// Does not fire the action handler unless the edge was Armed. The top
    /// edge also scrolls the affordance fully into view.
    pub fn start_animating(&self) {
        self.run("start_animating", |c| c.start_animating());
    }

    /// Return to Idle and restore the edge's original inset
    ///
    /// The top edge scrolls back if loading was started programmatically.
    /// A no-op while Idle.
    pub fn stop_animating(&self) {
        self.run("stop_animating", |c| c.stop_animating());
    }

    pub fn set_indicator_appearance(&self, appearance: IndicatorAppearance) {
        self.run("set_indicator_appearance", |c| {
            c.indicator.apply(appearance);
            Ok(Deferred::none())
        });
    }

    /// Run a pending layout pass
    pub fn layout_if_needed(&self) {
        self.run("layout", |c| c.layout_subviews());
    }

    /// Pre-teardown hook
    ///
    /// Removes every subscription and the affordance's subview, then drops
    /// the container reference. Later operations are no-ops.
    pub fn detach(&self) {
        self.run("detach", |c| {
            c.teardown();
            Ok(Deferred::none())
        });
    }

    fn handle_change(&self, change: &ContainerChange) {
        if let Err(err) = self.update(|c| c.handle_change(change)) {
            tracing::trace!(edge = %self.edge, ?change, %err, "change not handled");
        }
    }

    fn resume_inset_observation(&self) {
        self.run("resume_inset", |c| c.resume_inset());
    }

    fn finish_inset_write(&self, id: TransitionId, finished: bool) {
        self.run("finish_inset_write", |c| c.finish_inset_write(id, finished));
    }
}

impl<C: ScrollContainer> std::fmt::Debug for EdgeHandle<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_borrow() {
            Ok(c) => f
                .debug_struct("EdgeHandle")
                .field("edge", &self.edge)
                .field("state", &c.machine.state())
                .field("origin_inset", &c.origin_inset)
                .field("reserved_inset", &c.reserved_inset)
                .field("hidden", &c.hidden)
                .finish(),
            Err(_) => f
                .debug_struct("EdgeHandle")
                .field("edge", &self.edge)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use brink_animation::{AnimationScheduler, SchedulerHandle};
    use brink_core::{EdgeInsets, Size};

    use crate::host::RefreshExt;
    use crate::scroll_view::ScrollView;

    const DT: f32 = 1.0 / 60.0;

    fn view(scheduler: &AnimationScheduler, viewport: f32, content: f32) -> Rc<ScrollView> {
        let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, viewport), scheduler.handle());
        view.set_content_size(Size::new(320.0, content));
        view
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || c.set(c.get() + 1))
    }

    fn finish(scheduler: &AnimationScheduler) {
        scheduler.run_until_idle(DT, 240);
    }

    #[test]
    fn test_bottom_drag_release_loads() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 800.0, 1200.0);
        let (fired, handler) = counter();
        let bottom = view.add_infinite_scrolling_handler(handler);

        view.begin_drag();
        view.drag_to(430.0);
        assert_eq!(bottom.state(), EdgeState::Idle);
        view.drag_to(450.0);
        assert_eq!(bottom.state(), EdgeState::Armed);

        view.end_drag();
        assert_eq!(bottom.state(), EdgeState::Loading);
        assert_eq!(fired.get(), 1);
        assert_eq!(bottom.reserved_inset(), 60.0);
        assert!(!bottom.triggered_by_user());

        finish(&scheduler);
        assert_eq!(view.content_inset().bottom, 60.0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_top_drag_release_reserves_clamped_inset() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let (fired, handler) = counter();
        let top = view.add_pull_to_refresh_handler(handler);
        assert_eq!(top.frame().y(), -60.0);

        view.begin_drag();
        view.drag_to(-70.0);
        assert_eq!(top.state(), EdgeState::Armed);
        view.end_drag();

        assert_eq!(top.state(), EdgeState::Loading);
        assert_eq!(fired.get(), 1);
        assert_eq!(top.reserved_inset(), 60.0);

        finish(&scheduler);
        assert_eq!(view.content_inset().top, 60.0);
    }

    #[test]
    fn test_deep_pull_reservation_is_capped() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});

        view.begin_drag();
        view.drag_to(-240.0);
        view.end_drag();

        assert_eq!(top.state(), EdgeState::Loading);
        assert_eq!(top.reserved_inset(), 60.0);
    }

    #[test]
    fn test_loading_round_trip_restores_origin_inset() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        view.set_content_inset(EdgeInsets::new(20.0, 0.0, 10.0, 0.0));
        let top = view.add_pull_to_refresh_handler(|| {});
        assert_eq!(top.origin_inset(), 20.0);

        view.begin_drag();
        view.drag_to(-100.0);
        view.end_drag();
        assert_eq!(top.reserved_inset(), 80.0);

        // Let the reservation run part way, then stop mid-flight
        scheduler.tick(0.1);
        view.stop_animating(Edge::Top);
        finish(&scheduler);

        assert_eq!(top.state(), EdgeState::Idle);
        assert_eq!(top.reserved_inset(), 0.0);
        assert_eq!(view.content_inset(), EdgeInsets::new(20.0, 0.0, 10.0, 0.0));
    }

    #[test]
    fn test_dragging_back_disarms() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let (fired, handler) = counter();
        let top = view.add_pull_to_refresh_handler(handler);

        view.begin_drag();
        view.drag_to(-70.0);
        assert_eq!(top.state(), EdgeState::Armed);

        view.drag_to(-30.0);
        assert_eq!(top.state(), EdgeState::Idle);

        view.end_drag();
        assert_eq!(top.state(), EdgeState::Idle);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_offset_writes_without_drag_never_arm() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});
        let bottom = view.add_infinite_scrolling_handler(|| {});

        view.set_content_offset(Point::new(0.0, -200.0), false);
        view.set_content_offset(Point::new(0.0, 900.0), false);

        assert_eq!(top.state(), EdgeState::Idle);
        assert_eq!(bottom.state(), EdgeState::Idle);
    }

    #[test]
    fn test_trigger_loads_without_drag() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let (fired, handler) = counter();
        let top = view.add_pull_to_refresh_handler(handler);

        view.trigger(Edge::Top);
        assert_eq!(top.state(), EdgeState::Loading);
        assert_eq!(fired.get(), 1);
        assert!(top.triggered_by_user());

        finish(&scheduler);
        assert_eq!(view.content_offset().y, -60.0);
        assert_eq!(view.content_inset().top, 60.0);

        view.stop_animating(Edge::Top);
        finish(&scheduler);
        assert_eq!(top.state(), EdgeState::Idle);
        assert!(!top.triggered_by_user());
        assert_eq!(view.content_offset().y, 0.0);
        assert_eq!(view.content_inset().top, 0.0);
    }

    #[test]
    fn test_trigger_while_loading_is_ignored() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let (fired, handler) = counter();
        view.add_infinite_scrolling_handler(handler);

        view.trigger(Edge::Bottom);
        view.trigger(Edge::Bottom);
        assert_eq!(fired.get(), 1);
        assert_eq!(view.edge_state(Edge::Bottom), Some(EdgeState::Loading));
    }

    #[test]
    fn test_start_animating_from_idle_skips_handler() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let (fired, handler) = counter();
        let bottom = view.add_infinite_scrolling_handler(handler);

        view.start_animating(Edge::Bottom);
        assert_eq!(bottom.state(), EdgeState::Loading);
        assert_eq!(fired.get(), 0);

        // Bottom edge never auto-scrolls
        finish(&scheduler);
        assert_eq!(view.content_offset().y, 0.0);
        assert_eq!(view.content_inset().bottom, 60.0);
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});

        view.stop_animating(Edge::Top);
        assert!(!top.has_pending_inset_write());
        assert!(!scheduler.has_pending_work());
        assert!(top.is_inset_observing());
    }

    #[test]
    fn test_set_visible_is_idempotent() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});
        assert_eq!(view.observer_count(), 4);

        view.set_visible(Edge::Top, true);
        assert_eq!(view.observer_count(), 4);
        assert!(view.shows(Edge::Top));

        view.set_visible(Edge::Top, false);
        view.set_visible(Edge::Top, false);
        assert_eq!(view.observer_count(), 0);
        assert!(!top.is_observing());
        assert!(!view.shows(Edge::Top));
        assert!(!view.shows(Edge::Bottom));
    }

    #[test]
    fn test_hiding_parks_the_affordance() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let bottom = view.add_infinite_scrolling_handler(|| {});
        assert_eq!(bottom.frame().y(), 1000.0);

        view.set_content_size(Size::new(320.0, 1400.0));
        assert_eq!(bottom.frame().y(), 1400.0);

        view.set_visible(Edge::Bottom, false);
        view.set_content_size(Size::new(320.0, 1800.0));
        // Not observing any more, parked where the content ended
        assert_eq!(bottom.frame().y(), 1400.0);

        view.layout_edges();
        let subview = bottom.subview().and_then(|id| view.subview(id)).unwrap();
        assert!(subview.hidden);
        assert_eq!(subview.frame.y(), 1400.0);
    }

    #[test]
    fn test_handler_may_stop_synchronously() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 800.0, 1200.0);
        let (fired, count) = counter();

        let weak = Rc::downgrade(&view);
        let bottom = view.add_infinite_scrolling_handler(move || {
            count();
            if let Some(view) = weak.upgrade() {
                view.stop_animating(Edge::Bottom);
            }
        });

        view.begin_drag();
        view.drag_to(450.0);
        view.end_drag();

        assert_eq!(fired.get(), 1);
        assert_eq!(bottom.state(), EdgeState::Idle);

        finish(&scheduler);
        assert_eq!(view.content_inset().bottom, 0.0);
        assert!(!bottom.has_pending_inset_write());
        assert!(bottom.is_inset_observing());
    }

    #[test]
    fn test_superseded_inset_writes_resume_observation() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let bottom = view.add_infinite_scrolling_handler(|| {});

        view.start_animating(Edge::Bottom);
        assert!(!bottom.is_inset_observing());
        scheduler.tick(DT);

        view.stop_animating(Edge::Bottom);
        view.start_animating(Edge::Bottom);
        assert!(bottom.has_pending_inset_write());

        // The superseded completions land first; the latest write is still running
        scheduler.tick(DT);
        assert!(bottom.has_pending_inset_write());
        assert!(!bottom.is_inset_observing());

        finish(&scheduler);
        assert!(!bottom.has_pending_inset_write());
        assert!(bottom.is_inset_observing());
        assert_eq!(view.content_inset().bottom, 60.0);
        assert_eq!(bottom.origin_inset(), 0.0);
    }

    #[test]
    fn test_hidden_controller_stays_unobserved() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});

        view.start_animating(Edge::Top);
        view.set_visible(Edge::Top, false);
        finish(&scheduler);

        assert!(!top.is_inset_observing());
        assert_eq!(view.observer_count(), 0);

        view.set_visible(Edge::Top, true);
        assert!(top.is_inset_observing());
        assert_eq!(view.observer_count(), 4);
    }

    #[test]
    fn test_external_inset_change_updates_origin() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});
        let bottom = view.add_infinite_scrolling_handler(|| {});

        view.set_content_inset(EdgeInsets::new(64.0, 0.0, 34.0, 0.0));
        assert_eq!(top.origin_inset(), 64.0);
        assert_eq!(bottom.origin_inset(), 34.0);

        // While Loading the reservation is not an origin
        view.start_animating(Edge::Bottom);
        finish(&scheduler);
        assert_eq!(view.content_inset().bottom, 94.0);
        assert_eq!(bottom.origin_inset(), 34.0);
        assert_eq!(top.origin_inset(), 64.0);
    }

    #[test]
    fn test_edges_animate_insets_independently() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        view.add_pull_to_refresh_handler(|| {});
        view.add_infinite_scrolling_handler(|| {});

        view.trigger(Edge::Top);
        view.trigger(Edge::Bottom);
        finish(&scheduler);
        assert_eq!(view.content_inset().top, 60.0);
        assert_eq!(view.content_inset().bottom, 60.0);

        view.stop_animating(Edge::Bottom);
        finish(&scheduler);
        assert_eq!(view.content_inset().top, 60.0);
        assert_eq!(view.content_inset().bottom, 0.0);
    }

    #[test]
    fn test_writes_are_immediate_without_scheduler() {
        let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, 480.0), SchedulerHandle::detached());
        view.set_content_size(Size::new(320.0, 1000.0));
        let top = view.add_pull_to_refresh_handler(|| {});

        view.trigger(Edge::Top);
        assert_eq!(view.content_inset().top, 60.0);
        assert_eq!(view.content_offset().y, -60.0);
        assert!(!top.has_pending_inset_write());
        assert!(top.is_inset_observing());

        view.stop_animating(Edge::Top);
        assert_eq!(view.content_inset().top, 0.0);
        assert_eq!(view.content_offset().y, 0.0);
    }

    #[test]
    fn test_short_content_uses_top_based_bottom_threshold() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 800.0, 300.0);
        let bottom = view.add_infinite_scrolling_handler(|| {});

        view.begin_drag();
        view.drag_to(35.0);
        assert_eq!(bottom.state(), EdgeState::Idle);
        view.drag_to(45.0);
        assert_eq!(bottom.state(), EdgeState::Armed);
        // Nothing to scroll, so the spinner stays hidden while stopped
        assert!(bottom.indicator().hides_when_stopped());
    }

    #[test]
    fn test_bottom_indicator_shows_while_dragging() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let bottom = view.add_infinite_scrolling_handler(|| {});
        assert!(!bottom.indicator().is_visible());

        view.begin_drag();
        view.drag_to(100.0);
        assert!(!bottom.indicator().hides_when_stopped());
        assert!(bottom.indicator().is_visible());

        view.end_drag();
        assert!(bottom.indicator().hides_when_stopped());
    }

    #[test]
    fn test_layout_follows_state() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});

        view.layout_edges();
        assert!(!top.needs_layout());
        let subview = top.subview().and_then(|id| view.subview(id)).unwrap();
        assert!(!subview.hidden);
        assert_eq!(subview.frame, Rect::new(0.0, -60.0, 320.0, 60.0));
        assert_eq!(top.indicator().center(), Point::new(160.0, 30.0));

        view.trigger(Edge::Top);
        assert!(top.needs_layout());
        view.layout_edges();
        assert!(top.indicator().is_animating());

        view.stop_animating(Edge::Top);
        view.layout_edges();
        assert!(!top.indicator().is_animating());
    }

    #[test]
    fn test_frame_change_resizes_affordance() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});

        view.set_bounds(Rect::new(0.0, 0.0, 768.0, 1024.0));
        assert_eq!(top.frame().width(), 768.0);
        assert!(top.needs_layout());
    }

    #[test]
    fn test_second_attach_replaces_handler() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let (first, first_handler) = counter();
        let (second, second_handler) = counter();

        view.add_pull_to_refresh_handler(first_handler);
        view.add_pull_to_refresh_handler(second_handler);
        assert_eq!(view.subview_count(), 1);
        assert_eq!(view.observer_count(), 4);

        view.trigger(Edge::Top);
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_reattach_shows_hidden_edge() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});

        view.set_visible(Edge::Top, false);
        assert_eq!(view.observer_count(), 0);

        let (fired, handler) = counter();
        view.add_pull_to_refresh_handler(handler);
        assert!(view.shows(Edge::Top));
        assert!(top.is_observing());
        assert_eq!(view.observer_count(), 4);

        view.begin_drag();
        view.drag_to(-70.0);
        view.end_drag();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_inset_observers_may_read_state_without_scheduler() {
        let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, 480.0), SchedulerHandle::detached());
        view.set_content_size(Size::new(320.0, 1000.0));
        let top = view.add_pull_to_refresh_handler(|| {});

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let weak = Rc::downgrade(&view);
        let callback: ChangeCallback = Rc::new(move |change: &ContainerChange| {
            if let (ContainerChange::ContentInset(inset), Some(view)) = (change, weak.upgrade()) {
                log.borrow_mut().push((inset.top, view.edge_state(Edge::Top)));
            }
        });
        view.observe(ContainerProperty::ContentInset, callback);

        view.trigger(Edge::Top);
        view.stop_animating(Edge::Top);

        assert_eq!(
            *seen.borrow(),
            vec![
                (60.0, Some(EdgeState::Loading)),
                (0.0, Some(EdgeState::Idle)),
            ]
        );
        assert!(top.is_inset_observing());
        assert_eq!(top.origin_inset(), 0.0);
    }

    #[test]
    fn test_trigger_while_armed_fires_once() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let (fired, handler) = counter();
        let top = view.add_pull_to_refresh_handler(handler);

        view.begin_drag();
        view.drag_to(-70.0);
        assert_eq!(top.state(), EdgeState::Armed);

        view.trigger(Edge::Top);
        assert_eq!(top.state(), EdgeState::Loading);
        assert_eq!(fired.get(), 1);
        assert!(top.triggered_by_user());
    }

    #[test]
    fn test_detach_releases_container() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});
        view.add_infinite_scrolling_handler(|| {});
        assert_eq!(view.observer_count(), 8);
        assert_eq!(view.subview_count(), 2);

        view.detach(Edge::Top);
        assert_eq!(view.observer_count(), 4);
        assert_eq!(view.subview_count(), 1);
        assert!(view.edge_controller(Edge::Top).is_none());
        assert!(!top.is_attached());

        // A stale handle is inert
        top.trigger();
        assert_eq!(top.state(), EdgeState::Idle);

        view.detach(Edge::Bottom);
        assert_eq!(view.observer_count(), 0);
        assert_eq!(view.subview_count(), 0);
    }

    #[test]
    fn test_detach_while_loading_ignores_late_completion() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let bottom = view.add_infinite_scrolling_handler(|| {});

        view.trigger(Edge::Bottom);
        view.detach(Edge::Bottom);
        finish(&scheduler);

        assert!(!bottom.has_pending_inset_write());
        assert!(!bottom.is_inset_observing());
        assert_eq!(view.observer_count(), 0);
    }

    #[test]
    fn test_appearance_does_not_touch_state() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});

        view.set_indicator_appearance(Edge::Top, brink_core::Color::WHITE);
        view.set_indicator_appearance(Edge::Top, crate::indicator::IndicatorStyle::WhiteLarge);

        assert_eq!(top.state(), EdgeState::Idle);
        assert_eq!(top.indicator().color(), Some(brink_core::Color::WHITE));
        assert!(!scheduler.has_pending_work());
    }

    #[test]
    fn test_dropping_view_releases_controllers() {
        let scheduler = AnimationScheduler::new();
        let view = view(&scheduler, 480.0, 1000.0);
        let top = view.add_pull_to_refresh_handler(|| {});
        view.trigger(Edge::Top);

        drop(view);
        finish(&scheduler);
        assert!(!top.is_attached());
        top.stop_animating();
        assert_eq!(top.state(), EdgeState::Loading);
    }
}
