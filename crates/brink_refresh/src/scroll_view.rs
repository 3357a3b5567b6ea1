//! Headless scroll container
//!
//! Stores scroll geometry, publishes a [`ContainerChange`] after every write,
//! and owns the edge controllers attached to it. There is no scrolling
//! physics: the content moves only through explicit drags and offset writes.
//! Used by the demo CLI and the tests, and as the reference for hosting edge
//! controllers in a real container.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use brink_animation::{Easing, SchedulerHandle, TransitionId, Tween};
use brink_core::{
    ChangeCallback, ContainerChange, ContainerProperty, EdgeInsets, ObserverId, ObserverRegistry,
    Point, Rect, Size, Subview, SubviewId,
};
use slotmap::SlotMap;

use crate::config::{RefreshConfig, DEFAULT_TRANSITION_DURATION};
use crate::container::ScrollContainer;
use crate::host::{EdgeSlots, RefreshHost};

/// Observable geometry of a [`ScrollView`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollGeometry {
    pub content_offset: Point,
    pub content_size: Size,
    pub content_inset: EdgeInsets,
    pub bounds: Rect,
    pub dragging: bool,
}

pub struct ScrollView {
    this: Weak<ScrollView>,
    geometry: RefCell<ScrollGeometry>,
    observers: RefCell<ObserverRegistry>,
    subviews: RefCell<SlotMap<SubviewId, Subview>>,
    scheduler: SchedulerHandle,
    offset_transition: Cell<Option<TransitionId>>,
    slots: EdgeSlots<ScrollView>,
}

impl ScrollView {
    pub fn new(bounds: Rect, scheduler: SchedulerHandle) -> Rc<Self> {
        Self::with_config(bounds, scheduler, RefreshConfig::default())
    }

    /// Create a view whose edge controllers use `config`
    pub fn with_config(bounds: Rect, scheduler: SchedulerHandle, config: RefreshConfig) -> Rc<Self> {
        Rc::new_cyclic(|this| ScrollView {
            this: this.clone(),
            geometry: RefCell::new(ScrollGeometry {
                bounds,
                ..Default::default()
            }),
            observers: RefCell::new(ObserverRegistry::new()),
            subviews: RefCell::new(SlotMap::with_key()),
            scheduler,
            offset_transition: Cell::new(None),
            slots: EdgeSlots::with_config(config),
        })
    }

    pub fn geometry(&self) -> ScrollGeometry {
        *self.geometry.borrow()
    }

    fn notify(&self, change: ContainerChange) {
        ObserverRegistry::dispatch(&self.observers, &change);
    }

    pub fn set_content_size(&self, size: Size) {
        self.geometry.borrow_mut().content_size = size;
        self.notify(ContainerChange::ContentSize(size));
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.geometry.borrow_mut().bounds = bounds;
        self.notify(ContainerChange::Frame(bounds));
    }

    /// Write the offset now and publish it
    fn write_offset(&self, offset: Point) {
        self.geometry.borrow_mut().content_offset = offset;
        self.notify(ContainerChange::ContentOffset(offset));
    }

    fn cancel_offset_transition(&self) {
        if let Some(id) = self.offset_transition.take() {
            self.scheduler.cancel(id);
        }
    }

    /// Is an animated offset write running?
    pub fn is_scrolling_animated(&self) -> bool {
        self.offset_transition
            .get()
            .is_some_and(|id| self.scheduler.is_active(id))
    }

    /// The user touches the content
    pub fn begin_drag(&self) {
        self.cancel_offset_transition();
        self.geometry.borrow_mut().dragging = true;
    }

    /// Move the content under the user's finger
    pub fn drag_to(&self, offset_y: f32) {
        let offset = self.content_offset().with_y(offset_y);
        self.write_offset(offset);
    }

    /// The user lets go
    ///
    /// The offset is published once more with the drag flag cleared, as a
    /// real container does when its bounce starts.
    pub fn end_drag(&self) {
        self.geometry.borrow_mut().dragging = false;
        self.write_offset(self.content_offset());
    }

    /// Offset the content comes to rest at after a drag
    pub fn resting_offset(&self) -> Point {
        let g = self.geometry();
        let min_y = -g.content_inset.top;
        let max_y = (g.content_size.height - g.bounds.height() + g.content_inset.bottom).max(min_y);
        g.content_offset.with_y(g.content_offset.y.clamp(min_y, max_y))
    }

    /// Bounce back into the scrollable range
    pub fn settle(&self, animated: bool) {
        let resting = self.resting_offset();
        if resting != self.content_offset() {
            self.set_content_offset(resting, animated);
        }
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn observer_count_for(&self, property: ContainerProperty) -> usize {
        self.observers.borrow().count_for(property)
    }

    pub fn subview(&self, id: SubviewId) -> Option<Subview> {
        self.subviews.borrow().get(id).copied()
    }

    pub fn subview_count(&self) -> usize {
        self.subviews.borrow().len()
    }
}

impl ScrollContainer for ScrollView {
    fn content_offset(&self) -> Point {
        self.geometry.borrow().content_offset
    }

    fn set_content_offset(&self, offset: Point, animated: bool) {
        self.cancel_offset_transition();
        if !animated {
            self.write_offset(offset);
            return;
        }

        let from = self.content_offset();
        let tween = Tween::new(
            from.y,
            offset.y,
            DEFAULT_TRANSITION_DURATION,
            Easing::EaseInOut,
        );
        let weak = self.this.clone();
        let x = offset.x;
        let id = self.scheduler.start(
            tween,
            move |y| {
                if let Some(view) = weak.upgrade() {
                    view.write_offset(Point::new(x, y));
                }
            },
            |_| {},
        );
        match id {
            Some(id) => self.offset_transition.set(Some(id)),
            None => self.write_offset(offset),
        }
    }

    fn content_size(&self) -> Size {
        self.geometry.borrow().content_size
    }

    fn content_inset(&self) -> EdgeInsets {
        self.geometry.borrow().content_inset
    }

    fn set_content_inset(&self, inset: EdgeInsets) {
        self.geometry.borrow_mut().content_inset = inset;
        self.notify(ContainerChange::ContentInset(inset));
    }

    fn bounds(&self) -> Rect {
        self.geometry.borrow().bounds
    }

    fn is_dragging(&self) -> bool {
        self.geometry.borrow().dragging
    }

    fn observe(&self, property: ContainerProperty, callback: ChangeCallback) -> ObserverId {
        self.observers.borrow_mut().observe(property, callback)
    }

    fn unobserve(&self, id: ObserverId) -> bool {
        self.observers.borrow_mut().unobserve(id)
    }

    fn add_subview(&self, frame: Rect) -> SubviewId {
        self.subviews.borrow_mut().insert(Subview::new(frame))
    }

    fn set_subview_frame(&self, id: SubviewId, frame: Rect) {
        if let Some(subview) = self.subviews.borrow_mut().get_mut(id) {
            subview.frame = frame;
        }
    }

    fn set_subview_hidden(&self, id: SubviewId, hidden: bool) {
        if let Some(subview) = self.subviews.borrow_mut().get_mut(id) {
            subview.hidden = hidden;
        }
    }

    fn remove_subview(&self, id: SubviewId) -> bool {
        self.subviews.borrow_mut().remove(id).is_some()
    }

    fn scheduler(&self) -> SchedulerHandle {
        self.scheduler.clone()
    }
}

impl RefreshHost for ScrollView {
    fn edge_slots(&self) -> &EdgeSlots<Self> {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brink_animation::AnimationScheduler;

    #[test]
    fn test_writes_are_published() {
        let scheduler = AnimationScheduler::new();
        let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, 480.0), scheduler.handle());
        let seen = Rc::new(RefCell::new(Vec::new()));

        for property in [ContainerProperty::ContentOffset, ContainerProperty::ContentSize] {
            let seen = Rc::clone(&seen);
            view.observe(
                property,
                Rc::new(move |change: &ContainerChange| seen.borrow_mut().push(*change)),
            );
        }

        view.set_content_size(Size::new(320.0, 1000.0));
        view.begin_drag();
        view.drag_to(-30.0);
        view.end_drag();

        assert_eq!(
            *seen.borrow(),
            vec![
                ContainerChange::ContentSize(Size::new(320.0, 1000.0)),
                ContainerChange::ContentOffset(Point::new(0.0, -30.0)),
                ContainerChange::ContentOffset(Point::new(0.0, -30.0)),
            ]
        );
        assert!(!view.is_dragging());
    }

    #[test]
    fn test_animated_offset_runs_on_scheduler() {
        let scheduler = AnimationScheduler::new();
        let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, 480.0), scheduler.handle());

        view.set_content_offset(Point::new(0.0, -60.0), true);
        assert_eq!(view.content_offset(), Point::ZERO);
        assert!(view.is_scrolling_animated());

        scheduler.run_until_idle(1.0 / 60.0, 120);
        assert_eq!(view.content_offset(), Point::new(0.0, -60.0));
        assert!(!view.is_scrolling_animated());
    }

    #[test]
    fn test_drag_interrupts_animated_offset() {
        let scheduler = AnimationScheduler::new();
        let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, 480.0), scheduler.handle());

        view.set_content_offset(Point::new(0.0, 200.0), true);
        scheduler.tick(0.1);
        view.begin_drag();
        let held = view.content_offset();

        scheduler.run_until_idle(1.0 / 60.0, 120);
        assert_eq!(view.content_offset(), held);
    }

    #[test]
    fn test_settle_clamps_to_inset_range() {
        let scheduler = AnimationScheduler::new();
        let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, 480.0), scheduler.handle());
        view.set_content_size(Size::new(320.0, 1000.0));
        view.set_content_inset(EdgeInsets::new(60.0, 0.0, 0.0, 0.0));

        view.begin_drag();
        view.drag_to(-150.0);
        view.end_drag();
        assert_eq!(view.resting_offset(), Point::new(0.0, -60.0));

        view.begin_drag();
        view.drag_to(900.0);
        view.end_drag();
        view.settle(false);
        assert_eq!(view.content_offset(), Point::new(0.0, 520.0));
    }

    #[test]
    fn test_subviews() {
        let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, 480.0), SchedulerHandle::detached());
        let id = view.add_subview(Rect::new(0.0, -60.0, 320.0, 60.0));
        view.set_subview_hidden(id, true);

        assert_eq!(view.subview(id).map(|s| s.hidden), Some(true));
        assert!(view.remove_subview(id));
        assert!(!view.remove_subview(id));
        assert_eq!(view.subview_count(), 0);
    }

    #[test]
    fn test_animated_offset_without_scheduler_is_immediate() {
        let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, 480.0), SchedulerHandle::detached());
        view.set_content_offset(Point::new(0.0, -60.0), true);
        assert_eq!(view.content_offset(), Point::new(0.0, -60.0));
    }
}
