//! Scroll container adapter
//!
//! Edge controllers never own their container. They hold a `Weak` reference
//! and reach it only through this trait, so any scrollable surface that can
//! report its geometry and publish change notifications can host them.
//! [`ScrollView`](crate::scroll_view::ScrollView) is the headless reference
//! implementation.
//!
//! All methods take `&self`; containers are shared through `Rc` and keep
//! their state behind interior mutability. Implementations must not hold any
//! internal borrow while dispatching notifications, since observers read the
//! container and may write back into it.

use brink_animation::SchedulerHandle;
use brink_core::{
    ChangeCallback, ContainerProperty, EdgeInsets, ObserverId, Point, Rect, Size, SubviewId,
};

pub trait ScrollContainer: 'static {
    fn content_offset(&self) -> Point;

    /// Move the content; `animated` writes go through the container's scheduler
    fn set_content_offset(&self, offset: Point, animated: bool);

    fn content_size(&self) -> Size;

    fn content_inset(&self) -> EdgeInsets;

    /// Write the inset immediately and notify inset observers
    ///
    /// Called once per frame while an inset transition is running.
    fn set_content_inset(&self, inset: EdgeInsets);

    /// Visible viewport, in the container's own coordinates
    fn bounds(&self) -> Rect;

    /// Is the user currently dragging the content?
    fn is_dragging(&self) -> bool;

    /// Register for changes of one property
    fn observe(&self, property: ContainerProperty, callback: ChangeCallback) -> ObserverId;

    /// Stop delivering to an observer; false if it was not registered
    fn unobserve(&self, id: ObserverId) -> bool;

    /// Attach a visual element positioned in content coordinates
    fn add_subview(&self, frame: Rect) -> SubviewId;

    fn set_subview_frame(&self, id: SubviewId, frame: Rect);

    fn set_subview_hidden(&self, id: SubviewId, hidden: bool);

    fn remove_subview(&self, id: SubviewId) -> bool;

    /// Animation context for inset and offset transitions
    fn scheduler(&self) -> SchedulerHandle;
}
