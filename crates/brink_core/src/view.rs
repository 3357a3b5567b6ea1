//! Subviews attached to a scroll container

use slotmap::new_key_type;

use crate::geometry::Rect;

new_key_type! {
    /// Handle to a visual element a container holds for a controller
    pub struct SubviewId;
}

/// Placement of an attached visual element, in content coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Subview {
    pub frame: Rect,
    pub hidden: bool,
}

impl Subview {
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            hidden: false,
        }
    }
}
