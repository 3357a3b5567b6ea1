//! Arming thresholds
//!
//! Pure functions of the container geometry sampled at the moment of each
//! offset change. Nothing here is cached: content size and insets can change
//! between any two samples.

use brink_core::{Edge, EdgeInsets, Size};

use crate::container::ScrollContainer;

/// Geometry needed to place an edge's arming threshold
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeGeometry {
    pub content_size: Size,
    pub viewport_size: Size,
    pub content_inset: EdgeInsets,
    /// Inset on the controlled edge before any reservation
    pub origin_inset: f32,
    /// `y` of the affordance's own frame (top edge)
    pub frame_origin_y: f32,
    /// Early-arming distance (bottom edge)
    pub slack: f32,
}

impl EdgeGeometry {
    /// Read the current geometry from a container
    pub fn sample<C: ScrollContainer + ?Sized>(
        container: &C,
        origin_inset: f32,
        frame_origin_y: f32,
        slack: f32,
    ) -> Self {
        Self {
            content_size: container.content_size(),
            viewport_size: container.bounds().size,
            content_inset: container.content_inset(),
            origin_inset,
            frame_origin_y,
            slack,
        }
    }

    /// Can the content scroll at all?
    pub fn overflows(&self) -> bool {
        self.content_size.height > self.viewport_size.height
    }
}

/// Offset at which the edge arms
///
/// - Bottom: `content - viewport + slack`. When the content is shorter than
///   the viewport the bottom offset is meaningless and the threshold is
///   measured from the top instead: `slack - inset.top`.
/// - Top: `frame.y - origin_inset`, the offset at which the affordance
///   (parked above the content) becomes fully visible past the original inset.
pub fn threshold(edge: Edge, geometry: &EdgeGeometry) -> f32 {
    match edge {
        Edge::Bottom => {
            if geometry.content_size.height < geometry.viewport_size.height {
                geometry.slack - geometry.content_inset.top
            } else {
                geometry.content_size.height - geometry.viewport_size.height + geometry.slack
            }
        }
        Edge::Top => geometry.frame_origin_y - geometry.origin_inset,
    }
}
