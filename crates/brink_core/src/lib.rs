//! Brink Core
//!
//! Foundational types shared by the Brink crates:
//!
//! - **Geometry**: points, sizes, rects, content insets, colors
//! - **Edges**: the top and bottom scroll edges and their crossing rules
//! - **Observation**: typed property-change notifications keyed by
//!   [`ObserverId`] handles instead of string paths
//! - **Subviews**: handles for visual elements attached to a container

pub mod edge;
pub mod geometry;
pub mod observe;
pub mod view;

pub use edge::Edge;
pub use geometry::{Color, EdgeInsets, Point, Rect, Size};
pub use observe::{ChangeCallback, ContainerChange, ContainerProperty, ObserverId, ObserverRegistry};
pub use view::{Subview, SubviewId};
