//! Brink Refresh
//!
//! Pull-to-refresh and infinite-scroll affordances for scroll containers.
//!
//! Each edge of a container (top for pull-to-refresh, bottom for infinite
//! scrolling) gets an [`EdgeController`] that follows the container's scroll
//! offset through three states:
//!
//! - **Idle**: nothing in progress
//! - **Armed**: dragged past the edge's threshold; letting go starts loading
//! - **Loading**: the action handler has fired and the container's inset
//!   holds the indicator in view until [`stop_animating`] is called
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use brink_animation::AnimationScheduler;
//! use brink_core::{Edge, Rect, Size};
//! use brink_refresh::{EdgeState, RefreshExt, ScrollView};
//!
//! let scheduler = AnimationScheduler::new();
//! let view = ScrollView::new(Rect::new(0.0, 0.0, 320.0, 480.0), scheduler.handle());
//! view.set_content_size(Size::new(320.0, 1200.0));
//!
//! let refreshed = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&refreshed);
//! view.add_pull_to_refresh_handler(move || flag.set(true));
//!
//! view.begin_drag();
//! view.drag_to(-80.0);
//! view.end_drag();
//!
//! assert!(refreshed.get());
//! assert_eq!(view.edge_state(Edge::Top), Some(EdgeState::Loading));
//!
//! view.stop_animating(Edge::Top);
//! scheduler.run_until_idle(1.0 / 60.0, 120);
//! assert_eq!(view.edge_state(Edge::Top), Some(EdgeState::Idle));
//! ```
//!
//! [`stop_animating`]: RefreshExt::stop_animating

pub mod attachment;
pub mod config;
pub mod container;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod indicator;
pub mod scroll_view;
pub mod state;
pub mod threshold;

pub use config::{EdgeConfig, RefreshConfig};
pub use container::ScrollContainer;
pub use controller::{ActionHandler, EdgeController, EdgeHandle};
pub use error::{ConfigError, RefreshError, Result};
pub use host::{EdgeSlots, RefreshExt, RefreshHost};
pub use indicator::{ActivityIndicator, IndicatorAppearance, IndicatorStyle};
pub use scroll_view::{ScrollGeometry, ScrollView};
pub use state::{EdgeState, EdgeStateMachine, Transition};
pub use threshold::{threshold, EdgeGeometry};
