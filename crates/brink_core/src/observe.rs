//! Typed change notifications for scroll containers
//!
//! Containers keep an [`ObserverRegistry`] and dispatch a [`ContainerChange`]
//! after every write to an observable property. Observers are keyed by an
//! [`ObserverId`] returned at registration; unregistering with that id is the
//! only way to stop delivery.
//!
//! Dispatch clones the matching callbacks out of the registry before calling
//! them, so a callback may register, unregister, or write back into the
//! container that is notifying it.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use brink_core::observe::{ContainerChange, ContainerProperty, ObserverRegistry};
//! use brink_core::Point;
//!
//! let registry = RefCell::new(ObserverRegistry::new());
//! let id = registry.borrow_mut().observe(
//!     ContainerProperty::ContentOffset,
//!     Rc::new(|change: &ContainerChange| println!("{:?}", change)),
//! );
//!
//! ObserverRegistry::dispatch(&registry, &ContainerChange::ContentOffset(Point::new(0.0, -20.0)));
//! assert!(registry.borrow_mut().unobserve(id));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::geometry::{EdgeInsets, Point, Rect, Size};

new_key_type! {
    /// Handle to a registered change observer
    pub struct ObserverId;
}

/// Observable container properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerProperty {
    ContentOffset,
    ContentSize,
    ContentInset,
    Frame,
}

/// A property change carrying the new value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContainerChange {
    ContentOffset(Point),
    ContentSize(Size),
    ContentInset(EdgeInsets),
    Frame(Rect),
}

impl ContainerChange {
    pub fn property(&self) -> ContainerProperty {
        match self {
            ContainerChange::ContentOffset(_) => ContainerProperty::ContentOffset,
            ContainerChange::ContentSize(_) => ContainerProperty::ContentSize,
            ContainerChange::ContentInset(_) => ContainerProperty::ContentInset,
            ContainerChange::Frame(_) => ContainerProperty::Frame,
        }
    }
}

/// Callback invoked with each change of the observed property
pub type ChangeCallback = Rc<dyn Fn(&ContainerChange)>;

struct Observer {
    property: ContainerProperty,
    callback: ChangeCallback,
}

/// Registry of change observers for one container
#[derive(Default)]
pub struct ObserverRegistry {
    observers: SlotMap<ObserverId, Observer>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one property
    pub fn observe(&mut self, property: ContainerProperty, callback: ChangeCallback) -> ObserverId {
        let id = self.observers.insert(Observer { property, callback });
        tracing::trace!(?property, ?id, "observer registered");
        id
    }

    /// Remove an observer; returns false if the id was not registered
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let removed = self.observers.remove(id).is_some();
        if removed {
            tracing::trace!(?id, "observer removed");
        }
        removed
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.observers.contains_key(id)
    }

    /// Total number of live observers
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Number of live observers for a property
    pub fn count_for(&self, property: ContainerProperty) -> usize {
        self.observers
            .values()
            .filter(|o| o.property == property)
            .count()
    }

    /// Snapshot of the callbacks registered for a property
    pub fn callbacks_for(&self, property: ContainerProperty) -> SmallVec<[ChangeCallback; 4]> {
        self.observers
            .values()
            .filter(|o| o.property == property)
            .map(|o| Rc::clone(&o.callback))
            .collect()
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    /// Deliver a change to every observer of its property
    ///
    /// The registry is only borrowed while the callbacks are collected.
    pub fn dispatch(registry: &RefCell<ObserverRegistry>, change: &ContainerChange) {
        let callbacks = registry.borrow().callbacks_for(change.property());
        for callback in callbacks {
            callback(change);
        }
    }
}
