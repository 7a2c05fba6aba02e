//! Polyline features and geometry-change observation
//!
//! A [`Feature`] is a named polyline shared through an `Rc` handle. Whoever needs to
//! follow its geometry registers a [`GeometryObserver`] with [`Feature::subscribe`];
//! the feature keeps only a `Weak` reference, so subscribing never extends the
//! observer's lifetime. Notifications run synchronously inside [`Feature::set_geometry`].

use geo::{Coord, LineString};
use slotmap::{SlotMap, new_key_type};
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Identifier of a geometry observer registration, used to unsubscribe.
    pub struct ObserverId;
}

/// Receives the new geometry after a feature's geometry was replaced
pub trait GeometryObserver {
    fn geometry_changed(&self, geometry: &LineString<f64>);
}

/// A named polyline with an ordered vertex list
pub struct Feature {
    name: String,
    geometry: RefCell<LineString<f64>>,
    observers: RefCell<SlotMap<ObserverId, Weak<dyn GeometryObserver>>>,
}

impl Feature {
    /// Create a shared feature handle
    pub fn new(name: impl Into<String>, geometry: LineString<f64>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            geometry: RefCell::new(geometry),
            observers: RefCell::new(SlotMap::with_key()),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the current geometry
    ///
    /// The borrow must be released before calling [`Feature::set_geometry`].
    #[inline]
    pub fn geometry(&self) -> Ref<'_, LineString<f64>> {
        self.geometry.borrow()
    }

    /// Copy of the current vertices
    pub fn coordinates(&self) -> Vec<Coord<f64>> {
        self.geometry.borrow().0.clone()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.geometry.borrow().0.len()
    }

    /// Replace the geometry and notify every live observer
    pub fn set_geometry(&self, geometry: LineString<f64>) {
        *self.geometry.borrow_mut() = geometry;

        // Observers may read this feature or (un)subscribe while being notified, so
        // neither the geometry nor the registry stays borrowed during the callbacks.
        let live: Vec<Rc<dyn GeometryObserver>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|_, observer| observer.strong_count() > 0);
            observers.values().filter_map(Weak::upgrade).collect()
        };

        tracing::trace!(
            feature = %self.name,
            observers = live.len(),
            "geometry changed"
        );

        let geometry = self.geometry.borrow().clone();
        for observer in live {
            observer.geometry_changed(&geometry);
        }
    }

    /// Register an observer; the feature only holds it weakly
    pub fn subscribe(&self, observer: Weak<dyn GeometryObserver>) -> ObserverId {
        self.observers.borrow_mut().insert(observer)
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.borrow_mut().remove(id).is_some()
    }

    /// Number of registrations whose observer is still alive
    pub fn observer_count(&self) -> usize {
        self.observers
            .borrow()
            .values()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("name", &self.name)
            .field("vertices", &self.vertex_count())
            .finish()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
