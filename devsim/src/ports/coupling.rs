use std::fmt;
use std::ptr;
use std::rc::{Rc, Weak};

use super::port::{Inner, Port};
use super::CouplingError;

/// A directed connection from a source port to a destination port.
///
/// A coupling is immutable once created. It does not keep its endpoints
/// alive: ports are owned by their models, and a coupling whose endpoints
/// were dropped simply carries no value.
///
/// Cloning a `Coupling` produces a new handle to the same coupling.
pub struct Coupling<T> {
    inner: Rc<Endpoints<T>>,
}

struct Endpoints<T> {
    from: Weak<Inner<T>>,
    to: Weak<Inner<T>>,
    // Names captured at creation, used once an endpoint is dropped.
    from_name: String,
    to_name: String,
}

impl<T: Clone + 'static> Coupling<T> {
    /// Creates a coupling from `from` to `to`.
    pub fn new(from: &Port<T>, to: &Port<T>) -> Self {
        Self {
            inner: Rc::new(Endpoints {
                from: from.downgrade(),
                to: to.downgrade(),
                from_name: from.full_name(),
                to_name: to.full_name(),
            }),
        }
    }

    /// Returns the source port, if it is still alive.
    pub fn source(&self) -> Option<Port<T>> {
        self.inner.from.upgrade().map(Port::from_inner)
    }

    /// Returns the destination port, if it is still alive.
    pub fn destination(&self) -> Option<Port<T>> {
        self.inner.to.upgrade().map(Port::from_inner)
    }

    /// Checks whether `port` is the source of this coupling.
    pub fn has_source(&self, port: &Port<T>) -> bool {
        ptr::eq(self.inner.from.as_ptr(), Rc::as_ptr(&port.inner))
    }

    /// Checks whether `port` is the destination of this coupling.
    pub fn has_destination(&self, port: &Port<T>) -> bool {
        ptr::eq(self.inner.to.as_ptr(), Rc::as_ptr(&port.inner))
    }

    /// Returns a description of the coupling with the current names of its
    /// endpoints.
    fn describe(&self) -> String {
        let from = self
            .source()
            .map_or_else(|| self.inner.from_name.clone(), |p| p.full_name());
        let to = self
            .destination()
            .map_or_else(|| self.inner.to_name.clone(), |p| p.full_name());

        format!("({from} -> {to})")
    }

    /// Copies the values readable from the source to the destination buffer.
    pub fn propagate(&self) {
        let (Some(from), Some(to)) = (self.source(), self.destination()) else {
            return;
        };
        let values = from.read_all().to_vec();
        if !values.is_empty() {
            to.write_many(values);
        }
    }
}

impl<T> Clone for Coupling<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> fmt::Display for Coupling<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl<T: Clone + 'static> fmt::Debug for Coupling<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Coupling").field(&self.describe()).finish()
    }
}

/// Type-erased coupling, as stored by containers.
pub(crate) trait AnyCoupling {
    /// Copies values from the source to the destination.
    fn propagate(&self);
    /// Registers the coupling on both endpoints.
    fn register(&self) -> Result<(), CouplingError>;
    /// Returns a description of the coupling.
    fn label(&self) -> String;
}

impl<T: Clone + 'static> AnyCoupling for Coupling<T> {
    fn propagate(&self) {
        Coupling::propagate(self)
    }

    fn register(&self) -> Result<(), CouplingError> {
        if let (Some(from), Some(to)) = (self.source(), self.destination()) {
            from.register_outgoing(self)?;
            to.register_incoming(self)?;
        }

        Ok(())
    }

    fn label(&self) -> String {
        self.describe()
    }
}
