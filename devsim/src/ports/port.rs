use std::any::Any;
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use dyn_clone::DynClone;

use crate::model::component::{Kind, Node};

use super::coupling::Coupling;
use super::{CouplingError, Direction, EmptyPortError};

/// A typed event port.
///
/// See the [module-level documentation](crate::ports) for an overview.
///
/// Cloning a `Port` produces a new handle to the same port.
pub struct Port<T: Clone + 'static> {
    pub(super) inner: Rc<Inner<T>>,
}

pub(super) struct Inner<T> {
    name: String,
    owner: RefCell<Weak<Node>>,
    direction: Cell<Direction>,
    values: RefCell<Vec<T>>,
    chain: RefCell<Option<Chain<T>>>,
}

/// Chaining state of a port.
struct Chain<T> {
    incoming: Vec<Coupling<T>>,
    outgoing: Vec<Coupling<T>>,
    cache: Cache<T>,
}

/// Per-cycle cache of a chained port.
enum Cache<T> {
    Unfilled,
    Resolving,
    Filled(Vec<T>),
}

impl<T: Clone + 'static> Port<T> {
    /// Creates a new, unregistered port.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(Inner {
                name: name.into(),
                owner: RefCell::new(Weak::new()),
                direction: Cell::new(Direction::Unset),
                values: RefCell::new(Vec::new()),
                chain: RefCell::new(None),
            }),
        }
    }

    /// Returns the local name of the port.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the dotted path of the port from the root of the hierarchy.
    ///
    /// The path is recomputed at each call so it always reflects the current
    /// names of the enclosing components.
    pub fn full_name(&self) -> String {
        match self.inner.owner.borrow().upgrade() {
            Some(owner) => format!("{}.{}", owner.full_name(), self.inner.name),
            None => self.inner.name.clone(),
        }
    }

    /// Returns the direction of the port.
    pub fn direction(&self) -> Direction {
        self.inner.direction.get()
    }

    /// Checks whether the port is in chained mode.
    pub fn is_chained(&self) -> bool {
        self.inner.chain.borrow().is_some()
    }

    /// Appends a value to the port buffer.
    pub fn write(&self, value: T) {
        self.inner.values.borrow_mut().push(value);
    }

    /// Appends several values to the port buffer, preserving their order.
    pub fn write_many(&self, values: impl IntoIterator<Item = T>) {
        self.inner.values.borrow_mut().extend(values);
    }

    /// Returns all values readable from this port during the current cycle.
    ///
    /// For a chained port, the values of all upstream sources are resolved
    /// at the first read of the cycle, in coupling registration order, and
    /// later reads return the cached result until the port is cleared.
    ///
    /// The returned guard must be dropped before values are written to this
    /// port.
    pub fn read_all(&self) -> Ref<'_, [T]> {
        if !self.is_relay() {
            return Ref::map(self.inner.values.borrow(), |v| v.as_slice());
        }
        self.resolve();

        Ref::map(self.inner.chain.borrow(), |chain| match chain {
            Some(Chain {
                cache: Cache::Filled(values),
                ..
            }) => values.as_slice(),
            _ => &[],
        })
    }

    /// Returns the first value readable from this port during the current
    /// cycle.
    pub fn read_single(&self) -> Result<T, EmptyPortError> {
        self.read_all().first().cloned().ok_or(EmptyPortError)
    }

    /// Checks whether no value is readable from this port.
    pub fn is_empty(&self) -> bool {
        self.read_all().is_empty()
    }

    /// Returns the number of values readable from this port.
    pub fn len(&self) -> usize {
        self.read_all().len()
    }

    /// Discards all values as well as the cache of a chained port.
    pub fn clear(&self) {
        self.inner.values.borrow_mut().clear();
        if let Some(chain) = self.inner.chain.borrow_mut().as_mut() {
            chain.cache = Cache::Unfilled;
        }
    }

    /// Switches the port to chained mode.
    ///
    /// This has no effect if the port is already chained. Chaining must be
    /// enabled during bench assembly, before the simulation starts.
    pub fn enable_chaining(&self) {
        let mut chain = self.inner.chain.borrow_mut();
        if chain.is_none() {
            *chain = Some(Chain {
                incoming: Vec::new(),
                outgoing: Vec::new(),
                cache: Cache::Unfilled,
            });
        }
    }

    /// Registers a coupling whose destination is this port.
    ///
    /// Chaining is enabled if necessary. An error is returned if the
    /// destination of the coupling is another port.
    pub fn register_incoming(&self, coupling: &Coupling<T>) -> Result<(), CouplingError> {
        if !coupling.has_destination(self) {
            return Err(self.mismatch(coupling));
        }
        self.enable_chaining();
        if let Some(chain) = self.inner.chain.borrow_mut().as_mut() {
            chain.incoming.push(coupling.clone());
            chain.cache = Cache::Unfilled;
        }

        Ok(())
    }

    /// Registers a coupling whose source is this port.
    ///
    /// Chaining is enabled if necessary. An error is returned if the source
    /// of the coupling is another port.
    pub fn register_outgoing(&self, coupling: &Coupling<T>) -> Result<(), CouplingError> {
        if !coupling.has_source(self) {
            return Err(self.mismatch(coupling));
        }
        self.enable_chaining();
        if let Some(chain) = self.inner.chain.borrow_mut().as_mut() {
            chain.outgoing.push(coupling.clone());
        }

        Ok(())
    }

    /// Returns the number of couplings registered as incoming and outgoing.
    pub fn chained_couplings(&self) -> (usize, usize) {
        self.inner
            .chain
            .borrow()
            .as_ref()
            .map_or((0, 0), |c| (c.incoming.len(), c.outgoing.len()))
    }

    /// Makes `owner` the owner of this port.
    ///
    /// # Panics
    ///
    /// Panics if the port is already registered on a component.
    pub(crate) fn attach(&self, owner: &Rc<Node>, direction: Direction) {
        assert!(
            self.inner.direction.get() == Direction::Unset,
            "port '{}' is already registered on a component",
            self.full_name()
        );
        *self.inner.owner.borrow_mut() = Rc::downgrade(owner);
        self.inner.direction.set(direction);
    }

    pub(crate) fn owner(&self) -> Option<Rc<Node>> {
        self.inner.owner.borrow().upgrade()
    }

    pub(super) fn downgrade(&self) -> Weak<Inner<T>> {
        Rc::downgrade(&self.inner)
    }

    pub(super) fn from_inner(inner: Rc<Inner<T>>) -> Self {
        Self { inner }
    }

    /// Checks whether this is the output port of an atomic model.
    ///
    /// The buffer of a producer port is authoritative even in chained mode.
    fn is_producer(&self) -> bool {
        self.direction() == Direction::Out
            && self.owner().map(|o| o.kind()) == Some(Kind::Atomic)
    }

    /// Checks whether reads must be resolved through incoming couplings.
    fn is_relay(&self) -> bool {
        self.is_chained() && !self.is_producer()
    }

    /// Fills the cache of a chained port if it is not filled yet.
    fn resolve(&self) {
        // Guards returned by earlier reads may still be alive, so the state
        // is only inspected through a shared borrow.
        match self.inner.chain.borrow().as_ref().map(|chain| &chain.cache) {
            Some(Cache::Unfilled) => {}
            Some(Cache::Resolving) => {
                tracing::warn!(
                    port = %self.full_name(),
                    "coupling loop through chained ports; loop values are ignored"
                );
                return;
            }
            Some(Cache::Filled(_)) | None => return,
        }

        let sources = {
            let mut chain = self.inner.chain.borrow_mut();
            let Some(chain) = chain.as_mut() else {
                return;
            };
            chain.cache = Cache::Resolving;

            chain
                .incoming
                .iter()
                .filter_map(|c| c.source())
                .collect::<Vec<_>>()
        };

        // Values delivered directly to the port by a non-chained container
        // come first.
        let mut values = self.inner.values.borrow().clone();
        for source in &sources {
            values.extend_from_slice(&source.read_all());
        }
        tracing::trace!(
            port = %self.full_name(),
            sources = sources.len(),
            values = values.len(),
            "chained port resolved"
        );

        if let Some(chain) = self.inner.chain.borrow_mut().as_mut() {
            chain.cache = Cache::Filled(values);
        }
    }

    fn mismatch(&self, coupling: &Coupling<T>) -> CouplingError {
        CouplingError::EndpointMismatch {
            port: self.full_name(),
            coupling: coupling.to_string(),
        }
    }
}

impl<T: Clone + 'static> Clone for Port<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> PartialEq for Port<T> {
    /// Two handles are equal if they refer to the same port.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static> Eq for Port<T> {}

impl<T: Clone + 'static> fmt::Display for Port<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for Port<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("name", &self.full_name())
            .field("direction", &self.direction())
            .field("chained", &self.is_chained())
            .field("values", &*self.inner.values.borrow())
            .finish_non_exhaustive()
    }
}

/// Type-erased view of a [`Port`].
///
/// This trait gives containers and the coordinator uniform access to the
/// ports of a component, whatever the type of their values.
pub trait AnyPort: DynClone {
    /// Returns the local name of the port.
    fn name(&self) -> &str;
    /// Returns the dotted path of the port from the root of the hierarchy.
    fn full_name(&self) -> String;
    /// Returns the direction of the port.
    fn direction(&self) -> Direction;
    /// Checks whether no value is readable from this port.
    fn is_empty(&self) -> bool;
    /// Returns the number of values readable from this port.
    fn len(&self) -> usize;
    /// Discards all values as well as the cache of a chained port.
    fn clear(&self);
    /// Checks whether the port is in chained mode.
    fn is_chained(&self) -> bool;
    /// Returns the port as `&dyn Any`, for downcasting to a `Port<T>`.
    fn as_any(&self) -> &dyn Any;
}

dyn_clone::clone_trait_object!(AnyPort);

impl<T: Clone + 'static> AnyPort for Port<T> {
    fn name(&self) -> &str {
        Port::name(self)
    }
    fn full_name(&self) -> String {
        Port::full_name(self)
    }
    fn direction(&self) -> Direction {
        Port::direction(self)
    }
    fn is_empty(&self) -> bool {
        Port::is_empty(self)
    }
    fn len(&self) -> usize {
        Port::len(self)
    }
    fn clear(&self) {
        Port::clear(self)
    }
    fn is_chained(&self) -> bool {
        Port::is_chained(self)
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for dyn AnyPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyPort")
            .field("name", &self.full_name())
            .field("direction", &self.direction())
            .finish_non_exhaustive()
    }
}
