use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::ports::{AnyPort, Direction, Port};

/// The kind of model a component belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Kind {
    Atomic,
    Coupled,
}

/// Identity of a component within the model hierarchy.
///
/// Ports keep a weak reference to the node of their owner and containers set
/// the parent link of their children, so that fully-qualified names can be
/// computed on demand by walking up the hierarchy.
pub(crate) struct Node {
    name: RefCell<String>,
    parent: RefCell<Weak<Node>>,
    kind: Kind,
}

impl Node {
    fn new(name: String, kind: Kind) -> Rc<Self> {
        Rc::new(Self {
            name: RefCell::new(name),
            parent: RefCell::new(Weak::new()),
            kind,
        })
    }

    pub(crate) fn kind(&self) -> Kind {
        self.kind
    }

    pub(crate) fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub(crate) fn parent(&self) -> Option<Rc<Node>> {
        self.parent.borrow().upgrade()
    }

    /// Builds the dotted path of this node, root first.
    pub(crate) fn full_name(&self) -> String {
        let mut path = self.name();
        let mut ancestor = self.parent();
        while let Some(node) = ancestor {
            path.insert(0, '.');
            path.insert_str(0, &node.name.borrow());
            ancestor = node.parent();
        }

        path
    }
}

/// Name and ports shared by atomic and coupled models.
///
/// A `Component` is embedded by composition in every model. Ports are
/// registered with [`Component::add_in_port()`],
/// [`Component::add_out_port()`] and [`Component::add_inout_port()`], which
/// record the port direction and make the component the port's owner.
///
/// # Panics
///
/// Registering a port that is already owned by a component panics.
pub struct Component {
    node: Rc<Node>,
    in_ports: Vec<Box<dyn AnyPort>>,
    out_ports: Vec<Box<dyn AnyPort>>,
    inout_ports: Vec<Box<dyn AnyPort>>,
}

impl Component {
    /// Creates the component of an atomic model.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name.into(), Kind::Atomic)
    }

    /// Creates the component of a coupled model.
    pub(crate) fn new_coupled(name: impl Into<String>) -> Self {
        Self::with_kind(name.into(), Kind::Coupled)
    }

    fn with_kind(name: String, kind: Kind) -> Self {
        Self {
            node: Node::new(name, kind),
            in_ports: Vec::new(),
            out_ports: Vec::new(),
            inout_ports: Vec::new(),
        }
    }

    /// Returns the local name of the component.
    pub fn name(&self) -> String {
        self.node.name()
    }

    /// Renames the component.
    ///
    /// Fully-qualified names of descendants and ports reflect the change
    /// immediately.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.node.name.borrow_mut() = name.into();
    }

    /// Returns the dotted path of the component from the root of the
    /// hierarchy.
    pub fn full_name(&self) -> String {
        self.node.full_name()
    }

    /// Checks whether this is the component of an atomic model.
    pub fn is_atomic(&self) -> bool {
        self.node.kind == Kind::Atomic
    }

    /// Registers an input port.
    pub fn add_in_port<T: Clone + 'static>(&mut self, port: &Port<T>) {
        port.attach(&self.node, Direction::In);
        self.in_ports.push(Box::new(port.clone()));
    }

    /// Registers an output port.
    pub fn add_out_port<T: Clone + 'static>(&mut self, port: &Port<T>) {
        port.attach(&self.node, Direction::Out);
        self.out_ports.push(Box::new(port.clone()));
    }

    /// Registers a bidirectional port.
    ///
    /// A bidirectional port can be both the source and the destination of
    /// couplings. Values readable from it count as inputs of the model,
    /// including values written by the model's own output function.
    pub fn add_inout_port<T: Clone + 'static>(&mut self, port: &Port<T>) {
        port.attach(&self.node, Direction::InOut);
        self.inout_ports.push(Box::new(port.clone()));
    }

    /// Returns an iterator over the input ports, in registration order.
    pub fn in_ports(&self) -> impl Iterator<Item = &dyn AnyPort> + '_ {
        self.in_ports.iter().map(|p| p.as_ref())
    }

    /// Returns an iterator over the output ports, in registration order.
    pub fn out_ports(&self) -> impl Iterator<Item = &dyn AnyPort> + '_ {
        self.out_ports.iter().map(|p| p.as_ref())
    }

    /// Returns an iterator over the bidirectional ports, in registration
    /// order.
    pub fn inout_ports(&self) -> impl Iterator<Item = &dyn AnyPort> + '_ {
        self.inout_ports.iter().map(|p| p.as_ref())
    }

    /// Checks whether no value can be read from any input or bidirectional
    /// port.
    pub fn in_empty(&self) -> bool {
        self.in_ports
            .iter()
            .chain(&self.inout_ports)
            .all(|p| p.is_empty())
    }

    /// Checks whether no value can be read from any output port.
    pub fn out_empty(&self) -> bool {
        self.out_ports.iter().all(|p| p.is_empty())
    }

    pub(crate) fn node(&self) -> &Rc<Node> {
        &self.node
    }

    pub(crate) fn set_parent(&self, parent: &Component) {
        *self.node.parent.borrow_mut() = Rc::downgrade(&parent.node);
    }

    /// Checks whether the provided node is this component's node.
    pub(crate) fn is(&self, node: &Rc<Node>) -> bool {
        Rc::ptr_eq(&self.node, node)
    }

    /// Returns new handles to all ports, inputs first.
    pub(crate) fn port_handles(&self) -> impl Iterator<Item = Box<dyn AnyPort>> + '_ {
        self.in_ports
            .iter()
            .chain(&self.out_ports)
            .chain(&self.inout_ports)
            .cloned()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |ports: &[Box<dyn AnyPort>]| -> Vec<String> {
            ports.iter().map(|p| p.name().to_owned()).collect()
        };
        f.debug_struct("Component")
            .field("name", &self.full_name())
            .field("in_ports", &names(&self.in_ports))
            .field("out_ports", &names(&self.out_ports))
            .field("inout_ports", &names(&self.inout_ports))
            .finish()
    }
}
