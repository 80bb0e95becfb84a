use std::fmt;
use std::rc::Rc;

use crate::ports::{AnyCoupling, Coupling, CouplingError, Direction, Port};

use super::component::{Kind, Node};
use super::{Atomic, Component, Model};

/// Classification of the couplings of a coupled model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CouplingKind {
    /// External input coupling: from an input of the container to a child.
    ExternalInput,
    /// Internal coupling: between two children.
    Internal,
    /// External output coupling: from a child to an output of the container.
    ExternalOutput,
}

/// A container of models and of the couplings between their ports.
///
/// When chaining is enabled, each coupling is registered on both of its
/// endpoints as soon as it is added, so that destination ports resolve their
/// values directly from upstream sources. Otherwise, couplings are
/// propagated by the coordinator at each cycle.
///
/// # Examples
///
/// ```
/// use devsim::model::{Coupled, CouplingKind};
/// use devsim::models::Step;
/// use devsim::ports::Port;
///
/// let step = Step::new("step", 0.0, 15.0, 10.0);
/// let step_out = step.output.clone();
///
/// let mut root = Coupled::new("root");
/// let out = Port::new("out");
/// root.add_out_port(&out);
/// root.add_atomic(step);
/// root.add_coupling(&step_out, &out).unwrap();
///
/// assert_eq!(root.coupling_count(CouplingKind::ExternalOutput), 1);
/// assert_eq!(out.full_name(), "root.out");
/// assert_eq!(step_out.full_name(), "root.step.out");
/// ```
pub struct Coupled {
    component: Component,
    chained: bool,
    components: Vec<Model>,
    eic: Vec<Box<dyn AnyCoupling>>,
    ic: Vec<Box<dyn AnyCoupling>>,
    eoc: Vec<Box<dyn AnyCoupling>>,
}

impl Coupled {
    /// Creates an empty coupled model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            component: Component::new_coupled(name),
            chained: false,
            components: Vec::new(),
            eic: Vec::new(),
            ic: Vec::new(),
            eoc: Vec::new(),
        }
    }

    /// Creates an empty coupled model with chaining enabled.
    pub fn with_chaining(name: impl Into<String>) -> Self {
        let mut coupled = Self::new(name);
        coupled.chained = true;

        coupled
    }

    /// Returns the component holding the model name and ports.
    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Returns the local name of the model.
    pub fn name(&self) -> String {
        self.component.name()
    }

    /// Checks whether chaining is enabled.
    pub fn is_chained(&self) -> bool {
        self.chained
    }

    /// Registers an input port.
    pub fn add_in_port<T: Clone + 'static>(&mut self, port: &Port<T>) {
        self.component.add_in_port(port);
    }

    /// Registers an output port.
    pub fn add_out_port<T: Clone + 'static>(&mut self, port: &Port<T>) {
        self.component.add_out_port(port);
    }

    /// Registers a bidirectional port.
    pub fn add_inout_port<T: Clone + 'static>(&mut self, port: &Port<T>) {
        self.component.add_inout_port(port);
    }

    /// Adds an atomic model as a child.
    pub fn add_atomic<A: Atomic>(&mut self, model: A) {
        self.add_component(Model::Atomic(Box::new(model)));
    }

    /// Adds a coupled model as a child.
    pub fn add_coupled(&mut self, model: Coupled) {
        self.add_component(Model::Coupled(Box::new(model)));
    }

    /// Adds a model as a child.
    pub fn add_component(&mut self, model: Model) {
        model.component().set_parent(&self.component);
        self.components.push(model);
    }

    /// Returns the children, in insertion order.
    pub fn components(&self) -> &[Model] {
        &self.components
    }

    /// Adds a coupling between two ports.
    ///
    /// Each endpoint must belong either to this container or to one of its
    /// children; the coupling is classified accordingly. Inputs of atomic
    /// models cannot be sources and outputs of atomic models cannot be
    /// destinations.
    ///
    /// If chaining is enabled, the coupling is registered on both endpoints
    /// before this method returns.
    pub fn add_coupling<T: Clone + 'static>(
        &mut self,
        from: &Port<T>,
        to: &Port<T>,
    ) -> Result<CouplingKind, CouplingError> {
        let from_owner = owner_of(from)?;
        let to_owner = owner_of(to)?;
        if from_owner.kind() == Kind::Atomic && from.direction() == Direction::In {
            return Err(CouplingError::AtomicInputAsSource {
                port: from.full_name(),
            });
        }
        if to_owner.kind() == Kind::Atomic && to.direction() == Direction::Out {
            return Err(CouplingError::AtomicOutputAsDestination {
                port: to.full_name(),
            });
        }

        let coupling = Coupling::new(from, to);
        let kind = if self.component.is(&from_owner) && self.is_child(&to_owner) {
            CouplingKind::ExternalInput
        } else if self.is_child(&from_owner) && self.component.is(&to_owner) {
            CouplingKind::ExternalOutput
        } else if self.is_child(&from_owner) && self.is_child(&to_owner) {
            CouplingKind::Internal
        } else {
            return Err(CouplingError::NotChild {
                coupling: coupling.to_string(),
            });
        };

        if self.chained {
            AnyCoupling::register(&coupling)?;
        }
        tracing::trace!(
            container = %self.component.full_name(),
            coupling = %coupling,
            ?kind,
            "coupling added"
        );
        self.couplings_mut(kind).push(Box::new(coupling));

        Ok(kind)
    }

    /// Returns the number of couplings of the specified kind.
    pub fn coupling_count(&self, kind: CouplingKind) -> usize {
        match kind {
            CouplingKind::ExternalInput => self.eic.len(),
            CouplingKind::Internal => self.ic.len(),
            CouplingKind::ExternalOutput => self.eoc.len(),
        }
    }

    /// Enables chaining on this container and all its descendants,
    /// registering the couplings added so far.
    pub fn chain_all(&mut self) -> Result<(), CouplingError> {
        for child in &mut self.components {
            if let Model::Coupled(coupled) = child {
                coupled.chain_all()?;
            }
        }
        if !self.chained {
            self.chained = true;
            for coupling in self.eic.iter().chain(&self.ic).chain(&self.eoc) {
                coupling.register()?;
            }
        }

        Ok(())
    }

    /// Decomposes the container for the coordinator.
    pub(crate) fn into_parts(self) -> CoupledParts {
        let Self {
            component,
            chained,
            components,
            eic,
            ic,
            eoc,
        } = self;

        // Both IC and EOC only read ports of children.
        let mut output_couplings = ic;
        output_couplings.extend(eoc);

        CoupledParts {
            component,
            chained,
            components,
            input_couplings: eic,
            output_couplings,
        }
    }

    fn is_child(&self, node: &Rc<Node>) -> bool {
        self.components.iter().any(|c| c.component().is(node))
    }

    fn couplings_mut(&mut self, kind: CouplingKind) -> &mut Vec<Box<dyn AnyCoupling>> {
        match kind {
            CouplingKind::ExternalInput => &mut self.eic,
            CouplingKind::Internal => &mut self.ic,
            CouplingKind::ExternalOutput => &mut self.eoc,
        }
    }
}

impl fmt::Debug for Coupled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coupled")
            .field("component", &self.component)
            .field("chained", &self.chained)
            .field("components", &self.components)
            .field("eic", &self.eic.len())
            .field("ic", &self.ic.len())
            .field("eoc", &self.eoc.len())
            .finish()
    }
}

/// A coupled model taken apart.
pub(crate) struct CoupledParts {
    pub(crate) component: Component,
    pub(crate) chained: bool,
    pub(crate) components: Vec<Model>,
    pub(crate) input_couplings: Vec<Box<dyn AnyCoupling>>,
    pub(crate) output_couplings: Vec<Box<dyn AnyCoupling>>,
}

fn owner_of<T: Clone + 'static>(port: &Port<T>) -> Result<Rc<Node>, CouplingError> {
    port.owner().ok_or_else(|| CouplingError::UnregisteredPort {
        port: port.full_name(),
    })
}
