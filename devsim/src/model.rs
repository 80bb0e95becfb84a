//! Atomic and coupled models.
//!
//! # Atomic models
//!
//! An atomic model is a state machine whose state comprises a *phase* and a
//! *remaining time*, see [`AtomicState`]. Atomic models implement the
//! [`Atomic`] trait, which is driven by the coordinator as follows:
//!
//! * when the remaining time elapses, the model is *imminent*: its output
//!   function [`Atomic::lambda()`] is called, followed by its internal
//!   transition function [`Atomic::delta_int()`],
//! * when events arrive on its input ports, its external transition function
//!   [`Atomic::delta_ext()`] is called with the time elapsed since the last
//!   transition,
//! * when both happen in the same cycle, [`Atomic::delta_con()`] is called
//!   after the output function.
//!
//! Transition functions set the next state with
//! [`AtomicState::hold_in()`] or [`AtomicState::passivate()`].
//!
//! #### Example
//!
//! A model that forwards each input after a fixed delay, dropping inputs
//! received while busy:
//!
//! ```
//! use devsim::model::{Atomic, AtomicState, Component, DefaultPhase};
//! use devsim::ports::Port;
//!
//! pub struct Delay {
//!     component: Component,
//!     state: AtomicState<DefaultPhase>,
//!     delay: f64,
//!     value: Option<f64>,
//!     pub input: Port<f64>,
//!     pub output: Port<f64>,
//! }
//!
//! impl Delay {
//!     pub fn new(name: &str, delay: f64) -> Self {
//!         let mut component = Component::new(name);
//!         let input = Port::new("in");
//!         let output = Port::new("out");
//!         component.add_in_port(&input);
//!         component.add_out_port(&output);
//!
//!         Self {
//!             component,
//!             state: AtomicState::passive(),
//!             delay,
//!             value: None,
//!             input,
//!             output,
//!         }
//!     }
//! }
//!
//! impl Atomic for Delay {
//!     fn component(&self) -> &Component {
//!         &self.component
//!     }
//!     fn ta(&self) -> f64 {
//!         self.state.sigma()
//!     }
//!     fn delta_int(&mut self) {
//!         self.value = None;
//!         self.state.passivate();
//!     }
//!     fn delta_ext(&mut self, elapsed: f64) {
//!         if self.state.phase_is(DefaultPhase::Passive) {
//!             if let Ok(value) = self.input.read_single() {
//!                 self.value = Some(value);
//!                 self.state.hold_in(DefaultPhase::Active, self.delay);
//!             }
//!         } else {
//!             let sigma = self.state.sigma() - elapsed;
//!             self.state.hold_in(DefaultPhase::Active, sigma);
//!         }
//!     }
//!     fn lambda(&self) {
//!         if let Some(value) = self.value {
//!             self.output.write(value);
//!         }
//!     }
//! }
//! ```
//!
//! # Coupled models
//!
//! A [`Coupled`] model is a container of atomic and coupled models joined by
//! couplings between their ports. It has no behavior of its own.
mod atomic;
pub(crate) mod component;
mod coupled;
mod state;

pub use atomic::Atomic;
pub use component::Component;
pub use coupled::{Coupled, CouplingKind};
pub use state::{AtomicState, DefaultPhase, Phase};

/// A model of the hierarchy: either atomic or coupled.
pub enum Model {
    /// A leaf model.
    Atomic(Box<dyn Atomic>),
    /// A container model.
    Coupled(Box<Coupled>),
}

impl Model {
    /// Returns the component of the model.
    pub fn component(&self) -> &Component {
        match self {
            Model::Atomic(model) => model.component(),
            Model::Coupled(model) => model.component(),
        }
    }

    /// Returns the local name of the model.
    pub fn name(&self) -> String {
        self.component().name()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Model::Atomic(model) => f.debug_tuple("Atomic").field(model.component()).finish(),
            Model::Coupled(model) => f.debug_tuple("Coupled").field(model).finish(),
        }
    }
}
