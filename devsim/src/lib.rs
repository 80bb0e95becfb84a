//! A sequential discrete-event simulation kernel implementing the DEVS
//! formalism.
//!
//! In DEVS (Discrete Event System Specification), a system is described as a
//! hierarchy of *atomic models*, which are state machines evolving at
//! discrete points in simulated time, and *coupled models*, which are
//! containers joining the ports of their children with *couplings*. Models
//! only communicate by writing events to their output ports, which are
//! delivered through couplings to the input ports of other models.
//!
//! Devsim focuses on the efficient delivery of events through deeply nested
//! hierarchies: when *chaining* is enabled on a coupled model, the input
//! ports of its children resolve their values lazily from the upstream
//! ports, once per cycle, instead of having values copied through every
//! level of the hierarchy.
//!
//! # A practical overview
//!
//! Simulating a system typically involves three distinct activities:
//!
//! 1. the design of atomic models,
//! 2. the assembly of a simulation bench from coupled models, performed by
//!    coupling model ports,
//! 3. the execution of the simulation with a [`Coordinator`] built by
//!    [`SimInit`].
//!
//! ## Authoring models
//!
//! An atomic model embeds a [`Component`](model::Component) holding its name
//! and its [`Port`](ports::Port)s, as well as an
//! [`AtomicState`](model::AtomicState) holding its *phase* and its
//! *remaining time*, that is the simulated time left before its next internal
//! transition. It implements the [`Atomic`](model::Atomic) trait:
//!
//! * [`ta()`](model::Atomic::ta) returns the remaining time, infinite when
//!   the model is passive,
//! * [`lambda()`](model::Atomic::lambda) writes outputs when the remaining
//!   time has elapsed,
//! * [`delta_int()`](model::Atomic::delta_int) sets the state following
//!   the output,
//! * [`delta_ext()`](model::Atomic::delta_ext) sets the state when inputs
//!   are received.
//!
//! #### A simple model
//!
//! Let us consider a model that forwards its inputs after multiplying them
//! by 2:
//!
//! ```text
//!                ┌────────────┐
//!                │            │
//! Input ●───────▶│  Doubler   ├───────▶ Output
//!          f64   │            │  f64
//!                └────────────┘
//! ```
//!
//! `Doubler` could be implemented as follows:
//!
//! ```
//! use devsim::model::{Atomic, AtomicState, Component, DefaultPhase};
//! use devsim::ports::Port;
//!
//! pub struct Doubler {
//!     component: Component,
//!     state: AtomicState<DefaultPhase>,
//!     values: Vec<f64>,
//!     pub input: Port<f64>,
//!     pub output: Port<f64>,
//! }
//! impl Doubler {
//!     pub fn new(name: &str) -> Self {
//!         let mut component = Component::new(name);
//!         let input = Port::new("in");
//!         let output = Port::new("out");
//!         component.add_in_port(&input);
//!         component.add_out_port(&output);
//!
//!         Self { component, state: AtomicState::passive(), values: Vec::new(), input, output }
//!     }
//! }
//! impl Atomic for Doubler {
//!     fn component(&self) -> &Component {
//!         &self.component
//!     }
//!     fn ta(&self) -> f64 {
//!         self.state.sigma()
//!     }
//!     fn delta_int(&mut self) {
//!         self.values.clear();
//!         self.state.passivate();
//!     }
//!     fn delta_ext(&mut self, _elapsed: f64) {
//!         self.values.extend(self.input.read_all().iter());
//!         self.state.hold_in(DefaultPhase::Active, 0.0);
//!     }
//!     fn lambda(&self) {
//!         self.output.write_many(self.values.iter().map(|v| 2.0 * v));
//!     }
//! }
//! ```
//!
//! ## Assembling a bench
//!
//! Models are added to a [`Coupled`](model::Coupled) model, and their ports
//! coupled with [`Coupled::add_coupling()`](model::Coupled::add_coupling).
//! A coupling may join an input of the container to an input of a child, an
//! output of a child to an input of another child, or an output of a child
//! to an output of the container. Containers can be nested at will.
//!
//! ## Running a simulation
//!
//! The root coupled model is handed over to a [`SimInit`] builder which
//! produces a [`Coordinator`]. The coordinator advances simulation time from
//! one internal transition to the next with [`Coordinator::step()`],
//! [`Coordinator::step_until()`] or [`Coordinator::simulate_cycles()`], and
//! can also deliver external inputs to the root model with
//! [`Coordinator::inject()`].
//!
//! #### An example bench
//!
//! A [`Step`](models::Step) source emits 0 at *t*=0 and 10 at *t*=15. Its
//! output is doubled and recorded:
//!
//! ```text
//!  ┌──────────────────────────────────────────────┐
//!  │ root                                         │
//!  │ ┌────────┐     ┌─────────┐     ┌──────────┐  │
//!  │ │  Step  ├────▶│ Doubler ├────▶│ Recorder │  │
//!  │ └────────┘     └─────────┘     └──────────┘  │
//!  └──────────────────────────────────────────────┘
//! ```
//!
//! ```
//! # use devsim::model::{Atomic, AtomicState, Component, DefaultPhase};
//! # use devsim::ports::Port;
//! # pub struct Doubler {
//! #     component: Component,
//! #     state: AtomicState<DefaultPhase>,
//! #     values: Vec<f64>,
//! #     pub input: Port<f64>,
//! #     pub output: Port<f64>,
//! # }
//! # impl Doubler {
//! #     pub fn new(name: &str) -> Self {
//! #         let mut component = Component::new(name);
//! #         let input = Port::new("in");
//! #         let output = Port::new("out");
//! #         component.add_in_port(&input);
//! #         component.add_out_port(&output);
//! #         Self { component, state: AtomicState::passive(), values: Vec::new(), input, output }
//! #     }
//! # }
//! # impl Atomic for Doubler {
//! #     fn component(&self) -> &Component { &self.component }
//! #     fn ta(&self) -> f64 { self.state.sigma() }
//! #     fn delta_int(&mut self) { self.values.clear(); self.state.passivate(); }
//! #     fn delta_ext(&mut self, _elapsed: f64) {
//! #         self.values.extend(self.input.read_all().iter());
//! #         self.state.hold_in(DefaultPhase::Active, 0.0);
//! #     }
//! #     fn lambda(&self) { self.output.write_many(self.values.iter().map(|v| 2.0 * v)); }
//! # }
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use devsim::model::Coupled;
//! use devsim::models::Step;
//! use devsim::simulation::SimInit;
//!
//! // A passive model recording the time and value of its inputs.
//! pub struct Recorder {
//!     component: Component,
//!     clock: f64,
//!     pub input: Port<f64>,
//!     pub log: Rc<RefCell<Vec<(f64, f64)>>>,
//! }
//! impl Recorder {
//!     pub fn new(name: &str) -> Self {
//!         let mut component = Component::new(name);
//!         let input = Port::new("in");
//!         component.add_in_port(&input);
//!
//!         Self { component, clock: 0.0, input, log: Default::default() }
//!     }
//! }
//! impl Atomic for Recorder {
//!     fn component(&self) -> &Component {
//!         &self.component
//!     }
//!     fn ta(&self) -> f64 {
//!         f64::INFINITY
//!     }
//!     fn delta_int(&mut self) {}
//!     fn delta_ext(&mut self, elapsed: f64) {
//!         self.clock += elapsed;
//!         for value in self.input.read_all().iter() {
//!             self.log.borrow_mut().push((self.clock, *value));
//!         }
//!     }
//!     fn lambda(&self) {}
//! }
//!
//! // Models.
//! let step = Step::new("step", 0.0, 15.0, 10.0);
//! let doubler = Doubler::new("doubler");
//! let recorder = Recorder::new("recorder");
//!
//! // Handles to the ports and to the log.
//! let step_out = step.output.clone();
//! let (doubler_in, doubler_out) = (doubler.input.clone(), doubler.output.clone());
//! let recorder_in = recorder.input.clone();
//! let log = recorder.log.clone();
//!
//! // Assembly.
//! let mut root = Coupled::new("root");
//! root.add_atomic(step);
//! root.add_atomic(doubler);
//! root.add_atomic(recorder);
//! root.add_coupling(&step_out, &doubler_in).unwrap();
//! root.add_coupling(&doubler_out, &recorder_in).unwrap();
//!
//! // Simulation.
//! let mut simu = SimInit::new(root).init().unwrap();
//! simu.step_until(100.0).unwrap();
//! simu.exit();
//!
//! assert_eq!(*log.borrow(), vec![(0.0, 0.0), (15.0, 20.0)]);
//! assert_eq!(simu.time(), 100.0);
//! ```
//!
//! # Logging
//!
//! Model functions are called within `model` spans of the
//! [`tracing`](https://docs.rs/tracing) crate
//! named after the models. With the `tracing-timer` feature, the
//! `tracing` module provides a timer stamping log events with the simulation
//! time.
//!
//! # Feature flags
//!
//! * `tracing-timer`: simulation-time stamping of logs with
//!   [`tracing-subscriber`](https://docs.rs/tracing-subscriber),
//! * `dev-hooks`: unstable exports of internals, meant for benchmarking.
//!
//! [`Coordinator`]: simulation::Coordinator
//! [`Coordinator::step()`]: simulation::Coordinator::step
//! [`Coordinator::step_until()`]: simulation::Coordinator::step_until
//! [`Coordinator::simulate_cycles()`]: simulation::Coordinator::simulate_cycles
//! [`Coordinator::inject()`]: simulation::Coordinator::inject
//! [`SimInit`]: simulation::SimInit
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg_hide))]
#![cfg_attr(docsrs, doc(cfg_hide(feature = "dev-hooks")))]

pub mod model;
pub mod models;
pub mod ports;
pub mod simulation;
pub(crate) mod time;
#[cfg(feature = "tracing-timer")]
pub mod tracing;
pub(crate) mod util;

#[cfg(feature = "dev-hooks")]
pub mod dev_hooks;
