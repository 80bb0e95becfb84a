//! Simulation management.
//!
//! This module contains the [`Coordinator`], which drives a model hierarchy
//! through simulated time, and its [`SimInit`] builder.
//!
//! # Simulation lifecycle
//!
//! The lifecycle of a simulation bench typically comprises the following
//! stages:
//!
//! 1. instantiation of atomic models and of the coupled models containing
//!    them,
//! 2. connection of ports with [`Coupled::add_coupling()`],
//! 3. instantiation of a [`SimInit`] builder from the root coupled model,
//! 4. initialization of a [`Coordinator`] with [`SimInit::init()`], which
//!    calls [`Atomic::initialize()`] on every atomic model,
//! 5. discrete-event simulation with [`Coordinator::step()`],
//!    [`Coordinator::step_until()`] or [`Coordinator::simulate_cycles()`],
//!    possibly interleaved with input injection with
//!    [`Coordinator::inject()`],
//! 6. termination with [`Coordinator::exit()`].
//!
//! # Simulation cycle
//!
//! Each cycle processes a single simulation time, namely that of the earliest
//! scheduled internal transition or that of an injection. A cycle:
//!
//! 1. calls [`Atomic::lambda()`] on each imminent model,
//! 2. propagates the couplings of containers without chaining, output
//!    couplings of the deepest containers first, then input couplings of the
//!    shallowest containers first,
//! 3. calls [`Atomic::delta_con()`], [`Atomic::delta_int()`] or
//!    [`Atomic::delta_ext()`] on each model that is imminent and/or has
//!    readable inputs,
//! 4. reschedules the transitioned models,
//! 5. clears all ports.
//!
//! Chained ports need no propagation: they resolve their values from
//! upstream ports on first read.
//!
//! [`Coupled::add_coupling()`]: crate::model::Coupled::add_coupling
mod sim_init;

pub use sim_init::SimInit;

use std::error::Error;
use std::fmt;

use tracing::Span;

use crate::model::{Atomic, Component, Model};
use crate::ports::{AnyCoupling, AnyPort, CouplingError, Direction, Port};
use crate::time::TimeScope;
use crate::util::calendar::{Calendar, EventKey};

/// Sequential root coordinator.
///
/// A `Coordinator` is created by calling [`SimInit::init()`]. It owns the
/// flattened model hierarchy, an event calendar of the next internal
/// transitions, and the current simulation time.
pub struct Coordinator {
    simulators: Vec<Simulator>,
    // Pre-order: each container precedes its descendants.
    containers: Vec<Container>,
    ports: Vec<Box<dyn AnyPort>>,
    calendar: Calendar<usize>,
    time: f64,
    cycles: u64,
    exited: bool,
}

impl Coordinator {
    /// Flattens a hierarchy whose atomic models are not yet initialized.
    pub(crate) fn new(root: Model, start_time: f64) -> Self {
        let mut coordinator = Self {
            simulators: Vec::new(),
            containers: Vec::new(),
            ports: Vec::new(),
            calendar: Calendar::new(),
            time: start_time,
            cycles: 0,
            exited: false,
        };
        coordinator.flatten(root);

        coordinator
    }

    /// Calls the initialization function of every atomic model and schedules
    /// their first internal transition.
    pub(crate) fn initialize(&mut self) {
        let _time = TimeScope::enter(self.time);

        for (idx, simulator) in self.simulators.iter_mut().enumerate() {
            {
                let _enter = simulator.span.enter();
                simulator.model.initialize();
            }
            simulator.time_last = self.time;
            simulator.schedule(self.time, idx, &mut self.calendar);
        }

        tracing::info!(
            models = self.simulators.len(),
            containers = self.containers.len(),
            ports = self.ports.len(),
            start_time = self.time,
            "simulation initialized"
        );
    }

    /// Returns the current simulation time.
    ///
    /// This is the time of the last processed cycle, or the start time or
    /// the target time of [`Coordinator::step_until()`] if more recent.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns the time of the next scheduled internal transition, or
    /// infinity if all models are passive.
    pub fn next_time(&self) -> f64 {
        self.calendar.peek_time().unwrap_or(f64::INFINITY)
    }

    /// Returns the number of cycles processed so far.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    /// Returns the number of atomic models in the hierarchy.
    pub fn model_count(&self) -> usize {
        self.simulators.len()
    }

    /// Advances simulation time to that of the next scheduled internal
    /// transition and processes a cycle.
    ///
    /// This is a no-op if all models are passive.
    pub fn step(&mut self) {
        if let Some(time) = self.calendar.peek_time() {
            self.run_cycle(time);
        }
    }

    /// Iteratively processes cycles until the specified target time, as if
    /// by calling [`Coordinator::step()`] repeatedly.
    ///
    /// Transitions scheduled at the target time are processed. Unless the
    /// target time is infinite, the simulation time upon completion is equal
    /// to the target time, whether or not a transition was scheduled for
    /// that time.
    pub fn step_until(&mut self, target_time: f64) -> Result<(), SimulationError> {
        if target_time.is_nan() || target_time < self.time {
            return Err(SimulationError::InvalidTargetTime);
        }
        while let Some(time) = self.calendar.peek_time() {
            if time > target_time {
                break;
            }
            self.run_cycle(time);
        }
        if target_time.is_finite() {
            self.time = target_time;
        }

        Ok(())
    }

    /// Processes up to `count` cycles and returns the number of cycles
    /// actually processed, which is lower than `count` if all models became
    /// passive.
    pub fn simulate_cycles(&mut self, count: u64) -> u64 {
        for processed in 0..count {
            match self.calendar.peek_time() {
                Some(time) => self.run_cycle(time),
                None => return processed,
            }
        }

        count
    }

    /// Writes values to an input or bidirectional port of the root model and
    /// processes a cycle at the specified time.
    ///
    /// The time may not precede the current simulation time nor exceed the
    /// time of the next scheduled internal transition. If it is equal to the
    /// latter, imminent models undergo a confluent transition.
    pub fn inject<T: Clone + 'static>(
        &mut self,
        time: f64,
        port: &Port<T>,
        values: impl IntoIterator<Item = T>,
    ) -> Result<(), SimulationError> {
        if time.is_nan() || time < self.time || time > self.next_time() || time.is_infinite() {
            return Err(SimulationError::InvalidInjectionTime);
        }
        let is_root_input = matches!(port.direction(), Direction::In | Direction::InOut)
            && port
                .owner()
                .zip(self.containers.first())
                .is_some_and(|(owner, root)| root.component.is(&owner));
        if !is_root_input {
            return Err(SimulationError::NotRootInput {
                port: port.full_name(),
            });
        }

        port.write_many(values);
        tracing::debug!(time, port = %port.full_name(), "input injected");
        self.run_cycle(time);

        Ok(())
    }

    /// Calls the exit function of every atomic model.
    ///
    /// Only the first call has an effect.
    pub fn exit(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;

        let _time = TimeScope::enter(self.time);
        for simulator in &mut self.simulators {
            let _enter = simulator.span.enter();
            simulator.model.exit();
        }

        tracing::info!(
            time = self.time,
            cycles = self.cycles,
            "simulation terminated"
        );
    }

    /// Processes a full cycle at the specified time.
    fn run_cycle(&mut self, time: f64) {
        let _time = TimeScope::enter(time);
        self.time = time;
        self.cycles += 1;

        // Outputs.
        let mut imminent = 0;
        while let Some(idx) = self.calendar.pull_at(time) {
            let simulator = &mut self.simulators[idx];
            simulator.key = None;
            simulator.imminent = true;
            let _enter = simulator.span.enter();
            simulator.model.lambda();
            imminent += 1;
        }
        tracing::debug!(time, imminent, cycle = self.cycles, "cycle started");

        // Propagation.
        for container in self.containers.iter().rev().filter(|c| !c.chained) {
            for coupling in &container.output_couplings {
                coupling.propagate();
                tracing::trace!(coupling = %coupling.label(), "output coupling propagated");
            }
        }
        for container in self.containers.iter().filter(|c| !c.chained) {
            for coupling in &container.input_couplings {
                coupling.propagate();
                tracing::trace!(coupling = %coupling.label(), "input coupling propagated");
            }
        }

        // Transitions.
        for (idx, simulator) in self.simulators.iter_mut().enumerate() {
            let imminent = std::mem::take(&mut simulator.imminent);
            let has_input = !simulator.model.component().in_empty();
            if !imminent && !has_input {
                continue;
            }

            let elapsed = time - simulator.time_last;
            {
                let _enter = simulator.span.enter();
                match (imminent, has_input) {
                    (true, true) => simulator.model.delta_con(elapsed),
                    (true, false) => simulator.model.delta_int(),
                    _ => simulator.model.delta_ext(elapsed),
                }
            }
            simulator.time_last = time;
            simulator.schedule(time, idx, &mut self.calendar);
        }

        for port in &self.ports {
            port.clear();
        }
    }

    fn flatten(&mut self, model: Model) {
        match model {
            Model::Atomic(model) => {
                let component = model.component();
                self.ports.extend(component.port_handles());
                let span = tracing::info_span!(
                    target: env!("CARGO_PKG_NAME"),
                    "model",
                    name = %component.full_name()
                );

                self.simulators.push(Simulator {
                    model,
                    span,
                    time_last: self.time,
                    key: None,
                    imminent: false,
                });
            }
            Model::Coupled(model) => {
                let parts = model.into_parts();
                self.ports.extend(parts.component.port_handles());
                self.containers.push(Container {
                    component: parts.component,
                    chained: parts.chained,
                    input_couplings: parts.input_couplings,
                    output_couplings: parts.output_couplings,
                });
                for child in parts.components {
                    self.flatten(child);
                }
            }
        }
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("time", &self.time)
            .field("next_time", &self.next_time())
            .field("cycles", &self.cycles)
            .field("models", &self.simulators.len())
            .field("scheduled", &self.calendar.len())
            .finish_non_exhaustive()
    }
}

/// An atomic model with its scheduling state.
struct Simulator {
    model: Box<dyn Atomic>,
    span: Span,
    time_last: f64,
    key: Option<EventKey>,
    imminent: bool,
}

impl Simulator {
    /// Schedules the next internal transition after a transition at `time`.
    ///
    /// # Panics
    ///
    /// Panics if the time advance of the model is negative or NaN.
    fn schedule(&mut self, time: f64, idx: usize, calendar: &mut Calendar<usize>) {
        let ta = self.model.ta();
        assert!(
            ta >= 0.0,
            "model '{}' has an invalid time advance: {}",
            self.model.component().full_name(),
            ta
        );

        if let Some(key) = self.key.take() {
            calendar.delete(key);
        }
        if ta.is_finite() {
            self.key = Some(calendar.insert(time + ta, idx));
        }
    }
}

/// A coupled model reduced to its couplings.
struct Container {
    // Kept alive for the naming of descendants.
    component: Component,
    chained: bool,
    input_couplings: Vec<Box<dyn AnyCoupling>>,
    output_couplings: Vec<Box<dyn AnyCoupling>>,
}

/// Error returned when a simulation cannot be built or an operation is
/// invalid at the current simulation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulationError {
    /// The injection time precedes the current simulation time or exceeds
    /// the time of the next internal transition.
    InvalidInjectionTime,
    /// The target time precedes the current simulation time.
    InvalidTargetTime,
    /// Values can only be injected into input or bidirectional ports of the
    /// root model.
    NotRootInput {
        /// Fully-qualified name of the port.
        port: String,
    },
    /// A coupling could not be chained when building the simulation.
    Coupling(CouplingError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInjectionTime => write!(
                fmt,
                "the injection time should lie between the current simulation time and the time of the next internal transition"
            ),
            Self::InvalidTargetTime => write!(
                fmt,
                "the target time should not precede the current simulation time"
            ),
            Self::NotRootInput { port } => {
                write!(fmt, "port '{port}' is not an input port of the root model")
            }
            Self::Coupling(e) => write!(fmt, "invalid coupling: {e}"),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Coupling(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CouplingError> for SimulationError {
    fn from(e: CouplingError) -> Self {
        Self::Coupling(e)
    }
}
