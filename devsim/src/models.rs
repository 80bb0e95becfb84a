//! Library of ready-to-use atomic models.
//!
//! * [`Step`]: a source emitting an initial value, then a final value after
//!   a delay,
//! * [`Generator`]: a periodic source of numbered events which can be
//!   stopped by an input event.

use crate::model::{Atomic, AtomicState, Component, DefaultPhase, Phase};
use crate::ports::Port;

/// Phase of a [`Step`] source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StepPhase {
    /// The initial value is about to be emitted.
    Initial,
    /// The final value is about to be emitted.
    Final,
    /// Both values were emitted.
    Passive,
}

impl Phase for StepPhase {
    const PASSIVE: Self = StepPhase::Passive;

    fn name(&self) -> &'static str {
        match self {
            StepPhase::Initial => "initial",
            StepPhase::Final => "final",
            StepPhase::Passive => "passive",
        }
    }
}

/// A step source.
///
/// The initial value is emitted at the start of the simulation and the final
/// value after the step time. The model then passivates.
pub struct Step {
    component: Component,
    state: AtomicState<StepPhase>,
    initial_value: f64,
    step_time: f64,
    final_value: f64,

    /// Output port, named `out`.
    pub output: Port<f64>,
}

impl Step {
    /// Creates a step source.
    ///
    /// # Panics
    ///
    /// Panics if the step time is negative or NaN.
    pub fn new(name: &str, initial_value: f64, step_time: f64, final_value: f64) -> Self {
        assert!(step_time >= 0.0, "the step time should be non-negative");

        let mut component = Component::new(name);
        let output = Port::new("out");
        component.add_out_port(&output);

        Self {
            component,
            state: AtomicState::new(StepPhase::Initial, 0.0),
            initial_value,
            step_time,
            final_value,
            output,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> StepPhase {
        self.state.phase()
    }
}

impl Atomic for Step {
    fn component(&self) -> &Component {
        &self.component
    }

    fn ta(&self) -> f64 {
        self.state.sigma()
    }

    fn initialize(&mut self) {
        self.state.hold_in(StepPhase::Initial, 0.0);
    }

    fn delta_int(&mut self) {
        match self.state.phase() {
            StepPhase::Initial => self.state.hold_in(StepPhase::Final, self.step_time),
            StepPhase::Final | StepPhase::Passive => self.state.passivate(),
        }
    }

    fn delta_ext(&mut self, elapsed: f64) {
        // No input port: keep the schedule unchanged.
        let sigma = self.state.sigma() - elapsed;
        self.state.hold_in(self.state.phase(), sigma.max(0.0));
    }

    fn lambda(&self) {
        match self.state.phase() {
            StepPhase::Initial => self.output.write(self.initial_value),
            StepPhase::Final => self.output.write(self.final_value),
            StepPhase::Passive => {}
        }
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.component.full_name())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// A periodic generator of numbered events.
///
/// Events are numbered from 1. The first event is emitted after the offset
/// and the next ones at each period, until the maximum number of events is
/// reached or any value is received on the `stop` port.
pub struct Generator {
    component: Component,
    state: AtomicState<DefaultPhase>,
    offset: f64,
    period: f64,
    max_events: u64,
    count: u64,

    /// Stop port, named `stop`.
    pub stop: Port<()>,
    /// Output port, named `out`.
    pub output: Port<u64>,
}

impl Generator {
    /// Creates a generator emitting its first event after `offset` and the
    /// following ones every `period`.
    ///
    /// # Panics
    ///
    /// Panics if the offset is negative or NaN, or if the period is not
    /// strictly positive.
    pub fn new(name: &str, offset: f64, period: f64) -> Self {
        assert!(offset >= 0.0, "the offset should be non-negative");
        assert!(period > 0.0, "the period should be strictly positive");

        let mut component = Component::new(name);
        let stop = Port::new("stop");
        let output = Port::new("out");
        component.add_in_port(&stop);
        component.add_out_port(&output);

        Self {
            component,
            state: AtomicState::passive(),
            offset,
            period,
            max_events: u64::MAX,
            count: 0,
            stop,
            output,
        }
    }

    /// Limits the number of emitted events.
    pub fn with_max_events(mut self, max_events: u64) -> Self {
        self.max_events = max_events;

        self
    }

    /// Returns the number of events emitted so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Atomic for Generator {
    fn component(&self) -> &Component {
        &self.component
    }

    fn ta(&self) -> f64 {
        self.state.sigma()
    }

    fn initialize(&mut self) {
        self.count = 0;
        if self.max_events > 0 {
            self.state.hold_in(DefaultPhase::Active, self.offset);
        } else {
            self.state.passivate();
        }
    }

    fn delta_int(&mut self) {
        self.count += 1;
        if self.count < self.max_events {
            self.state.hold_in(DefaultPhase::Active, self.period);
        } else {
            self.state.passivate();
        }
    }

    fn delta_ext(&mut self, elapsed: f64) {
        if !self.stop.is_empty() {
            tracing::debug!(count = self.count, "generator stopped");
            self.state.passivate();
        } else {
            let sigma = self.state.sigma() - elapsed;
            self.state.hold_in(self.state.phase(), sigma.max(0.0));
        }
    }

    fn lambda(&self) {
        self.output.write(self.count + 1);
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("name", &self.component.full_name())
            .field("state", &self.state)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}
