//! Example: a step source observed by a console.
//!
//! This example demonstrates in particular:
//!
//! * the use of a library model,
//! * the observation of outputs with a passive sink model,
//! * bounded simulation with `step_until`.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ root                                 │
//! │   ┌────────┐  f64   ┌───────────┐    │
//! │   │  Step  ├───────►│  Console  │    │
//! │   └────────┘        └───────────┘    │
//! └──────────────────────────────────────┘
//! ```
use std::cell::RefCell;
use std::rc::Rc;

use devsim::model::{Atomic, Component, Coupled};
use devsim::models::Step;
use devsim::ports::Port;
use devsim::simulation::{SimInit, SimulationError};

/// A passive sink logging and recording every value it receives.
pub struct Console {
    component: Component,
    clock: f64,
    /// Input port -- `in`.
    pub input: Port<f64>,
    received: Rc<RefCell<Vec<(f64, f64)>>>,
}

impl Console {
    /// Creates a console.
    pub fn new(name: &str) -> Self {
        let mut component = Component::new(name);
        let input = Port::new("in");
        component.add_in_port(&input);

        Self {
            component,
            clock: 0.0,
            input,
            received: Default::default(),
        }
    }

    /// Returns a handle to the received values and their time of arrival.
    pub fn received(&self) -> Rc<RefCell<Vec<(f64, f64)>>> {
        self.received.clone()
    }
}

impl Atomic for Console {
    fn component(&self) -> &Component {
        &self.component
    }

    fn ta(&self) -> f64 {
        f64::INFINITY
    }

    fn delta_int(&mut self) {}

    fn delta_ext(&mut self, elapsed: f64) {
        self.clock += elapsed;
        for value in self.input.read_all().iter() {
            tracing::info!(time = self.clock, value, "value received");
            self.received.borrow_mut().push((self.clock, *value));
        }
    }

    fn lambda(&self) {}
}

fn main() -> Result<(), SimulationError> {
    tracing_subscriber::fmt::init();

    // ---------------
    // Bench assembly.
    // ---------------

    // Models.
    let step = Step::new("step", 0.0, 15.0, 10.0);
    let console = Console::new("console");

    // Model handles for simulation.
    let step_out = step.output.clone();
    let console_in = console.input.clone();
    let received = console.received();

    // Assembly and initialization.
    let mut root = Coupled::new("root");
    root.add_atomic(step);
    root.add_atomic(console);
    root.add_coupling(&step_out, &console_in)?;

    let mut simu = SimInit::new(root).init()?;

    // ----------
    // Simulation.
    // ----------

    simu.step_until(30.0)?;
    simu.exit();

    assert_eq!(*received.borrow(), vec![(0.0, 0.0), (15.0, 10.0)]);
    assert_eq!(simu.time(), 30.0);

    Ok(())
}
