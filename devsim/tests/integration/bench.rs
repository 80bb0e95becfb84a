//! Models and benches shared by the integration tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use devsim::model::{Atomic, AtomicState, Component, Coupled, DefaultPhase};
use devsim::ports::Port;

/// Transition counters shared by all the atomic models of a bench.
#[derive(Default, Debug)]
pub struct Counters {
    pub internal: Cell<u64>,
    pub external: Cell<u64>,
    pub events: Cell<u64>,
}

/// The atomic model of DEVStone benches: forwards a token after a fixed
/// preparation time.
pub struct DevStoneAtomic {
    component: Component,
    state: AtomicState<DefaultPhase>,
    preparation_time: f64,
    counters: Rc<Counters>,
    pub input: Port<u64>,
    pub output: Port<u64>,
}

impl DevStoneAtomic {
    pub fn new(name: &str, preparation_time: f64, counters: Rc<Counters>) -> Self {
        let mut component = Component::new(name);
        let input = Port::new("in");
        let output = Port::new("out");
        component.add_in_port(&input);
        component.add_out_port(&output);

        Self {
            component,
            state: AtomicState::passive(),
            preparation_time,
            counters,
            input,
            output,
        }
    }
}

impl Atomic for DevStoneAtomic {
    fn component(&self) -> &Component {
        &self.component
    }
    fn ta(&self) -> f64 {
        self.state.sigma()
    }
    fn delta_int(&mut self) {
        self.counters.internal.set(self.counters.internal.get() + 1);
        self.state.passivate();
    }
    fn delta_ext(&mut self, _: f64) {
        self.counters.external.set(self.counters.external.get() + 1);
        let events = self.input.len() as u64;
        self.counters.events.set(self.counters.events.get() + events);
        self.state.hold_in(DefaultPhase::Active, self.preparation_time);
    }
    fn lambda(&self) {
        self.output.write(0);
    }
}

/// A DEVStone coupled model with its ports.
pub struct DevStone {
    pub model: Coupled,
    pub input: Port<u64>,
    pub output: Port<u64>,
}

/// Topology of a DEVStone bench.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Topology {
    /// Atomic models of a level are only connected to the level input.
    Li,
    /// Like `Li`, with each atomic model also feeding the next one.
    Hi,
}

/// Builds a DEVStone bench of the specified width and depth.
///
/// The `chained` predicate decides, from the level depth, whether a
/// container is created with chaining enabled.
pub fn devstone(
    topology: Topology,
    width: usize,
    depth: usize,
    counters: &Rc<Counters>,
    chained: &dyn Fn(usize) -> bool,
) -> DevStone {
    let name = format!("c{}", depth - 1);
    let mut model = if chained(depth) {
        Coupled::with_chaining(name)
    } else {
        Coupled::new(name)
    };
    let input = Port::new("in");
    let output = Port::new("out");
    model.add_in_port(&input);
    model.add_out_port(&output);

    if depth == 1 {
        let atomic = DevStoneAtomic::new("a1", 0.0, counters.clone());
        let (a_in, a_out) = (atomic.input.clone(), atomic.output.clone());
        model.add_atomic(atomic);
        model.add_coupling(&input, &a_in).unwrap();
        model.add_coupling(&a_out, &output).unwrap();

        return DevStone {
            model,
            input,
            output,
        };
    }

    let sub = devstone(topology, width, depth - 1, counters, chained);
    model.add_coupled(sub.model);
    model.add_coupling(&input, &sub.input).unwrap();
    model.add_coupling(&sub.output, &output).unwrap();

    let mut previous: Option<Port<u64>> = None;
    for i in 1..width {
        let atomic = DevStoneAtomic::new(&format!("a{i}"), 0.0, counters.clone());
        let (a_in, a_out) = (atomic.input.clone(), atomic.output.clone());
        model.add_atomic(atomic);
        model.add_coupling(&input, &a_in).unwrap();
        if topology == Topology::Hi {
            if let Some(previous) = &previous {
                model.add_coupling(previous, &a_in).unwrap();
            }
        }
        previous = Some(a_out);
    }

    DevStone {
        model,
        input,
        output,
    }
}

/// A passive model recording the simulation time and value of its inputs.
pub struct Recorder<T: Clone + 'static> {
    component: Component,
    clock: f64,
    pub input: Port<T>,
    pub log: Rc<RefCell<Vec<(f64, T)>>>,
}

impl<T: Clone + 'static> Recorder<T> {
    pub fn new(name: &str, start_time: f64) -> Self {
        let mut component = Component::new(name);
        let input = Port::new("in");
        component.add_in_port(&input);

        Self {
            component,
            clock: start_time,
            input,
            log: Default::default(),
        }
    }
}

impl<T: Clone + 'static> Atomic for Recorder<T> {
    fn component(&self) -> &Component {
        &self.component
    }
    fn ta(&self) -> f64 {
        f64::INFINITY
    }
    fn delta_int(&mut self) {
        panic!("a passive model cannot undergo an internal transition");
    }
    fn delta_ext(&mut self, elapsed: f64) {
        self.clock += elapsed;
        let mut log = self.log.borrow_mut();
        for value in self.input.read_all().iter() {
            log.push((self.clock, value.clone()));
        }
    }
    fn lambda(&self) {
        panic!("a passive model cannot produce outputs");
    }
}
