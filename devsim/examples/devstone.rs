//! Example: DEVStone synthetic benchmark.
//!
//! This example demonstrates in particular:
//!
//! * deeply nested hierarchies built recursively,
//! * the equivalence of chained and non-chained event delivery,
//! * the performance benefit of chaining on deep hierarchies.
//!
//! Each level of depth `d > 1` contains the level of depth `d - 1` and
//! `width - 1` atomic models; the innermost level contains a single atomic
//! model. Every atomic model forwards a token after receiving one. Three
//! topologies are available:
//!
//! * `LI`: atomic models are only fed by the level input,
//! * `HI`: each atomic model also feeds the next one,
//! * `HO`: like `HI`, with a second input feeding the atomic models and a
//!   second output collecting their tokens.
//!
//! ```text
//!  ┌─────────────────────────────────────────────┐
//!  │ c(d-1)               ┌──────────────┐       │
//!  │              ┌──────►│    c(d-2)    ├──────►├──► out
//!  │              │       └──────────────┘       │
//!  │              │       ┌────┐   ┌────┐        │
//!  │  in ●────────┼──────►│ a1 ├──►│ a2 │ ...    │
//!  │              └──────►└────┘   └────┘        │
//!  └─────────────────────────────────────────────┘
//! ```
//!
//! Usage: `cargo run --release --example devstone -- [LI|HI|HO] [width] [depth]`
use std::cell::Cell;
use std::env;
use std::rc::Rc;
use std::time::Instant;

use devsim::model::{Atomic, AtomicState, Component, Coupled, DefaultPhase};
use devsim::models::Generator;
use devsim::ports::{CouplingError, Port};
use devsim::simulation::{SimInit, SimulationError};

/// Transition counters shared by all atomic models.
#[derive(Debug, Default)]
struct Counters {
    internal: Cell<u64>,
    external: Cell<u64>,
}

/// DEVStone atomic model.
struct Stone {
    component: Component,
    state: AtomicState<DefaultPhase>,
    counters: Rc<Counters>,
    input: Port<u64>,
    output: Port<u64>,
}

impl Stone {
    fn new(name: String, counters: &Rc<Counters>) -> Self {
        let mut component = Component::new(name);
        let input = Port::new("in");
        let output = Port::new("out");
        component.add_in_port(&input);
        component.add_out_port(&output);

        Self {
            component,
            state: AtomicState::passive(),
            counters: counters.clone(),
            input,
            output,
        }
    }
}

impl Atomic for Stone {
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

    fn delta_ext(&mut self, _elapsed: f64) {
        self.counters.external.set(self.counters.external.get() + 1);
        self.state.hold_in(DefaultPhase::Active, 0.0);
    }

    fn lambda(&self) {
        self.output.write(0);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Topology {
    Li,
    Hi,
    Ho,
}

/// A DEVStone level with its ports.
struct Level {
    model: Coupled,
    input: Port<u64>,
    input_aux: Port<u64>,
    output: Port<u64>,
    output_aux: Port<u64>,
}

fn build(
    topology: Topology,
    width: usize,
    depth: usize,
    chained: bool,
    counters: &Rc<Counters>,
) -> Result<Level, CouplingError> {
    let name = format!("c{}", depth - 1);
    let mut model = if chained {
        Coupled::with_chaining(name)
    } else {
        Coupled::new(name)
    };
    let input = Port::new("in");
    let input_aux = Port::new("in_aux");
    let output = Port::new("out");
    let output_aux = Port::new("out_aux");
    model.add_in_port(&input);
    model.add_out_port(&output);
    if topology == Topology::Ho {
        model.add_in_port(&input_aux);
        model.add_out_port(&output_aux);
    }

    if depth == 1 {
        let stone = Stone::new("a1".into(), counters);
        let (a_in, a_out) = (stone.input.clone(), stone.output.clone());
        model.add_atomic(stone);
        model.add_coupling(&input, &a_in)?;
        model.add_coupling(&a_out, &output)?;
    } else {
        let sub = build(topology, width, depth - 1, chained, counters)?;
        model.add_coupled(sub.model);
        model.add_coupling(&input, &sub.input)?;
        model.add_coupling(&sub.output, &output)?;
        if topology == Topology::Ho {
            model.add_coupling(&input, &sub.input_aux)?;
        }

        let level_input = match topology {
            Topology::Li | Topology::Hi => &input,
            Topology::Ho => &input_aux,
        };
        let mut previous: Option<Port<u64>> = None;
        for i in 1..width {
            let stone = Stone::new(format!("a{i}"), counters);
            let (a_in, a_out) = (stone.input.clone(), stone.output.clone());
            model.add_atomic(stone);
            model.add_coupling(level_input, &a_in)?;
            if topology != Topology::Li {
                if let Some(previous) = &previous {
                    model.add_coupling(previous, &a_in)?;
                }
            }
            if topology == Topology::Ho {
                model.add_coupling(&a_out, &output_aux)?;
            }
            previous = Some(a_out);
        }
    }

    Ok(Level {
        model,
        input,
        input_aux,
        output,
        output_aux,
    })
}

/// Runs a benchmark and returns the internal and external transition
/// counts.
fn run(
    topology: Topology,
    width: usize,
    depth: usize,
    chained: bool,
) -> Result<(u64, u64), SimulationError> {
    let counters = Rc::new(Counters::default());
    let level = build(topology, width, depth, chained, &counters)?;
    let generator = Generator::new("generator", 0.0, 1.0).with_max_events(1);
    let gen_out = generator.output.clone();

    let mut root = Coupled::new("devstone");
    root.add_atomic(generator);
    root.add_coupled(level.model);
    root.add_coupling(&gen_out, &level.input)?;
    if topology == Topology::Ho {
        root.add_coupling(&gen_out, &level.input_aux)?;
    }
    // Unused by the benchmark.
    let _ = (level.output, level.output_aux);

    let start = Instant::now();
    let mut simu = SimInit::new(root).init()?;
    simu.step_until(f64::INFINITY)?;
    simu.exit();

    tracing::info!(
        ?topology,
        width,
        depth,
        chained,
        cycles = simu.cycle_count(),
        internal = counters.internal.get(),
        external = counters.external.get(),
        elapsed = ?start.elapsed(),
        "benchmark completed"
    );

    Ok((counters.internal.get(), counters.external.get()))
}

fn main() -> Result<(), SimulationError> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let topologies = match args.first().map(|a| a.to_uppercase()).as_deref() {
        Some("LI") => vec![Topology::Li],
        Some("HI") => vec![Topology::Hi],
        Some("HO") => vec![Topology::Ho],
        _ => vec![Topology::Li, Topology::Hi, Topology::Ho],
    };
    let width = args.get(1).and_then(|a| a.parse().ok()).unwrap_or(10usize).max(2);
    let depth = args.get(2).and_then(|a| a.parse().ok()).unwrap_or(10usize).max(2);

    for topology in topologies {
        let plain = run(topology, width, depth, false)?;
        let chained = run(topology, width, depth, true)?;
        assert_eq!(plain, chained);

        let (w, d) = (width as u64, depth as u64);
        match topology {
            Topology::Li => assert_eq!(plain, ((w - 1) * (d - 1) + 1, (w - 1) * (d - 1) + 1)),
            Topology::Hi => {
                let expected = w * (w - 1) / 2 * (d - 1) + 1;
                assert_eq!(plain, (expected, expected));
            }
            Topology::Ho => {}
        }
    }

    Ok(())
}
