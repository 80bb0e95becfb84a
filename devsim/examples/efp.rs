//! Example: a processor observed by an experimental frame.
//!
//! This example demonstrates in particular:
//!
//! * custom phases,
//! * a hierarchy mixing chained and non-chained containers,
//! * internal feedback couplings,
//! * simulation-time stamping of logs.
//!
//! The experimental frame generates jobs, measures the turnaround time of the
//! processor and stops the generator at the end of the observation window.
//! Jobs that arrive while the processor is busy are dropped.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ efp                                                     │
//! │ ┌───────────────────────────────────────┐               │
//! │ │ ef (chained)                          │               │
//! │ │  ┌───────────┐ jobs                   │    ┌───────┐  │
//! │ │  │ Generator ├───────────────────────►├───►│   P   │  │
//! │ │  └───────────┘                        │    └───┬───┘  │
//! │ │    ▲  │arrived   ┌────────────┐       │        │      │
//! │ │    │  └─────────►│            │solved │        │      │
//! │ │    │ stop        │ Transducer │◄──────┤◄───────┘      │
//! │ │    └─────────────┤            │       │               │
//! │ │                  └────────────┘       │               │
//! │ └───────────────────────────────────────┘               │
//! └─────────────────────────────────────────────────────────┘
//! ```
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use devsim::model::{Atomic, AtomicState, Component, Coupled, DefaultPhase, Phase};
use devsim::models::Generator;
use devsim::ports::Port;
use devsim::simulation::{SimInit, SimulationError};
use devsim::tracing::SimulationTime;

/// Job processor.
pub struct Processor {
    component: Component,
    state: AtomicState<DefaultPhase>,
    processing_time: f64,
    job: Option<u64>,
    /// Incoming jobs -- input port `in`.
    pub input: Port<u64>,
    /// Processed jobs -- output port `out`.
    pub output: Port<u64>,
}

impl Processor {
    /// Creates a processor with the specified processing time.
    pub fn new(name: &str, processing_time: f64) -> Self {
        let mut component = Component::new(name);
        let input = Port::new("in");
        let output = Port::new("out");
        component.add_in_port(&input);
        component.add_out_port(&output);

        Self {
            component,
            state: AtomicState::passive(),
            processing_time,
            job: None,
            input,
            output,
        }
    }
}

impl Atomic for Processor {
    fn component(&self) -> &Component {
        &self.component
    }

    fn ta(&self) -> f64 {
        self.state.sigma()
    }

    fn delta_int(&mut self) {
        self.job = None;
        self.state.passivate();
    }

    fn delta_ext(&mut self, elapsed: f64) {
        if self.state.is_passive() {
            if let Ok(job) = self.input.read_single() {
                tracing::debug!(job, "job accepted");
                self.job = Some(job);
                self.state.hold_in(DefaultPhase::Active, self.processing_time);
            }
        } else {
            for job in self.input.read_all().iter() {
                tracing::debug!(job, "job dropped");
            }
            let sigma = self.state.sigma() - elapsed;
            self.state.hold_in(DefaultPhase::Active, sigma);
        }
    }

    fn lambda(&self) {
        if let Some(job) = self.job {
            self.output.write(job);
        }
    }
}

/// Phase of the transducer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransducerPhase {
    /// Jobs are being observed.
    Observing,
    /// The observation window is closed and the generator must be stopped.
    Done,
    /// The experiment is over.
    Passive,
}

impl Phase for TransducerPhase {
    const PASSIVE: Self = TransducerPhase::Passive;

    fn name(&self) -> &'static str {
        match self {
            TransducerPhase::Observing => "observing",
            TransducerPhase::Done => "done",
            TransducerPhase::Passive => "passive",
        }
    }
}

/// Experiment statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    /// Number of jobs generated.
    pub arrived: u64,
    /// Number of jobs processed.
    pub solved: u64,
    /// Mean turnaround time of processed jobs.
    pub mean_turnaround: f64,
    /// Processed jobs per unit of time.
    pub throughput: f64,
}

/// Transducer measuring the turnaround time of jobs.
pub struct Transducer {
    component: Component,
    state: AtomicState<TransducerPhase>,
    observation_time: f64,
    clock: f64,
    arrivals: HashMap<u64, f64>,
    solved: u64,
    total_turnaround: f64,
    statistics: Rc<RefCell<Option<Statistics>>>,
    /// Generated jobs -- input port `arrived`.
    pub arrived: Port<u64>,
    /// Processed jobs -- input port `solved`.
    pub solved_jobs: Port<u64>,
    /// End of the experiment -- output port `out`.
    pub output: Port<()>,
}

impl Transducer {
    /// Creates a transducer with the specified observation window.
    pub fn new(name: &str, observation_time: f64) -> Self {
        let mut component = Component::new(name);
        let arrived = Port::new("arrived");
        let solved_jobs = Port::new("solved");
        let output = Port::new("out");
        component.add_in_port(&arrived);
        component.add_in_port(&solved_jobs);
        component.add_out_port(&output);

        Self {
            component,
            state: AtomicState::passive(),
            observation_time,
            clock: 0.0,
            arrivals: HashMap::new(),
            solved: 0,
            total_turnaround: 0.0,
            statistics: Default::default(),
            arrived,
            solved_jobs,
            output,
        }
    }

    /// Returns a handle to the statistics, available at the end of the
    /// observation window.
    pub fn statistics(&self) -> Rc<RefCell<Option<Statistics>>> {
        self.statistics.clone()
    }
}

impl Atomic for Transducer {
    fn component(&self) -> &Component {
        &self.component
    }

    fn ta(&self) -> f64 {
        self.state.sigma()
    }

    fn initialize(&mut self) {
        self.state.hold_in(TransducerPhase::Observing, self.observation_time);
    }

    fn delta_int(&mut self) {
        self.clock += self.state.sigma();
        if !self.state.phase_is(TransducerPhase::Observing) {
            self.state.passivate();
            return;
        }

        let arrived = self.arrivals.len() as u64;
        let mean_turnaround = if self.solved > 0 {
            self.total_turnaround / self.solved as f64
        } else {
            0.0
        };
        let throughput = if self.clock > 0.0 {
            self.solved as f64 / self.clock
        } else {
            0.0
        };
        tracing::info!(
            arrived,
            solved = self.solved,
            mean_turnaround,
            throughput,
            "observation window closed"
        );
        *self.statistics.borrow_mut() = Some(Statistics {
            arrived,
            solved: self.solved,
            mean_turnaround,
            throughput,
        });
        self.state.hold_in(TransducerPhase::Done, 0.0);
    }

    fn delta_ext(&mut self, elapsed: f64) {
        self.clock += elapsed;
        if self.state.phase_is(TransducerPhase::Observing) {
            for &job in self.arrived.read_all().iter() {
                tracing::info!(job, "job arrived");
                self.arrivals.insert(job, self.clock);
            }
            for &job in self.solved_jobs.read_all().iter() {
                if let Some(arrival) = self.arrivals.get(&job) {
                    tracing::info!(job, "job solved");
                    self.total_turnaround += self.clock - arrival;
                    self.solved += 1;
                }
            }
        }
        let sigma = self.state.sigma() - elapsed;
        self.state.hold_in(self.state.phase(), sigma);
    }

    fn lambda(&self) {
        if self.state.phase_is(TransducerPhase::Done) {
            self.output.write(());
        }
    }
}

fn main() -> Result<(), SimulationError> {
    tracing_subscriber::fmt()
        .with_timer(SimulationTime::with_system_timer())
        .init();

    // ---------------
    // Bench assembly.
    // ---------------

    let period = 1.0;
    let observation_time = 10.0;

    // Models.
    let generator = Generator::new("generator", 0.0, period);
    let transducer = Transducer::new("transducer", observation_time);
    let processor = Processor::new("processor", 3.0 * period);

    // Model handles for simulation.
    let (gen_out, gen_stop) = (generator.output.clone(), generator.stop.clone());
    let (arrived, solved, done) = (
        transducer.arrived.clone(),
        transducer.solved_jobs.clone(),
        transducer.output.clone(),
    );
    let (proc_in, proc_out) = (processor.input.clone(), processor.output.clone());
    let statistics = transducer.statistics();

    // Experimental frame.
    let mut ef = Coupled::with_chaining("ef");
    let ef_in = Port::new("in");
    let ef_out = Port::new("out");
    ef.add_in_port(&ef_in);
    ef.add_out_port(&ef_out);
    ef.add_atomic(generator);
    ef.add_atomic(transducer);
    ef.add_coupling(&ef_in, &solved)?;
    ef.add_coupling(&gen_out, &arrived)?;
    ef.add_coupling(&done, &gen_stop)?;
    ef.add_coupling(&gen_out, &ef_out)?;

    // Root.
    let mut efp = Coupled::new("efp");
    efp.add_coupled(ef);
    efp.add_atomic(processor);
    efp.add_coupling(&ef_out, &proc_in)?;
    efp.add_coupling(&proc_out, &ef_in)?;

    let mut simu = SimInit::new(efp).init()?;

    // ----------
    // Simulation.
    // ----------

    simu.step_until(100.0)?;
    simu.exit();

    // Jobs 1, 4 and 7 are processed, the others are dropped.
    let statistics = statistics.borrow().clone();
    assert_eq!(
        statistics,
        Some(Statistics {
            arrived: 10,
            solved: 3,
            mean_turnaround: 3.0,
            throughput: 0.3,
        })
    );
    // The generator was stopped and the processor finished its last job.
    assert_eq!(simu.next_time(), f64::INFINITY);

    Ok(())
}
