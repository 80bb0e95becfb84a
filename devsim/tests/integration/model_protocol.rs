//! Execution protocol of atomic models.

use std::cell::RefCell;
use std::rc::Rc;

use devsim::model::{Atomic, AtomicState, Component, Coupled, DefaultPhase};
use devsim::models::{Generator, Step};
use devsim::ports::Port;
use devsim::simulation::SimInit;

use crate::bench::Recorder;

type Log = Rc<RefCell<Vec<String>>>;

/// A periodic model logging all calls made by the coordinator.
struct Probe {
    component: Component,
    state: AtomicState<DefaultPhase>,
    period: f64,
    custom_delta_con: bool,
    log: Log,
    input: Port<u64>,
    output: Port<u64>,
}

impl Probe {
    fn new(name: &str, period: f64, log: &Log) -> Self {
        let mut component = Component::new(name);
        let input = Port::new("in");
        let output = Port::new("out");
        component.add_in_port(&input);
        component.add_out_port(&output);

        Self {
            component,
            state: AtomicState::passive(),
            period,
            custom_delta_con: false,
            log: log.clone(),
            input,
            output,
        }
    }

    fn record(&self, call: String) {
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.component.name(), call));
    }
}

impl Atomic for Probe {
    fn component(&self) -> &Component {
        &self.component
    }
    fn ta(&self) -> f64 {
        self.state.sigma()
    }
    fn initialize(&mut self) {
        self.state.hold_in(DefaultPhase::Active, self.period);
    }
    fn delta_int(&mut self) {
        self.record("int".into());
        self.state.hold_in(DefaultPhase::Active, self.period);
    }
    fn delta_ext(&mut self, elapsed: f64) {
        self.record(format!("ext({elapsed})"));
        let sigma = self.state.sigma() - elapsed;
        self.state.hold_in(DefaultPhase::Active, sigma);
    }
    fn delta_con(&mut self, elapsed: f64) {
        if self.custom_delta_con {
            self.record(format!("con({elapsed})"));
            self.state.hold_in(DefaultPhase::Active, self.period);
        } else {
            self.delta_int();
            self.delta_ext(0.0);
        }
    }
    fn lambda(&self) {
        self.record("lambda".into());
        self.output.write(0);
    }
}

#[test]
fn model_step_scenario() {
    let step = Step::new("step", 0.0, 15.0, 10.0);
    let recorder = Recorder::new("recorder", 0.0);
    let step_out = step.output.clone();
    let recorder_in = recorder.input.clone();
    let log = recorder.log.clone();

    let mut root = Coupled::new("root");
    root.add_atomic(step);
    root.add_atomic(recorder);
    root.add_coupling(&step_out, &recorder_in).unwrap();

    let mut simu = SimInit::new(root).init().unwrap();
    simu.step_until(30.0).unwrap();

    assert_eq!(*log.borrow(), vec![(0.0, 0.0), (15.0, 10.0)]);
    assert_eq!(simu.cycle_count(), 2);
    assert_eq!(simu.next_time(), f64::INFINITY);
    assert_eq!(simu.time(), 30.0);
}

#[test]
fn model_step_with_start_time() {
    let step = Step::new("step", 1.0, 2.5, -1.0);
    let recorder = Recorder::new("recorder", 10.0);
    let step_out = step.output.clone();
    let recorder_in = recorder.input.clone();
    let log = recorder.log.clone();

    let mut root = Coupled::new("root");
    root.add_atomic(step);
    root.add_atomic(recorder);
    root.add_coupling(&step_out, &recorder_in).unwrap();

    let mut simu = SimInit::new(root).set_start_time(10.0).init().unwrap();
    simu.step();
    simu.step();
    simu.step();

    assert_eq!(*log.borrow(), vec![(10.0, 1.0), (12.5, -1.0)]);
    assert_eq!(simu.time(), 12.5);
}

#[test]
fn model_outputs_precede_transitions() {
    let log = Log::default();
    let a = Probe::new("a", 3.0, &log);
    let b = Probe::new("b", 3.0, &log);
    let (a_out, b_in) = (a.output.clone(), b.input.clone());

    let mut root = Coupled::new("root");
    root.add_atomic(a);
    root.add_atomic(b);
    root.add_coupling(&a_out, &b_in).unwrap();

    let mut simu = SimInit::new(root).init().unwrap();
    simu.step();

    assert_eq!(simu.time(), 3.0);
    assert_eq!(
        *log.borrow(),
        vec!["a:lambda", "b:lambda", "a:int", "b:int", "b:ext(0)"]
    );
}

#[test]
fn model_external_and_confluent_transitions() {
    let log = Log::default();
    let probe = Probe::new("probe", 3.0, &log);
    let generator = Generator::new("gen", 1.0, 2.0).with_max_events(3);
    let (gen_out, probe_in) = (generator.output.clone(), probe.input.clone());

    let mut root = Coupled::new("root");
    root.add_atomic(probe);
    root.add_atomic(generator);
    root.add_coupling(&gen_out, &probe_in).unwrap();

    let mut simu = SimInit::new(root).init().unwrap();
    simu.step_until(6.0).unwrap();

    // Events at t=1, t=3 (confluent), t=5 and t=6 (internal).
    assert_eq!(
        *log.borrow(),
        vec![
            "probe:ext(1)",
            "probe:lambda",
            "probe:int",
            "probe:ext(0)",
            "probe:ext(2)",
            "probe:lambda",
            "probe:int",
        ]
    );
    assert_eq!(simu.next_time(), 9.0);
}

#[test]
fn model_custom_confluent_transition() {
    let log = Log::default();
    let mut probe = Probe::new("probe", 2.0, &log);
    probe.custom_delta_con = true;
    let generator = Generator::new("gen", 2.0, 2.0).with_max_events(1);
    let (gen_out, probe_in) = (generator.output.clone(), probe.input.clone());

    let mut root = Coupled::new("root");
    root.add_atomic(probe);
    root.add_atomic(generator);
    root.add_coupling(&gen_out, &probe_in).unwrap();

    let mut simu = SimInit::new(root).init().unwrap();
    simu.step();

    assert_eq!(*log.borrow(), vec!["probe:lambda", "probe:con(2)"]);
}

#[test]
fn model_passive_never_fires() {
    let recorder = Recorder::<u32>::new("recorder", 0.0);
    let log = recorder.log.clone();

    let mut root = Coupled::new("root");
    root.add_atomic(recorder);

    let mut simu = SimInit::new(root).init().unwrap();
    assert_eq!(simu.next_time(), f64::INFINITY);

    simu.step();
    assert_eq!(simu.simulate_cycles(10), 0);
    simu.step_until(1000.0).unwrap();

    assert_eq!(simu.cycle_count(), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn model_simulate_cycles_stops_when_passive() {
    let generator = Generator::new("gen", 0.0, 1.0).with_max_events(4);
    let mut root = Coupled::new("root");
    root.add_atomic(generator);

    let mut simu = SimInit::new(root).init().unwrap();
    assert_eq!(simu.simulate_cycles(2), 2);
    assert_eq!(simu.time(), 1.0);
    assert_eq!(simu.simulate_cycles(10), 2);
    assert_eq!(simu.time(), 3.0);
    assert_eq!(simu.next_time(), f64::INFINITY);
}

#[test]
#[should_panic]
fn model_invalid_time_advance() {
    struct Broken {
        component: Component,
    }
    impl Atomic for Broken {
        fn component(&self) -> &Component {
            &self.component
        }
        fn ta(&self) -> f64 {
            f64::NAN
        }
        fn delta_int(&mut self) {}
        fn delta_ext(&mut self, _: f64) {}
        fn lambda(&self) {}
    }

    let mut root = Coupled::new("root");
    root.add_atomic(Broken {
        component: Component::new("broken"),
    });

    let _ = SimInit::new(root).init();
}

#[test]
fn model_initialize_and_exit_are_called_once() {
    struct Lifecycle {
        component: Component,
        calls: Rc<RefCell<Vec<&'static str>>>,
    }
    impl Atomic for Lifecycle {
        fn component(&self) -> &Component {
            &self.component
        }
        fn ta(&self) -> f64 {
            f64::INFINITY
        }
        fn initialize(&mut self) {
            self.calls.borrow_mut().push("initialize");
        }
        fn exit(&mut self) {
            self.calls.borrow_mut().push("exit");
        }
        fn delta_int(&mut self) {}
        fn delta_ext(&mut self, _: f64) {}
        fn lambda(&self) {}
    }

    let calls = Rc::new(RefCell::new(Vec::new()));
    let mut inner = Coupled::new("inner");
    inner.add_atomic(Lifecycle {
        component: Component::new("model"),
        calls: calls.clone(),
    });
    let mut root = Coupled::new("root");
    root.add_coupled(inner);

    let mut simu = SimInit::new(root).init().unwrap();
    assert_eq!(simu.model_count(), 1);
    simu.exit();
    simu.exit();

    assert_eq!(*calls.borrow(), vec!["initialize", "exit"]);
}
