//! Injection of external inputs and time management.

use devsim::model::Coupled;
use devsim::models::{Generator, Step};
use devsim::ports::Port;
use devsim::simulation::{SimInit, SimulationError};

use crate::bench::Recorder;

#[test]
fn inject_into_root_input() {
    for chaining in [false, true] {
        let recorder = Recorder::new("recorder", 0.0);
        let recorder_in = recorder.input.clone();
        let log = recorder.log.clone();

        let mut root = Coupled::new("root");
        let input = Port::new("in");
        root.add_in_port(&input);
        root.add_atomic(recorder);
        root.add_coupling(&input, &recorder_in).unwrap();

        let mut simu = SimInit::new(root).set_chaining(chaining).init().unwrap();
        simu.inject(2.5, &input, [7, 8]).unwrap();
        simu.inject(2.5, &input, [9]).unwrap();
        simu.inject(4.0, &input, []).unwrap();

        assert_eq!(*log.borrow(), vec![(2.5, 7), (2.5, 8), (2.5, 9)]);
        assert_eq!(simu.time(), 4.0);
        assert_eq!(simu.cycle_count(), 3);
        assert!(input.is_empty());
    }
}

#[test]
fn inject_into_root_inout_port() {
    let recorder = Recorder::new("recorder", 0.0);
    let recorder_in = recorder.input.clone();
    let log = recorder.log.clone();

    let mut root = Coupled::new("root");
    let io = Port::new("io");
    root.add_inout_port(&io);
    root.add_atomic(recorder);
    root.add_coupling(&io, &recorder_in).unwrap();

    let mut simu = SimInit::new(root).init().unwrap();
    simu.inject(1.0, &io, ['x']).unwrap();

    assert_eq!(*log.borrow(), vec![(1.0, 'x')]);
}

#[test]
fn inject_time_bounds() {
    let step = Step::new("step", 0.0, 15.0, 10.0);
    let recorder = Recorder::new("recorder", 0.0);
    let step_out = step.output.clone();
    let recorder_in = recorder.input.clone();
    let log = recorder.log.clone();

    let mut root = Coupled::new("root");
    let input = Port::new("in");
    root.add_in_port(&input);
    root.add_atomic(step);
    root.add_atomic(recorder);
    root.add_coupling(&step_out, &recorder_in).unwrap();
    root.add_coupling(&input, &recorder_in).unwrap();

    let mut simu = SimInit::new(root).init().unwrap();
    simu.step();
    assert_eq!(simu.next_time(), 15.0);

    assert_eq!(
        simu.inject(20.0, &input, [1.0]),
        Err(SimulationError::InvalidInjectionTime)
    );
    assert_eq!(
        simu.inject(-1.0, &input, [1.0]),
        Err(SimulationError::InvalidInjectionTime)
    );
    assert_eq!(
        simu.inject(f64::NAN, &input, [1.0]),
        Err(SimulationError::InvalidInjectionTime)
    );
    assert!(input.is_empty());

    // Injected values and step outputs are delivered in the same cycle.
    simu.inject(15.0, &input, [-1.0]).unwrap();

    assert_eq!(*log.borrow(), vec![(0.0, 0.0), (15.0, 10.0), (15.0, -1.0)]);
    assert_eq!(simu.next_time(), f64::INFINITY);
}

#[test]
fn inject_rejects_non_root_inputs() {
    let generator = Generator::new("gen", 0.0, 1.0);
    let stop = generator.stop.clone();

    let mut root = Coupled::new("root");
    let output = Port::new("out");
    root.add_out_port(&output);
    root.add_atomic(generator);

    let mut simu = SimInit::new(root).init().unwrap();

    assert_eq!(
        simu.inject(0.0, &stop, [()]),
        Err(SimulationError::NotRootInput {
            port: "root.gen.stop".into()
        })
    );
    assert!(matches!(
        simu.inject(0.0, &output, [0u64]),
        Err(SimulationError::NotRootInput { .. })
    ));
    assert!(matches!(
        simu.inject(0.0, &Port::new("loose"), [0u64]),
        Err(SimulationError::NotRootInput { .. })
    ));
}

#[test]
fn inject_stops_generator() {
    let generator = Generator::new("gen", 0.0, 1.0);
    let recorder = Recorder::new("recorder", 0.0);
    let (gen_stop, gen_out) = (generator.stop.clone(), generator.output.clone());
    let recorder_in = recorder.input.clone();
    let log = recorder.log.clone();

    let mut root = Coupled::new("root");
    let stop = Port::new("stop");
    root.add_in_port(&stop);
    root.add_atomic(generator);
    root.add_atomic(recorder);
    root.add_coupling(&stop, &gen_stop).unwrap();
    root.add_coupling(&gen_out, &recorder_in).unwrap();

    let mut simu = SimInit::new(root).init().unwrap();
    simu.step_until(2.0).unwrap();
    simu.inject(2.5, &stop, [()]).unwrap();
    simu.step_until(10.0).unwrap();

    assert_eq!(*log.borrow(), vec![(0.0, 1), (1.0, 2), (2.0, 3)]);
    assert_eq!(simu.next_time(), f64::INFINITY);
}

#[test]
fn step_until_rejects_past_target() {
    let mut root = Coupled::new("root");
    root.add_atomic(Generator::new("gen", 0.0, 1.0));

    let mut simu = SimInit::new(root).set_start_time(3.0).init().unwrap();
    assert_eq!(
        simu.step_until(2.0),
        Err(SimulationError::InvalidTargetTime)
    );
    assert_eq!(
        simu.step_until(f64::NAN),
        Err(SimulationError::InvalidTargetTime)
    );

    simu.step_until(5.5).unwrap();
    assert_eq!(simu.time(), 5.5);
    assert_eq!(simu.cycle_count(), 3);
    assert_eq!(simu.next_time(), 6.0);
}
