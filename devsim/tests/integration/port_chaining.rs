//! Event delivery through chained and non-chained hierarchies.

use std::rc::Rc;

use devsim::model::Coupled;
use devsim::models::{Generator, Step};
use devsim::ports::Port;
use devsim::simulation::{Coordinator, SimInit};

use crate::bench::{devstone, Counters, Recorder, Topology};

/// Builds a DEVStone bench fed by a single event at t=0.
fn devstone_bench(
    topology: Topology,
    width: usize,
    depth: usize,
    chained: &dyn Fn(usize) -> bool,
    force_chaining: bool,
) -> (Coordinator, Rc<Counters>) {
    let counters = Rc::new(Counters::default());
    let bench = devstone(topology, width, depth, &counters, chained);
    let generator = Generator::new("gen", 0.0, 1.0).with_max_events(1);
    let gen_out = generator.output.clone();

    let mut root = Coupled::new("root");
    root.add_atomic(generator);
    root.add_coupled(bench.model);
    root.add_coupling(&gen_out, &bench.input).unwrap();

    let simu = SimInit::new(root)
        .set_chaining(force_chaining)
        .init()
        .unwrap();

    (simu, counters)
}

#[test]
fn chaining_devstone_li_counts() {
    type Chaining = fn(usize) -> bool;
    let configurations: [(Chaining, bool); 5] = [
        (|_| false, false),
        (|_| true, false),
        (|_| false, true),
        (|depth| depth % 2 == 0, false),
        (|depth| depth % 2 == 1, false),
    ];

    for (width, depth) in [(2, 2), (3, 4), (5, 3), (4, 1)] {
        let expected = ((width - 1) * (depth - 1) + 1) as u64;

        for (chained, force) in configurations {
            let (mut simu, counters) = devstone_bench(Topology::Li, width, depth, &chained, force);
            simu.step_until(10.0).unwrap();

            assert_eq!(counters.external.get(), expected);
            assert_eq!(counters.internal.get(), expected);
            assert_eq!(counters.events.get(), expected);
            assert_eq!(simu.next_time(), f64::INFINITY);
        }
    }
}

#[test]
fn chaining_devstone_hi_counts() {
    type Chaining = fn(usize) -> bool;
    let configurations: [Chaining; 3] = [|_| false, |_| true, |depth| depth % 2 == 0];

    for (width, depth) in [(2, 3), (3, 3), (4, 5)] {
        let expected = (width * (width - 1) / 2 * (depth - 1) + 1) as u64;

        for chained in configurations {
            let (mut simu, counters) =
                devstone_bench(Topology::Hi, width, depth, &chained, false);
            simu.step_until(10.0).unwrap();

            assert_eq!(counters.external.get(), expected);
            assert_eq!(counters.internal.get(), expected);
        }
    }
}

#[test]
fn chaining_values_do_not_leak_across_cycles() {
    let generator = Generator::new("gen", 1.0, 1.0).with_max_events(3);
    let recorder = Recorder::new("recorder", 0.0);
    let gen_out = generator.output.clone();
    let recorder_in = recorder.input.clone();
    let log = recorder.log.clone();

    // root > outer (chained) > inner (chained) > recorder
    let mut inner = Coupled::with_chaining("inner");
    let inner_in = Port::new("in");
    inner.add_in_port(&inner_in);
    inner.add_atomic(recorder);
    inner.add_coupling(&inner_in, &recorder_in).unwrap();

    let mut outer = Coupled::with_chaining("outer");
    let outer_in = Port::new("in");
    outer.add_in_port(&outer_in);
    outer.add_coupled(inner);
    outer.add_coupling(&outer_in, &inner_in).unwrap();

    let mut root = Coupled::new("root");
    root.add_atomic(generator);
    root.add_coupled(outer);
    root.add_coupling(&gen_out, &outer_in).unwrap();

    let mut simu = SimInit::new(root).init().unwrap();
    simu.step_until(10.0).unwrap();

    assert_eq!(*log.borrow(), vec![(1.0, 1), (2.0, 2), (3.0, 3)]);
    assert!(recorder_in.is_empty());
    assert_eq!(recorder_in.full_name(), "root.outer.inner.recorder.in");
}

#[test]
fn chaining_fan_in_follows_registration_order() {
    for chained in [false, true] {
        let a = Step::new("a", 1.0, 1.0, 3.0);
        let b = Step::new("b", 2.0, 1.0, 4.0);
        let recorder = Recorder::new("recorder", 0.0);
        let (a_out, b_out) = (a.output.clone(), b.output.clone());
        let recorder_in = recorder.input.clone();
        let log = recorder.log.clone();

        let mut sink = if chained {
            Coupled::with_chaining("sink")
        } else {
            Coupled::new("sink")
        };
        let sink_in = Port::new("in");
        sink.add_in_port(&sink_in);
        sink.add_atomic(recorder);
        sink.add_coupling(&sink_in, &recorder_in).unwrap();

        let mut root = if chained {
            Coupled::with_chaining("root")
        } else {
            Coupled::new("root")
        };
        root.add_atomic(a);
        root.add_atomic(b);
        root.add_coupled(sink);
        root.add_coupling(&b_out, &sink_in).unwrap();
        root.add_coupling(&a_out, &sink_in).unwrap();

        let mut simu = SimInit::new(root).init().unwrap();
        simu.step_until(1.0).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![(0.0, 2.0), (0.0, 1.0), (1.0, 4.0), (1.0, 3.0)]
        );
    }
}

#[test]
fn chaining_output_couplings_across_levels() {
    let step = Step::new("step", 5.0, 2.0, 6.0);
    let recorder = Recorder::new("recorder", 0.0);
    let step_out = step.output.clone();
    let recorder_in = recorder.input.clone();
    let log = recorder.log.clone();

    // The step output climbs two levels before reaching the recorder.
    let mut deep = Coupled::with_chaining("deep");
    let deep_out = Port::new("out");
    deep.add_out_port(&deep_out);
    deep.add_atomic(step);
    deep.add_coupling(&step_out, &deep_out).unwrap();

    let mut mid = Coupled::new("mid");
    let mid_out = Port::new("out");
    mid.add_out_port(&mid_out);
    mid.add_coupled(deep);
    mid.add_coupling(&deep_out, &mid_out).unwrap();

    let mut root = Coupled::with_chaining("root");
    root.add_coupled(mid);
    root.add_atomic(recorder);
    root.add_coupling(&mid_out, &recorder_in).unwrap();

    let mut simu = SimInit::new(root).init().unwrap();
    simu.step_until(5.0).unwrap();

    assert_eq!(*log.borrow(), vec![(0.0, 5.0), (2.0, 6.0)]);
}
