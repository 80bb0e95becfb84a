//! Simulation-time stamping of structured logs.
//!
//! # Overview
//!
//! The coordinator runs each function of an atomic model inside a
//! [`tracing::Span`] with the following metadata:
//!
//! - name: `model`,
//! - target: `devsim`,
//! - verbosity level: [`Level::INFO`](tracing::Level::INFO),
//! - a unique field called `name`, associated to the fully-qualified name of
//!   the model, such as `root.processor`.
//!
//! By default, the [`tracing_subscriber::fmt`][mod@tracing_subscriber::fmt]
//! subscriber stamps events with the wall clock time. This module provides a
//! [`SimulationTime`] timer which stamps events emitted during a simulation
//! cycle with the simulation time instead:
//!
//! ```
//! use devsim::tracing::SimulationTime;
//!
//! tracing_subscriber::fmt()
//!     .with_timer(SimulationTime::with_system_timer())
//!     .init();
//! ```
//!
//! Events emitted outside simulation cycles are stamped with the system
//! time:
//!
//! ```text
//! [4.000000000]  INFO model{name="efp.ef.transducer"}: efp: job solved job=1
//! 2024-09-10T14:39:24.670921Z  INFO devsim::simulation: simulation terminated time=100.0 cycles=13
//! ```
//!
//! With `SimulationTime::with_system_timer_always()`, the system time is
//! prepended to all events:
//!
//! ```text
//! 2024-09-10T14:39:22.124945Z [4.000000000]  INFO model{name="efp.ef.transducer"}: efp: job solved job=1
//! 2024-09-10T14:39:24.670921Z  INFO devsim::simulation: simulation terminated time=100.0 cycles=13
//! ```
//!
//! # Event filtering
//!
//! Filtering based on the `RUST_LOG` environment variable requires the
//! `env-filter` feature of [`tracing-subscriber`][tracing_subscriber]. For
//! instance, the directive below only lets warnings pass through, except for
//! the `efp.processor` model which logs at the debug level:
//!
//! ```text
//! $ RUST_LOG="warn,[model{name=efp.processor}]=debug" cargo run --example efp
//! ```

use std::fmt;

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};

use crate::time;

/// A timer that can be used in conjunction with the
/// [`tracing-subscriber`][tracing_subscriber] crate to log events using the
/// simulation time instead of (or on top of) the wall clock time.
///
/// See the [module-level documentation][crate::tracing] for more details.
#[derive(Default, Debug)]
pub struct SimulationTime<const VERBOSE: bool, T> {
    sys_timer: T,
}

impl SimulationTime<false, SystemTime> {
    /// Constructs a new simulation timer which falls back to the
    /// [`SystemTime`] timer for events generated outside simulation cycles.
    pub fn with_system_timer() -> Self {
        Self::default()
    }
}

impl SimulationTime<true, SystemTime> {
    /// Constructs a new simulation timer which prepends a [`SystemTime`]
    /// timestamp to all tracing events, as well as a simulation timestamp for
    /// events generated during simulation cycles.
    pub fn with_system_timer_always() -> Self {
        Self::default()
    }
}

impl<T: FormatTime> SimulationTime<false, T> {
    /// Constructs a new simulation timer which falls back to the provided
    /// timer for events generated outside simulation cycles.
    pub fn with_custom_timer(sys_timer: T) -> Self {
        Self { sys_timer }
    }
}

impl<T: FormatTime> SimulationTime<true, T> {
    /// Constructs a new simulation timer which prepends a timestamp generated
    /// with the provided timer to all tracing events, as well as a simulation
    /// timestamp for events generated during simulation cycles.
    pub fn with_custom_timer_always(sys_timer: T) -> Self {
        Self { sys_timer }
    }
}

impl<const VERBOSE: bool, T: FormatTime> FormatTime for SimulationTime<VERBOSE, T> {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match time::current() {
            Some(t) => {
                if VERBOSE {
                    self.sys_timer.format_time(w)?;
                    w.write_char(' ')?;
                }
                write!(w, "[{t:.9}]")
            }
            None => self.sys_timer.format_time(w),
        }
    }
}
