use std::fmt;

use crate::model::{Coupled, Model};

use super::{Coordinator, SimulationError};

/// Builder for a sequential DEVS simulation.
///
/// # Examples
///
/// ```
/// use devsim::model::Coupled;
/// use devsim::models::Step;
/// use devsim::simulation::SimInit;
///
/// let mut root = Coupled::new("root");
/// root.add_atomic(Step::new("step", 0.0, 15.0, 10.0));
///
/// let mut simu = SimInit::new(root).set_start_time(5.0).init().unwrap();
///
/// // The step emits its initial value right away.
/// assert_eq!(simu.next_time(), 5.0);
/// simu.step();
/// assert_eq!(simu.next_time(), 20.0);
/// simu.step();
/// assert_eq!(simu.next_time(), f64::INFINITY);
/// simu.exit();
/// ```
pub struct SimInit {
    root: Coupled,
    start_time: f64,
    chaining: bool,
}

impl SimInit {
    /// Creates a builder for a simulation of the specified root model.
    pub fn new(root: Coupled) -> Self {
        Self {
            root,
            start_time: 0.0,
            chaining: false,
        }
    }

    /// Sets the simulation time at initialization.
    ///
    /// The start time defaults to zero.
    ///
    /// # Panics
    ///
    /// Panics if the start time is not finite.
    pub fn set_start_time(mut self, start_time: f64) -> Self {
        assert!(
            start_time.is_finite(),
            "the start time should be a finite number"
        );
        self.start_time = start_time;

        self
    }

    /// Forces chaining on all containers of the hierarchy.
    ///
    /// If chaining is not forced, only the containers created with
    /// [`Coupled::with_chaining()`] are chained.
    pub fn set_chaining(mut self, chaining: bool) -> Self {
        self.chaining = chaining;

        self
    }

    /// Builds a coordinator initialized at the start time, executing the
    /// [`Atomic::initialize()`](crate::model::Atomic::initialize) method on
    /// all atomic models.
    pub fn init(mut self) -> Result<Coordinator, SimulationError> {
        if self.chaining {
            self.root.chain_all()?;
        }

        let root = Model::Coupled(Box::new(self.root));
        let mut coordinator = Coordinator::new(root, self.start_time);
        coordinator.initialize();

        Ok(coordinator)
    }
}

impl fmt::Debug for SimInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimInit")
            .field("root", &self.root.name())
            .field("start_time", &self.start_time)
            .field("chaining", &self.chaining)
            .finish()
    }
}
