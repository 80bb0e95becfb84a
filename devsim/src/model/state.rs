use std::fmt;

/// Phase of an atomic model.
///
/// Each atomic model defines its own phase enumeration. `PASSIVE` is the
/// phase entered by [`AtomicState::passivate()`].
///
/// # Examples
///
/// ```
/// use devsim::model::Phase;
///
/// #[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// enum Light {
///     Off,
///     Blinking,
/// }
///
/// impl Phase for Light {
///     const PASSIVE: Self = Light::Off;
///
///     fn name(&self) -> &'static str {
///         match self {
///             Light::Off => "off",
///             Light::Blinking => "blinking",
///         }
///     }
/// }
/// ```
pub trait Phase: Copy + Eq + fmt::Debug + 'static {
    /// The phase of a passive model.
    const PASSIVE: Self;

    /// Returns the name of the phase.
    fn name(&self) -> &'static str;
}

/// The two-phase default used by models that are either waiting for input
/// or about to fire.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefaultPhase {
    /// No internal event is scheduled.
    Passive,
    /// An internal event is scheduled.
    Active,
}

impl Phase for DefaultPhase {
    const PASSIVE: Self = DefaultPhase::Passive;

    fn name(&self) -> &'static str {
        match self {
            DefaultPhase::Passive => "passive",
            DefaultPhase::Active => "active",
        }
    }
}

/// Phase and remaining time of an atomic model.
///
/// The remaining time, often called *sigma*, is the simulated time left
/// before the next internal transition. It is infinite when the model is
/// passive.
#[derive(Clone, Copy, PartialEq)]
pub struct AtomicState<P: Phase> {
    phase: P,
    sigma: f64,
}

impl<P: Phase> AtomicState<P> {
    /// Creates a state in the specified phase.
    ///
    /// # Panics
    ///
    /// Panics if `sigma` is negative or NaN.
    pub fn new(phase: P, sigma: f64) -> Self {
        check_sigma(sigma);

        Self { phase, sigma }
    }

    /// Creates a passive state.
    pub fn passive() -> Self {
        Self {
            phase: P::PASSIVE,
            sigma: f64::INFINITY,
        }
    }

    /// Sets the phase and the time until the next internal transition.
    ///
    /// # Panics
    ///
    /// Panics if `sigma` is negative or NaN.
    pub fn hold_in(&mut self, phase: P, sigma: f64) {
        check_sigma(sigma);
        self.phase = phase;
        self.sigma = sigma;
    }

    /// Enters the passive phase with an infinite remaining time.
    pub fn passivate(&mut self) {
        self.passivate_in(P::PASSIVE);
    }

    /// Enters the specified phase with an infinite remaining time.
    pub fn passivate_in(&mut self, phase: P) {
        self.phase = phase;
        self.sigma = f64::INFINITY;
    }

    /// Returns the current phase.
    pub fn phase(&self) -> P {
        self.phase
    }

    /// Returns the time until the next internal transition.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Checks whether the model is in the specified phase.
    pub fn phase_is(&self, phase: P) -> bool {
        self.phase == phase
    }

    /// Checks whether the name of the current phase is `name`.
    ///
    /// An unknown name simply yields `false`.
    pub fn phase_is_named(&self, name: &str) -> bool {
        self.phase.name() == name
    }

    /// Checks whether no internal transition is scheduled.
    pub fn is_passive(&self) -> bool {
        self.sigma == f64::INFINITY
    }
}

impl<P: Phase> Default for AtomicState<P> {
    fn default() -> Self {
        Self::passive()
    }
}

impl<P: Phase> fmt::Debug for AtomicState<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicState")
            .field("phase", &self.phase)
            .field("sigma", &self.sigma)
            .finish()
    }
}

impl<P: Phase> fmt::Display for AtomicState<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.phase.name(), self.sigma)
    }
}

fn check_sigma(sigma: f64) {
    assert!(
        sigma >= 0.0,
        "the remaining time must be non-negative (got {sigma})"
    );
}
