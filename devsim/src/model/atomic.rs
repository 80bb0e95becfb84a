use super::Component;

/// Trait to be implemented by atomic models.
///
/// Implementors typically embed a [`Component`] holding their name and
/// ports, and an [`AtomicState`](super::AtomicState) holding their phase and
/// remaining time.
///
/// The coordinator guarantees that, within a simulation cycle, the output
/// functions of all imminent models are called and their outputs propagated
/// before any transition function is called, and that no port is cleared
/// before all transition functions have returned.
pub trait Atomic: 'static {
    /// Returns the component holding the model name and ports.
    fn component(&self) -> &Component;

    /// Time advance: the simulated time until the next internal transition.
    ///
    /// An infinite value means that the model is passive.
    fn ta(&self) -> f64;

    /// Called once before the first simulation cycle.
    fn initialize(&mut self) {}

    /// Called once when the simulation ends.
    fn exit(&mut self) {}

    /// Internal transition function.
    ///
    /// Called when the remaining time has elapsed, right after
    /// [`Atomic::lambda()`]. It must set a new state and must not access
    /// ports.
    fn delta_int(&mut self);

    /// External transition function.
    ///
    /// Called when events are readable on the input ports, `elapsed` being
    /// the simulated time spent in the current state.
    fn delta_ext(&mut self, elapsed: f64);

    /// Confluent transition function.
    ///
    /// Called when an internal and an external transition are due in the
    /// same cycle. The default implementation performs the internal
    /// transition followed by an external transition with a null elapsed
    /// time.
    fn delta_con(&mut self, elapsed: f64) {
        let _ = elapsed;
        self.delta_int();
        self.delta_ext(0.0);
    }

    /// Output function.
    ///
    /// Called when the model is imminent, before the internal or confluent
    /// transition. Values may only be written to output ports.
    fn lambda(&self);
}
