//! Simulation time context of the current thread.
//!
//! The coordinator publishes the time of the cycle being processed so that
//! diagnostics emitted from within models can be stamped with it.

use std::cell::Cell;

thread_local! {
    static CURRENT_TIME: Cell<Option<f64>> = const { Cell::new(None) };
}

/// Returns the simulation time of the cycle being processed on this thread,
/// if any.
#[cfg_attr(not(feature = "tracing-timer"), allow(dead_code))]
pub(crate) fn current() -> Option<f64> {
    CURRENT_TIME.with(|t| t.get())
}

/// A guard publishing a simulation time until it is dropped.
///
/// Guards can be nested; dropping a guard restores the previously published
/// time.
#[derive(Debug)]
pub(crate) struct TimeScope {
    previous: Option<f64>,
}

impl TimeScope {
    /// Publishes `time` as the current simulation time.
    pub(crate) fn enter(time: f64) -> Self {
        let previous = CURRENT_TIME.with(|t| t.replace(Some(time)));

        Self { previous }
    }
}

impl Drop for TimeScope {
    fn drop(&mut self) {
        CURRENT_TIME.with(|t| t.set(self.previous));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_scope_nesting() {
        assert_eq!(current(), None);
        {
            let _outer = TimeScope::enter(1.0);
            assert_eq!(current(), Some(1.0));
            {
                let _inner = TimeScope::enter(2.5);
                assert_eq!(current(), Some(2.5));
            }
            assert_eq!(current(), Some(1.0));
        }
        assert_eq!(current(), None);
    }
}
