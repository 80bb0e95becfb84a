//! Unstable, unofficial public API meant for external benchmarking and testing.
//!
//! Not for production use!

use crate::util::calendar;

/// The event calendar of the coordinator.
#[derive(Debug, Default)]
pub struct Calendar<V>(calendar::Calendar<V>);

/// A key that can be used to delete a value from a [`Calendar`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventKey(calendar::EventKey);

impl<V> Calendar<V> {
    /// Creates an empty calendar.
    pub fn new() -> Self {
        Self(calendar::Calendar::new())
    }

    /// Schedules a value at the specified time.
    pub fn insert(&mut self, time: f64, value: V) -> EventKey {
        EventKey(self.0.insert(time, value))
    }

    /// Pulls the earliest value, if any.
    pub fn pull(&mut self) -> Option<(f64, V)> {
        self.0.pull()
    }

    /// Returns the earliest scheduled time, if any.
    pub fn peek_time(&self) -> Option<f64> {
        self.0.peek_time()
    }

    /// Deletes a value if it is still scheduled.
    pub fn delete(&mut self, key: EventKey) -> bool {
        self.0.delete(key.0)
    }

    /// Returns the number of scheduled values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether the calendar is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
