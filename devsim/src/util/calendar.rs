//! Event calendar.

use std::cmp::Ordering;

use slab::Slab;

/// A priority queue of values scheduled at simulation times, optimized for
/// extraction of the earliest value and deletion of arbitrary entries.
///
/// The calendar is a binary heap cross-indexed with entries stored in a slab
/// allocator: each heap item contains the scheduled time and the index of
/// the slab entry, while each slab entry contains the value and a
/// back-pointing index to the heap. Heap items also carry a unique epoch so
/// that same-time values are pulled in insertion order, and so that deletion
/// keys cannot be confused with those of entries that re-used the same slab
/// slot.
///
/// Insertion, extraction and deletion all have *O*(log(*N*)) complexity.
#[derive(Debug)]
pub(crate) struct Calendar<V> {
    heap: Vec<Item>,
    slab: Slab<Entry<V>>,
    next_epoch: u64,
}

impl<V> Calendar<V> {
    /// Creates an empty calendar.
    pub(crate) fn new() -> Self {
        Self {
            heap: Vec::new(),
            slab: Slab::new(),
            next_epoch: 0,
        }
    }

    /// Returns the number of scheduled values.
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    /// Checks whether the calendar is empty.
    #[cfg_attr(not(feature = "dev-hooks"), allow(dead_code))]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Schedules a value and returns a key that can be used to delete it.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN.
    pub(crate) fn insert(&mut self, time: f64, value: V) -> EventKey {
        assert!(!time.is_nan(), "events cannot be scheduled at a NaN time");

        let epoch = self.next_epoch;
        self.next_epoch += 1;
        let key = UniqueKey {
            time: Time(time),
            epoch,
        };

        let heap_idx = self.heap.len();
        let slab_idx = self.slab.insert(Entry { value, heap_idx });
        self.heap.push(Item { key, slab_idx });
        self.sift_up(heap_idx);

        EventKey { slab_idx, epoch }
    }

    /// Returns the earliest scheduled time, if any.
    pub(crate) fn peek_time(&self) -> Option<f64> {
        self.heap.first().map(|item| item.key.time.0)
    }

    /// Pulls the earliest value.
    ///
    /// Among values scheduled at the same time, the first inserted is pulled
    /// first.
    pub(crate) fn pull(&mut self) -> Option<(f64, V)> {
        let top = *self.heap.first()?;
        self.remove_at(0);
        let entry = self.slab.remove(top.slab_idx);

        Some((top.key.time.0, entry.value))
    }

    /// Pulls the earliest value if it is scheduled at time `time`.
    pub(crate) fn pull_at(&mut self, time: f64) -> Option<V> {
        if self.peek_time()? == time {
            self.pull().map(|(_, value)| value)
        } else {
            None
        }
    }

    /// Deletes the value associated to the key, if it is still scheduled.
    ///
    /// Returns `true` if a value was deleted.
    pub(crate) fn delete(&mut self, key: EventKey) -> bool {
        let Some(entry) = self.slab.get(key.slab_idx) else {
            return false;
        };
        let heap_idx = entry.heap_idx;
        if self.heap[heap_idx].key.epoch != key.epoch {
            return false;
        }
        self.remove_at(heap_idx);
        self.slab.remove(key.slab_idx);

        true
    }

    /// Removes the heap item at `heap_idx`, restoring the heap property.
    fn remove_at(&mut self, heap_idx: usize) {
        let last = self.heap.len() - 1;
        if heap_idx != last {
            self.heap.swap(heap_idx, last);
            self.slab[self.heap[heap_idx].slab_idx].heap_idx = heap_idx;
        }
        self.heap.pop();
        if heap_idx < self.heap.len() {
            let idx = self.sift_up(heap_idx);
            self.sift_down(idx);
        }
    }

    /// Moves the item at `heap_idx` up while its parent has a larger key and
    /// returns its final position.
    fn sift_up(&mut self, mut heap_idx: usize) -> usize {
        while heap_idx != 0 {
            let parent_idx = (heap_idx - 1) / 2;
            if self.heap[heap_idx].key >= self.heap[parent_idx].key {
                break;
            }
            self.swap(heap_idx, parent_idx);
            heap_idx = parent_idx;
        }
        self.slab[self.heap[heap_idx].slab_idx].heap_idx = heap_idx;

        heap_idx
    }

    /// Moves the item at `heap_idx` down while a child has a smaller key.
    fn sift_down(&mut self, mut heap_idx: usize) {
        loop {
            let mut child_idx = 2 * heap_idx + 1;
            if child_idx >= self.heap.len() {
                break;
            }
            // Pick the sibling if it has a smaller key.
            if child_idx + 1 < self.heap.len()
                && self.heap[child_idx + 1].key < self.heap[child_idx].key
            {
                child_idx += 1;
            }
            if self.heap[heap_idx].key <= self.heap[child_idx].key {
                break;
            }
            self.swap(heap_idx, child_idx);
            heap_idx = child_idx;
        }
        self.slab[self.heap[heap_idx].slab_idx].heap_idx = heap_idx;
    }

    /// Swaps two heap items and updates their back-pointing indices.
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slab[self.heap[a].slab_idx].heap_idx = a;
        self.slab[self.heap[b].slab_idx].heap_idx = b;
    }
}

impl<V> Default for Calendar<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A key that can be used to delete a scheduled value.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub(crate) struct EventKey {
    slab_idx: usize,
    epoch: u64,
}

#[derive(Copy, Clone, Debug)]
struct Item {
    key: UniqueKey,
    slab_idx: usize,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    heap_idx: usize,
}

/// Scheduled time complemented by the insertion epoch.
///
/// The derived ordering is lexicographic, so the time has priority over the
/// epoch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueKey {
    time: Time,
    epoch: u64,
}

/// A totally ordered, non-NaN simulation time.
#[derive(Copy, Clone, Debug)]
struct Time(f64);

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
