//! Bounded top-k selection.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::model::Suggestion;

/// Heap entry ordered by score only.
#[derive(Debug)]
struct Scored(Suggestion);

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.score.total_cmp(&other.0.score)
    }
}

/// Fixed-capacity selector keeping the highest-scoring suggestions seen so far.
///
/// The root is the current minimum; a push that overflows the capacity evicts
/// it. Equal scores are kept or evicted in unspecified order, so callers must
/// not rely on insertion-order stability among ties.
#[derive(Debug)]
pub struct TopKSelector {
    heap: BinaryHeap<Reverse<Scored>>,
    capacity: usize,
}

impl TopKSelector {
    /// Selector retaining at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1).min(4096)),
            capacity,
        }
    }

    /// Insert in O(log k), evicting the minimum on overflow.
    pub fn push(&mut self, candidate: Suggestion) {
        self.heap.push(Reverse(Scored(candidate)));
        if self.heap.len() > self.capacity {
            self.heap.pop();
        }
    }

    /// Entries currently retained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Maximum retained entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Smallest retained score.
    #[must_use]
    pub fn min_score(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(entry)| entry.0.score)
    }

    /// Drain into a list sorted by descending score.
    #[must_use]
    pub fn into_sorted_vec(mut self) -> Vec<Suggestion> {
        let mut ranked = Vec::with_capacity(self.heap.len());
        while let Some(Reverse(Scored(entry))) = self.heap.pop() {
            ranked.push(entry);
        }
        ranked.reverse();
        ranked
    }
}

impl Extend<Suggestion> for TopKSelector {
    fn extend<T: IntoIterator<Item = Suggestion>>(&mut self, iter: T) {
        for candidate in iter {
            self.push(candidate);
        }
    }
}
