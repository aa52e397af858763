//! Max-priority queue of depth hypotheses ordered by confidence.
//!
//! There is no decrease-key and no removal by identity. When a pixel is
//! improved through another path, the older entries stay in the heap and are
//! recognised as stale when popped, by comparing against the reference view's
//! stored confidence.

mod entry;

pub use entry::QueueEntry;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap slot ordering entries by confidence only.
#[derive(Debug)]
struct Prioritized(QueueEntry);

impl PartialEq for Prioritized {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Prioritized {}

impl PartialOrd for Prioritized {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Prioritized {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.confidence.total_cmp(&other.0.confidence)
    }
}

#[derive(Debug, Default)]
pub struct ConfidenceQueue {
    heap: BinaryHeap<Prioritized>,
}

impl ConfidenceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, entry: QueueEntry) {
        self.heap.push(Prioritized(entry));
    }

    /// Removes and returns the highest-confidence entry. Ties pop in
    /// unspecified order. Ordering is `f32::total_cmp`, so a positive NaN
    /// pops before `+inf` and a negative NaN after `-inf`; neither ever
    /// commits.
    #[inline]
    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.heap.pop().map(|p| p.0)
    }

    #[inline]
    pub fn peek_confidence(&self) -> Option<f32> {
        self.heap.peek().map(|p| p.0.confidence)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl Extend<QueueEntry> for ConfidenceQueue {
    fn extend<I: IntoIterator<Item = QueueEntry>>(&mut self, iter: I) {
        self.heap.extend(iter.into_iter().map(Prioritized));
    }
}
