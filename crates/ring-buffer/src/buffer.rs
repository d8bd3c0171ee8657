//! Ring Buffer Implementation

use std::collections::VecDeque;

/// Bounded FIFO window; pushing onto a full buffer evicts the oldest sample
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Samples, oldest at the front
    storage: VecDeque<T>,
    /// Maximum number of retained samples
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Ring buffer capacity must be > 0");
        Self {
            storage: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a sample, returning the evicted one if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.storage.len() >= self.capacity {
            self.storage.pop_front()
        } else {
            None
        };
        self.storage.push_back(item);
        evicted
    }

    /// Number of samples currently retained
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// True once `capacity` samples are retained
    pub fn is_full(&self) -> bool {
        self.storage.len() == self.capacity
    }

    /// Most recent sample
    pub fn back(&self) -> Option<&T> {
        self.storage.back()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.storage.iter()
    }

    /// Count samples matching a predicate
    pub fn count_where<F>(&self, mut pred: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.storage.iter().filter(|item| pred(item)).count()
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }
}

impl<T: PartialEq> RingBuffer<T> {
    /// Most frequent sample; ties go to whichever value was seen first
    pub fn mode(&self) -> Option<&T> {
        let mut tallies: Vec<(&T, usize)> = Vec::new();
        for item in &self.storage {
            match tallies.iter_mut().find(|(seen, _)| *seen == item) {
                Some((_, n)) => *n += 1,
                None => tallies.push((item, 1)),
            }
        }

        let mut best: Option<(&T, usize)> = None;
        for (item, n) in tallies {
            if best.map_or(true, |(_, top)| n > top) {
                best = Some((item, n));
            }
        }
        best.map(|(item, _)| item)
    }
}
