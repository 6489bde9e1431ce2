//! Indexed Container
//!
//! Ordered, index-addressable storage used for both the pending and the
//! main side of a [`QueueManager`](crate::queue::QueueManager). Reads are
//! forgiving (out-of-range yields `None`); writes are checked and report
//! [`QueueError::IndexOutOfBounds`].

use std::cmp::Ordering;
use crate::queue::{QueueError, QueueResult};

/// Generic ordered sequence with checked positional writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedContainer<T> {
    items: Vec<T>,
}

impl<T> IndexedContainer<T> {
    /// Create an empty container
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty container with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Current number of items
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`, or `None` when `index >= count`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Replace the item at `index`
    pub fn set(&mut self, index: usize, value: T) -> QueueResult<()> {
        let count = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(QueueError::index_out_of_bounds(index, count)),
        }
    }

    /// Positional update; same contract as [`set`](Self::set)
    pub fn update(&mut self, value: T, index: usize) -> QueueResult<()> {
        self.set(index, value)
    }

    /// Add an item at the end
    pub fn append(&mut self, value: T) {
        self.items.push(value);
    }

    /// Insert an item at `index`, shifting later items right.
    ///
    /// `index == count` appends.
    pub fn insert(&mut self, value: T, index: usize) -> QueueResult<()> {
        if index > self.items.len() {
            return Err(QueueError::index_out_of_bounds(index, self.items.len()));
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Insert each item at position 0 in turn, so the last item yielded
    /// ends up first
    pub fn prepend_each<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut batch: Vec<T> = items.into_iter().collect();
        batch.reverse();
        self.items.splice(0..0, batch);
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Remove all items
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sort in place. The sort is stable: equal items keep their order.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.items.sort_by(compare);
    }

    /// Clear, then fill with `items` in the order given
    pub fn replace_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.items.clear();
        self.items.extend(items);
    }

    /// Move every item out, leaving the container empty
    pub fn drain_all(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> IndexedContainer<T> {
    /// Items satisfying `predicate`, in container order
    pub fn filter<P>(&self, mut predicate: P) -> Vec<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Snapshot copy of all items in order
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<T> Default for IndexedContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for IndexedContainer<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for IndexedContainer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a IndexedContainer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
