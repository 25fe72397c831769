//! Bounded most-recent-first buffer for ticker-style widgets

use std::collections::VecDeque;

/// Ordered records capped at `capacity`, newest at the head.
///
/// `len() <= capacity()` holds after every call returns.
#[derive(Debug, Clone)]
pub struct BoundedBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the head, evicting from the tail while over capacity.
    ///
    /// Returns how many items were evicted.
    pub fn push_front(&mut self, item: T) -> usize {
        self.items.push_front(item);
        self.trim()
    }

    /// Change the cap; shrinking trims the tail immediately
    pub fn set_capacity(&mut self, capacity: usize) -> usize {
        self.capacity = capacity;
        self.trim()
    }

    fn trim(&mut self) -> usize {
        let excess = self.items.len().saturating_sub(self.capacity);
        self.items.truncate(self.capacity);
        excess
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Most recent item
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Items, most recent first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(buffer: &BoundedBuffer<&'static str>) -> Vec<&'static str> {
        buffer.iter().copied().collect()
    }

    #[test]
    fn test_most_recent_first_with_eviction() {
        let mut buffer = BoundedBuffer::new(3);
        for id in ["a", "b", "c"] {
            assert_eq!(buffer.push_front(id), 0);
        }
        assert_eq!(contents(&buffer), ["c", "b", "a"]);

        assert_eq!(buffer.push_front("d"), 1);
        assert_eq!(contents(&buffer), ["d", "c", "b"]);
        assert_eq!(buffer.front(), Some(&"d"));
    }

    #[test]
    fn test_shrinking_capacity_trims_immediately() {
        let mut buffer = BoundedBuffer::new(5);
        for id in ["a", "b", "c", "d", "e"] {
            buffer.push_front(id);
        }
        assert_eq!(buffer.set_capacity(2), 3);
        assert_eq!(contents(&buffer), ["e", "d"]);

        // Growing does not resurrect anything
        assert_eq!(buffer.set_capacity(4), 0);
        assert_eq!(contents(&buffer), ["e", "d"]);
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut buffer = BoundedBuffer::new(0);
        assert_eq!(buffer.push_front("a"), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_invariant_under_mixed_operations() {
        let mut buffer = BoundedBuffer::new(4);
        let mut seq = 0u32;
        // Deterministic mix of inserts and capacity changes
        for step in 0..200u32 {
            if step % 17 == 0 {
                buffer.set_capacity((step as usize / 17) % 6);
            } else {
                seq += 1;
                buffer.push_front(seq);
            }
            assert!(buffer.len() <= buffer.capacity());
            let items: Vec<u32> = buffer.iter().copied().collect();
            assert!(
                items.windows(2).all(|w| w[0] > w[1]),
                "not most-recent-first: {:?}",
                items
            );
        }
    }
}
