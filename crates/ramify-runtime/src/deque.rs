//! Fixed-capacity double-ended task queue, one per worker.
//!
//! The deque is a circular buffer guarded by a single spin lock. The owning
//! worker pushes newly spawned tasks at the back and pops from the back when
//! looking for local work, so the most recently spawned task runs first
//! (LIFO), which keeps divide-and-conquer recursion working on the hot end
//! of the tree. Thieves pop from the front and therefore receive the oldest
//! task in the queue — typically the coarsest-grained one, which keeps steal
//! traffic low.
//!
//! Capacity is a hard bound. When the buffer is full, `push_*` hands the
//! rejected element back to the caller instead of blocking or growing; the
//! scheduler reacts by executing the task inline (see
//! [`ThreadPool::spawn`](crate::ThreadPool::spawn)).

use crate::sync::SpinLock;

/// Default number of slots in each worker's deque.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// A bounded, lock-guarded double-ended queue.
pub struct WorkDeque<T> {
    inner: SpinLock<Ring<T>>,
}

struct Ring<T> {
    slots: Box<[Option<T>]>,
    front: usize,
    len: usize,
}

impl<T> Ring<T> {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn push_front(&mut self, value: T) -> Result<(), T> {
        if self.len == self.capacity() {
            return Err(value);
        }
        self.front = (self.front + self.capacity() - 1) % self.capacity();
        self.slots[self.front] = Some(value);
        self.len += 1;
        Ok(())
    }

    fn push_back(&mut self, value: T) -> Result<(), T> {
        if self.len == self.capacity() {
            return Err(value);
        }
        let back = (self.front + self.len) % self.capacity();
        self.slots[back] = Some(value);
        self.len += 1;
        Ok(())
    }

    fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.front].take();
        debug_assert!(value.is_some());
        self.front = (self.front + 1) % self.capacity();
        self.len -= 1;
        value
    }

    fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let back = (self.front + self.len - 1) % self.capacity();
        let value = self.slots[back].take();
        debug_assert!(value.is_some());
        self.len -= 1;
        value
    }
}

impl<T> WorkDeque<T> {
    /// Create a deque with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a deque with room for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "deque capacity must be at least 1");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        WorkDeque {
            inner: SpinLock::new(Ring {
                slots: slots.into_boxed_slice(),
                front: 0,
                len: 0,
            }),
        }
    }

    /// Push onto the thief end.
    ///
    /// Returns the rejected element when the deque is full.
    pub fn push_front(&self, value: T) -> Result<(), T> {
        self.inner.lock().push_front(value)
    }

    /// Push onto the owner end.
    ///
    /// Returns the rejected element when the deque is full.
    pub fn push_back(&self, value: T) -> Result<(), T> {
        self.inner.lock().push_back(value)
    }

    /// Pop from the thief end: the oldest element pushed by the owner.
    pub fn pop_front(&self) -> Option<T> {
        self.inner.lock().pop_front()
    }

    /// Pop from the owner end: the most recently pushed element.
    pub fn pop_back(&self) -> Option<T> {
        self.inner.lock().pop_back()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().len == 0
    }

    pub fn is_full(&self) -> bool {
        let ring = self.inner.lock();
        ring.len == ring.capacity()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}

impl<T> Default for WorkDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_owner_end_is_lifo() {
        let deque = WorkDeque::new();
        deque.push_back(1).unwrap();
        deque.push_back(2).unwrap();
        deque.push_back(3).unwrap();

        assert_eq!(deque.pop_back(), Some(3));
        assert_eq!(deque.pop_back(), Some(2));
        assert_eq!(deque.pop_back(), Some(1));
        assert_eq!(deque.pop_back(), None);
    }

    #[test]
    fn test_thief_end_is_fifo() {
        let deque = WorkDeque::new();
        deque.push_back(1).unwrap();
        deque.push_back(2).unwrap();
        deque.push_back(3).unwrap();

        assert_eq!(deque.pop_front(), Some(1));
        assert_eq!(deque.pop_front(), Some(2));
        assert_eq!(deque.pop_front(), Some(3));
        assert_eq!(deque.pop_front(), None);
    }

    #[test]
    fn test_push_front_is_popped_first_by_thief() {
        let deque = WorkDeque::new();
        deque.push_back(1).unwrap();
        deque.push_front(2).unwrap();

        assert_eq!(deque.pop_front(), Some(2));
        assert_eq!(deque.pop_front(), Some(1));
    }

    #[test]
    fn test_capacity_is_a_hard_bound() {
        let capacity = 4;
        let deque = WorkDeque::with_capacity(capacity);

        for i in 0..capacity {
            assert!(deque.push_back(i).is_ok());
        }
        assert!(deque.is_full());

        // The push past capacity fails and hands the element back.
        assert_eq!(deque.push_back(99), Err(99));
        assert_eq!(deque.push_front(99), Err(99));

        // One pop re-admits exactly one element.
        assert_eq!(deque.pop_front(), Some(0));
        assert!(deque.push_back(100).is_ok());
        assert_eq!(deque.push_back(101), Err(101));
    }

    #[test]
    fn test_default_capacity() {
        let deque: WorkDeque<u32> = WorkDeque::new();
        assert_eq!(deque.capacity(), DEFAULT_QUEUE_CAPACITY);
        assert!(deque.is_empty());
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let deque = WorkDeque::with_capacity(3);

        // Drive the indices around the ring a few times.
        for round in 0..10 {
            deque.push_back(round * 10).unwrap();
            deque.push_back(round * 10 + 1).unwrap();
            assert_eq!(deque.pop_front(), Some(round * 10));
            assert_eq!(deque.pop_back(), Some(round * 10 + 1));
            assert!(deque.is_empty());
        }
    }

    #[test]
    #[should_panic(expected = "deque capacity must be at least 1")]
    fn test_zero_capacity_rejected() {
        let _ = WorkDeque::<u32>::with_capacity(0);
    }
}
