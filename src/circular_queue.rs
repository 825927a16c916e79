use std::collections::VecDeque;
use std::fmt;

/// Newest-first queue; drops the oldest item once `capacity` is reached.
/// Without a capacity it grows for the lifetime of the owner.
pub struct CircularQueue<T> {
    deque: VecDeque<T>,
    capacity: Option<usize>,
}

impl<T: Clone> Clone for CircularQueue<T> {
    fn clone(&self) -> Self {
        Self {
            deque: self.deque.clone(),
            capacity: self.capacity,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for CircularQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.deque.fmt(f)
    }
}

impl<T> CircularQueue<T> {
    #[inline]
    pub fn unbounded() -> Self {
        Self {
            deque: VecDeque::new(),
            capacity: None,
        }
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            deque: VecDeque::with_capacity(cap),
            capacity: Some(cap),
        }
    }

    #[inline]
    pub fn push(&mut self, item: T) -> Option<T> {
        let poped = if self.is_full() {
            self.deque.pop_back()
        } else {
            None
        };

        self.deque.push_front(item);

        poped
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.deque.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deque.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        matches!(self.capacity, Some(cap) if self.deque.len() >= cap)
    }

    #[inline]
    pub fn top(&self) -> Option<&T> {
        self.deque.front()
    }

    /// Newest to oldest
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'_ T> + ExactSizeIterator {
        self.deque.iter()
    }

    /// Oldest to newest
    #[inline]
    pub fn asc_iter(&self) -> impl DoubleEndedIterator<Item = &'_ T> + ExactSizeIterator {
        self.deque.iter().rev()
    }
}
