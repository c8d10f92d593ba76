//! Bounded blocking FIFO queue of chunk-buffer indices.
//!
//! Used for both the in-queue (I/O thread -> workers) and the out-queue
//! (workers -> I/O thread, recycling buffers) of the chunked pipeline. Built
//! on `Mutex` + `Condvar` rather than `crossbeam-channel`, the way the
//! teacher crate's thread pool pairs a `Mutex`-guarded state struct with a
//! `Condvar` for its own completion signal: the queue's `pop` contract needs
//! to observe "empty" and "done" together under one lock, which a channel's
//! disconnect signal doesn't expose directly.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

struct State {
    items: VecDeque<usize>,
    capacity: usize,
    done: bool,
}

/// A FIFO queue of `usize` slot indices, bounded at `capacity`, with a
/// one-shot `done` signal.
pub struct BoundedQueue {
    state: Mutex<State>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl BoundedQueue {
    /// Creates an empty queue that can hold up to `capacity` items at once.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be > 0");
        BoundedQueue {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                capacity,
                done: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Pushes `x`, blocking while the queue is at capacity.
    ///
    /// Pushing after [`BoundedQueue::mark_done`] has been called is allowed
    /// (it does not panic) but is not meaningful in this pipeline's usage:
    /// callers stop pushing before calling `mark_done`.
    pub fn push(&self, x: usize) {
        let mut state = self.state.lock().unwrap();
        while state.items.len() >= state.capacity {
            state = self.not_full.wait(state).unwrap();
        }
        state.items.push_back(x);
        self.not_empty.notify_one();
    }

    /// Blocks until an item is available or the queue is drained and done.
    ///
    /// Returns `None` iff the queue is empty and [`BoundedQueue::mark_done`]
    /// has been called; otherwise returns the next item in FIFO order.
    pub fn pop(&self) -> Option<usize> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(x) = state.items.pop_front() {
                self.not_full.notify_one();
                return Some(x);
            }
            if state.done {
                return None;
            }
            state = self.not_empty.wait(state).unwrap();
        }
    }

    /// Flips the terminal flag and wakes every blocked waiter. Idempotent.
    pub fn mark_done(&self) {
        let mut state = self.state.lock().unwrap();
        state.done = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Approximate current length, for orchestration/diagnostics only.
    pub fn size(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    /// Approximate emptiness, for orchestration/diagnostics only.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn push_then_pop_preserves_fifo_order() {
        let q = BoundedQueue::new(4);
        q.push(1);
        q.push(2);
        q.push(3);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
    }

    #[test]
    fn pop_on_empty_done_queue_returns_none() {
        let q = BoundedQueue::new(2);
        q.mark_done();
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn pop_drains_before_reporting_done() {
        let q = BoundedQueue::new(2);
        q.push(42);
        q.mark_done();
        assert_eq!(q.pop(), Some(42));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn pop_blocks_until_push_arrives() {
        let q = Arc::new(BoundedQueue::new(1));
        let q2 = q.clone();
        let handle = thread::spawn(move || q2.pop());
        thread::sleep(Duration::from_millis(50));
        q.push(7);
        assert_eq!(handle.join().unwrap(), Some(7));
    }

    #[test]
    fn push_blocks_at_capacity_until_pop_frees_space() {
        let q = Arc::new(BoundedQueue::new(1));
        q.push(1);
        let q2 = q.clone();
        let handle = thread::spawn(move || {
            q2.push(2);
        });
        thread::sleep(Duration::from_millis(50));
        assert_eq!(q.pop(), Some(1));
        handle.join().unwrap();
        assert_eq!(q.pop(), Some(2));
    }

    #[test]
    fn mark_done_wakes_blocked_pop() {
        let q = Arc::new(BoundedQueue::new(1));
        let q2 = q.clone();
        let handle = thread::spawn(move || q2.pop());
        thread::sleep(Duration::from_millis(50));
        q.mark_done();
        assert_eq!(handle.join().unwrap(), None);
    }
}
