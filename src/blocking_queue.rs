use std::collections::VecDeque;
use std::fmt;
use std::iter::FromIterator;
use std::mem;
use std::ptr;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::trace;

/// Returned by [`BlockingQueue::front`] when there is nothing to peek at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("attempt to access empty queue")]
pub struct EmptyQueueError;

/// Unbounded FIFO for handing values from producer threads to consumer threads.
///
/// `dequeue` blocks while the queue is empty, every other operation only
/// waits for the lock. The queue is not `Clone`; share it by reference,
/// e.g. behind an `Arc`.
pub struct BlockingQueue<T> {
    queue: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

impl<T> BlockingQueue<T> {
    pub fn new() -> Self {
        BlockingQueue {
            queue: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    /// Builds a new queue holding every element of `source`, in order,
    /// and leaves `source` empty. The new queue has its own lock and condvar.
    pub fn take_from(source: &BlockingQueue<T>) -> Self {
        let items = mem::take(&mut *source.lock());
        trace!("take_from moved {} elements", items.len());
        BlockingQueue::from(items)
    }

    /// Replaces the contents of `self` with those of `source`, leaving
    /// `source` empty. Elements previously held by `self` are dropped.
    ///
    /// Both locks are held for the whole transfer. They are taken in
    /// address order so two threads moving in opposite directions cannot
    /// deadlock. Moving a queue onto itself does nothing.
    pub fn move_from(&self, source: &BlockingQueue<T>) {
        if ptr::eq(self, source) {
            return;
        }

        let (mut dest, mut src) = if (self as *const Self) < (source as *const Self) {
            let dest = self.lock();
            let src = source.lock();
            (dest, src)
        } else {
            let src = source.lock();
            let dest = self.lock();
            (dest, src)
        };

        let replaced = mem::replace(&mut *dest, mem::take(&mut *src));
        let moved = dest.len();
        drop(src);
        drop(dest);
        trace!("move_from moved {} elements, dropped {}", moved, replaced.len());

        // consumers parked on the destination would otherwise miss the new elements
        if moved > 0 {
            self.not_empty.notify_all();
        }
    }

    pub fn enqueue(&self, value: T) {
        {
            let mut queue = self.lock();
            queue.push_back(value);
        }
        self.not_empty.notify_one();
    }

    /// Removes and returns the front element, waiting for a producer if the
    /// queue is empty. There is no timeout.
    pub fn dequeue(&self) -> T {
        let mut queue = self.lock();
        loop {
            if let Some(front) = queue.pop_front() {
                return front;
            }
            trace!("dequeue waiting on empty queue");
            queue = self
                .not_empty
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);
            trace!("dequeue woken, {} queued", queue.len());
        }
    }

    /// Non-blocking variant of [`dequeue`](Self::dequeue).
    pub fn try_dequeue(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Returns a copy of the element `dequeue` would return next.
    /// Fails immediately instead of waiting when the queue is empty.
    pub fn front(&self) -> Result<T, EmptyQueueError>
    where
        T: Clone,
    {
        self.with_front(T::clone)
    }

    /// Runs `f` against the front element while the lock is held.
    ///
    /// `f` must not call back into this queue.
    pub fn with_front<R, F>(&self, f: F) -> Result<R, EmptyQueueError>
    where
        F: FnOnce(&T) -> R,
    {
        let queue = self.lock();
        queue.front().map(f).ok_or(EmptyQueueError)
    }

    /// Drops every queued element. Blocked consumers stay blocked.
    pub fn clear(&self) {
        let drained = mem::take(&mut *self.lock());
        trace!("clear dropped {} elements", drained.len());
    }

    /// Number of queued elements at the moment the lock was held.
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn into_inner(self) -> VecDeque<T> {
        self.queue
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Every critical section leaves the deque consistent, so a panic on
    // another thread while holding the lock does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<VecDeque<T>> for BlockingQueue<T> {
    fn from(items: VecDeque<T>) -> Self {
        BlockingQueue {
            queue: Mutex::new(items),
            not_empty: Condvar::new(),
        }
    }
}

impl<T> FromIterator<T> for BlockingQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        BlockingQueue::from(iter.into_iter().collect::<VecDeque<T>>())
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingQueue")
            .field("size", &self.size())
            .finish()
    }
}
