//! FIFO of asynchronous dataplane events.
//!
//! The queue decouples state changes published by the dataplane from the
//! synchronous configuration calls: producers enqueue from any thread, and a
//! single consumer polls without ever blocking.
//!
//! # Ownership
//!
//! ```text
//!  producer(s) --enqueue--> [ queue-owned ] --dequeue--> DequeuedEvent --free--> hook(event)
//! ```
//!
//! An event belongs to the queue until it is dequeued, then to the consumer
//! until it is released. Release runs the queue's free hook exactly once:
//! [`DequeuedEvent::free`] consumes the handle, and dropping an unreleased
//! handle releases it too. Events still queued when the last handle goes away
//! are released by the queue itself.
//!
//! # Single consumer
//!
//! [`EventConsumer`] is not `Clone` and [`EventConsumer::dequeue`] takes
//! `&mut self`, so at most one dequeue is ever in flight.

use crossbeam_queue::SegQueue;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type FreeHook<T> = dyn Fn(T) + Send + Sync;

struct Shared<T> {
    queue: SegQueue<T>,
    free: Box<FreeHook<T>>,
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    freed: AtomicU64,
}

impl<T> Shared<T> {
    fn release(&self, event: T) {
        (self.free)(event);
        self.freed.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        while let Some(event) = self.queue.pop() {
            self.release(event);
        }
    }
}

/// Lifecycle counters of a queue.
///
/// A snapshot taken while producers run is ordered (`freed <= dequeued <=
/// enqueued`) but may lag them. `pending` is read separately and is only a
/// hint under concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub enqueued: u64,
    pub dequeued: u64,
    pub freed: u64,
    pub pending: usize,
}

impl QueueStats {
    /// Events handed to the consumer and not yet released.
    pub fn outstanding(&self) -> u64 {
        self.dequeued.saturating_sub(self.freed)
    }
}

/// Creates a queue whose events are released by dropping them.
pub fn channel<T: Send + 'static>() -> (EventProducer<T>, EventConsumer<T>) {
    channel_with_free(drop)
}

/// Creates a queue with a caller-supplied release hook.
///
/// The hook runs exactly once per event, either when the consumer releases a
/// dequeued event or when the queue is torn down with the event still pending.
pub fn channel_with_free<T, F>(free: F) -> (EventProducer<T>, EventConsumer<T>)
where
    T: Send + 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    let shared = Arc::new(Shared {
        queue: SegQueue::new(),
        free: Box::new(free),
        enqueued: AtomicU64::new(0),
        dequeued: AtomicU64::new(0),
        freed: AtomicU64::new(0),
    });

    (
        EventProducer {
            shared: Arc::clone(&shared),
        },
        EventConsumer { shared },
    )
}

/// Producer side of an event queue. Cheap to clone and safe to share.
pub struct EventProducer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> EventProducer<T> {
    /// Appends an event at the tail of the queue.
    pub fn enqueue(&self, event: T) {
        // Counted before the push so no consumer can dequeue it uncounted.
        self.shared.enqueued.fetch_add(1, Ordering::SeqCst);
        self.shared.queue.push(event);
    }

    /// Number of events waiting to be dequeued.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }
}

impl<T> Clone for EventProducer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for EventProducer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventProducer")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Consumer side of an event queue.
pub struct EventConsumer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> EventConsumer<T> {
    /// Removes and returns the oldest pending event.
    ///
    /// Returns `None` when nothing is pending. Never blocks.
    pub fn dequeue(&mut self) -> Option<DequeuedEvent<T>> {
        let event = self.shared.queue.pop()?;
        self.shared.dequeued.fetch_add(1, Ordering::SeqCst);
        Some(DequeuedEvent {
            event: ManuallyDrop::new(event),
            shared: Arc::clone(&self.shared),
        })
    }

    /// Returns a new producer handle for this queue.
    pub fn producer(&self) -> EventProducer<T> {
        EventProducer {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn len(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.queue.is_empty()
    }

    pub fn stats(&self) -> QueueStats {
        // Read downstream counters first: a snapshot then always satisfies
        // freed <= dequeued <= enqueued.
        let freed = self.shared.freed.load(Ordering::SeqCst);
        let dequeued = self.shared.dequeued.load(Ordering::SeqCst);
        let enqueued = self.shared.enqueued.load(Ordering::SeqCst);
        QueueStats {
            enqueued,
            dequeued,
            freed,
            pending: self.shared.queue.len(),
        }
    }
}

impl<T> fmt::Debug for EventConsumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventConsumer")
            .field("stats", &self.stats())
            .finish()
    }
}

/// An event owned by the consumer.
///
/// Dereferences to the event payload. Released through the queue's free hook
/// by [`free`](Self::free) or on drop.
pub struct DequeuedEvent<T> {
    event: ManuallyDrop<T>,
    shared: Arc<Shared<T>>,
}

impl<T> DequeuedEvent<T> {
    /// Releases the event.
    pub fn free(self) {
        drop(self)
    }
}

impl<T> Deref for DequeuedEvent<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.event
    }
}

impl<T> Drop for DequeuedEvent<T> {
    fn drop(&mut self) {
        // SAFETY: the payload is taken here once and `self` is never used again.
        let event = unsafe { ManuallyDrop::take(&mut self.event) };
        self.shared.release(event);
    }
}

impl<T: fmt::Debug> fmt::Debug for DequeuedEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DequeuedEvent").field(&*self.event).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_empty_dequeue() {
        let (_tx, mut rx) = channel::<u32>();
        assert!(rx.dequeue().is_none());
        assert!(rx.dequeue().is_none());
        assert!(rx.is_empty());
    }

    #[test]
    fn test_fifo_order() {
        let (tx, mut rx) = channel();
        for i in 0..5 {
            tx.enqueue(i);
        }
        let order: Vec<i32> = std::iter::from_fn(|| rx.dequeue().map(|ev| *ev)).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_free_runs_hook_once() {
        let freed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&freed);
        let (tx, mut rx) = channel_with_free(move |_: String| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tx.enqueue("a".to_string());
        tx.enqueue("b".to_string());

        let first = rx.dequeue().unwrap();
        assert_eq!(first.as_str(), "a");
        first.free();
        assert_eq!(freed.load(Ordering::SeqCst), 1);

        // Dropping without an explicit free still releases.
        drop(rx.dequeue().unwrap());
        assert_eq!(freed.load(Ordering::SeqCst), 2);

        let stats = rx.stats();
        assert_eq!(stats.enqueued, 2);
        assert_eq!(stats.dequeued, 2);
        assert_eq!(stats.freed, 2);
        assert_eq!(stats.outstanding(), 0);
    }

    #[test]
    fn test_pending_released_on_teardown() {
        let freed = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&freed);
        let (tx, rx) = channel_with_free(move |_: u8| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tx.enqueue(1);
        tx.enqueue(2);
        tx.enqueue(3);
        drop(rx);
        assert_eq!(freed.load(Ordering::SeqCst), 0);
        drop(tx);
        assert_eq!(freed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_producer_from_consumer() {
        let (_tx, mut rx) = channel();
        rx.producer().enqueue(9u16);
        assert_eq!(rx.len(), 1);
        assert_eq!(*rx.dequeue().unwrap(), 9);
    }
}
