//! Event publishing sink.
//!
//! Aggregates publish each newly recorded event once. Delivery, subscription
//! and persistence of published events belong to the bus implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, mpsc};

/// Fire-and-forget publish sink for domain events.
///
/// `publish` is synchronous and infallible from the publisher's side; any
/// failure or backpressure handling is the bus's own concern.
pub trait EventBus<E>: Send + Sync {
    fn publish(&self, event: E);
}

impl<E, B> EventBus<E> for &B
where
    B: EventBus<E> + ?Sized,
{
    fn publish(&self, event: E) {
        (**self).publish(event)
    }
}

impl<E, B> EventBus<E> for Arc<B>
where
    B: EventBus<E> + ?Sized,
{
    fn publish(&self, event: E) {
        (**self).publish(event)
    }
}

/// In-memory bus for tests/dev.
///
/// - Keeps every published event until drained
/// - Fans out a copy to each live subscriber
/// - No IO / no async
#[derive(Debug)]
pub struct InMemoryEventBus<E> {
    published: Mutex<Vec<E>>,
    subscribers: Mutex<Vec<mpsc::Sender<E>>>,
}

impl<E> InMemoryEventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a receiver for every event published from now on.
    pub fn subscribe(&self) -> mpsc::Receiver<E> {
        let (tx, rx) = mpsc::channel();
        lock(&self.subscribers).push(tx);
        rx
    }

    /// Removes and returns the recorded events, oldest first.
    pub fn drain(&self) -> Vec<E> {
        std::mem::take(&mut *lock(&self.published))
    }

    pub fn len(&self) -> usize {
        lock(&self.published).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.published).is_empty()
    }
}

impl<E: Clone> InMemoryEventBus<E> {
    /// Returns a copy of the recorded events, oldest first.
    pub fn published(&self) -> Vec<E> {
        lock(&self.published).clone()
    }
}

impl<E> Default for InMemoryEventBus<E> {
    fn default() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<E> EventBus<E> for InMemoryEventBus<E>
where
    E: Clone + Send,
{
    fn publish(&self, event: E) {
        // Drop any dead subscribers while publishing.
        lock(&self.subscribers).retain(|tx| tx.send(event.clone()).is_ok());
        lock(&self.published).push(event);
    }
}

// A panic while holding the lock cannot leave a Vec half-written, so a
// poisoned lock is still safe to use.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
