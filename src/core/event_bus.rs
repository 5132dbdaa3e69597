//! Pub/Sub event bus for curation state changes.
//!
//! - `subscribe::<E>()` registers a callback invoked synchronously on emit
//! - `emit()` runs callbacks AND queues the event
//! - `poll()` drains the queue for batch processing in the event loop
//!
//! Callbacks for one event type run in subscription order. No ordering is
//! promised across different event types.
//!
//! `EventBus` and `EventEmitter` share one inner state; the emitter is the
//! cheap handle handed to components that only publish.

use log::warn;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Queue length at which the oldest half is evicted
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events. Anything `Send + Sync + 'static` qualifies.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Queued event
pub type BoxedEvent = Box<dyn Event>;

#[derive(Default)]
struct Inner {
    subscribers: RwLock<HashMap<TypeId, Vec<Callback>>>,
    queue: Mutex<Vec<BoxedEvent>>,
}

impl Inner {
    fn dispatch(&self, type_id: TypeId, event: &dyn Any) {
        // Clone the list so callbacks may subscribe without deadlocking
        let callbacks: Vec<Callback> = self
            .subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&type_id)
            .cloned()
            .unwrap_or_default();
        for cb in callbacks {
            cb(event);
        }
    }

    fn enqueue(&self, event: BoxedEvent) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= MAX_QUEUE_SIZE {
            let evict = queue.len() / 2;
            warn!("Event queue full ({} events), evicting oldest {}", queue.len(), evict);
            queue.drain(0..evict);
        }
        queue.push(event);
    }

    fn emit<E: Event>(&self, event: E) {
        self.dispatch(TypeId::of::<E>(), &event);
        self.enqueue(Box::new(event));
    }
}

/// Pub/Sub bus with deferred polling
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events of type `E`.
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    pub fn emit<E: Event>(&self, event: E) {
        self.inner.emit(event);
    }

    /// Drain everything emitted since the last poll.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.inner.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Publishing handle sharing this bus.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            inner: Some(Arc::clone(&self.inner)),
        }
    }

    pub fn unsubscribe_all<E: Event>(&self) {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&TypeId::of::<E>());
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Publishing handle. `EventEmitter::default()` is a no-op sink, handy
/// before the bus exists and in tests.
#[derive(Clone, Default)]
pub struct EventEmitter {
    inner: Option<Arc<Inner>>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("connected", &self.inner.is_some())
            .finish()
    }
}

impl EventEmitter {
    pub fn emit<E: Event>(&self, event: E) {
        if let Some(inner) = &self.inner {
            inner.emit(event);
        }
    }
}

/// Downcast a queued event to its concrete type.
///
/// Deref to `dyn Event` first: calling `as_any()` on the box itself would hit
/// the blanket impl for `Box<dyn Event>` and the downcast would always fail.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug)]
    struct Moved(usize);

    #[derive(Clone, Debug)]
    struct Halted;

    #[test]
    fn test_subscriber_called_on_emit() {
        let bus = EventBus::new();
        let sum = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&sum);
        bus.subscribe::<Moved, _>(move |e| {
            s.fetch_add(e.0, Ordering::SeqCst);
        });

        bus.emit(Moved(3));
        bus.emit(Moved(4));
        assert_eq!(sum.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_poll_drains_queue_in_order() {
        let bus = EventBus::new();
        bus.emit(Moved(1));
        bus.emit(Halted);
        bus.emit(Moved(2));

        let events = bus.poll();
        assert_eq!(events.len(), 3);
        assert_eq!(downcast_event::<Moved>(&events[0]).map(|m| m.0), Some(1));
        assert!(downcast_event::<Halted>(&events[1]).is_some());
        assert!(downcast_event::<Moved>(&events[1]).is_none());
        assert_eq!(bus.queue_len(), 0);
    }

    #[test]
    fn test_emitter_shares_bus() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        bus.subscribe::<Halted, _>(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        bus.emitter().emit(Halted);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.poll().len(), 1);
    }

    #[test]
    fn test_default_emitter_is_silent() {
        let emitter = EventEmitter::default();
        emitter.emit(Halted);
    }

    #[test]
    fn test_unsubscribe_keeps_queueing() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        bus.subscribe::<Halted, _>(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        bus.unsubscribe_all::<Halted>();
        bus.emit(Halted);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(bus.queue_len(), 1);
    }

    #[test]
    fn test_queue_evicts_oldest_half() {
        let bus = EventBus::new();
        for i in 0..MAX_QUEUE_SIZE + 1 {
            bus.emit(Moved(i));
        }
        let events = bus.poll();
        assert_eq!(events.len(), MAX_QUEUE_SIZE / 2 + 1);
        assert_eq!(
            downcast_event::<Moved>(&events[0]).map(|m| m.0),
            Some(MAX_QUEUE_SIZE / 2)
        );
    }
}
