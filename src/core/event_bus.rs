//! Typed pub/sub between the renderer session and its observers.
//!
//! `emit` runs the subscribers of that event type right away, on the emitting
//! thread, then appends the event to a bounded queue that the host loop drains
//! with `poll`. Preload events are emitted from worker threads, so the bus is
//! `Send + Sync`; clones share subscribers and queue.
//!
//! Subscribers of one type run in subscription order.

use log::warn;
use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Queue capacity; beyond it the oldest queued event is dropped
const QUEUE_CAPACITY: usize = 1024;

/// Anything that can travel on the bus
pub trait Event: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Queued event, type-erased
pub type BoxedEvent = Box<dyn Event>;

type Handler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

struct BusInner {
    handlers: RwLock<HashMap<TypeId, Vec<Handler>>>,
    queue: Mutex<VecDeque<BoxedEvent>>,
    dropped: AtomicU64,
}

#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let types = self.inner.handlers.read().map(|h| h.len()).unwrap_or(0);
        f.debug_struct("EventBus")
            .field("event_types", &types)
            .field("queued", &self.queue_len())
            .field("dropped", &self.dropped())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                handlers: RwLock::new(HashMap::new()),
                queue: Mutex::new(VecDeque::with_capacity(64)),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Register `callback` for every future `E`.
    ///
    /// ```ignore
    /// bus.subscribe::<LoadProgressEvent, _>(|e| bar.set_position(e.settled as u64));
    /// ```
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        let mut handlers = self.inner.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.entry(TypeId::of::<E>()).or_default().push(handler);
    }

    /// Run subscribers of `E` now, then queue the event for `poll`.
    pub fn emit<E: Event + Clone>(&self, event: E) {
        // Handlers run outside the lock: a handler may subscribe or emit
        let handlers = {
            let map = self.inner.handlers.read().unwrap_or_else(|e| e.into_inner());
            map.get(&TypeId::of::<E>()).cloned().unwrap_or_default()
        };
        for handler in &handlers {
            handler(&event);
        }

        let mut queue = self.inner.queue.lock().unwrap_or_else(|e| e.into_inner());
        if queue.len() >= QUEUE_CAPACITY {
            queue.pop_front();
            let dropped = self.inner.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if dropped == 1 || dropped % 256 == 0 {
                warn!("Event queue full ({}), {} events dropped so far", QUEUE_CAPACITY, dropped);
            }
        }
        queue.push_back(Box::new(event));
    }

    /// Take all queued events, oldest first
    pub fn poll(&self) -> Vec<BoxedEvent> {
        let mut queue = self.inner.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.drain(..).collect()
    }

    pub fn has_subscribers<E: Event>(&self) -> bool {
        let map = self.inner.handlers.read().unwrap_or_else(|e| e.into_inner());
        map.get(&TypeId::of::<E>()).is_some_and(|h| !h.is_empty())
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Events evicted from a full queue since creation
    pub fn dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }
}

/// Downcast a queued event to `E`.
///
/// Derefs to `dyn Event` first: `Box<dyn Event>` is itself an `Event`, and
/// calling `as_any` on the box would yield the box, never `E`.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}
