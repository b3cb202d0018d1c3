//! # Handler Registry
//!
//! Maps event types to callbacks. Registering under [`crate::WILDCARD`]
//! matches every event. Dispatch snapshots the matching handlers before
//! invoking any of them, so a handler may remove itself (or others) without
//! deadlocking or perturbing the in-flight dispatch.

use crate::envelope::{EventEnvelope, WILDCARD};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback invoked for each matching event.
pub type HandlerFn = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;

/// Opaque token returned by [`HandlerRegistry::on`], used to unregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Thread-safe registry of event handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Vec<(HandlerId, HandlerFn)>>>,
    next_id: AtomicU64,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event_type` (or [`WILDCARD`] for all events).
    pub fn on<F>(&self, event_type: &str, handler: F) -> HandlerId
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .entry(event_type.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a previously registered handler. Returns `true` if it was found.
    pub fn off(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        for list in handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(hid, _)| *hid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Number of registered handlers across all event types.
    pub fn len(&self) -> usize {
        self.handlers.read().values().map(Vec::len).sum()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every handler matching `event.event_type`, exact matches first,
    /// then wildcard handlers, each in registration order.
    pub fn dispatch(&self, event: &EventEnvelope) {
        let matching: Vec<HandlerFn> = {
            let handlers = self.handlers.read();
            let exact = handlers
                .get(&event.event_type)
                .into_iter()
                .flatten()
                .map(|(_, f)| Arc::clone(f));
            let wildcard = handlers
                .get(WILDCARD)
                .into_iter()
                .flatten()
                .map(|(_, f)| Arc::clone(f));
            exact.chain(wildcard).collect()
        };
        for handler in matching {
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_exact_and_wildcard_dispatch() {
        let registry = HandlerRegistry::new();
        let exact = Arc::new(AtomicUsize::new(0));
        let all = Arc::new(AtomicUsize::new(0));

        let e = Arc::clone(&exact);
        registry.on("death", move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });
        let a = Arc::clone(&all);
        registry.on(WILDCARD, move |_| {
            a.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&EventEnvelope::synthetic("death"));
        registry.dispatch(&EventEnvelope::synthetic("heartbeat"));

        assert_eq!(exact.load(Ordering::SeqCst), 1);
        assert_eq!(all.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_off_removes_handler() {
        let registry = HandlerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let id = registry.on("status", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&EventEnvelope::synthetic("status"));
        assert!(registry.off(id));
        registry.dispatch(&EventEnvelope::synthetic("status"));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!registry.off(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_handler_may_remove_itself_during_dispatch() {
        let registry = Arc::new(HandlerRegistry::new());
        let count = Arc::new(AtomicUsize::new(0));
        let own_id: Arc<Mutex<Option<HandlerId>>> = Arc::new(Mutex::new(None));

        let r = Arc::clone(&registry);
        let c = Arc::clone(&count);
        let slot = Arc::clone(&own_id);
        let id = registry.on("status", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = slot.lock().take() {
                r.off(id);
            }
        });
        *own_id.lock() = Some(id);

        registry.dispatch(&EventEnvelope::synthetic("status"));
        registry.dispatch(&EventEnvelope::synthetic("status"));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_order_is_registration_order() {
        let registry = HandlerRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let o = Arc::clone(&order);
            registry.on("status", move |_| o.lock().push(tag));
        }
        let o = Arc::clone(&order);
        registry.on(WILDCARD, move |_| o.lock().push("wildcard"));

        registry.dispatch(&EventEnvelope::synthetic("status"));
        assert_eq!(*order.lock(), vec!["first", "second", "wildcard"]);
    }
}
