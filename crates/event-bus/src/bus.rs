//! Event Bus Implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

use crate::event::{Event, EventData, EventSource, LifecycleEvent};

/// Listener callback
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: LifecycleEvent,
    listener: Listener,
}

/// Process-wide lifecycle notification channel
#[derive(Default)]
pub struct EventBus {
    /// Subscriptions in registration order
    subscriptions: RwLock<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bus ready to be shared
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a listener for one event kind
    pub fn subscribe<F>(&self, kind: LifecycleEvent, listener: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscription {
                id,
                kind,
                listener: Arc::new(listener),
            });
        debug!("Subscribed {:?} to {}", id, kind.name());
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write().unwrap_or_else(PoisonError::into_inner);
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        before != subscriptions.len()
    }

    /// Deliver an event to every listener of its kind, in subscription order.
    ///
    /// Returns the number of listeners notified.
    pub fn publish(&self, kind: LifecycleEvent, source: EventSource, data: EventData) -> usize {
        // Snapshot first so listeners may subscribe or unsubscribe while running
        let listeners: Vec<Listener> = self
            .subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| Arc::clone(&s.listener))
            .collect();

        let event = Event { kind, source, data };
        trace!("Publishing {} from {:?} to {} listener(s)", kind.name(), source, listeners.len());
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    /// Number of listeners registered for an event kind
    pub fn listener_count(&self, kind: LifecycleEvent) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.kind == kind)
            .count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.subscriptions.read().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("EventBus").field("subscriptions", &count).finish()
    }
}
