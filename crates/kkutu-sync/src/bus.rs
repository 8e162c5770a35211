//! Lifecycle event bus.
//!
//! Two ways to listen:
//! - [`LifecycleEventBus::subscribe`] registers a synchronous handler that
//!   runs on the publishing thread, inside the synchronizer's session lock.
//!   It stays registered until the returned [`Subscription`] is dropped.
//! - [`LifecycleEventBus::receiver`] returns a broadcast receiver for async
//!   consumers. Slow receivers lag rather than block publishing.
//!
//! Handlers must be quick and must not panic: a panicking handler unwinds
//! into whichever poller or dispatch task published the event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use kkutu_core::LifecycleEvent;
use metrics::counter;
use parking_lot::RwLock;
use tokio::sync::broadcast;

/// Default broadcast channel capacity.
const DEFAULT_CAPACITY: usize = 1024;

/// Synchronous lifecycle event handler.
pub trait LifecycleHandler: Send + Sync {
    /// Called once per published event.
    fn handle(&self, event: &LifecycleEvent);
}

impl<F> LifecycleHandler for F
where
    F: Fn(&LifecycleEvent) + Send + Sync,
{
    fn handle(&self, event: &LifecycleEvent) {
        self(event);
    }
}

type HandlerEntry = (u64, Arc<dyn LifecycleHandler>);

/// Multi-subscriber surface for [`LifecycleEvent`]s.
pub struct LifecycleEventBus {
    handlers: RwLock<Vec<HandlerEntry>>,
    next_id: AtomicU64,
    tx: broadcast::Sender<LifecycleEvent>,
    emit_count: AtomicU64,
}

impl LifecycleEventBus {
    /// Bus with the default broadcast capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Bus with a custom broadcast capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
            tx,
            emit_count: AtomicU64::new(0),
        }
    }

    /// Register a synchronous handler. Dropping the returned
    /// [`Subscription`] unregisters it.
    #[must_use = "dropping the subscription unregisters the handler"]
    pub fn subscribe(self: &Arc<Self>, handler: impl LifecycleHandler + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.write().push((id, Arc::new(handler)));
        Subscription {
            bus: Arc::downgrade(self),
            id,
            detached: false,
        }
    }

    /// Receiver for async consumers; sees events published after this call.
    pub fn receiver(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }

    /// Deliver `event` to every handler, then to broadcast receivers.
    ///
    /// Returns the number of listeners reached.
    pub fn publish(&self, event: LifecycleEvent) -> usize {
        let _ = self.emit_count.fetch_add(1, Ordering::Relaxed);
        counter!("lifecycle_events_total", "type" => event.event_type()).increment(1);

        // Snapshot so handlers may subscribe or unsubscribe re-entrantly.
        let handlers: Vec<Arc<dyn LifecycleHandler>> = self
            .handlers
            .read()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in &handlers {
            handler.handle(&event);
        }
        handlers.len() + self.tx.send(event).unwrap_or(0)
    }

    /// Number of registered synchronous handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Total events published.
    pub fn emit_count(&self) -> u64 {
        self.emit_count.load(Ordering::Relaxed)
    }

    fn unsubscribe(&self, id: u64) {
        self.handlers.write().retain(|(entry_id, _)| *entry_id != id);
    }
}

impl Default for LifecycleEventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle keeping a synchronous handler registered.
pub struct Subscription {
    bus: Weak<LifecycleEventBus>,
    id: u64,
    detached: bool,
}

impl Subscription {
    /// Unregister now.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the handler registered for the bus's whole lifetime.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kkutu_core::BaseEvent;
    use parking_lot::Mutex;

    fn ended() -> LifecycleEvent {
        LifecycleEvent::GameEnded {
            base: BaseEvent::now("s1"),
        }
    }

    fn recorder(bus: &Arc<LifecycleEventBus>) -> (Arc<Mutex<Vec<String>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = bus.subscribe(move |e: &LifecycleEvent| sink.lock().push(e.event_type().to_owned()));
        (seen, sub)
    }

    #[test]
    fn publish_without_listeners() {
        let bus = LifecycleEventBus::new();
        assert_eq!(bus.publish(ended()), 0);
        assert_eq!(bus.emit_count(), 1);
    }

    #[test]
    fn handlers_run_synchronously() {
        let bus = Arc::new(LifecycleEventBus::new());
        let (seen, _sub) = recorder(&bus);
        assert_eq!(bus.publish(ended()), 1);
        assert_eq!(*seen.lock(), vec!["game_ended".to_owned()]);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let bus = Arc::new(LifecycleEventBus::new());
        let (seen, sub) = recorder(&bus);
        assert_eq!(bus.handler_count(), 1);
        sub.unsubscribe();
        assert_eq!(bus.handler_count(), 0);
        let _ = bus.publish(ended());
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn detached_subscription_stays() {
        let bus = Arc::new(LifecycleEventBus::new());
        let (seen, sub) = recorder(&bus);
        sub.detach();
        let _ = bus.publish(ended());
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus = Arc::new(LifecycleEventBus::new());
        let (_seen, sub) = recorder(&bus);
        drop(bus);
        drop(sub);
    }

    #[test]
    fn handler_may_unsubscribe_itself() {
        let bus = Arc::new(LifecycleEventBus::new());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot2 = Arc::clone(&slot);
        let sub = bus.subscribe(move |_: &LifecycleEvent| {
            let _ = slot2.lock().take();
        });
        *slot.lock() = Some(sub);
        let _ = bus.publish(ended());
        assert_eq!(bus.handler_count(), 0);
    }

    #[tokio::test]
    async fn async_receivers_get_events() {
        let bus = LifecycleEventBus::new();
        let mut rx = bus.receiver();
        assert_eq!(bus.publish(ended()), 1);
        let got = rx.recv().await.unwrap();
        assert_eq!(got.event_type(), "game_ended");
    }

    #[tokio::test]
    async fn slow_receiver_lags() {
        let bus = LifecycleEventBus::with_capacity(2);
        let mut rx = bus.receiver();
        for _ in 0..3 {
            let _ = bus.publish(ended());
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
    }
}
