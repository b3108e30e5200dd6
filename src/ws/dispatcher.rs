//! Observer registry that fans events out to application callbacks.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use dashmap::DashMap;

use super::event::{Event, EventKind};

/// A registered observer callback.
///
/// Callbacks are compared by [`Arc::ptr_eq`], so keep a clone of the `Arc`
/// around if you want to unregister it later.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

/// Ordered observer lists keyed by [`EventKind`].
///
/// Insertion order is invocation order and the same callback may be
/// registered more than once. A panicking callback is caught and logged and
/// does not stop the remaining callbacks from running.
#[derive(Default, Clone)]
pub struct ObserverRegistry {
    listeners: Arc<DashMap<EventKind, Vec<Listener>>>,
}

impl ObserverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `listener` to the observers of `kind`.
    pub fn subscribe(&self, kind: EventKind, listener: Listener) {
        self.listeners.entry(kind).or_default().push(listener);
    }

    /// Remove every registration of `listener` for `kind`, returning how many were removed.
    pub fn unsubscribe(&self, kind: EventKind, listener: &Listener) -> usize {
        let Some(mut entry) = self.listeners.get_mut(&kind) else {
            return 0;
        };

        let before = entry.len();
        entry.retain(|registered| !Arc::ptr_eq(registered, listener));
        before - entry.len()
    }

    /// Number of observers registered for `kind`.
    #[must_use]
    pub fn len(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, |entry| entry.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.iter().all(|entry| entry.is_empty())
    }

    /// Drop every observer.
    pub fn clear(&self) {
        self.listeners.clear();
    }

    /// Deliver `event` to every observer of its kind, in registration order.
    ///
    /// Returns the number of observers that completed without panicking.
    pub fn publish(&self, event: &Event) -> usize {
        let kind = event.kind();
        // Snapshot so callbacks can (un)register without deadlocking on the shard lock
        let snapshot: Vec<Listener> = match self.listeners.get(&kind) {
            Some(entry) => entry.value().clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for listener in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => delivered += 1,
                Err(panic) => {
                    let reason = panic_message(panic.as_ref());
                    #[cfg(feature = "tracing")]
                    tracing::error!(%kind, %reason, "Observer callback panicked");
                    #[cfg(not(feature = "tracing"))]
                    let _ = (&kind, &reason);
                }
            }
        }

        delivered
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ws::event::CloseInfo;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> Listener {
        let log = Arc::clone(log);
        Arc::new(move |_event: &Event| log.lock().unwrap().push(name.to_owned()))
    }

    fn panicking_observer(_event: &Event) {
        panic!("observer failure");
    }

    #[test]
    fn publishes_in_registration_order() {
        let registry = ObserverRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.subscribe(EventKind::Connect, recorder(&log, "first"));
        registry.subscribe(EventKind::Connect, recorder(&log, "second"));
        registry.subscribe(EventKind::Disconnect, recorder(&log, "other"));

        let delivered = registry.publish(&Event::Connect("up".to_owned()));

        assert_eq!(delivered, 2);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn panicking_observer_does_not_stop_the_rest() {
        let registry = ObserverRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.subscribe(EventKind::Disconnect, Arc::new(panicking_observer));
        registry.subscribe(EventKind::Disconnect, recorder(&log, "survivor"));

        let delivered = registry.publish(&Event::Disconnect(CloseInfo::new(1006, "")));

        assert_eq!(delivered, 1);
        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    }

    #[test]
    fn unsubscribe_removes_every_matching_registration() {
        let registry = ObserverRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let twice = recorder(&log, "twice");
        let kept = recorder(&log, "kept");

        registry.subscribe(EventKind::Message, Arc::clone(&twice));
        registry.subscribe(EventKind::Message, Arc::clone(&kept));
        registry.subscribe(EventKind::Message, Arc::clone(&twice));

        assert_eq!(registry.unsubscribe(EventKind::Message, &twice), 2);
        assert_eq!(registry.unsubscribe(EventKind::Error, &twice), 0);
        assert_eq!(registry.len(EventKind::Message), 1);

        registry.publish(&Event::Message(serde_json::json!({"status": "ok"})));
        assert_eq!(*log.lock().unwrap(), vec!["kept"]);
    }

    #[test]
    fn observer_may_register_during_publish() {
        let registry = ObserverRegistry::new();
        let inner = registry.clone();

        registry.subscribe(
            EventKind::Connect,
            Arc::new(move |_event: &Event| {
                inner.subscribe(EventKind::Connect, Arc::new(|_event: &Event| {}));
            }),
        );

        assert_eq!(registry.publish(&Event::Connect(String::new())), 1);
        assert_eq!(registry.len(EventKind::Connect), 2);

        registry.clear();
        assert!(registry.is_empty());
    }
}
