//! Event bus for dispatching typed events to subscribed handlers
//!
//! The bus is an explicitly constructed, single-threaded handle. Cloning it
//! yields another handle to the same subscriber registry, so it can be
//! injected into every component that publishes or subscribes.
//!
//! Delivery is synchronous: [`EventBus::publish`] runs every matching
//! handler on the caller's stack before returning. The subscriber list is
//! snapshotted when a publish starts, which keeps re-entrant calls well
//! defined:
//! - a handler may publish again (delivery nests, depth-first)
//! - handlers registered during a publish only see later publishes
//! - unsubscribing during a publish never fails and does not change the
//!   snapshot already taken
//!
//! A panicking handler is caught, logged and counted in the returned
//! [`PublishReport`]; the remaining handlers still run.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::{error, trace};

use crate::event::{BusEvent, EventKind, Payload};

type Handler<E> = Rc<dyn Fn(&E)>;

struct Entry<E> {
    id: u64,
    handler: Handler<E>,
}

struct Registry<E: BusEvent> {
    /// Subscriptions: event kind -> handlers in registration order
    by_kind: HashMap<E::Kind, Vec<Entry<E>>>,
    /// Wildcard handlers, run after the kind-specific ones
    any: Vec<Entry<E>>,
    next_id: u64,
}

impl<E: BusEvent> Registry<E> {
    fn remove(&mut self, kind: Option<E::Kind>, id: u64) -> bool {
        let entries = match kind {
            Some(kind) => match self.by_kind.get_mut(&kind) {
                Some(entries) => entries,
                None => return false,
            },
            None => &mut self.any,
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        before != entries.len()
    }
}

/// Outcome of a single [`EventBus::publish`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Handlers that returned normally
    pub delivered: usize,
    /// Handlers that panicked
    pub failed: usize,
}

impl PublishReport {
    /// Total handlers invoked
    pub fn invoked(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Event bus that manages subscriptions and dispatches events
///
/// Generic over `E`, the registry enum (see [`BusEvent`]).
pub struct EventBus<E: BusEvent> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        let subscriptions: usize = registry.by_kind.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("subscriptions", &subscriptions)
            .field("wildcards", &registry.any.len())
            .finish()
    }
}

impl<E: BusEvent> EventBus<E> {
    /// Create a new event bus with no subscribers
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                by_kind: HashMap::new(),
                any: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Subscribe to the event carrying payload type `P`
    ///
    /// The handler receives the payload by reference.
    pub fn subscribe<P, F>(&self, handler: F) -> Subscription
    where
        P: Payload<E>,
        F: Fn(&P) + 'static,
    {
        self.register(
            Some(P::KIND),
            Rc::new(move |event: &E| {
                if let Some(payload) = P::from_event(event) {
                    handler(payload);
                }
            }),
        )
    }

    /// Subscribe to a signal-only event
    ///
    /// The handler takes no arguments. It may also be registered for a
    /// payload-bearing kind, in which case the payload is ignored.
    pub fn subscribe_signal<F>(&self, kind: E::Kind, handler: F) -> Subscription
    where
        F: Fn() + 'static,
    {
        self.register(Some(kind), Rc::new(move |_: &E| handler()))
    }

    /// Subscribe to a kind and receive the whole event
    pub fn subscribe_event<F>(&self, kind: E::Kind, handler: F) -> Subscription
    where
        F: Fn(&E) + 'static,
    {
        self.register(Some(kind), Rc::new(handler))
    }

    /// Subscribe to every event published on this bus
    pub fn subscribe_any<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&E) + 'static,
    {
        self.register(None, Rc::new(handler))
    }

    fn register(&self, kind: Option<E::Kind>, handler: Handler<E>) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            let entry = Entry { id, handler };
            match kind {
                Some(kind) => registry.by_kind.entry(kind).or_default().push(entry),
                None => registry.any.push(entry),
            }
            id
        };

        let label = kind.map_or("*", |k| k.name());
        trace!(event = label, subscription = id, "subscribed");

        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        Subscription {
            label,
            id,
            release: RefCell::new(Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    if registry.borrow_mut().remove(kind, id) {
                        trace!(event = label, subscription = id, "unsubscribed");
                    }
                }
            }))),
        }
    }

    /// Publish an event to every current subscriber of its kind
    ///
    /// Handlers run in registration order, then wildcard handlers.
    /// Publishing with no subscribers is a no-op.
    pub fn publish(&self, event: impl Into<E>) -> PublishReport {
        let event = event.into();
        let kind = event.kind();

        let snapshot: Vec<(u64, Handler<E>)> = {
            let registry = self.registry.borrow();
            registry
                .by_kind
                .get(&kind)
                .into_iter()
                .flatten()
                .chain(registry.any.iter())
                .map(|entry| (entry.id, Rc::clone(&entry.handler)))
                .collect()
        };

        let mut report = PublishReport::default();
        if snapshot.is_empty() {
            trace!(event = kind.name(), "published with no subscribers");
            return report;
        }

        for (id, handler) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(()) => report.delivered += 1,
                Err(panic) => {
                    report.failed += 1;
                    error!(
                        event = kind.name(),
                        subscription = id,
                        panic = %panic_message(panic.as_ref()),
                        "event handler panicked"
                    );
                }
            }
        }

        trace!(
            event = kind.name(),
            delivered = report.delivered,
            failed = report.failed,
            "published"
        );
        report
    }

    /// Number of kind-specific subscribers for `kind`
    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.registry
            .borrow()
            .by_kind
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Whether anything besides wildcard handlers listens for `kind`
    pub fn has_subscribers(&self, kind: E::Kind) -> bool {
        self.subscriber_count(kind) > 0
    }

    /// Drop every registration; outstanding tokens become inert
    pub fn clear(&self) {
        let mut registry = self.registry.borrow_mut();
        registry.by_kind.clear();
        registry.any.clear();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic>".to_string()
    }
}

/// Token for a single registration on an [`EventBus`]
///
/// Dropping the token unsubscribes. Call [`detach`](Self::detach) to keep the
/// handler registered for the lifetime of the bus instead.
pub struct Subscription {
    label: &'static str,
    id: u64,
    release: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl Subscription {
    /// Remove the registration
    ///
    /// Repeated calls are no-ops. Safe to call from inside a handler while
    /// the bus is publishing.
    pub fn unsubscribe(&self) {
        let release = self.release.borrow_mut().take();
        if let Some(release) = release {
            release();
        }
    }

    /// Whether [`unsubscribe`](Self::unsubscribe) has not been called yet
    pub fn is_active(&self) -> bool {
        self.release.borrow().is_some()
    }

    /// Event name this token was registered for (`"*"` for wildcards)
    pub fn event_name(&self) -> &'static str {
        self.label
    }

    /// Keep the handler registered after the token is dropped
    pub fn detach(self) {
        self.release.borrow_mut().take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.label)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
