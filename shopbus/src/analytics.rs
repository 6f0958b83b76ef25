//! Analytics consumer
//!
//! [`AnalyticsLogger`] listens for analytics events and for the cart events
//! analytics cares about, and writes each one to `tracing` as JSON. It keeps
//! the most recent entries in a ring buffer so hosts and tests can inspect
//! them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::events::{AppBus, AppEvent, EventName};
use crate::{BusEvent, Clock, EventKind, Subscription};

/// Event kinds the logger subscribes to, in subscription order
pub const LOGGED_EVENTS: &[EventName] = &[
    EventName::AnalyticsTrack,
    EventName::AnalyticsPageView,
    EventName::AnalyticsUserAction,
    EventName::CartItemAdded,
    EventName::CartItemRemoved,
    EventName::CartCleared,
];

/// Entries kept by [`AnalyticsLogger::attach`]
pub const DEFAULT_CAPACITY: usize = 500;

/// One event as the logger saw it
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEvent {
    pub kind: EventName,
    /// Payload rendered as JSON, `null` for signals
    pub payload: Value,
    pub logged_at: DateTime<Utc>,
}

/// Structured log sink for analytics and cart events
///
/// Every event is written to `tracing`. Only the newest `capacity` entries
/// are kept in memory; a capacity of zero keeps none. Dropping the logger
/// unsubscribes it.
pub struct AnalyticsLogger {
    entries: Rc<RefCell<VecDeque<LoggedEvent>>>,
    capacity: usize,
    _subscriptions: Vec<Subscription>,
}

impl AnalyticsLogger {
    pub fn attach(bus: &AppBus, clock: Rc<dyn Clock>) -> Self {
        Self::with_capacity(bus, clock, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(bus: &AppBus, clock: Rc<dyn Clock>, capacity: usize) -> Self {
        let entries = Rc::new(RefCell::new(VecDeque::with_capacity(capacity.min(1024))));
        let subscriptions = LOGGED_EVENTS
            .iter()
            .map(|&kind| {
                let sink = Rc::clone(&entries);
                let clock = Rc::clone(&clock);
                bus.subscribe_event(kind, move |event: &AppEvent| {
                    let entry = LoggedEvent {
                        kind: event.kind(),
                        payload: render(event),
                        logged_at: clock.now(),
                    };
                    info!(
                        target: "shopbus::analytics",
                        event = entry.kind.name(),
                        payload = %entry.payload,
                        "{}",
                        describe(entry.kind)
                    );
                    if capacity == 0 {
                        return;
                    }
                    let mut sink = sink.borrow_mut();
                    if sink.len() >= capacity {
                        sink.pop_front();
                    }
                    sink.push_back(entry);
                })
            })
            .collect();

        Self {
            entries,
            capacity,
            _subscriptions: subscriptions,
        }
    }

    /// Retained entries, oldest first
    pub fn entries(&self) -> Vec<LoggedEvent> {
        self.entries.borrow().iter().cloned().collect()
    }

    /// Logged payloads of one kind
    pub fn payloads(&self, kind: EventName) -> Vec<Value> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.payload.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl std::fmt::Debug for AnalyticsLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsLogger")
            .field("logged", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

fn render(event: &AppEvent) -> Value {
    serde_json::to_value(event).unwrap_or_else(|err| {
        warn!(event = event.name(), %err, "failed to render payload");
        Value::Null
    })
}

fn describe(kind: EventName) -> &'static str {
    match kind {
        EventName::AnalyticsTrack => "analytics event",
        EventName::AnalyticsPageView => "page view",
        EventName::AnalyticsUserAction => "user action",
        EventName::CartItemAdded => "cart analytics: item added",
        EventName::CartItemRemoved => "cart analytics: item removed",
        EventName::CartCleared => "cart analytics: cart cleared",
        _ => "event",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facades::{Analytics, CartEvents, Notify, UiEvents};
    use crate::testing::test_clock;
    use serde_json::json;

    fn setup() -> (AppBus, AnalyticsLogger) {
        let bus = AppBus::new();
        let logger = AnalyticsLogger::attach(&bus, Rc::new(test_clock()));
        (bus, logger)
    }

    #[test]
    fn test_logs_analytics_and_cart_events() {
        let (bus, logger) = setup();
        let analytics = Analytics::new(&bus, Rc::new(test_clock()));
        let cart = CartEvents::new(&bus);

        analytics.page_view("/", Some("Home"), None);
        cart.item_added("1", "Mouse");
        cart.item_removed("1");
        cart.cleared();

        let kinds: Vec<_> = logger.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventName::AnalyticsPageView,
                EventName::CartItemAdded,
                EventName::CartItemRemoved,
                EventName::CartCleared,
            ]
        );
        assert_eq!(
            logger.payloads(EventName::CartItemAdded),
            vec![json!({"productId": "1", "productName": "Mouse"})]
        );
        assert_eq!(logger.payloads(EventName::CartCleared), vec![Value::Null]);
    }

    #[test]
    fn test_ignores_other_domains() {
        let (bus, logger) = setup();

        Notify::new(&bus).success("hi");
        UiEvents::new(&bus).counter_reset("Clicks");
        CartEvents::new(&bus).item_updated("1", 2);

        assert!(logger.is_empty());
    }

    #[test]
    fn test_track_payload_is_camel_case() {
        let (bus, logger) = setup();
        Analytics::new(&bus, Rc::new(test_clock()))
            .with_user("u-1")
            .track("counter_logged", Some(json!({"count": 2})));

        let payload = &logger.payloads(EventName::AnalyticsTrack)[0];
        assert_eq!(payload["event"], "counter_logged");
        assert_eq!(payload["userId"], "u-1");
        assert_eq!(payload["properties"]["count"], 2);
        assert_eq!(payload["timestamp"], test_clock().epoch_millis());
    }

    #[test]
    fn test_keeps_only_newest_entries() {
        let bus = AppBus::new();
        let logger = AnalyticsLogger::with_capacity(&bus, Rc::new(test_clock()), 3);
        let cart = CartEvents::new(&bus);

        for id in ["1", "2", "3", "4"] {
            cart.item_removed(id);
        }

        assert_eq!(logger.len(), 3);
        assert_eq!(
            logger.payloads(EventName::CartItemRemoved),
            vec![
                json!({"productId": "2"}),
                json!({"productId": "3"}),
                json!({"productId": "4"}),
            ]
        );
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let bus = AppBus::new();
        let logger = AnalyticsLogger::with_capacity(&bus, Rc::new(test_clock()), 0);
        CartEvents::new(&bus).cleared();
        assert!(logger.is_empty());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let (bus, logger) = setup();
        assert_eq!(bus.subscriber_count(EventName::CartCleared), 1);
        drop(logger);
        assert_eq!(bus.subscriber_count(EventName::CartCleared), 0);
    }
}
