//! Test utilities for shopbus applications
//!
//! - [`EventRecorder`]: wildcard subscriber capturing every published event
//! - [`TestHarness`]: state plus an action channel, for code that reports
//!   back through an mpsc sender (timers, async tasks)
//! - [`test_clock`]: a [`FixedClock`] pinned to 2025-01-01
//! - Assertion macros for emitted events and actions
//!
//! # Example
//!
//! ```ignore
//! use shopbus::testing::EventRecorder;
//! use shopbus::assert_emitted;
//!
//! let recorder = EventRecorder::attach(&bus);
//! cart.dispatch(CartAction::ClearCart);
//!
//! let events = recorder.take();
//! assert_emitted!(events, AppEvent::CartCleared);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{TimeZone, Utc};
use tokio::sync::mpsc;

use crate::bus::{EventBus, Subscription};
use crate::clock::FixedClock;
use crate::event::{BusEvent, EventKind};
use crate::Action;

/// A [`FixedClock`] at 2025-01-01 00:00:00 UTC
pub fn test_clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
}

/// Records every event published on a bus, in delivery order.
///
/// Subscribes as a wildcard handler, so it observes events after their
/// kind-specific handlers ran. Dropping the recorder unsubscribes.
pub struct EventRecorder<E> {
    events: Rc<RefCell<Vec<E>>>,
    _subscription: Subscription,
}

impl<E: BusEvent + Clone> EventRecorder<E> {
    /// Start recording on `bus`
    pub fn attach(bus: &EventBus<E>) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription = bus.subscribe_any(move |event: &E| {
            sink.borrow_mut().push(event.clone());
        });
        Self {
            events,
            _subscription: subscription,
        }
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Copy of recorded events, leaving them in place
    pub fn events(&self) -> Vec<E> {
        self.events.borrow().clone()
    }

    /// Recorded event names in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(BusEvent::name).collect()
    }

    /// Number of recorded events of `kind`
    pub fn count(&self, kind: E::Kind) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }

    /// Whether an event of `kind` was recorded
    pub fn saw(&self, kind: E::Kind) -> bool {
        self.count(kind) > 0
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl<E: BusEvent> std::fmt::Debug for EventRecorder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self
            .events
            .borrow()
            .iter()
            .map(|event| event.kind().name())
            .collect();
        f.debug_struct("EventRecorder").field("events", &names).finish()
    }
}

/// State under test plus an action channel.
///
/// ```ignore
/// let mut harness = TestHarness::<(), NotificationAction>::default();
/// let mut tasks = TaskManager::new(harness.sender());
/// tasks.delay("n:0", Duration::from_millis(10), NotificationAction::Expire { id });
///
/// tokio::time::advance(Duration::from_millis(10)).await;
/// let actions = harness.drain_emitted();
/// ```
pub struct TestHarness<S, A: Action> {
    /// The state under test
    pub state: S,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A: Action> TestHarness<S, A> {
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { state, tx, rx }
    }

    /// Sender to hand to the code under test
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    /// Push an action as if the code under test had sent it
    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    /// Drain all actions sent so far
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Wait for the next action
    pub async fn recv(&mut self) -> Option<A> {
        self.rx.recv().await
    }
}

impl<S: Default, A: Action> Default for TestHarness<S, A> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Advance tokio's paused clock and let woken tasks run.
#[cfg(feature = "testing-time")]
pub async fn advance_time(duration: std::time::Duration) {
    tokio::time::advance(duration).await;
    tokio::task::yield_now().await;
}

/// Assert that an event or action matching a pattern was emitted.
///
/// ```ignore
/// let events = recorder.take();
/// assert_emitted!(events, AppEvent::CartItemAdded(ItemAdded { product_id, .. }) if product_id == "1");
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($emitted:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $emitted.iter().any(|e| matches!(e, $pattern $(if $guard)?)),
            "Expected `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $emitted
        );
    };
}

/// Assert that nothing matching a pattern was emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($emitted:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$emitted.iter().any(|e| matches!(e, $pattern $(if $guard)?)),
            "Expected `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $emitted
        );
    };
}

/// First emitted item matching a pattern.
#[macro_export]
macro_rules! find_emitted {
    ($emitted:expr, $pattern:pat $(if $guard:expr)?) => {
        $emitted.iter().find(|e| matches!(e, $pattern $(if $guard)?))
    };
}

/// Number of emitted items matching a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($emitted:expr, $pattern:pat $(if $guard:expr)?) => {
        $emitted.iter().filter(|e| matches!(e, $pattern $(if $guard)?)).count()
    };
}
