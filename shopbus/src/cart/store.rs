use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, info};

use super::action::CartAction;
use super::diff::diff;
use super::effects::CartEffects;
use super::reducer::reducer;
use super::state::CartState;
use crate::events::{AppBus, RestoreRequested};
use crate::facades::{Analytics, CartEvents, Notify};
use crate::{ActionLog, ActionLoggerMiddleware, PublishReport, StoreWithMiddleware, Subscription};

type Inner = StoreWithMiddleware<CartState, CartAction, ActionLoggerMiddleware>;

/// The cart: a store whose committed transitions publish events
///
/// Every dispatch runs the reducer through the action logger, diffs the
/// state before and after, and applies the resulting changes through the
/// facades. The store borrow is released before any event is published, so
/// bus handlers may read the cart or dispatch into it. Such nested dispatches
/// are queued and run once the current action's effects are out.
///
/// Cloning yields another handle to the same cart.
#[derive(Clone)]
pub struct CartStore {
    store: Rc<RefCell<Inner>>,
    effects: Rc<CartEffects>,
    queue: Rc<RefCell<VecDeque<CartAction>>>,
    draining: Rc<Cell<bool>>,
}

impl CartStore {
    /// Empty cart publishing on `bus`, with a default action logger
    pub fn new(bus: &AppBus, analytics: Analytics) -> Self {
        Self::with_logger(bus, analytics, ActionLoggerMiddleware::default())
    }

    pub fn with_logger(bus: &AppBus, analytics: Analytics, logger: ActionLoggerMiddleware) -> Self {
        let effects = CartEffects::new(CartEvents::new(bus), Notify::new(bus), analytics);
        Self::from_parts(CartState::new(), effects, logger)
    }

    pub fn from_parts(
        state: CartState,
        effects: CartEffects,
        logger: ActionLoggerMiddleware,
    ) -> Self {
        Self {
            store: Rc::new(RefCell::new(StoreWithMiddleware::new(
                state, reducer, logger,
            ))),
            effects: Rc::new(effects),
            queue: Rc::new(RefCell::new(VecDeque::new())),
            draining: Rc::new(Cell::new(false)),
        }
    }

    /// Dispatch an action
    ///
    /// Returns whether this action changed the cart. An action dispatched
    /// from inside another dispatch's effects is queued and reports `false`
    /// whatever its eventual outcome; it runs before the outer call returns.
    /// Use [`is_dispatching`](Self::is_dispatching) to tell a queued action
    /// from a no-op. The `add_item`/`remove_item`/`update_quantity`/`clear`
    /// helpers behave the same way.
    pub fn dispatch(&self, action: CartAction) -> bool {
        if self.draining.get() {
            debug!(action = ?action, "queued nested cart dispatch");
            self.queue.borrow_mut().push_back(action);
            return false;
        }

        let _draining = DrainGuard::enter(&self.draining);
        let changed = self.process(action);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            match next {
                Some(action) => {
                    self.process(action);
                }
                None => break,
            }
        }
        changed
    }

    /// Whether a dispatch is in progress, so a new one would be queued
    pub fn is_dispatching(&self) -> bool {
        self.draining.get()
    }

    fn process(&self, action: CartAction) -> bool {
        let (previous, current) = {
            let mut store = self.store.borrow_mut();
            let previous = store.state().clone();
            if !store.dispatch(action) {
                return false;
            }
            (previous, store.state().clone())
        };

        let changes = diff(&previous, &current);
        self.effects.apply_all(&changes);
        true
    }

    /// Add one of an item; see [`dispatch`](Self::dispatch) for the result
    pub fn add_item(&self, id: &str, name: &str, price: f64) -> bool {
        self.dispatch(CartAction::add(id, name, price))
    }

    /// See [`dispatch`](Self::dispatch) for the result
    pub fn remove_item(&self, id: &str) -> bool {
        self.dispatch(CartAction::remove(id))
    }

    pub fn update_quantity(&self, id: &str, quantity: i64) -> bool {
        self.dispatch(CartAction::update_quantity(id, quantity))
    }

    pub fn clear(&self) -> bool {
        self.dispatch(CartAction::ClearCart)
    }

    /// Put items back when `cart:restore-requested` is published
    ///
    /// An item that is still in the cart is left as it is. Dropping the
    /// returned subscription stops the handling.
    pub fn handle_restore_requests(&self, events: &CartEvents) -> Subscription {
        let cart = self.clone();
        events.on_restore_requested(move |request: &RestoreRequested| {
            if cart.with_state(|state| state.contains(&request.product_id)) {
                debug!(id = %request.product_id, "restore for item already in cart");
                return;
            }
            cart.add_item(&request.product_id, &request.product_name, request.price);
        })
    }

    /// Snapshot of the current cart
    pub fn state(&self) -> CartState {
        self.store.borrow().state().clone()
    }

    /// Run `f` against the current cart without cloning it
    ///
    /// `f` must not dispatch into this store.
    pub fn with_state<R>(&self, f: impl FnOnce(&CartState) -> R) -> R {
        f(self.store.borrow().state())
    }

    pub fn total_items(&self) -> u32 {
        self.with_state(CartState::total_items)
    }

    pub fn total_price(&self) -> f64 {
        self.with_state(CartState::total_price)
    }

    pub fn is_empty(&self) -> bool {
        self.with_state(CartState::is_empty)
    }

    /// Publish `cart:checkout-started` with the current totals
    ///
    /// Returns `None` for an empty cart.
    pub fn checkout(&self) -> Option<PublishReport> {
        let (items, price) = self.with_state(|cart| (cart.total_items(), cart.total_price()));
        if items == 0 {
            debug!("checkout on empty cart");
            return None;
        }
        info!(items, price, "checkout started");
        Some(self.effects.cart.checkout_started(items, price))
    }

    /// Copy of the recorded action history, if the logger keeps one
    pub fn action_log(&self) -> Option<ActionLog> {
        self.store.borrow().middleware().log().cloned()
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("CartStore");
        match self.store.try_borrow() {
            Ok(store) => s.field("state", store.state()),
            Err(_) => s.field("state", &"<dispatching>"),
        };
        s.field("queued", &self.queue.borrow().len()).finish()
    }
}

struct DrainGuard<'a>(&'a Cell<bool>);

impl<'a> DrainGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{CheckoutStarted, ItemAdded, ItemRemoved};
    use crate::testing::{test_clock, EventRecorder};
    use crate::{assert_emitted, assert_not_emitted, count_emitted, ActionLogConfig, AppEvent};

    fn cart() -> (AppBus, CartStore, EventRecorder<AppEvent>) {
        let bus = AppBus::new();
        let analytics = Analytics::new(&bus, Rc::new(test_clock()));
        let store = CartStore::new(&bus, analytics);
        let recorder = EventRecorder::attach(&bus);
        (bus, store, recorder)
    }

    #[test]
    fn test_first_add_publishes_item_added() {
        let (_bus, store, recorder) = cart();

        assert!(store.add_item("1", "Mouse", 29.99));

        assert_eq!(
            recorder.names(),
            vec!["cart:item-added", "notification:show", "analytics:track"]
        );
    }

    #[test]
    fn test_second_add_only_notifies() {
        let (_bus, store, recorder) = cart();
        store.add_item("1", "Mouse", 29.99);
        recorder.clear();

        store.add_item("1", "Mouse", 29.99);

        assert_eq!(store.total_items(), 2);
        assert_eq!(recorder.names(), vec!["notification:show"]);
    }

    #[test]
    fn test_noop_publishes_nothing() {
        let (_bus, store, recorder) = cart();

        assert!(!store.remove_item("nope"));
        assert!(!store.clear());
        assert!(!store.update_quantity("nope", 3));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_decrease_publishes_nothing() {
        let (_bus, store, recorder) = cart();
        store.add_item("1", "Mouse", 29.99);
        store.update_quantity("1", 4);
        recorder.clear();

        assert!(store.update_quantity("1", 2));
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_clear_publishes_removals_then_cleared() {
        let (_bus, store, recorder) = cart();
        store.add_item("1", "Mouse", 29.99);
        store.add_item("2", "Keyboard", 79.99);
        recorder.clear();

        assert!(store.clear());

        let events = recorder.take();
        assert_eq!(
            count_emitted!(events, AppEvent::CartItemRemoved(ItemRemoved { .. })),
            2
        );
        let last_removed = events
            .iter()
            .rposition(|e| matches!(e, AppEvent::CartItemRemoved(_)))
            .unwrap();
        let cleared = events
            .iter()
            .position(|e| matches!(e, AppEvent::CartCleared))
            .unwrap();
        assert!(last_removed < cleared);
    }

    #[test]
    fn test_handler_reads_committed_state() {
        let (bus, store, _recorder) = cart();
        let seen = Rc::new(Cell::new(0));
        let reader = store.clone();
        let sink = Rc::clone(&seen);
        let _sub = bus.subscribe(move |_: &ItemAdded| sink.set(reader.total_items()));

        store.add_item("1", "Mouse", 29.99);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_nested_dispatch_runs_after_current_effects() {
        let (bus, store, recorder) = cart();
        let nested = store.clone();
        let _sub = bus.subscribe(move |added: &ItemAdded| {
            if added.product_id == "1" {
                assert!(nested.is_dispatching());
                assert!(!nested.add_item("2", "Mouse Pad", 9.99));
            }
        });

        assert!(!store.is_dispatching());
        assert!(store.add_item("1", "Mouse", 29.99));
        assert!(!store.is_dispatching());

        let names = recorder.names();
        assert_eq!(names.len(), 6);
        assert_eq!(&names[..3], &["cart:item-added", "notification:show", "analytics:track"]);
        let events = recorder.take();
        assert!(matches!(
            &events[3],
            AppEvent::CartItemAdded(ItemAdded { product_id, .. }) if product_id == "2"
        ));
        assert_eq!(store.state().len(), 2);
    }

    #[test]
    fn test_restore_request_adds_missing_item_once() {
        let (bus, store, recorder) = cart();
        let _restores = store.handle_restore_requests(&CartEvents::new(&bus));
        store.add_item("1", "Mouse", 29.99);
        store.remove_item("1");
        recorder.clear();

        CartEvents::new(&bus).restore_requested("1", "Mouse", 29.99);

        let events = recorder.take();
        assert_eq!(count_emitted!(events, AppEvent::CartItemAdded(_)), 1);
        assert_eq!(count_emitted!(events, AppEvent::CartRestoreRequested(_)), 1);
        assert_eq!(store.state().get("1").unwrap().quantity, 1);
    }

    #[test]
    fn test_restore_request_leaves_present_item_alone() {
        let (bus, store, recorder) = cart();
        let _restores = store.handle_restore_requests(&CartEvents::new(&bus));
        store.add_item("1", "Mouse", 29.99);
        recorder.clear();

        CartEvents::new(&bus).restore_requested("1", "Mouse", 29.99);

        assert_eq!(recorder.names(), vec!["cart:restore-requested"]);
        assert_eq!(store.total_items(), 1);
    }

    #[test]
    fn test_checkout() {
        let (_bus, store, recorder) = cart();
        assert!(store.checkout().is_none());

        store.add_item("1", "Mouse", 10.0);
        store.update_quantity("1", 3);
        recorder.clear();
        store.checkout();

        let events = recorder.take();
        assert_emitted!(
            events,
            AppEvent::CartCheckoutStarted(CheckoutStarted { total_items: 3, total_price })
                if (*total_price - 30.0).abs() < 1e-9
        );
        assert_not_emitted!(events, AppEvent::CartCleared);
    }

    #[test]
    fn test_action_log_records_outcomes() {
        let bus = AppBus::new();
        let analytics = Analytics::new(&bus, Rc::new(test_clock()));
        let store = CartStore::with_logger(
            &bus,
            analytics,
            ActionLoggerMiddleware::with_log(ActionLogConfig::with_capacity(10)),
        );

        store.add_item("1", "Mouse", 29.99);
        store.remove_item("nope");

        let log = store.action_log().unwrap();
        let outcomes: Vec<_> = log
            .entries()
            .map(|entry| (entry.name, entry.state_changed))
            .collect();
        assert_eq!(
            outcomes,
            vec![("AddItem", Some(true)), ("RemoveItem", Some(false))]
        );
    }
}
