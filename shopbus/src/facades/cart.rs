use super::CartPayload;
use crate::events::{
    AppBus, AppEvent, CheckoutStarted, EventName, ItemAdded, ItemRemoved, ItemUpdated,
    RestoreRequested,
};
use crate::{PublishReport, Subscription};

/// Publishes `cart:*` events
#[derive(Debug, Clone)]
pub struct CartEvents {
    bus: AppBus,
}

impl CartEvents {
    pub fn new(bus: &AppBus) -> Self {
        Self { bus: bus.clone() }
    }

    pub fn publish<P: CartPayload>(&self, payload: P) -> PublishReport {
        self.bus.publish(payload.into_event())
    }

    pub fn on<P, F>(&self, handler: F) -> Subscription
    where
        P: CartPayload,
        F: Fn(&P) + 'static,
    {
        self.bus.subscribe(handler)
    }

    pub fn item_added(&self, product_id: &str, product_name: &str) -> PublishReport {
        self.publish(ItemAdded {
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
        })
    }

    pub fn item_removed(&self, product_id: &str) -> PublishReport {
        self.publish(ItemRemoved {
            product_id: product_id.to_string(),
        })
    }

    pub fn item_updated(&self, product_id: &str, quantity: u32) -> PublishReport {
        self.publish(ItemUpdated {
            product_id: product_id.to_string(),
            quantity,
        })
    }

    pub fn cleared(&self) -> PublishReport {
        self.bus.publish(AppEvent::CartCleared)
    }

    pub fn checkout_started(&self, total_items: u32, total_price: f64) -> PublishReport {
        self.publish(CheckoutStarted {
            total_items,
            total_price,
        })
    }

    /// Ask the cart to put an item back
    pub fn restore_requested(
        &self,
        product_id: &str,
        product_name: &str,
        price: f64,
    ) -> PublishReport {
        self.publish(RestoreRequested {
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            price,
        })
    }

    pub fn on_item_added<F: Fn(&ItemAdded) + 'static>(&self, handler: F) -> Subscription {
        self.on(handler)
    }

    pub fn on_item_removed<F: Fn(&ItemRemoved) + 'static>(&self, handler: F) -> Subscription {
        self.on(handler)
    }

    pub fn on_item_updated<F: Fn(&ItemUpdated) + 'static>(&self, handler: F) -> Subscription {
        self.on(handler)
    }

    pub fn on_checkout_started<F: Fn(&CheckoutStarted) + 'static>(
        &self,
        handler: F,
    ) -> Subscription {
        self.on(handler)
    }

    pub fn on_restore_requested<F: Fn(&RestoreRequested) + 'static>(
        &self,
        handler: F,
    ) -> Subscription {
        self.on(handler)
    }

    pub fn on_cleared<F: Fn() + 'static>(&self, handler: F) -> Subscription {
        self.bus.subscribe_signal(EventName::CartCleared, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::EventRecorder;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_helpers_publish_catalog_events() {
        let bus = AppBus::new();
        let cart = CartEvents::new(&bus);
        let recorder = EventRecorder::attach(&bus);

        cart.item_added("1", "Mouse");
        cart.item_updated("1", 3);
        cart.item_removed("1");
        cart.cleared();
        cart.checkout_started(3, 89.97);
        cart.restore_requested("1", "Mouse", 29.99);

        assert_eq!(
            recorder.names(),
            vec![
                "cart:item-added",
                "cart:item-updated",
                "cart:item-removed",
                "cart:cleared",
                "cart:checkout-started",
                "cart:restore-requested",
            ]
        );
    }

    #[test]
    fn test_on_cleared_is_a_signal_handler() {
        let bus = AppBus::new();
        let cart = CartEvents::new(&bus);
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let sub = cart.on_cleared(move || c.set(c.get() + 1));

        cart.cleared();
        sub.unsubscribe();
        cart.cleared();
        assert_eq!(calls.get(), 1);
    }
}
