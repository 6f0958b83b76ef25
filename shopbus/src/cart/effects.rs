use serde_json::json;
use tracing::debug;

use super::diff::CartChange;
use crate::facades::{Analytics, CartEvents, Notify};

/// Publishes the events a [`CartChange`] stands for
///
/// Each change is applied fully (cart event, notification, analytics) before
/// the next one starts.
#[derive(Debug, Clone)]
pub struct CartEffects {
    pub cart: CartEvents,
    pub notify: Notify,
    pub analytics: Analytics,
}

impl CartEffects {
    pub fn new(cart: CartEvents, notify: Notify, analytics: Analytics) -> Self {
        Self {
            cart,
            notify,
            analytics,
        }
    }

    pub fn apply(&self, change: &CartChange) {
        debug!(?change, "cart change");
        match change {
            CartChange::Added { id, name } => {
                self.cart.item_added(id, name);
                self.notify.success(format!("{name} added to cart!"));
                self.analytics.track(
                    "cart_item_added",
                    Some(json!({ "productId": id, "productName": name })),
                );
            }
            CartChange::QuantityIncreased { name, .. } => {
                self.notify.info(format!("Updated {name} quantity in cart"));
            }
            CartChange::Removed { id, name } => {
                self.cart.item_removed(id);
                self.notify.info(format!("{name} removed from cart"));
                self.analytics.track(
                    "cart_item_removed",
                    Some(json!({ "productId": id, "productName": name })),
                );
            }
            CartChange::Cleared => {
                self.cart.cleared();
                self.notify.info("Cart cleared");
                self.analytics.track(
                    "cart_cleared",
                    Some(json!({ "timestamp": self.analytics.timestamp() })),
                );
            }
        }
    }

    pub fn apply_all(&self, changes: &[CartChange]) {
        for change in changes {
            self.apply(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AppBus, ItemAdded, NotificationKind, ShowNotification, Track};
    use crate::testing::{test_clock, EventRecorder};
    use crate::{assert_emitted, AppEvent, Clock};
    use std::rc::Rc;

    fn effects(bus: &AppBus) -> CartEffects {
        CartEffects::new(
            CartEvents::new(bus),
            Notify::new(bus),
            Analytics::new(bus, Rc::new(test_clock())),
        )
    }

    #[test]
    fn test_added_publishes_three_events_in_order() {
        let bus = AppBus::new();
        let recorder = EventRecorder::attach(&bus);

        effects(&bus).apply(&CartChange::Added {
            id: "1".into(),
            name: "Mouse".into(),
        });

        let events = recorder.take();
        assert_eq!(
            events[0],
            AppEvent::CartItemAdded(ItemAdded {
                product_id: "1".into(),
                product_name: "Mouse".into(),
            })
        );
        assert_emitted!(
            events,
            AppEvent::NotificationShow(ShowNotification { message, kind: NotificationKind::Success, .. })
                if message == "Mouse added to cart!"
        );
        assert_emitted!(
            events,
            AppEvent::AnalyticsTrack(Track { event, properties: Some(props), .. })
                if event == "cart_item_added" && props["productName"] == "Mouse"
        );
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_quantity_increase_only_notifies() {
        let bus = AppBus::new();
        let recorder = EventRecorder::attach(&bus);

        effects(&bus).apply(&CartChange::QuantityIncreased {
            id: "1".into(),
            name: "Mouse".into(),
            from: 1,
            to: 2,
        });

        assert_eq!(recorder.names(), vec!["notification:show"]);
    }

    #[test]
    fn test_cleared_tracks_timestamp() {
        let bus = AppBus::new();
        let recorder = EventRecorder::attach(&bus);

        effects(&bus).apply(&CartChange::Cleared);

        let expected = test_clock().epoch_millis();
        let events = recorder.take();
        assert_eq!(events[0], AppEvent::CartCleared);
        assert_emitted!(
            events,
            AppEvent::AnalyticsTrack(Track { event, properties: Some(props), .. })
                if event == "cart_cleared" && props["timestamp"] == expected
        );
    }
}
