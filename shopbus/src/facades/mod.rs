//! Domain facades over the application bus
//!
//! Each facade wraps an [`AppBus`](crate::events::AppBus) handle and only
//! accepts the payload types of its own domain, enforced through a sealed
//! marker trait. Facades hold no state of their own and pass payloads to
//! the bus unchanged.
//!
//! ```compile_fail
//! use shopbus::events::{AppBus, ItemAdded};
//! use shopbus::facades::Notify;
//!
//! let notify = Notify::new(&AppBus::new());
//! // `ItemAdded` belongs to the cart domain
//! notify.publish(ItemAdded { product_id: "1".into(), product_name: "Mouse".into() });
//! ```

mod analytics;
mod cart;
mod notify;
mod ui;

pub use analytics::Analytics;
pub use cart::CartEvents;
pub use notify::{Notify, NotifyOptions};
pub use ui::UiEvents;

use crate::events::{
    AppEvent, CheckoutStarted, CounterDecremented, CounterIncremented, CounterReset,
    FormSubmitted, FormValidationFailed, HideNotification, ItemAdded, ItemRemoved, ItemUpdated,
    ModalClosed, ModalOpened, PageView, RestoreRequested, ShowNotification, Track, UserAction,
};
use crate::Payload;

mod sealed {
    pub trait Sealed {}
}

/// Payloads of the `analytics:*` events
pub trait AnalyticsPayload: Payload<AppEvent> + sealed::Sealed {}

/// Payloads of the `cart:*` events
pub trait CartPayload: Payload<AppEvent> + sealed::Sealed {}

/// Payloads of the `notification:*` events
pub trait NotificationPayload: Payload<AppEvent> + sealed::Sealed {}

/// Payloads of the counter, modal and form events
pub trait UiPayload: Payload<AppEvent> + sealed::Sealed {}

macro_rules! domain_payloads {
    ($marker:ident: $($payload:ty),+ $(,)?) => {
        $(
            impl sealed::Sealed for $payload {}
            impl $marker for $payload {}
        )+
    };
}

domain_payloads!(AnalyticsPayload: Track, PageView, UserAction);
domain_payloads!(
    CartPayload: ItemAdded,
    ItemRemoved,
    ItemUpdated,
    CheckoutStarted,
    RestoreRequested,
);
domain_payloads!(NotificationPayload: ShowNotification, HideNotification);
domain_payloads!(
    UiPayload: CounterIncremented,
    CounterDecremented,
    CounterReset,
    ModalOpened,
    ModalClosed,
    FormSubmitted,
    FormValidationFailed,
);
