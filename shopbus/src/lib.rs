//! shopbus: a typed event bus driving a storefront
//!
//! Producers (the cart, UI code) publish typed events through small domain
//! facades; consumers (notifications, analytics logging) subscribe to them.
//! The cart is a reducer-driven store whose committed transitions are diffed
//! to decide which events to publish.
//!
//! # Example
//! ```
//! use std::rc::Rc;
//! use shopbus::prelude::*;
//!
//! let bus = AppBus::new();
//! let analytics = Analytics::new(&bus, Rc::new(SystemClock));
//! let cart = CartStore::new(&bus, analytics);
//!
//! let _sub = bus.subscribe(|added: &ItemAdded| {
//!     assert_eq!(added.product_name, "Mouse");
//! });
//!
//! cart.add_item("1", "Mouse", 29.99);
//! assert_eq!(cart.total_items(), 1);
//! ```

// Lets the derives' `shopbus::` paths resolve inside this crate
extern crate self as shopbus;

// Re-export everything from core
pub use shopbus_core::*;

// Re-export derive macros
pub use shopbus_macros::{Action, BusEvent};

pub mod analytics;
pub mod cart;
pub mod config;
pub mod context;
pub mod events;
pub mod facades;
pub mod notifications;
pub mod storefront;

pub use events::{AppBus, AppEvent, EventName};

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use shopbus_core::{Action, BusEvent, Clock, EventKind, Payload};

    // Event system
    pub use crate::events::{
        AppBus, AppEvent, EventName, ItemAdded, ItemRemoved, NotificationKind, ShowNotification,
        Track,
    };
    pub use shopbus_core::{EventBus, PublishReport, Subscription, SystemClock};

    // Facades
    pub use crate::facades::{Analytics, CartEvents, Notify, NotifyOptions, UiEvents};

    // Cart
    pub use crate::cart::{CartAction, CartState, CartStore};

    // Consumers
    pub use crate::analytics::AnalyticsLogger;
    pub use crate::notifications::{NotificationCenter, TokioExpiry};

    // Wiring
    pub use crate::config::ShopConfig;
    pub use crate::context::AppContext;
    pub use crate::storefront::Storefront;

    // Derive macros
    pub use shopbus_macros::{Action, BusEvent};
}
