//! Core traits and types for shopbus
//!
//! This crate provides the generic machinery the storefront is built on:
//! a typed, synchronous event bus and a Redux-style store whose committed
//! transitions drive side effects.
//!
//! # Core Concepts
//!
//! - **Action**: Intents that describe state changes
//! - **Store**: State container with a reducer and optional middleware
//! - **EffectStore**: Store whose reducer also returns declarative effects
//! - **EventBus**: Publish/subscribe over a closed event registry
//! - **TaskManager**: Keyed, cancellable deferred work (expiry timers)
//!
//! # Basic Example
//!
//! ```ignore
//! use shopbus_core::prelude::*;
//!
//! #[derive(BusEvent, Clone, Debug)]
//! #[bus(kind = "EventName")]
//! enum AppEvent {
//!     #[bus(name = "counter:incremented")]
//!     Incremented(Count),
//! }
//!
//! let bus = EventBus::<AppEvent>::new();
//! let _sub = bus.subscribe(|count: &Count| println!("now {}", count.0));
//! bus.publish(Count(1));
//! ```
//!
//! # Timers
//!
//! The bus and stores are single-threaded. Work that has to wait (a
//! notification's expiry) runs on tokio through [`TaskManager`], which sends
//! an action back over an mpsc channel when it fires; the host loop then
//! dispatches it like any other action:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(action) = expiry_rx.recv() => center.handle(action),
//!         _ = shutdown.cancelled() => break,
//!     }
//! }
//! ```

pub mod action;
pub mod bus;
pub mod clock;
pub mod effect;
pub mod event;
pub mod logging;
pub mod store;
pub mod tasks;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionSummary};

// Event system exports
pub use bus::{EventBus, PublishReport, Subscription};
pub use event::{BusEvent, EventKind, Payload, UnknownEvent};

// Store exports
pub use store::{Middleware, Reducer, Store, StoreWithMiddleware};

// Effect exports
pub use effect::{DispatchResult, EffectReducer, EffectStore};

// Task exports
pub use tasks::{TaskKey, TaskManager};

// Logging exports
pub use logging::{ActionLog, ActionLogConfig, ActionLoggerMiddleware, EventTracer, LogFilter};

// Time exports
pub use clock::{Clock, FixedClock, SystemClock};

// Testing exports
pub use testing::{test_clock, EventRecorder, TestHarness};

#[cfg(feature = "testing-time")]
pub use testing::advance_time;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionSummary};
    pub use crate::bus::{EventBus, PublishReport, Subscription};
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::effect::{DispatchResult, EffectReducer, EffectStore};
    pub use crate::event::{BusEvent, EventKind, Payload};
    pub use crate::logging::{ActionLoggerMiddleware, LogFilter};
    pub use crate::store::{Middleware, Reducer, Store, StoreWithMiddleware};
    pub use crate::tasks::{TaskKey, TaskManager};
}
