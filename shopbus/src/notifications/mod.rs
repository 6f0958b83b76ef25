//! Notification lifecycle
//!
//! [`NotificationCenter`] is the bus consumer; the list itself is managed
//! by a pure reducer over [`NotificationState`] whose timer requests are
//! carried out by an [`ExpiryScheduler`].

mod center;
mod expiry;
mod model;
mod reducer;

pub use center::NotificationCenter;
pub use expiry::{ExpiryScheduler, ManualExpiry, TokioExpiry};
pub use model::{Notification, NotificationId};
pub use reducer::{reducer, NotificationAction, NotificationEffect, NotificationState};
