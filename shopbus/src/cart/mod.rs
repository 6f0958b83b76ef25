//! Shopping cart
//!
//! [`reducer`] is the state machine, [`diff`] derives what changed between two
//! snapshots, and [`CartStore`] ties them to the bus: every committed
//! transition is diffed and published through [`CartEffects`].

mod action;
mod diff;
mod effects;
mod reducer;
mod state;
mod store;

pub use action::CartAction;
pub use diff::{diff, CartChange};
pub use effects::CartEffects;
pub use reducer::reducer;
pub use state::{CartItem, CartState};
pub use store::CartStore;
