//! Event registry traits
//!
//! An application declares its closed event catalog as a single enum and
//! derives [`BusEvent`] for it:
//!
//! ```ignore
//! #[derive(BusEvent, Clone, Debug)]
//! #[bus(kind = "EventName")]
//! pub enum AppEvent {
//!     #[bus(name = "cart:item-added")]
//!     CartItemAdded(ItemAdded),
//!     #[bus(name = "cart:cleared")]
//!     CartCleared,
//! }
//! ```
//!
//! The derive generates a fieldless `EventName` enum implementing
//! [`EventKind`], plus a [`Payload`] impl for every newtype variant so
//! handlers can subscribe by payload type. Unit variants are signals.

use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

/// Returned when a string does not name any event in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event `{name}`")]
pub struct UnknownEvent {
    /// The name that failed to resolve
    pub name: String,
}

impl UnknownEvent {
    /// Create an error for the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Fieldless identifier of an event in the registry.
///
/// The bus keys its subscriber lists by this type.
pub trait EventKind: Copy + Eq + Hash + Debug + 'static {
    /// Wire name, e.g. `"cart:item-added"`
    fn name(&self) -> &'static str;

    /// Every kind in the registry, in declaration order
    fn all() -> &'static [Self];

    /// Whether events of this kind carry no payload
    fn is_signal(&self) -> bool;

    /// Look up a kind by wire name
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.name() == name)
    }

    /// Look up a kind by wire name, failing with [`UnknownEvent`]
    fn parse(name: &str) -> Result<Self, UnknownEvent> {
        Self::from_name(name).ok_or_else(|| UnknownEvent::new(name))
    }

    /// Domain prefix of the name (`"cart"` for `"cart:item-added"`)
    ///
    /// Names without a `:` are their own namespace.
    fn namespace(&self) -> &'static str {
        let name = self.name();
        name.split_once(':').map_or(name, |(ns, _)| ns)
    }
}

/// The event type carried by an [`EventBus`](crate::EventBus).
pub trait BusEvent: Debug + 'static {
    /// Kind enum used for routing
    type Kind: EventKind;

    /// Kind of this event
    fn kind(&self) -> Self::Kind;

    /// Wire name of this event
    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// A payload type bound to exactly one event name.
///
/// Implemented by `#[derive(BusEvent)]` for each newtype variant.
pub trait Payload<E: BusEvent>: Sized + 'static {
    /// The kind this payload is published under
    const KIND: E::Kind;

    /// Borrow the payload out of an event, if the event carries this type
    fn from_event(event: &E) -> Option<&Self>;

    /// Wrap the payload into the registry enum
    fn into_event(self) -> E;
}
