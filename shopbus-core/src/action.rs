//! Action trait for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to a store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged or sent to middleware before the reducer
/// - Debug: For logging and the in-memory action log
/// - Send + 'static: Timer tasks send actions back to the host loop
///
/// Use `#[derive(Action)]` from `shopbus-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// One-line description of an action for log displays.
///
/// Blanket-implemented for every [`Action`] using its `Debug` output.
pub trait ActionSummary: Action {
    /// Summary text, e.g. `AddItem { id: "1", .. }`
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}

impl<A: Action> ActionSummary for A {}
