//! The storefront's event catalog
//!
//! Every event the application can publish is a variant of [`AppEvent`].
//! Payload structs serialize with camelCase field names, which is the shape
//! the analytics logger prints.
//!
//! A name can only be bound once:
//!
//! ```compile_fail
//! use shopbus::BusEvent;
//!
//! #[derive(BusEvent, Debug, Clone)]
//! #[bus(kind = "Kind")]
//! enum Catalog {
//!     #[bus(name = "cart:cleared")]
//!     Cleared,
//!     #[bus(name = "cart:cleared")]
//!     Emptied,
//! }
//! ```

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::notifications::NotificationId;
use crate::{BusEvent, EventBus};

/// Bus carrying [`AppEvent`]s
pub type AppBus = EventBus<AppEvent>;

#[derive(BusEvent, Debug, Clone, PartialEq, Serialize)]
#[bus(kind = "EventName")]
#[serde(untagged)]
pub enum AppEvent {
    #[bus(name = "analytics:track")]
    AnalyticsTrack(Track),
    #[bus(name = "analytics:page-view")]
    AnalyticsPageView(PageView),
    #[bus(name = "analytics:user-action")]
    AnalyticsUserAction(UserAction),

    #[bus(name = "cart:item-added")]
    CartItemAdded(ItemAdded),
    #[bus(name = "cart:item-removed")]
    CartItemRemoved(ItemRemoved),
    #[bus(name = "cart:item-updated")]
    CartItemUpdated(ItemUpdated),
    #[bus(name = "cart:cleared")]
    CartCleared,
    #[bus(name = "cart:checkout-started")]
    CartCheckoutStarted(CheckoutStarted),
    #[bus(name = "cart:restore-requested")]
    CartRestoreRequested(RestoreRequested),

    #[bus(name = "notification:show")]
    NotificationShow(ShowNotification),
    #[bus(name = "notification:hide")]
    NotificationHide(HideNotification),
    #[bus(name = "notification:clear-all")]
    NotificationClearAll,

    #[bus(name = "counter:incremented")]
    CounterIncremented(CounterIncremented),
    #[bus(name = "counter:decremented")]
    CounterDecremented(CounterDecremented),
    #[bus(name = "counter:reset")]
    CounterReset(CounterReset),
    #[bus(name = "modal:opened")]
    ModalOpened(ModalOpened),
    #[bus(name = "modal:closed")]
    ModalClosed(ModalClosed),
    #[bus(name = "form:submitted")]
    FormSubmitted(FormSubmitted),
    #[bus(name = "form:validation-failed")]
    FormValidationFailed(FormValidationFailed),
}

// ============================================================================
// Analytics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub action: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

// ============================================================================
// Cart
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAdded {
    pub product_id: String,
    pub product_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRemoved {
    pub product_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdated {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStarted {
    pub total_items: u32,
    pub total_price: f64,
}

/// Request to put a removed item back in the cart
///
/// A command rather than a record of a change: the cart store reacts to it,
/// and publishes `cart:item-added` itself if the item was missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequested {
    pub product_id: String,
    pub product_name: String,
    pub price: f64,
}

// ============================================================================
// Notifications
// ============================================================================

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
            NotificationKind::Warning => "warning",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Button attached to a notification
///
/// Activating it republishes `trigger` on the bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotifyAction {
    pub label: String,
    #[serde(serialize_with = "serialize_trigger")]
    pub trigger: Box<AppEvent>,
}

impl NotifyAction {
    pub fn new(label: impl Into<String>, trigger: impl Into<AppEvent>) -> Self {
        Self {
            label: label.into(),
            trigger: Box::new(trigger.into()),
        }
    }
}

fn serialize_trigger<S: Serializer>(trigger: &AppEvent, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(trigger.name())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowNotification {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Display time in milliseconds; the center's default applies when
    /// missing or zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NotifyAction>,
}

/// Hide request; `id: None` is accepted and ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HideNotification {
    pub id: Option<NotificationId>,
}

// ============================================================================
// UI
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterIncremented {
    pub count: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterDecremented {
    pub count: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterReset {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalOpened {
    pub modal_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalClosed {
    pub modal_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmitted {
    pub form_id: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidationFailed {
    pub form_id: String,
    pub errors: Vec<String>,
}
