use std::rc::Rc;

use serde_json::Value;

use super::AnalyticsPayload;
use crate::events::{AppBus, PageView, Track, UserAction};
use crate::{Clock, PublishReport, Subscription};

/// Publishes `analytics:*` events
///
/// `track` stamps each event with the injected clock's time in epoch
/// milliseconds.
#[derive(Clone)]
pub struct Analytics {
    bus: AppBus,
    clock: Rc<dyn Clock>,
    user_id: Option<String>,
}

impl Analytics {
    pub fn new(bus: &AppBus, clock: Rc<dyn Clock>) -> Self {
        Self {
            bus: bus.clone(),
            clock,
            user_id: None,
        }
    }

    /// Attach `user_id` to every tracked event
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Current time from the injected clock, in epoch milliseconds
    pub fn timestamp(&self) -> i64 {
        self.clock.epoch_millis()
    }

    pub fn publish<P: AnalyticsPayload>(&self, payload: P) -> PublishReport {
        self.bus.publish(payload.into_event())
    }

    pub fn on<P, F>(&self, handler: F) -> Subscription
    where
        P: AnalyticsPayload,
        F: Fn(&P) + 'static,
    {
        self.bus.subscribe(handler)
    }

    /// Publish `analytics:track`
    pub fn track(&self, event: &str, properties: Option<Value>) -> PublishReport {
        self.publish(Track {
            event: event.to_string(),
            properties,
            user_id: self.user_id.clone(),
            timestamp: Some(self.clock.epoch_millis()),
        })
    }

    /// Publish `analytics:track` for a specific user
    pub fn track_as(&self, user_id: &str, event: &str, properties: Option<Value>) -> PublishReport {
        self.publish(Track {
            event: event.to_string(),
            properties,
            user_id: Some(user_id.to_string()),
            timestamp: Some(self.clock.epoch_millis()),
        })
    }

    /// Publish `analytics:page-view`
    pub fn page_view(
        &self,
        page: &str,
        title: Option<&str>,
        referrer: Option<&str>,
    ) -> PublishReport {
        self.publish(PageView {
            page: page.to_string(),
            title: title.map(str::to_string),
            referrer: referrer.map(str::to_string),
        })
    }

    /// Publish `analytics:user-action`
    pub fn user_action(
        &self,
        action: &str,
        category: &str,
        label: Option<&str>,
        value: Option<f64>,
    ) -> PublishReport {
        self.publish(UserAction {
            action: action.to_string(),
            category: category.to_string(),
            label: label.map(str::to_string),
            value,
        })
    }
}

impl std::fmt::Debug for Analytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analytics")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}
