use serde_json::json;
use shopbus::facades::{Analytics, UiEvents};
use tracing::info;

/// Labelled counter that reports every interaction
///
/// Each change publishes a `counter:*` event and a user action, then logs the
/// new count with whatever label is current at that moment.
pub struct CounterLogger {
    label: String,
    count: i64,
    ui: UiEvents,
    analytics: Analytics,
}

impl CounterLogger {
    pub fn new(label: &str, ui: UiEvents, analytics: Analytics) -> Self {
        Self {
            label: label.to_string(),
            count: 0,
            ui,
            analytics,
        }
    }

    pub fn increment(&mut self) {
        self.count += 1;
        self.ui.counter_incremented(self.count, &self.label);
        self.analytics
            .user_action("counter_increment", "demo", Some(&self.label), None);
        self.log_count();
    }

    pub fn decrement(&mut self) {
        self.count -= 1;
        self.ui.counter_decremented(self.count, &self.label);
        self.analytics
            .user_action("counter_decrement", "demo", Some(&self.label), None);
        self.log_count();
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.ui.counter_reset(&self.label);
        self.analytics
            .user_action("counter_reset", "demo", Some(&self.label), None);
        self.log_count();
    }

    /// Relabel without logging
    pub fn relabel(&mut self, label: &str) {
        self.label = label.to_string();
    }

    fn log_count(&self) {
        info!(count = self.count, label = %self.label, "counter");
        self.analytics.track(
            "counter_logged",
            Some(json!({
                "count": self.count,
                "label": self.label,
                "timestamp": self.analytics.timestamp(),
            })),
        );
    }
}
