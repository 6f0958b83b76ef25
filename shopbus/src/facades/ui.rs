use serde_json::Value;

use super::UiPayload;
use crate::events::{
    AppBus, CounterDecremented, CounterIncremented, CounterReset, FormSubmitted,
    FormValidationFailed, ModalClosed, ModalOpened,
};
use crate::{PublishReport, Subscription};

/// Publishes counter, modal and form events
#[derive(Debug, Clone)]
pub struct UiEvents {
    bus: AppBus,
}

impl UiEvents {
    pub fn new(bus: &AppBus) -> Self {
        Self { bus: bus.clone() }
    }

    pub fn publish<P: UiPayload>(&self, payload: P) -> PublishReport {
        self.bus.publish(payload.into_event())
    }

    pub fn on<P, F>(&self, handler: F) -> Subscription
    where
        P: UiPayload,
        F: Fn(&P) + 'static,
    {
        self.bus.subscribe(handler)
    }

    pub fn counter_incremented(&self, count: i64, label: &str) -> PublishReport {
        self.publish(CounterIncremented {
            count,
            label: label.to_string(),
        })
    }

    pub fn counter_decremented(&self, count: i64, label: &str) -> PublishReport {
        self.publish(CounterDecremented {
            count,
            label: label.to_string(),
        })
    }

    pub fn counter_reset(&self, label: &str) -> PublishReport {
        self.publish(CounterReset {
            label: label.to_string(),
        })
    }

    pub fn modal_opened(&self, modal_id: &str) -> PublishReport {
        self.publish(ModalOpened {
            modal_id: modal_id.to_string(),
        })
    }

    pub fn modal_closed(&self, modal_id: &str) -> PublishReport {
        self.publish(ModalClosed {
            modal_id: modal_id.to_string(),
        })
    }

    pub fn form_submitted(&self, form_id: &str, data: Value) -> PublishReport {
        self.publish(FormSubmitted {
            form_id: form_id.to_string(),
            data,
        })
    }

    pub fn form_validation_failed(&self, form_id: &str, errors: Vec<String>) -> PublishReport {
        self.publish(FormValidationFailed {
            form_id: form_id.to_string(),
            errors,
        })
    }
}
