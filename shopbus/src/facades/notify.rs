use super::NotificationPayload;
use crate::events::{
    AppBus, AppEvent, EventName, HideNotification, NotificationKind, NotifyAction,
    ShowNotification,
};
use crate::notifications::NotificationId;
use crate::{PublishReport, Subscription};

/// Optional parts of a `notification:show` request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotifyOptions {
    /// Display time in milliseconds
    pub duration: Option<u64>,
    pub action: Option<NotifyAction>,
}

impl NotifyOptions {
    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.duration = Some(ms);
        self
    }

    /// Add a button that publishes `trigger` when activated
    pub fn action(mut self, label: impl Into<String>, trigger: impl Into<AppEvent>) -> Self {
        self.action = Some(NotifyAction::new(label, trigger));
        self
    }
}

/// Publishes `notification:*` events
///
/// ```
/// use shopbus::events::AppBus;
/// use shopbus::facades::Notify;
///
/// let bus = AppBus::new();
/// let notify = Notify::new(&bus);
/// assert_eq!(notify.success("Saved").delivered, 0);
/// ```
#[derive(Debug, Clone)]
pub struct Notify {
    bus: AppBus,
}

impl Notify {
    pub fn new(bus: &AppBus) -> Self {
        Self { bus: bus.clone() }
    }

    pub fn publish<P: NotificationPayload>(&self, payload: P) -> PublishReport {
        self.bus.publish(payload.into_event())
    }

    pub fn on<P, F>(&self, handler: F) -> Subscription
    where
        P: NotificationPayload,
        F: Fn(&P) + 'static,
    {
        self.bus.subscribe(handler)
    }

    /// Publish `notification:show`
    pub fn show(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        options: NotifyOptions,
    ) -> PublishReport {
        self.publish(ShowNotification {
            message: message.into(),
            kind,
            duration: options.duration,
            action: options.action,
        })
    }

    pub fn success(&self, message: impl Into<String>) -> PublishReport {
        self.show(NotificationKind::Success, message, NotifyOptions::default())
    }

    pub fn error(&self, message: impl Into<String>) -> PublishReport {
        self.show(NotificationKind::Error, message, NotifyOptions::default())
    }

    pub fn info(&self, message: impl Into<String>) -> PublishReport {
        self.show(NotificationKind::Info, message, NotifyOptions::default())
    }

    pub fn warning(&self, message: impl Into<String>) -> PublishReport {
        self.show(NotificationKind::Warning, message, NotifyOptions::default())
    }

    pub fn success_with(&self, message: impl Into<String>, options: NotifyOptions) -> PublishReport {
        self.show(NotificationKind::Success, message, options)
    }

    pub fn error_with(&self, message: impl Into<String>, options: NotifyOptions) -> PublishReport {
        self.show(NotificationKind::Error, message, options)
    }

    pub fn info_with(&self, message: impl Into<String>, options: NotifyOptions) -> PublishReport {
        self.show(NotificationKind::Info, message, options)
    }

    pub fn warning_with(&self, message: impl Into<String>, options: NotifyOptions) -> PublishReport {
        self.show(NotificationKind::Warning, message, options)
    }

    /// Publish `notification:hide`
    pub fn hide(&self, id: NotificationId) -> PublishReport {
        self.publish(HideNotification { id: Some(id) })
    }

    /// Publish `notification:clear-all`
    pub fn clear_all(&self) -> PublishReport {
        self.bus.publish(AppEvent::NotificationClearAll)
    }

    pub fn on_show<F: Fn(&ShowNotification) + 'static>(&self, handler: F) -> Subscription {
        self.on(handler)
    }

    pub fn on_hide<F: Fn(&HideNotification) + 'static>(&self, handler: F) -> Subscription {
        self.on(handler)
    }

    pub fn on_clear_all<F: Fn() + 'static>(&self, handler: F) -> Subscription {
        self.bus
            .subscribe_signal(EventName::NotificationClearAll, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RestoreRequested;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_helpers_set_kind() {
        let bus = AppBus::new();
        let notify = Notify::new(&bus);
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&kinds);
        let _sub = notify.on_show(move |show| sink.borrow_mut().push(show.kind));

        notify.success("a");
        notify.error("b");
        notify.info("c");
        notify.warning("d");

        assert_eq!(
            *kinds.borrow(),
            vec![
                NotificationKind::Success,
                NotificationKind::Error,
                NotificationKind::Info,
                NotificationKind::Warning,
            ]
        );
    }

    #[test]
    fn test_options_pass_through() {
        let bus = AppBus::new();
        let notify = Notify::new(&bus);
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let _sub = notify.on_show(move |show| *sink.borrow_mut() = Some(show.clone()));

        let undo = RestoreRequested {
            product_id: "1".into(),
            product_name: "Mouse".into(),
            price: 29.99,
        };
        notify.info_with(
            "Mouse removed from cart",
            NotifyOptions::default()
                .duration_ms(1000)
                .action("Undo", undo.clone()),
        );

        let show = seen.borrow().clone().unwrap();
        assert_eq!(show.duration, Some(1000));
        let action = show.action.unwrap();
        assert_eq!(action.label, "Undo");
        assert_eq!(*action.trigger, AppEvent::CartRestoreRequested(undo));
    }

    #[test]
    fn test_hide_and_clear_all() {
        let bus = AppBus::new();
        let notify = Notify::new(&bus);
        let hidden = Rc::new(Cell::new(None));
        let cleared = Rc::new(Cell::new(0));

        let h = Rc::clone(&hidden);
        let _hide = notify.on_hide(move |hide| h.set(hide.id));
        let c = Rc::clone(&cleared);
        let _clear = notify.on_clear_all(move || c.set(c.get() + 1));

        notify.hide(NotificationId(7));
        notify.clear_all();

        assert_eq!(hidden.get(), Some(NotificationId(7)));
        assert_eq!(cleared.get(), 1);
    }
}
