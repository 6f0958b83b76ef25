use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, info};

use super::expiry::ExpiryScheduler;
use super::model::{Notification, NotificationId};
use super::reducer::{reducer, NotificationAction, NotificationEffect, NotificationState};
use crate::config::NotificationSettings;
use crate::events::{AppBus, EventName, HideNotification, ShowNotification};
use crate::{BusEvent, Clock, EffectStore, Subscription};

struct Inner {
    store: EffectStore<NotificationState, NotificationAction, NotificationEffect>,
    scheduler: Box<dyn ExpiryScheduler>,
    clock: Rc<dyn Clock>,
    default_duration: Duration,
    next_id: u64,
}

impl Inner {
    fn handle(&mut self, action: NotificationAction) -> bool {
        if let NotificationAction::Expire { id } = &action {
            self.scheduler.fired(*id);
        }

        let result = self.store.dispatch(action);
        for effect in result.effects {
            match effect {
                NotificationEffect::ScheduleExpiry { id, after } => {
                    self.scheduler.schedule(id, after)
                }
                NotificationEffect::CancelExpiry { id } => self.scheduler.cancel(id),
                NotificationEffect::CancelAll => self.scheduler.cancel_all(),
            }
        }
        result.changed
    }
}

/// Consumer that keeps the list of visible notifications
///
/// Listens for `notification:show`, `notification:hide` and
/// `notification:clear-all`. Each shown notification gets an expiry timer
/// from the scheduler; removing a notification early cancels its timer, and
/// an expiry arriving after removal does nothing.
///
/// Cloning yields another handle to the same center. The bus subscriptions
/// end when the last handle is dropped.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Rc<RefCell<Inner>>,
    bus: AppBus,
    _subscriptions: Rc<[Subscription]>,
}

impl NotificationCenter {
    /// Create a center and subscribe it to `bus`
    pub fn attach(
        bus: &AppBus,
        settings: &NotificationSettings,
        scheduler: impl ExpiryScheduler + 'static,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let inner = Rc::new(RefCell::new(Inner {
            store: EffectStore::new(NotificationState::new(settings.max_visible), reducer),
            scheduler: Box::new(scheduler),
            clock,
            default_duration: settings.default_duration(),
            next_id: 0,
        }));

        let on_show = {
            let weak = Rc::downgrade(&inner);
            bus.subscribe(move |show: &ShowNotification| {
                if let Some(inner) = weak.upgrade() {
                    Self::show_with(&inner, show);
                }
            })
        };
        let on_hide = {
            let weak = Rc::downgrade(&inner);
            bus.subscribe(move |hide: &HideNotification| {
                // A hide without an id has nothing to target
                if let Some(id) = hide.id {
                    dispatch_weak(&weak, NotificationAction::Hide { id });
                }
            })
        };
        let on_clear = {
            let weak = Rc::downgrade(&inner);
            bus.subscribe_signal(EventName::NotificationClearAll, move || {
                dispatch_weak(&weak, NotificationAction::ClearAll);
            })
        };

        Self {
            inner,
            bus: bus.clone(),
            _subscriptions: Rc::from(vec![on_show, on_hide, on_clear]),
        }
    }

    fn show_with(inner: &RefCell<Inner>, show: &ShowNotification) -> NotificationId {
        let mut inner = inner.borrow_mut();
        let id = NotificationId(inner.next_id);
        inner.next_id += 1;

        let duration = match show.duration {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => inner.default_duration,
        };
        let notification = Notification {
            id,
            message: show.message.clone(),
            kind: show.kind,
            created_at: inner.clock.now(),
            duration,
            action: show.action.clone(),
        };

        info!(id = %id, kind = %show.kind, message = %show.message, "notification");
        inner.handle(NotificationAction::Show(notification));
        id
    }

    /// Show a notification directly, bypassing the bus
    pub fn show(&self, show: &ShowNotification) -> NotificationId {
        Self::show_with(&self.inner, show)
    }

    /// Run an action through the reducer and scheduler
    ///
    /// The host loop feeds timer-produced `Expire` actions in here.
    /// Returns whether the visible list changed.
    pub fn handle(&self, action: NotificationAction) -> bool {
        self.inner.borrow_mut().handle(action)
    }

    /// Remove a notification before it expires
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.handle(NotificationAction::Hide { id })
    }

    pub fn clear_all(&self) -> bool {
        self.handle(NotificationAction::ClearAll)
    }

    /// Press a notification's action button
    ///
    /// Dismisses the notification and publishes its trigger event. Returns
    /// `false` if the notification is gone or has no action.
    pub fn activate(&self, id: NotificationId) -> bool {
        let trigger = {
            let inner = self.inner.borrow();
            inner
                .store
                .state()
                .get(id)
                .and_then(|n| n.action.as_ref())
                .map(|action| (*action.trigger).clone())
        };
        let Some(trigger) = trigger else {
            return false;
        };

        self.dismiss(id);
        debug!(id = %id, event = trigger.name(), "notification action activated");
        self.bus.publish(trigger);
        true
    }

    /// Visible notifications, oldest first
    pub fn visible(&self) -> Vec<Notification> {
        self.inner.borrow().store.state().visible.clone()
    }

    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.inner.borrow().store.state().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().store.state().visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn dispatch_weak(weak: &Weak<RefCell<Inner>>, action: NotificationAction) {
    if let Some(inner) = weak.upgrade() {
        inner.borrow_mut().handle(action);
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("visible", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NotificationKind, NotifyAction, RestoreRequested};
    use crate::notifications::ManualExpiry;
    use crate::testing::{test_clock, EventRecorder};
    use crate::{assert_emitted, AppEvent};

    fn setup() -> (AppBus, NotificationCenter, ManualExpiry) {
        let bus = AppBus::new();
        let timers = ManualExpiry::new();
        let center = NotificationCenter::attach(
            &bus,
            &NotificationSettings::default(),
            timers.clone(),
            Rc::new(test_clock()),
        );
        (bus, center, timers)
    }

    fn show(message: &str, duration: Option<u64>) -> ShowNotification {
        ShowNotification {
            message: message.into(),
            kind: NotificationKind::Success,
            duration,
            action: None,
        }
    }

    #[test]
    fn test_show_from_bus_uses_default_duration() {
        let (bus, center, timers) = setup();
        bus.publish(show("Mouse added to cart!", None));
        bus.publish(show("zero means default", Some(0)));
        bus.publish(show("custom", Some(250)));

        let visible = center.visible();
        assert_eq!(visible.len(), 3);
        assert_eq!(visible[0].duration, Duration::from_millis(4000));
        assert_eq!(visible[1].duration, Duration::from_millis(4000));
        assert_eq!(visible[2].duration, Duration::from_millis(250));
        assert_eq!(visible[0].created_at, test_clock().now());
        assert_eq!(timers.pending().len(), 3);
    }

    #[test]
    fn test_ids_are_unique() {
        let (_bus, center, _timers) = setup();
        let a = center.show(&show("a", None));
        let b = center.show(&show("b", None));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hide_cancels_timer_and_late_expiry_is_noop() {
        let (bus, center, timers) = setup();
        let id = center.show(&show("bye", None));
        assert!(timers.is_pending(id));

        bus.publish(HideNotification { id: Some(id) });
        assert!(center.is_empty());
        assert!(!timers.is_pending(id));

        assert!(!center.handle(NotificationAction::Expire { id }));
    }

    #[test]
    fn test_hide_without_id_is_ignored() {
        let (bus, center, _timers) = setup();
        center.show(&show("stay", None));
        bus.publish(HideNotification { id: None });
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn test_expire_removes() {
        let (_bus, center, timers) = setup();
        let id = center.show(&show("short", Some(10)));
        assert!(center.handle(NotificationAction::Expire { id }));
        assert!(center.is_empty());
        assert!(timers.pending().is_empty());
    }

    #[test]
    fn test_clear_all_signal() {
        let (bus, center, timers) = setup();
        center.show(&show("a", None));
        center.show(&show("b", None));

        bus.publish(AppEvent::NotificationClearAll);
        assert!(center.is_empty());
        assert!(timers.pending().is_empty());
    }

    #[test]
    fn test_activate_publishes_trigger_and_dismisses() {
        let (bus, center, _timers) = setup();
        let recorder = EventRecorder::attach(&bus);
        let undo = RestoreRequested {
            product_id: "1".into(),
            product_name: "Mouse".into(),
            price: 29.99,
        };
        let id = center.show(&ShowNotification {
            message: "Mouse removed from cart".into(),
            kind: NotificationKind::Info,
            duration: None,
            action: Some(NotifyAction::new("Undo", undo.clone())),
        });

        assert!(center.activate(id));
        assert!(center.is_empty());
        let events = recorder.take();
        assert_emitted!(events, AppEvent::CartRestoreRequested(request) if *request == undo);

        assert!(!center.activate(id));
    }

    #[test]
    fn test_dropping_center_unsubscribes() {
        let (bus, center, _timers) = setup();
        drop(center);
        assert!(!bus.has_subscribers(EventName::NotificationShow));
    }
}
