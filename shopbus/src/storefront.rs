//! Application wiring
//!
//! [`Storefront`] builds one bus and attaches everything to it: facades, the
//! cart store, the notification center and the loggers. Hosts drive it by
//! calling into the cart and forwarding expiry actions to
//! [`Storefront::handle_expiry`].

use std::rc::Rc;

use tracing::info;

use crate::analytics::AnalyticsLogger;
use crate::cart::CartStore;
use crate::config::ShopConfig;
use crate::context::AppContext;
use crate::events::AppBus;
use crate::facades::{Analytics, CartEvents, Notify, UiEvents};
use crate::notifications::{ExpiryScheduler, NotificationAction, NotificationCenter};
use crate::{ActionLoggerMiddleware, Clock, EventTracer, Subscription};

pub struct Storefront {
    pub bus: AppBus,
    pub analytics: Analytics,
    pub notify: Notify,
    pub cart_events: CartEvents,
    pub ui: UiEvents,
    pub cart: CartStore,
    pub notifications: NotificationCenter,
    pub analytics_logger: AnalyticsLogger,
    tracer: Option<EventTracer>,
    _restores: Subscription,
}

impl Storefront {
    pub fn new(
        config: &ShopConfig,
        scheduler: impl ExpiryScheduler + 'static,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let bus = AppBus::new();

        // The tracer goes first so it sees events before other wildcard
        // subscribers
        let tracer = config
            .logging
            .trace_events
            .then(|| EventTracer::attach(&bus, config.logging.events.clone()));

        let mut analytics = Analytics::new(&bus, Rc::clone(&clock));
        if let Some(user_id) = &config.user_id {
            analytics = analytics.with_user(user_id.clone());
        }

        let notifications = NotificationCenter::attach(
            &bus,
            &config.notifications,
            scheduler,
            Rc::clone(&clock),
        );
        let analytics_logger = AnalyticsLogger::with_capacity(
            &bus,
            Rc::clone(&clock),
            config.logging.analytics_capacity,
        );

        let cart = CartStore::with_logger(
            &bus,
            analytics.clone(),
            ActionLoggerMiddleware::with_log(config.logging.actions.clone()),
        );
        let cart_events = CartEvents::new(&bus);
        let restores = cart.handle_restore_requests(&cart_events);

        info!(
            max_visible = config.notifications.max_visible,
            default_duration_ms = config.notifications.default_duration_ms,
            trace_events = config.logging.trace_events,
            "storefront ready"
        );

        Self {
            notify: Notify::new(&bus),
            cart_events,
            ui: UiEvents::new(&bus),
            analytics,
            cart,
            notifications,
            analytics_logger,
            tracer,
            _restores: restores,
            bus,
        }
    }

    /// Forward an action produced by the expiry scheduler
    pub fn handle_expiry(&self, action: NotificationAction) -> bool {
        self.notifications.handle(action)
    }

    /// Number of events the tracer has logged, if tracing is on
    pub fn traced_events(&self) -> Option<u64> {
        self.tracer.as_ref().map(EventTracer::traced)
    }

    /// A provider context holding handles to every service
    pub fn context(&self) -> AppContext {
        AppContext::builder()
            .provide(self.bus.clone())
            .provide(self.analytics.clone())
            .provide(self.notify.clone())
            .provide(self.cart_events.clone())
            .provide(self.ui.clone())
            .provide(self.cart.clone())
            .provide(self.notifications.clone())
            .build()
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("cart", &self.cart)
            .field("notifications", &self.notifications)
            .field("analytics_logger", &self.analytics_logger)
            .finish_non_exhaustive()
    }
}
