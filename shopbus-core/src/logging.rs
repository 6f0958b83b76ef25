//! Action and event logging with glob filters
//!
//! Two consumers share one filter type:
//! - [`ActionLoggerMiddleware`] logs actions passing through a
//!   [`StoreWithMiddleware`](crate::StoreWithMiddleware) and can keep the
//!   most recent ones in an [`ActionLog`] ring buffer.
//! - [`EventTracer`] is a wildcard bus subscriber that logs every published
//!   event whose name passes the filter.
//!
//! # Example
//!
//! ```ignore
//! use shopbus_core::logging::{ActionLogConfig, ActionLoggerMiddleware, EventTracer, LogFilter};
//!
//! let middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::with_capacity(50));
//! let tracer = EventTracer::attach(&bus, LogFilter::parse(Some("cart:*"), None));
//! ```

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, trace};

use crate::action::ActionSummary;
use crate::bus::{EventBus, Subscription};
use crate::event::BusEvent;
use crate::store::Middleware;

/// Include/exclude glob filter over action or event names.
///
/// Patterns support `*` (any run of characters) and `?` (one character).
/// With no include patterns everything is included; excludes are applied
/// after includes.
///
/// - `cart:*` matches every cart event
/// - `*Item` matches `AddItem` and `RemoveItem`
/// - `notification:hide` matches only itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogFilter {
    /// If non-empty, a name must match one of these
    pub include: Vec<String>,
    /// Names matching any of these are dropped
    pub exclude: Vec<String>,
}

impl LogFilter {
    /// Build a filter from comma-separated pattern lists
    ///
    /// ```
    /// use shopbus_core::logging::LogFilter;
    ///
    /// let filter = LogFilter::parse(Some("cart:*, analytics:*"), Some("cart:item-updated"));
    /// assert!(filter.allows("cart:item-added"));
    /// assert!(filter.allows("analytics:track"));
    /// assert!(!filter.allows("cart:item-updated"));
    /// assert!(!filter.allows("notification:show"));
    /// ```
    pub fn parse(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include: include.map(split_patterns).unwrap_or_default(),
            exclude: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    /// A filter that lets every name through
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Every pattern, includes first
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.include.iter().chain(self.exclude.iter()).map(String::as_str)
    }

    /// Check a name against the filter
    pub fn allows(&self, name: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| glob_match(p, name)) {
            return false;
        }
        !self.exclude.iter().any(|p| glob_match(p, name))
    }
}

fn split_patterns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Glob matching supporting `*` and `?`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last `*` seen and the text index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    p = star + 1;
                    t = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

// ============================================================================
// In-memory action log
// ============================================================================

/// A dispatched action as recorded by [`ActionLog`]
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    /// Action name
    pub name: &'static str,
    /// `Debug` rendering of the action
    pub summary: String,
    /// When the action reached the middleware
    pub recorded_at: Instant,
    /// Monotonic sequence number, survives eviction
    pub sequence: u64,
    /// Whether the reducer changed state; `None` until it has run
    pub state_changed: Option<bool>,
}

impl ActionLogEntry {
    /// Time since the action was recorded
    pub fn age(&self) -> Duration {
        self.recorded_at.elapsed()
    }
}

/// Ring buffer settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ActionLogConfig {
    /// Maximum number of entries to keep
    pub capacity: usize,
    /// Which action names get recorded
    pub filter: LogFilter,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: LogFilter::default(),
        }
    }
}

impl ActionLogConfig {
    /// Default filter with a custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }
}

/// Bounded history of dispatched actions, oldest evicted first
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity.min(1024)),
            config,
            next_sequence: 0,
        }
    }

    /// Record an action if it passes the filter
    pub fn record<A: ActionSummary>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        let name = action.name();
        if self.config.capacity == 0 || !self.config.filter.allows(name) {
            return None;
        }

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActionLogEntry {
            name,
            summary: action.summary(),
            recorded_at: Instant::now(),
            sequence: self.next_sequence,
            state_changed: None,
        });
        self.next_sequence += 1;
        self.entries.back()
    }

    /// Fill in the reducer outcome of the newest entry
    pub fn mark_last(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// Entries oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// The newest `count` entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn config(&self) -> &ActionLogConfig {
        &self.config
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware that logs actions through `tracing` and optionally records
/// them in an [`ActionLog`].
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    filter: LogFilter,
    log: Option<ActionLog>,
    /// Whether `before` recorded the in-flight action
    recorded: bool,
    active: bool,
}

impl Default for ActionLoggerMiddleware {
    fn default() -> Self {
        Self::new(LogFilter::default())
    }
}

impl ActionLoggerMiddleware {
    /// Tracing output only
    pub fn new(filter: LogFilter) -> Self {
        Self {
            filter,
            log: None,
            recorded: false,
            active: true,
        }
    }

    /// Tracing output plus an in-memory log using the same filter
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            filter: config.filter.clone(),
            log: Some(ActionLog::new(config)),
            recorded: false,
            active: true,
        }
    }

    /// Turn the middleware into a no-op when `false`
    ///
    /// ```ignore
    /// let middleware = ActionLoggerMiddleware::default().active(args.log_actions);
    /// ```
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The recorded history, if storage is enabled
    pub fn log(&self) -> Option<&ActionLog> {
        self.log.as_ref()
    }

    pub fn filter(&self) -> &LogFilter {
        &self.filter
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&mut self, action: &A) {
        if !self.active {
            return;
        }

        let name = action.name();
        if self.filter.allows(name) {
            debug!(action = name, summary = %action.summary(), "dispatch");
        }

        self.recorded = self
            .log
            .as_mut()
            .is_some_and(|log| log.record(action).is_some());
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if !self.active {
            return;
        }

        if !state_changed && self.filter.allows(action.name()) {
            trace!(action = action.name(), "no state change");
        }
        if self.recorded {
            if let Some(log) = self.log.as_mut() {
                log.mark_last(state_changed);
            }
        }
    }
}

// ============================================================================
// Bus tracing
// ============================================================================

/// Wildcard bus subscriber logging every event that passes its filter.
///
/// Dropping the tracer unsubscribes it.
#[derive(Debug)]
pub struct EventTracer {
    traced: Rc<Cell<u64>>,
    subscription: Subscription,
}

impl EventTracer {
    /// Start tracing events on `bus`
    pub fn attach<E: BusEvent>(bus: &EventBus<E>, filter: LogFilter) -> Self {
        let traced = Rc::new(Cell::new(0));
        let counter = Rc::clone(&traced);
        let subscription = bus.subscribe_any(move |event: &E| {
            let name = event.name();
            if filter.allows(name) {
                counter.set(counter.get() + 1);
                debug!(event = name, payload = ?event, "event");
            }
        });
        Self {
            traced,
            subscription,
        }
    }

    /// Number of events logged so far
    pub fn traced(&self) -> u64 {
        self.traced.get()
    }

    /// Stop tracing
    pub fn detach(self) {
        self.subscription.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::fixtures::{Note, Ping, TestEvent};
    use crate::Action;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("cart:*", "cart:item-added"));
        assert!(glob_match("cart:*", "cart:"));
        assert!(!glob_match("cart:*", "notification:show"));
        assert!(glob_match("*Item", "RemoveItem"));
        assert!(glob_match("*:item-*", "cart:item-removed"));
        assert!(glob_match("cart:item-?dded", "cart:item-added"));
        assert!(!glob_match("cart:item-?dded", "cart:item-dded"));
        assert!(glob_match("ClearCart", "ClearCart"));
        assert!(!glob_match("ClearCart", "ClearCartNow"));
        assert!(glob_match("**", ""));
    }

    #[test]
    fn test_filter_include_then_exclude() {
        let filter = LogFilter::parse(Some("cart:*"), Some("cart:item-updated"));
        assert!(filter.allows("cart:cleared"));
        assert!(!filter.allows("cart:item-updated"));
        assert!(!filter.allows("analytics:track"));
    }

    #[test]
    fn test_filter_empty_allows_everything() {
        let filter = LogFilter::allow_all();
        assert!(filter.allows("anything"));
        assert_eq!(LogFilter::parse(Some(" , "), None), filter);
    }

    #[test]
    fn test_filter_deserialize_partial() {
        let filter: LogFilter = serde_json::from_str(r#"{"exclude": ["analytics:*"]}"#).unwrap();
        assert!(filter.include.is_empty());
        assert!(!filter.allows("analytics:page-view"));
        assert_eq!(filter.patterns().collect::<Vec<_>>(), vec!["analytics:*"]);
    }

    #[derive(Clone, Debug)]
    enum CartLike {
        AddItem(u32),
        ClearCart,
    }

    impl Action for CartLike {
        fn name(&self) -> &'static str {
            match self {
                CartLike::AddItem(_) => "AddItem",
                CartLike::ClearCart => "ClearCart",
            }
        }
    }

    #[test]
    fn test_action_log_capacity_and_sequence() {
        let mut log = ActionLog::new(ActionLogConfig::with_capacity(2));
        log.record(&CartLike::AddItem(1));
        log.record(&CartLike::AddItem(2));
        log.record(&CartLike::ClearCart);

        assert_eq!(log.len(), 2);
        let sequences: Vec<u64> = log.entries().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert_eq!(log.recent(1).next().unwrap().name, "ClearCart");
        assert_eq!(log.entries().next().unwrap().summary, "AddItem(2)");
    }

    #[test]
    fn test_action_log_filtered_out() {
        let config = ActionLogConfig {
            capacity: 10,
            filter: LogFilter::parse(None, Some("Clear*")),
        };
        let mut log = ActionLog::new(config);
        assert!(log.record(&CartLike::ClearCart).is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn test_middleware_marks_outcome_of_recorded_action_only() {
        let config = ActionLogConfig {
            capacity: 10,
            filter: LogFilter::parse(Some("AddItem"), None),
        };
        let mut middleware = ActionLoggerMiddleware::with_log(config);

        middleware.before(&CartLike::AddItem(1));
        middleware.after(&CartLike::AddItem(1), true);
        middleware.before(&CartLike::ClearCart);
        middleware.after(&CartLike::ClearCart, false);

        let log = middleware.log().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries().next().unwrap().state_changed, Some(true));
    }

    #[test]
    fn test_inactive_middleware_records_nothing() {
        let mut middleware =
            ActionLoggerMiddleware::with_log(ActionLogConfig::default()).active(false);
        middleware.before(&CartLike::AddItem(1));
        middleware.after(&CartLike::AddItem(1), true);
        assert!(middleware.log().unwrap().is_empty());
    }

    #[test]
    fn test_event_tracer_counts_filtered_events() {
        let bus: EventBus<TestEvent> = EventBus::new();
        let tracer = EventTracer::attach(&bus, LogFilter::parse(Some("test:*"), None));

        bus.publish(Ping(1));
        bus.publish(Note("hi".into()));
        bus.publish(TestEvent::Reset);
        assert_eq!(tracer.traced(), 2);

        tracer.detach();
        assert_eq!(bus.publish(Ping(2)).invoked(), 0);
    }
}
