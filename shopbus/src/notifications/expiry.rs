//! Expiry timers for notifications

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::model::NotificationId;
use super::reducer::NotificationAction;
use crate::tasks::{TaskKey, TaskManager};

/// Runs the timers requested by the notification reducer
pub trait ExpiryScheduler {
    /// Arrange for `NotificationAction::Expire { id }` after `after`
    fn schedule(&mut self, id: NotificationId, after: Duration);

    /// Drop the pending timer for `id`, if any
    fn cancel(&mut self, id: NotificationId);

    /// Drop every pending timer
    fn cancel_all(&mut self);

    /// The timer for `id` delivered its action
    fn fired(&mut self, _id: NotificationId) {}
}

fn task_key(id: NotificationId) -> TaskKey {
    TaskKey::new(format!("notification:{}", id.0))
}

/// Tokio-backed timers
///
/// Each timer is a keyed task that sleeps, then sends `Expire` back over
/// the channel; the host loop passes it to
/// [`NotificationCenter::handle`](super::NotificationCenter::handle).
/// Must be used from inside a tokio runtime.
pub struct TokioExpiry {
    tasks: TaskManager<NotificationAction>,
}

impl TokioExpiry {
    pub fn new(action_tx: mpsc::UnboundedSender<NotificationAction>) -> Self {
        Self {
            tasks: TaskManager::new(action_tx),
        }
    }

    /// Create the scheduler and the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NotificationAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Timers not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }
}

impl ExpiryScheduler for TokioExpiry {
    fn schedule(&mut self, id: NotificationId, after: Duration) {
        self.tasks
            .delay(task_key(id), after, NotificationAction::Expire { id });
    }

    fn cancel(&mut self, id: NotificationId) {
        if self.tasks.cancel(&task_key(id)) {
            debug!(id = %id, "expiry timer cancelled");
        }
    }

    fn cancel_all(&mut self) {
        self.tasks.cancel_all();
    }

    fn fired(&mut self, id: NotificationId) {
        self.tasks.complete(&task_key(id));
    }
}

/// Scheduler that only records requests; tests fire expiries by hand
///
/// Clones share the same pending list, so a test can keep one clone while
/// the center owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualExpiry {
    pending: Rc<RefCell<Vec<(NotificationId, Duration)>>>,
}

impl ManualExpiry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending timers in scheduling order
    pub fn pending(&self) -> Vec<(NotificationId, Duration)> {
        self.pending.borrow().clone()
    }

    pub fn is_pending(&self, id: NotificationId) -> bool {
        self.pending.borrow().iter().any(|(pending, _)| *pending == id)
    }
}

impl ExpiryScheduler for ManualExpiry {
    fn schedule(&mut self, id: NotificationId, after: Duration) {
        let mut pending = self.pending.borrow_mut();
        pending.retain(|(p, _)| *p != id);
        pending.push((id, after));
    }

    fn cancel(&mut self, id: NotificationId) {
        self.pending.borrow_mut().retain(|(p, _)| *p != id);
    }

    fn cancel_all(&mut self) {
        self.pending.borrow_mut().clear();
    }

    fn fired(&mut self, id: NotificationId) {
        self.cancel(id);
    }
}
