//! Notification list reducer
//!
//! Pure: timers are requested through [`NotificationEffect`]s and run by
//! the center's scheduler once the new state is committed.

use std::time::Duration;

use tracing::trace;

use super::model::{Notification, NotificationId};
use crate::{Action, DispatchResult};

#[derive(Action, Debug, Clone, PartialEq)]
pub enum NotificationAction {
    Show(Notification),
    /// Explicit removal (hide event or dismissal)
    Hide {
        id: NotificationId,
    },
    /// The expiry timer fired
    Expire {
        id: NotificationId,
    },
    ClearAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEffect {
    ScheduleExpiry { id: NotificationId, after: Duration },
    CancelExpiry { id: NotificationId },
    CancelAll,
}

/// Visible notifications, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationState {
    pub visible: Vec<Notification>,
    /// Oldest notifications are dropped beyond this many
    pub max_visible: usize,
}

impl NotificationState {
    pub fn new(max_visible: usize) -> Self {
        Self {
            visible: Vec::new(),
            max_visible: max_visible.max(1),
        }
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.visible.iter().find(|n| n.id == id)
    }

    fn take(&mut self, id: NotificationId) -> Option<Notification> {
        let index = self.visible.iter().position(|n| n.id == id)?;
        Some(self.visible.remove(index))
    }
}

pub fn reducer(
    state: &mut NotificationState,
    action: NotificationAction,
) -> DispatchResult<NotificationEffect> {
    match action {
        NotificationAction::Show(notification) => {
            let id = notification.id;
            let after = notification.duration;
            state.visible.push(notification);

            let mut result =
                DispatchResult::changed_with(NotificationEffect::ScheduleExpiry { id, after });
            while state.visible.len() > state.max_visible {
                let evicted = state.visible.remove(0);
                trace!(id = %evicted.id, "evicted oldest notification");
                result = result.with(NotificationEffect::CancelExpiry { id: evicted.id });
            }
            result
        }

        NotificationAction::Hide { id } => match state.take(id) {
            Some(_) => DispatchResult::changed_with(NotificationEffect::CancelExpiry { id }),
            None => {
                trace!(id = %id, "hide for unknown notification");
                DispatchResult::unchanged()
            }
        },

        NotificationAction::Expire { id } => match state.take(id) {
            Some(_) => DispatchResult::changed(),
            None => {
                trace!(id = %id, "late expiry ignored");
                DispatchResult::unchanged()
            }
        },

        NotificationAction::ClearAll => {
            if state.visible.is_empty() {
                return DispatchResult::unchanged();
            }
            state.visible.clear();
            DispatchResult::changed_with(NotificationEffect::CancelAll)
        }
    }
}
