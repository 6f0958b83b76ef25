//! Task manager for deferred, cancellable work
//!
//! Each task is identified by a [`TaskKey`]. Spawning with a key that is
//! already running aborts the old task first. A finished task sends the
//! action it produced back over an mpsc channel, so state is only ever
//! touched by the host loop that owns the store.
//!
//! # Example
//!
//! ```ignore
//! use shopbus::tasks::{TaskKey, TaskManager};
//! use std::time::Duration;
//!
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut tasks = TaskManager::new(action_tx);
//!
//! // Deliver `Expire` after four seconds unless cancelled first
//! tasks.delay("notification:3", Duration::from_secs(4), NotificationAction::Expire { id });
//!
//! // Early removal
//! tasks.cancel(&TaskKey::new("notification:3"));
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::trace;

use crate::Action;

/// Identifies a task for cancellation and replacement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    /// Create a new task key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Manages async task lifecycle with automatic cancellation.
///
/// Tasks are spawned on the ambient tokio runtime. Dropping the manager
/// aborts everything still pending.
pub struct TaskManager<A> {
    tasks: HashMap<TaskKey, AbortHandle>,
    action_tx: mpsc::UnboundedSender<A>,
}

impl<A> TaskManager<A>
where
    A: Action,
{
    /// Create a new task manager sending finished actions to `action_tx`.
    pub fn new(action_tx: mpsc::UnboundedSender<A>) -> Self {
        Self {
            tasks: HashMap::new(),
            action_tx,
        }
    }

    /// Spawn a task, cancelling any existing task with the same key.
    ///
    /// If the task is cancelled before completion, no action is sent.
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let key = key.into();
        self.cancel(&key);

        let tx = self.action_tx.clone();
        let handle: JoinHandle<()> = tokio::spawn(async move {
            let action = future.await;
            let _ = tx.send(action);
        });

        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Send `action` after `duration`, cancelling any task with the same key.
    pub fn delay(&mut self, key: impl Into<TaskKey>, duration: Duration, action: A) -> &mut Self {
        let key = key.into();
        trace!(task = key.name(), delay_ms = duration.as_millis() as u64, "scheduled");
        self.spawn(key, async move {
            tokio::time::sleep(duration).await;
            action
        })
    }

    /// Cancel a task by key.
    ///
    /// Returns `false` if no task was registered under the key.
    pub fn cancel(&mut self, key: &TaskKey) -> bool {
        match self.tasks.remove(key) {
            Some(handle) => {
                handle.abort();
                trace!(task = key.name(), "cancelled");
                true
            }
            None => false,
        }
    }

    /// Forget a task that already delivered its action.
    ///
    /// Keeps the registry from growing with finished keys.
    pub fn complete(&mut self, key: &TaskKey) {
        self.tasks.remove(key);
    }

    /// Cancel all running tasks.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Check if a task with the given key is currently registered.
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks.contains_key(key)
    }

    /// Get the number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if there are no registered tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<A> Drop for TaskManager<A> {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Expire(u64),
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            "Expire"
        }
    }

    #[test]
    fn test_task_key() {
        let k1 = TaskKey::new("n:1");
        let k2: TaskKey = "n:1".into();
        let k3 = TaskKey::from(String::from("n:1"));

        assert_eq!(k1, k2);
        assert_eq!(k2, k3);
        assert_eq!(k1.name(), "n:1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_sends_after_duration() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.delay("n:1", Duration::from_millis(4000), TestAction::Expire(1));

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(rx.try_recv().is_err());

        let action = tokio::time::timeout(Duration::from_millis(10), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(action, TestAction::Expire(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_delivery() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.delay("n:1", Duration::from_millis(100), TestAction::Expire(1));
        assert!(tasks.is_running(&TaskKey::new("n:1")));

        assert!(tasks.cancel(&TaskKey::new("n:1")));
        assert!(!tasks.cancel(&TaskKey::new("n:1")));

        let result = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_replaces_previous() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.delay("n:1", Duration::from_millis(50), TestAction::Expire(1));
        tasks.delay("n:1", Duration::from_millis(80), TestAction::Expire(2));
        assert_eq!(tasks.len(), 1);

        let action = tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(action, TestAction::Expire(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_and_complete() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.delay("a", Duration::from_secs(10), TestAction::Expire(1));
        tasks.delay("b", Duration::from_secs(10), TestAction::Expire(2));
        assert_eq!(tasks.len(), 2);

        tasks.complete(&TaskKey::new("a"));
        assert_eq!(tasks.len(), 1);

        tasks.cancel_all();
        assert!(tasks.is_empty());
    }
}
