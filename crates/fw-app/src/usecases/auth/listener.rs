use fw_core::ports::SessionSubscription;
use tokio::task::JoinHandle;
use tracing::debug;

/// Scoped registration for gateway session-change notifications.
///
/// Release it with [`unsubscribe`](Self::unsubscribe) when the owning scope
/// ends. Dropping the handle tears the registration down as well, so a
/// listener cannot outlive its owner.
pub struct SessionChangeListener {
    subscription: Option<Box<dyn SessionSubscription>>,
    task: Option<JoinHandle<()>>,
}

impl SessionChangeListener {
    pub(crate) fn new(subscription: Box<dyn SessionSubscription>, task: JoinHandle<()>) -> Self {
        Self {
            subscription: Some(subscription),
            task: Some(task),
        }
    }

    /// Whether the forwarding task is still running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn unsubscribe(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("session change listener released");
        }
    }
}

impl Drop for SessionChangeListener {
    fn drop(&mut self) {
        self.teardown();
    }
}
