use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use fw_core::auth::{AuthState, SignedInSession};
use fw_core::ports::AccessTokenProvider;

/// Process-wide holder of the current [`AuthState`].
///
/// Every write replaces the whole signed-in pair inside one
/// `send_if_modified` closure, so readers never observe an identity without
/// its session.
pub struct SessionStore {
    state: watch::Sender<AuthState>,
    // Set by any explicit write while restoration is outstanding; only
    // touched inside `state` closures.
    written_during_restore: AtomicBool,
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(AuthState::initializing());
        Self {
            state,
            written_during_restore: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_initializing(&self) -> bool {
        self.state.borrow().is_initializing
    }

    /// Replace the signed-in pair. Returns true if it changed.
    pub(crate) fn replace(&self, signed_in: Option<SignedInSession>) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_initializing {
                self.written_during_restore.store(true, Ordering::SeqCst);
            }
            state.replace(signed_in)
        })
    }

    /// End the startup phase with the restored session.
    ///
    /// Only the first call has any effect. Any sign-in, sign-out or
    /// invalidation that landed while restoration was outstanding wins over
    /// the restored value. Returns true if the restored value was adopted.
    pub(crate) fn complete_restoration(&self, restored: Option<SignedInSession>) -> bool {
        let mut adopted = false;
        self.state.send_if_modified(|state| {
            if !state.is_initializing {
                return false;
            }
            state.is_initializing = false;
            if !self.written_during_restore.load(Ordering::SeqCst) {
                state.replace(restored);
                adopted = true;
            }
            true
        });
        adopted
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessTokenProvider for SessionStore {
    fn access_token(&self) -> Option<String> {
        self.state
            .borrow()
            .session()
            .map(|session| session.access_token().to_string())
    }
}
