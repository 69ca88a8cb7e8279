//! Auth session manager.
//!
//! Owns the [`SessionStore`]: restores the session at startup, runs the
//! credential flows and mirrors out-of-band gateway changes into the store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn, Instrument};

use fw_core::auth::{AuthState, Credentials, CredentialsPurpose, SignedInSession};
use fw_core::ports::{
    AuthGatewayPort, ErrorKind, GatewayError, ObservabilityPort, SessionChangeFeed,
    SessionInvalidationPort,
};

use super::listener::SessionChangeListener;
use super::store::SessionStore;
use crate::usecases::internal::{with_timeout, DEFAULT_REQUEST_TIMEOUT};

/// Failure surfaced by sign-in, sign-up and sign-out.
///
/// `Display` is the message shown to the user.
pub type AuthError = GatewayError;

/// Writes to the store and mirrors the identity to observability.
#[derive(Clone)]
struct SessionSync {
    store: Arc<SessionStore>,
    observability: Arc<dyn ObservabilityPort>,
}

impl SessionSync {
    fn apply(&self, signed_in: Option<SignedInSession>) {
        let identity = signed_in.as_ref().map(|s| s.identity.clone());
        if self.store.replace(signed_in) {
            debug!(user_id = ?identity.as_ref().map(|i| i.id.as_str()), "session store replaced");
        }
        self.observability.set_user(identity.as_ref());
    }
}

/// Ends the startup phase even if the restore future is dropped mid-flight.
struct RestorationGuard<'a> {
    store: &'a SessionStore,
    armed: bool,
}

impl RestorationGuard<'_> {
    fn complete(mut self, restored: Option<SignedInSession>) -> bool {
        self.armed = false;
        self.store.complete_restoration(restored)
    }
}

impl Drop for RestorationGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("session restoration abandoned, continuing signed out");
            self.store.complete_restoration(None);
        }
    }
}

pub struct AuthSessionManager {
    sync: SessionSync,
    gateway: Arc<dyn AuthGatewayPort>,
    request_timeout: Duration,
    restore_started: AtomicBool,
}

impl AuthSessionManager {
    pub fn new(
        store: Arc<SessionStore>,
        gateway: Arc<dyn AuthGatewayPort>,
        observability: Arc<dyn ObservabilityPort>,
    ) -> Self {
        Self {
            sync: SessionSync {
                store,
                observability,
            },
            gateway,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            restore_started: AtomicBool::new(false),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.sync.store
    }

    pub fn state(&self) -> AuthState {
        self.sync.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.sync.store.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sync.store.is_authenticated()
    }

    /// Restore a session the gateway already holds.
    ///
    /// Runs once per process; later calls wait for that run to finish and
    /// return the current state without touching the gateway. Failures leave
    /// the client signed out and are never returned.
    ///
    /// A sign-in, sign-out or invalidation made while restoration is still
    /// outstanding wins over the restored session.
    pub async fn restore_session(&self) -> AuthState {
        if self.restore_started.swap(true, Ordering::SeqCst) {
            debug!("session restoration already started, waiting for it");
            let mut rx = self.subscribe();
            return match rx.wait_for(|state| !state.is_initializing).await {
                Ok(state) => state.clone(),
                Err(_) => self.state(),
            };
        }

        let span = info_span!("usecase.auth.restore_session");
        async {
            let guard = RestorationGuard {
                store: &self.sync.store,
                armed: true,
            };

            let restored = match with_timeout(
                "restore session",
                self.request_timeout,
                self.gateway.get_session(),
            )
            .await
            {
                Ok(Some(signed_in)) => {
                    info!(user_id = %signed_in.identity.id, "session restored");
                    Some(signed_in)
                }
                Ok(None) => {
                    info!("no stored session");
                    None
                }
                Err(err) => {
                    warn!(error = %err, kind = ?err.kind(), "session restoration failed");
                    None
                }
            };

            let adopted = guard.complete(restored);
            let state = self.state();
            if adopted {
                if let Some(identity) = state.identity() {
                    self.sync.observability.set_user(Some(identity));
                }
            }
            state
        }
        .instrument(span)
        .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let credentials = Credentials::new(email, password);
        self.submit_credentials(credentials, CredentialsPurpose::SignIn)
            .instrument(info_span!("usecase.auth.sign_in"))
            .await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let credentials = Credentials::new(email, password);
        self.submit_credentials(credentials, CredentialsPurpose::SignUp)
            .instrument(info_span!("usecase.auth.sign_up"))
            .await
    }

    /// Sign out remotely, then clear local state.
    ///
    /// Local state is cleared even when the remote call fails; that failure
    /// is still returned. A gateway answering `Unauthorized` already
    /// considers the session gone, which counts as success.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let span = info_span!("usecase.auth.sign_out");
        async {
            let remote =
                with_timeout("sign out", self.request_timeout, self.gateway.sign_out()).await;

            self.sync.apply(None);

            match remote {
                Ok(()) => {
                    info!("signed out");
                    Ok(())
                }
                Err(err) if err.kind() == ErrorKind::Unauthorized => {
                    info!("remote session already invalid, signed out locally");
                    Ok(())
                }
                Err(err) => {
                    warn!(error = %err, "remote sign out failed, local session cleared");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Mirror gateway session changes into the store until the returned
    /// handle is released.
    pub fn listen_for_session_changes(&self) -> SessionChangeListener {
        let SessionChangeFeed {
            mut events,
            subscription,
        } = self.gateway.on_session_change();
        let sync = self.sync.clone();

        let task = tokio::spawn(
            async move {
                loop {
                    match events.recv().await {
                        Ok(change) => {
                            info!(change = change.name(), "gateway session change");
                            sync.apply(change.into_signed_in());
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "session change listener lagged");
                        }
                        Err(RecvError::Closed) => {
                            debug!("session change feed closed");
                            break;
                        }
                    }
                }
            }
            .instrument(info_span!("usecase.auth.session_changes")),
        );

        SessionChangeListener::new(subscription, task)
    }

    async fn submit_credentials(
        &self,
        credentials: Credentials,
        purpose: CredentialsPurpose,
    ) -> Result<(), AuthError> {
        if let Err(err) = credentials.validate(purpose) {
            info!(error = %err, "credentials rejected locally");
            return Err(err.into());
        }

        let result = match purpose {
            CredentialsPurpose::SignIn => {
                with_timeout(
                    "sign in",
                    self.request_timeout,
                    self.gateway.sign_in(&credentials),
                )
                .await
            }
            CredentialsPurpose::SignUp => {
                with_timeout(
                    "sign up",
                    self.request_timeout,
                    self.gateway.sign_up(&credentials),
                )
                .await
            }
        };

        match result {
            Ok(signed_in) => {
                info!(user_id = %signed_in.identity.id, "authenticated");
                self.sync.apply(Some(signed_in));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "authentication failed");
                Err(err)
            }
        }
    }
}

impl SessionInvalidationPort for AuthSessionManager {
    fn invalidate_session(&self, reason: &str) {
        if self.sync.store.is_authenticated() {
            warn!(reason, "session invalidated, signing out locally");
            self.sync.apply(None);
        }
    }
}
