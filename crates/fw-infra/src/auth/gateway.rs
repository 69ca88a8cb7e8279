use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fw_core::auth::{Credentials, SessionChange, SignedInSession};
use fw_core::ports::{
    AuthGatewayPort, ClockPort, ErrorKind, GatewayError, SessionChangeFeed, SessionSubscription,
};
use reqwest::Method;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::session_cache::FileSessionCache;
use super::wire::{PasswordGrant, RefreshGrant, TokenBody};
use crate::http::{map_transport, read_error, ApiClient};

/// How often the background ticker checks whether the session is due for
/// a refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

const CHANGE_CHANNEL_CAPACITY: usize = 16;

struct Inner {
    client: ApiClient,
    cache: Option<FileSessionCache>,
    clock: Arc<dyn ClockPort>,
    current: Mutex<Option<SignedInSession>>,
    changes: broadcast::Sender<SessionChange>,
    refresh_margin: chrono::Duration,
}

impl Inner {
    fn current(&self) -> Option<SignedInSession> {
        self.current.lock().ok().and_then(|guard| guard.clone())
    }

    fn set_current(&self, signed_in: Option<SignedInSession>) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = signed_in;
        }
    }

    /// Swap in `next` only if the held session still uses `refresh_token`.
    fn replace_if_current(&self, refresh_token: &str, next: Option<SignedInSession>) -> bool {
        let Ok(mut guard) = self.current.lock() else {
            return false;
        };
        let still_current = guard
            .as_ref()
            .is_some_and(|s| s.session.refresh_token() == refresh_token);
        if still_current {
            *guard = next;
        }
        still_current
    }

    async fn persist(&self, signed_in: Option<&SignedInSession>) {
        let Some(cache) = &self.cache else {
            return;
        };
        let result = match signed_in {
            Some(signed_in) => cache.save(signed_in).await,
            None => cache.clear().await,
        };
        if let Err(err) = result {
            warn!(error = %err, "session cache update failed");
        }
    }

    async fn load_cached(&self) -> Option<SignedInSession> {
        let cache = self.cache.as_ref()?;
        match cache.load().await {
            Ok(cached) => cached,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable session cache");
                None
            }
        }
    }

    fn is_due(&self, signed_in: &SignedInSession) -> bool {
        signed_in
            .session
            .expires_within(self.clock.now(), self.refresh_margin)
    }

    async fn post_for_session<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<TokenBody, GatewayError> {
        let response = self
            .client
            .request(Method::POST, path, None)
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;
        if !response.status().is_success() {
            return Err(read_error(response).await);
        }
        response.json::<TokenBody>().await.map_err(map_transport)
    }

    async fn token_grant<B: Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<SignedInSession, GatewayError> {
        let path = format!("auth/v1/token?grant_type={grant_type}");
        self.post_for_session(&path, body)
            .await?
            .into_signed_in(self.clock.now())
            .ok_or_else(|| GatewayError::rejected("Unexpected response from the server", None))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SignedInSession, GatewayError> {
        self.token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    /// Refresh the held session if it is close to expiry and broadcast the
    /// result.
    async fn refresh_if_due(&self) {
        let Some(current) = self.current() else {
            return;
        };
        if !self.is_due(&current) {
            return;
        }

        let refresh_token = current.session.refresh_token().to_string();
        match self.refresh(&refresh_token).await {
            Ok(refreshed) => {
                if self.replace_if_current(&refresh_token, Some(refreshed.clone())) {
                    self.persist(Some(&refreshed)).await;
                    info!(user_id = %refreshed.identity.id, "session refreshed in background");
                    let _ = self.changes.send(SessionChange::TokenRefreshed(refreshed));
                }
            }
            Err(err) if err.is_retryable() => {
                debug!(error = %err, "background refresh failed, retrying next tick");
            }
            Err(err) => {
                warn!(error = %err, "refresh token rejected, session ended");
                if self.replace_if_current(&refresh_token, None) {
                    self.persist(None).await;
                    let _ = self.changes.send(SessionChange::SignedOut);
                }
            }
        }
    }
}

/// Stops the background refresh ticker when released.
struct RefreshTicker {
    task: JoinHandle<()>,
}

impl SessionSubscription for RefreshTicker {
    fn unsubscribe(self: Box<Self>) {
        self.task.abort();
    }
}

/// [`AuthGatewayPort`] over the identity service REST API.
///
/// Keeps the current session in memory (and in the optional file cache) so
/// `get_session` can restore it and the ticker can refresh it.
pub struct RestAuthGateway {
    inner: Arc<Inner>,
    refresh_interval: Duration,
}

impl RestAuthGateway {
    pub fn new(
        client: ApiClient,
        cache: Option<FileSessionCache>,
        clock: Arc<dyn ClockPort>,
        refresh_margin: chrono::Duration,
    ) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                client,
                cache,
                clock,
                current: Mutex::new(None),
                changes,
                refresh_margin,
            }),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    async fn remember(&self, signed_in: &SignedInSession) {
        self.inner.set_current(Some(signed_in.clone()));
        self.inner.persist(Some(signed_in)).await;
    }

    async fn forget(&self) {
        self.inner.set_current(None);
        self.inner.persist(None).await;
    }
}

#[async_trait]
impl AuthGatewayPort for RestAuthGateway {
    async fn get_session(&self) -> Result<Option<SignedInSession>, GatewayError> {
        let held = match self.inner.current() {
            Some(current) => Some(current),
            None => self.inner.load_cached().await,
        };
        let Some(held) = held else {
            return Ok(None);
        };

        if !self.inner.is_due(&held) {
            self.inner.set_current(Some(held.clone()));
            return Ok(Some(held));
        }

        debug!("stored session near expiry, refreshing");
        match self.inner.refresh(held.session.refresh_token()).await {
            Ok(refreshed) => {
                self.remember(&refreshed).await;
                Ok(Some(refreshed))
            }
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::Unauthorized | ErrorKind::RemoteRejection
                ) =>
            {
                info!(error = %err, "stored session no longer valid");
                self.forget().await;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SignedInSession, GatewayError> {
        let signed_in = self
            .inner
            .token_grant(
                "password",
                &PasswordGrant {
                    email: &credentials.email,
                    password: &credentials.password,
                },
            )
            .await?;
        self.remember(&signed_in).await;
        Ok(signed_in)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignedInSession, GatewayError> {
        let body = self
            .inner
            .post_for_session(
                "auth/v1/signup",
                &PasswordGrant {
                    email: &credentials.email,
                    password: &credentials.password,
                },
            )
            .await?;
        let signed_in = body.into_signed_in(self.inner.clock.now()).ok_or_else(|| {
            GatewayError::rejected("Check your inbox to confirm your email address", None)
        })?;
        self.remember(&signed_in).await;
        Ok(signed_in)
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        let Some(current) = self.inner.current() else {
            self.forget().await;
            return Ok(());
        };

        let result = self
            .inner
            .client
            .request(
                Method::POST,
                "auth/v1/logout",
                Some(current.session.access_token()),
            )
            .send()
            .await
            .map_err(map_transport);

        // The local copy goes regardless of what the server says.
        self.forget().await;

        let response = result?;
        if !response.status().is_success() {
            return Err(read_error(response).await);
        }
        Ok(())
    }

    fn on_session_change(&self) -> SessionChangeFeed {
        let events = self.inner.changes.subscribe();
        let inner = self.inner.clone();
        let interval = self.refresh_interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                inner.refresh_if_due().await;
            }
        });

        SessionChangeFeed {
            events,
            subscription: Box::new(RefreshTicker { task }),
        }
    }
}
