use async_trait::async_trait;
use tokio::sync::broadcast;

use super::errors::GatewayError;
use crate::auth::{Credentials, SessionChange, SignedInSession};

/// Handle for a registered session-change listener.
///
/// Consumed by `unsubscribe`, so it can only be released once.
pub trait SessionSubscription: Send {
    fn unsubscribe(self: Box<Self>);
}

/// Stream of session notifications plus the handle that keeps it alive.
pub struct SessionChangeFeed {
    pub events: broadcast::Receiver<SessionChange>,
    pub subscription: Box<dyn SessionSubscription>,
}

/// Remote identity provider.
#[async_trait]
pub trait AuthGatewayPort: Send + Sync {
    /// Existing valid session, if the gateway has one.
    async fn get_session(&self) -> Result<Option<SignedInSession>, GatewayError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<SignedInSession, GatewayError>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignedInSession, GatewayError>;

    /// Invalidate the current session remotely.
    async fn sign_out(&self) -> Result<(), GatewayError>;

    /// Register for out-of-band session changes (token refresh, remote sign-out).
    fn on_session_change(&self) -> SessionChangeFeed;
}
