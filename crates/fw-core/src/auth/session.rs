use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Opaque token material plus expiry metadata.
///
/// Sessions are values: a refresh produces a new `Session`, nothing mutates
/// one in place.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True when the session expires within `margin` of `now` (or already has).
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at <= now + margin
    }
}

// Tokens never reach logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Minimal public user record derived from a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// A session together with the identity it proves.
///
/// The store only ever holds `Option<SignedInSession>`, which makes an
/// identity without a session (or the reverse) unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInSession {
    pub session: Session,
    pub identity: Identity,
}

impl SignedInSession {
    pub fn new(session: Session, identity: Identity) -> Self {
        Self { session, identity }
    }
}

/// Out-of-band session notification pushed by the auth gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn(SignedInSession),
    TokenRefreshed(SignedInSession),
    UserUpdated(SignedInSession),
    SignedOut,
}

impl SessionChange {
    /// The session the store should hold after applying this change.
    pub fn into_signed_in(self) -> Option<SignedInSession> {
        match self {
            SessionChange::SignedIn(s)
            | SessionChange::TokenRefreshed(s)
            | SessionChange::UserUpdated(s) => Some(s),
            SessionChange::SignedOut => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionChange::SignedIn(_) => "signed_in",
            SessionChange::TokenRefreshed(_) => "token_refreshed",
            SessionChange::UserUpdated(_) => "user_updated",
            SessionChange::SignedOut => "signed_out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_expiring_at(expires_at: DateTime<Utc>) -> Session {
        Session::new("access", "refresh", expires_at)
    }

    #[test]
    fn test_debug_output_redacts_tokens() {
        let session = Session::new("secret-access", "secret-refresh", Utc::now());
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("secret-access"));
        assert!(!rendered.contains("secret-refresh"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_expiry_checks() {
        let now = Utc::now();
        let session = session_expiring_at(now + Duration::seconds(30));

        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::seconds(30)));
        assert!(session.expires_within(now, Duration::seconds(60)));
        assert!(!session.expires_within(now, Duration::seconds(10)));
    }

    #[test]
    fn test_signed_out_change_clears_session() {
        assert_eq!(SessionChange::SignedOut.into_signed_in(), None);

        let signed_in = SignedInSession::new(
            session_expiring_at(Utc::now()),
            Identity::new("user-1"),
        );
        let change = SessionChange::TokenRefreshed(signed_in.clone());
        assert_eq!(change.into_signed_in(), Some(signed_in));
    }
}
