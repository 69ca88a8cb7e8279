//! Request and response bodies of the identity service.

use chrono::{DateTime, Duration, Utc};
use fw_core::auth::{Identity, Session, SignedInSession};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserBody {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token grant response. Sign-up answers with a bare user when the account
/// still needs email confirmation, so every token field is optional.
#[derive(Debug, Deserialize)]
pub(super) struct TokenBody {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<UserBody>,
}

impl TokenBody {
    /// `None` when the body carries no usable session.
    pub fn into_signed_in(self, now: DateTime<Utc>) -> Option<SignedInSession> {
        let access_token = self.access_token?;
        let refresh_token = self.refresh_token?;
        let user = self.user?;
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in.unwrap_or(3600)));

        let mut identity = Identity::new(user.id);
        if let Some(email) = user.email {
            identity = identity.with_email(email);
        }
        Some(SignedInSession::new(
            Session::new(access_token, refresh_token, expires_at),
            identity,
        ))
    }
}
