/// Read access to the bearer token of the current session.
pub trait AccessTokenProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Forces a local sign-out when a remote call reports the session invalid.
pub trait SessionInvalidationPort: Send + Sync {
    fn invalidate_session(&self, reason: &str);
}
