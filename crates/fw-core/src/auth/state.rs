use serde::Serialize;

use super::session::{Identity, Session, SignedInSession};

/// Observable authentication snapshot.
///
/// `is_initializing` is true only until the one-time startup restoration
/// finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthState {
    signed_in: Option<SignedInSession>,
    pub is_initializing: bool,
}

impl AuthState {
    /// State at process start: nobody signed in, restoration pending.
    pub fn initializing() -> Self {
        Self {
            signed_in: None,
            is_initializing: true,
        }
    }

    pub fn ready(signed_in: Option<SignedInSession>) -> Self {
        Self {
            signed_in,
            is_initializing: false,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.signed_in.as_ref().map(|s| &s.identity)
    }

    pub fn session(&self) -> Option<&Session> {
        self.signed_in.as_ref().map(|s| &s.session)
    }

    pub fn signed_in(&self) -> Option<&SignedInSession> {
        self.signed_in.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some() && self.session().is_some()
    }

    /// Replace the whole signed-in pair. Returns true if anything changed.
    pub fn replace(&mut self, signed_in: Option<SignedInSession>) -> bool {
        if self.signed_in == signed_in {
            return false;
        }
        self.signed_in = signed_in;
        true
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::initializing()
    }
}
