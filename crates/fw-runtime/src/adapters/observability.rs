use fw_core::auth::Identity;
use fw_core::ports::ObservabilityPort;

/// Tags Sentry events with the signed-in user.
///
/// Writes to the current hub's scope, so it is a no-op when Sentry was
/// never initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct SentryObservability;

impl SentryObservability {
    pub fn new() -> Self {
        Self
    }
}

impl ObservabilityPort for SentryObservability {
    fn set_user(&self, identity: Option<&Identity>) {
        let user = identity.map(|identity| sentry::User {
            id: Some(identity.id.as_str().to_string()),
            email: identity.email.clone(),
            ..Default::default()
        });
        tracing::debug!(signed_in = user.is_some(), "Updating error-reporting user");
        sentry::configure_scope(|scope| scope.set_user(user));
    }
}
