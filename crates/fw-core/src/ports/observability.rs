use crate::auth::Identity;

/// Crash/telemetry sink that tracks who is signed in.
pub trait ObservabilityPort: Send + Sync {
    /// Called on every identity transition; `None` after sign-out.
    fn set_user(&self, identity: Option<&Identity>);
}
