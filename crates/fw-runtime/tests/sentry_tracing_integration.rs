use fw_core::auth::Identity;
use fw_core::ports::ObservabilityPort;
use fw_runtime::adapters::SentryObservability;
use fw_runtime::bootstrap::tracing::init_tracing_subscriber;
use sentry::Level;

#[test]
fn test_sentry_tracing_integration() {
    std::env::set_var("SENTRY_DSN", "https://public@example.com/1");
    std::env::set_var("RUST_LOG", "info");

    init_tracing_subscriber(None).expect("Failed to init tracing");

    let events = sentry::test::with_captured_events(|| {
        tracing::error!("Transactions page request failed");
    });

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Level::Error);
    assert_eq!(
        events[0].message.as_deref(),
        Some("Transactions page request failed")
    );

    let events = sentry::test::with_captured_events(|| {
        SentryObservability::new().set_user(Some(&Identity::new("U1")));
        tracing::warn!("Session refresh retried");
        tracing::error!("Session refresh failed");
    });

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(
        event.user.as_ref().and_then(|u| u.id.as_deref()),
        Some("U1")
    );

    let breadcrumbs: Vec<_> = event
        .breadcrumbs
        .iter()
        .filter(|b| b.message.as_deref() == Some("Session refresh retried"))
        .collect();

    assert_eq!(breadcrumbs.len(), 1);
    assert_eq!(breadcrumbs[0].level, Level::Warning);
}
