use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::{broadcast, oneshot};

use fw_app::usecases::auth::{AuthSessionManager, SessionStore};
use fw_core::auth::{AuthState, Credentials, Identity, Session, SessionChange, SignedInSession};
use fw_core::ids::UserId;
use fw_core::ports::{
    AccessTokenProvider, AuthGatewayPort, ErrorKind, GatewayError, ObservabilityPort,
    SessionChangeFeed, SessionSubscription,
};

fn signed_in(user: &str, token: &str) -> SignedInSession {
    SignedInSession::new(
        Session::new(token, "refresh", Utc::now() + ChronoDuration::hours(1)),
        Identity::new(user).with_email(format!("{user}@b.com")),
    )
}

type Restored = Result<Option<SignedInSession>, GatewayError>;

/// Scripted gateway: every call pops the next queued response.
#[derive(Default)]
struct FakeGateway {
    get_session: Mutex<VecDeque<Restored>>,
    /// When set, `get_session` waits for the test to answer.
    restore_gate: Mutex<Option<oneshot::Receiver<Restored>>>,
    sign_in: Mutex<VecDeque<Result<SignedInSession, GatewayError>>>,
    sign_out: Mutex<VecDeque<Result<(), GatewayError>>>,
    get_session_calls: AtomicUsize,
    changes: Mutex<Option<broadcast::Sender<SessionChange>>>,
    unsubscribed: Arc<AtomicUsize>,
}

impl FakeGateway {
    fn gated_restore() -> (Self, oneshot::Sender<Restored>) {
        let (answer, gate) = oneshot::channel();
        let gateway = Self::default();
        *gateway.restore_gate.lock().unwrap() = Some(gate);
        (gateway, answer)
    }

    async fn wait_for_restore_call(&self) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while self.get_session_calls.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("restore never reached the gateway");
    }

    fn emit(&self, change: SessionChange) {
        let sender = self.changes.lock().unwrap().clone().expect("no listener");
        sender.send(change).expect("listener dropped");
    }
}

struct FakeSubscription {
    unsubscribed: Arc<AtomicUsize>,
}

impl SessionSubscription for FakeSubscription {
    fn unsubscribe(self: Box<Self>) {
        self.unsubscribed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthGatewayPort for FakeGateway {
    async fn get_session(&self) -> Result<Option<SignedInSession>, GatewayError> {
        self.get_session_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.restore_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(GatewayError::network("gate dropped")));
        }
        self.get_session
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn sign_in(&self, _credentials: &Credentials) -> Result<SignedInSession, GatewayError> {
        self.sign_in
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::rejected("Invalid login credentials", Some(400))))
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignedInSession, GatewayError> {
        self.sign_in(credentials).await
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        self.sign_out.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn on_session_change(&self) -> SessionChangeFeed {
        let (sender, events) = broadcast::channel(8);
        *self.changes.lock().unwrap() = Some(sender);
        SessionChangeFeed {
            events,
            subscription: Box::new(FakeSubscription {
                unsubscribed: self.unsubscribed.clone(),
            }),
        }
    }
}

#[derive(Default)]
struct RecordingObservability {
    users: Mutex<Vec<Option<UserId>>>,
}

impl ObservabilityPort for RecordingObservability {
    fn set_user(&self, identity: Option<&Identity>) {
        self.users
            .lock()
            .unwrap()
            .push(identity.map(|i| i.id.clone()));
    }
}

struct Harness {
    manager: Arc<AuthSessionManager>,
    store: Arc<SessionStore>,
    gateway: Arc<FakeGateway>,
    observability: Arc<RecordingObservability>,
}

fn harness(gateway: FakeGateway) -> Harness {
    let store = Arc::new(SessionStore::new());
    let gateway = Arc::new(gateway);
    let observability = Arc::new(RecordingObservability::default());
    let manager = Arc::new(AuthSessionManager::new(
        store.clone(),
        gateway.clone(),
        observability.clone(),
    ));
    Harness {
        manager,
        store,
        gateway,
        observability,
    }
}

fn assert_identity_iff_session(state: &AuthState) {
    assert_eq!(state.identity().is_some(), state.session().is_some());
    assert_eq!(
        state.is_authenticated(),
        state.identity().is_some() && state.session().is_some()
    );
}

#[tokio::test]
async fn fresh_start_without_session_is_signed_out_and_ready() {
    let h = harness(FakeGateway::default());
    assert!(h.manager.state().is_initializing);

    let state = h.manager.restore_session().await;

    assert!(state.identity().is_none());
    assert!(!state.is_initializing);
    assert!(h.observability.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn restore_failure_is_swallowed_and_initializing_ends_once() {
    let gateway = FakeGateway::default();
    gateway
        .get_session
        .lock()
        .unwrap()
        .push_back(Err(GatewayError::network("dns failure")));
    let h = harness(gateway);
    let mut rx = h.store.subscribe();

    let state = h.manager.restore_session().await;
    assert!(!state.is_initializing);
    assert!(!state.is_authenticated());
    assert!(rx.has_changed().unwrap());
    rx.mark_unchanged();

    h.manager.restore_session().await;
    assert!(!rx.has_changed().unwrap());
    assert_eq!(h.gateway.get_session_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sign_in_replaces_pair_and_reports_user() {
    let gateway = FakeGateway::default();
    gateway
        .sign_in
        .lock()
        .unwrap()
        .push_back(Ok(signed_in("U1", "S1")));
    let h = harness(gateway);
    h.manager.restore_session().await;

    h.manager.sign_in("a@b.com", "secret").await.unwrap();

    let state = h.manager.state();
    assert_eq!(state.identity().map(|i| i.id.as_str()), Some("U1"));
    assert_eq!(state.session().map(|s| s.access_token()), Some("S1"));
    assert_eq!(h.store.access_token().as_deref(), Some("S1"));
    assert_eq!(
        *h.observability.users.lock().unwrap(),
        vec![Some(UserId::from("U1"))]
    );
}

#[tokio::test]
async fn failed_sign_in_leaves_store_untouched() {
    let gateway = FakeGateway::default();
    gateway
        .sign_in
        .lock()
        .unwrap()
        .push_back(Ok(signed_in("U1", "S1")));
    let h = harness(gateway);
    h.manager.sign_in("a@b.com", "secret").await.unwrap();
    let before = h.manager.state();

    let err = h.manager.sign_in("a@b.com", "wrong").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteRejection);
    assert_eq!(err.to_string(), "Invalid login credentials");
    assert_eq!(h.manager.state(), before);
}

#[tokio::test]
async fn sign_out_failure_still_clears_local_state() {
    let gateway = FakeGateway::default();
    gateway
        .sign_in
        .lock()
        .unwrap()
        .push_back(Ok(signed_in("U1", "S1")));
    gateway
        .sign_out
        .lock()
        .unwrap()
        .push_back(Err(GatewayError::network("connection refused")));
    let h = harness(gateway);
    h.manager.sign_in("a@b.com", "secret").await.unwrap();

    let result = h.manager.sign_out().await;

    // Remote failure is reported, local state is cleared regardless.
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    let state = h.manager.state();
    assert!(state.identity().is_none());
    assert!(state.session().is_none());
    assert!(!state.is_authenticated());
    assert_eq!(h.store.access_token(), None);
    assert_eq!(h.observability.users.lock().unwrap().last(), Some(&None));
}

#[tokio::test]
async fn identity_and_session_stay_paired_across_any_sequence() {
    let gateway = FakeGateway::default();
    gateway
        .get_session
        .lock()
        .unwrap()
        .push_back(Ok(Some(signed_in("U0", "S0"))));
    {
        let mut sign_in = gateway.sign_in.lock().unwrap();
        sign_in.push_back(Ok(signed_in("U1", "S1")));
        sign_in.push_back(Err(GatewayError::network("timeout")));
        sign_in.push_back(Ok(signed_in("U2", "S2")));
    }
    gateway
        .sign_out
        .lock()
        .unwrap()
        .push_back(Err(GatewayError::rejected("boom", Some(500))));
    let h = harness(gateway);
    let mut rx = h.store.subscribe();

    assert_identity_iff_session(&h.manager.restore_session().await);
    for step in 0..7 {
        match step % 3 {
            0 => {
                let _ = h.manager.sign_in("a@b.com", "secret").await;
            }
            1 => {
                let _ = h.manager.sign_out().await;
            }
            _ => {
                h.manager.restore_session().await;
            }
        }
        assert_identity_iff_session(&h.manager.state());
        assert_identity_iff_session(&rx.borrow_and_update());
    }
}

#[tokio::test]
async fn session_changes_replace_store_until_unsubscribed() {
    let h = harness(FakeGateway::default());
    h.manager.restore_session().await;
    let mut rx = h.store.subscribe();
    rx.mark_unchanged();

    let listener = h.manager.listen_for_session_changes();
    assert!(listener.is_active());

    h.gateway
        .emit(SessionChange::TokenRefreshed(signed_in("U1", "S1-refreshed")));
    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(h.store.access_token().as_deref(), Some("S1-refreshed"));

    h.gateway.emit(SessionChange::SignedOut);
    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(!h.store.is_authenticated());
    assert_eq!(
        *h.observability.users.lock().unwrap(),
        vec![Some(UserId::from("U1")), None]
    );

    listener.unsubscribe();
    assert_eq!(h.gateway.unsubscribed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dropped_listener_releases_subscription() {
    let h = harness(FakeGateway::default());

    {
        let _listener = h.manager.listen_for_session_changes();
    }

    assert_eq!(h.gateway.unsubscribed.load(Ordering::SeqCst), 1);
}

fn spawn_restore(h: &Harness) -> tokio::task::JoinHandle<AuthState> {
    let manager = h.manager.clone();
    tokio::spawn(async move { manager.restore_session().await })
}

#[tokio::test]
async fn sign_out_during_restore_is_not_reverted() {
    let (gateway, answer) = FakeGateway::gated_restore();
    let h = harness(gateway);

    let restore = spawn_restore(&h);
    h.gateway.wait_for_restore_call().await;

    h.manager.sign_out().await.unwrap();
    let _ = answer.send(Ok(Some(signed_in("U0", "S0"))));
    let state = restore.await.unwrap();

    assert!(!state.is_initializing);
    assert!(!state.is_authenticated());
    assert!(!h.store.is_authenticated());
    assert_eq!(h.store.access_token(), None);
    assert_eq!(*h.observability.users.lock().unwrap(), vec![None]);
}

#[tokio::test]
async fn sign_in_during_restore_wins_over_restored_session() {
    let (gateway, answer) = FakeGateway::gated_restore();
    gateway
        .sign_in
        .lock()
        .unwrap()
        .push_back(Ok(signed_in("U1", "S1")));
    let h = harness(gateway);

    let restore = spawn_restore(&h);
    h.gateway.wait_for_restore_call().await;

    h.manager.sign_in("a@b.com", "secret").await.unwrap();
    let _ = answer.send(Ok(Some(signed_in("U0", "S0"))));
    let state = restore.await.unwrap();

    assert_eq!(state.identity().map(|i| i.id.as_str()), Some("U1"));
    assert_eq!(h.store.access_token().as_deref(), Some("S1"));
    assert_eq!(
        *h.observability.users.lock().unwrap(),
        vec![Some(UserId::from("U1"))]
    );
}

#[tokio::test]
async fn second_restore_waits_for_the_first() {
    let (gateway, answer) = FakeGateway::gated_restore();
    let h = harness(gateway);

    let first = spawn_restore(&h);
    h.gateway.wait_for_restore_call().await;
    let second = spawn_restore(&h);
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!second.is_finished());

    let _ = answer.send(Ok(Some(signed_in("U0", "S0"))));
    let first = first.await.unwrap();
    let second = second.await.unwrap();

    assert!(!second.is_initializing);
    assert_eq!(first, second);
    assert!(second.is_authenticated());
    assert_eq!(h.gateway.get_session_calls.load(Ordering::SeqCst), 1);
}
