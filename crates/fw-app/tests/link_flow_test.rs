use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};

use fw_app::usecases::link_flow::{LinkFlowError, LinkFlowOrchestrator};
use fw_app::usecases::pagination::{FetchOutcome, PaginatedFetchController};
use fw_core::finance::{Account, AccountKind, ListFilters, Page};
use fw_core::ids::AccountId;
use fw_core::link::{LinkFlowState, LinkToken, PublicToken};
use fw_core::ports::{
    GatewayError, LinkOutcome, LinkSdkPort, LinkTokenPort, PageSource, RefreshTriggerPort,
};

/// Records the orchestrator state seen at each remote call.
#[derive(Default)]
struct Observed {
    state: OnceLock<watch::Receiver<LinkFlowState>>,
    seen: Mutex<Vec<&'static str>>,
}

impl Observed {
    fn record(&self) {
        if let Some(rx) = self.state.get() {
            self.seen.lock().unwrap().push(rx.borrow().name());
        }
    }
}

struct FakeTokens {
    observed: Arc<Observed>,
    create_fails: bool,
    exchanged: Mutex<Vec<String>>,
}

#[async_trait]
impl LinkTokenPort for FakeTokens {
    async fn create_link_token(&self) -> Result<LinkToken, GatewayError> {
        self.observed.record();
        if self.create_fails {
            Err(GatewayError::rejected("Link token unavailable", Some(502)))
        } else {
            Ok(LinkToken::new("link-sandbox-abc"))
        }
    }

    async fn exchange_public_token(&self, public_token: &PublicToken) -> Result<(), GatewayError> {
        self.exchanged
            .lock()
            .unwrap()
            .push(public_token.as_str().to_string());
        Ok(())
    }
}

enum SdkBehaviour {
    Immediate(LinkOutcome),
    Gated(Mutex<Option<oneshot::Receiver<LinkOutcome>>>),
}

struct FakeSdk {
    observed: Arc<Observed>,
    behaviour: SdkBehaviour,
    opened: AtomicUsize,
}

#[async_trait]
impl LinkSdkPort for FakeSdk {
    async fn open_link(&self, _token: LinkToken) -> LinkOutcome {
        self.observed.record();
        self.opened.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            SdkBehaviour::Immediate(outcome) => outcome.clone(),
            SdkBehaviour::Gated(gate) => {
                let rx = gate.lock().unwrap().take().expect("opened twice");
                rx.await.unwrap_or(LinkOutcome::Exit)
            }
        }
    }
}

fn account(id: &str) -> Account {
    Account {
        id: AccountId::from(id),
        name: "Everyday Checking".to_string(),
        official_name: None,
        mask: Some("0000".to_string()),
        kind: AccountKind::Depository,
        current_balance_minor: Some(125_00),
        available_balance_minor: None,
        currency: "USD".to_string(),
        institution_name: Some("First Platypus Bank".to_string()),
    }
}

#[derive(Default)]
struct CountingRefresh(AtomicUsize);

#[async_trait]
impl RefreshTriggerPort for CountingRefresh {
    async fn trigger_refresh(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    orchestrator: Arc<LinkFlowOrchestrator>,
    observed: Arc<Observed>,
    tokens: Arc<FakeTokens>,
    sdk: Arc<FakeSdk>,
}

fn harness(
    create_fails: bool,
    behaviour: SdkBehaviour,
    accounts: Arc<dyn RefreshTriggerPort>,
) -> Harness {
    let observed = Arc::new(Observed::default());
    let tokens = Arc::new(FakeTokens {
        observed: observed.clone(),
        create_fails,
        exchanged: Mutex::new(Vec::new()),
    });
    let sdk = Arc::new(FakeSdk {
        observed: observed.clone(),
        behaviour,
        opened: AtomicUsize::new(0),
    });
    let orchestrator = Arc::new(LinkFlowOrchestrator::new(
        tokens.clone(),
        sdk.clone(),
        accounts,
    ));
    let _ = observed.state.set(orchestrator.subscribe());
    Harness {
        orchestrator,
        observed,
        tokens,
        sdk,
    }
}

#[tokio::test]
async fn exit_ends_flow_without_accounts_refresh() {
    let refresh = Arc::new(CountingRefresh::default());
    let h = harness(
        false,
        SdkBehaviour::Immediate(LinkOutcome::Exit),
        refresh.clone(),
    );
    assert_eq!(h.orchestrator.state(), LinkFlowState::Idle);

    let state = h.orchestrator.start().await.unwrap();

    assert_eq!(state, LinkFlowState::Exited);
    assert_eq!(
        *h.observed.seen.lock().unwrap(),
        vec!["opening", "awaiting_handoff"]
    );
    assert_eq!(refresh.0.load(Ordering::SeqCst), 0);
    assert!(h.tokens.exchanged.lock().unwrap().is_empty());
}

#[tokio::test]
async fn success_exchanges_token_and_refreshes_accounts() {
    struct AccountsSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageSource<Account> for AccountsSource {
        async fn fetch_page(
            &self,
            _offset: usize,
            _limit: usize,
            _filters: &ListFilters,
        ) -> Result<Page<Account>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Page::new(vec![account("acc-new")], 1))
        }
    }

    let source = Arc::new(AccountsSource {
        calls: AtomicUsize::new(0),
    });
    let accounts = Arc::new(PaginatedFetchController::new("accounts", source.clone()));
    let h = harness(
        false,
        SdkBehaviour::Immediate(LinkOutcome::Success {
            public_token: PublicToken::new("public-sandbox-xyz"),
        }),
        accounts.clone(),
    );

    let state = h.orchestrator.start().await.unwrap();

    assert_eq!(
        state,
        LinkFlowState::Succeeded {
            public_token: PublicToken::new("public-sandbox-xyz")
        }
    );
    assert_eq!(
        *h.tokens.exchanged.lock().unwrap(),
        vec!["public-sandbox-xyz".to_string()]
    );
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert!(accounts.snapshot().buffer.get("acc-new").is_some());
}

#[tokio::test]
async fn token_failure_skips_handoff() {
    let refresh = Arc::new(CountingRefresh::default());
    let h = harness(
        true,
        SdkBehaviour::Immediate(LinkOutcome::Exit),
        refresh.clone(),
    );

    let state = h.orchestrator.start().await.unwrap();

    assert_eq!(
        state,
        LinkFlowState::Failed {
            reason: "Link token unavailable".to_string()
        }
    );
    assert_eq!(h.sdk.opened.load(Ordering::SeqCst), 0);
    assert_eq!(*h.observed.seen.lock().unwrap(), vec!["opening"]);
}

#[tokio::test]
async fn start_is_rejected_while_a_session_is_open() {
    let (release, gate) = oneshot::channel();
    let refresh = Arc::new(CountingRefresh::default());
    let h = harness(
        false,
        SdkBehaviour::Gated(Mutex::new(Some(gate))),
        refresh.clone(),
    );
    let mut rx = h.orchestrator.subscribe();

    let running = tokio::spawn({
        let orchestrator = h.orchestrator.clone();
        async move { orchestrator.start().await }
    });
    tokio::time::timeout(
        Duration::from_secs(1),
        rx.wait_for(|state| *state == LinkFlowState::AwaitingHandoff),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(
        h.orchestrator.start().await,
        Err(LinkFlowError::AlreadyInProgress)
    );

    let _ = release.send(LinkOutcome::Error {
        message: "institution down".to_string(),
    });
    let state = running.await.unwrap().unwrap();
    assert_eq!(
        state,
        LinkFlowState::Failed {
            reason: "institution down".to_string()
        }
    );
    assert_eq!(h.sdk.opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reset_discards_late_sdk_outcome() {
    let (release, gate) = oneshot::channel();
    let refresh = Arc::new(CountingRefresh::default());
    let h = harness(
        false,
        SdkBehaviour::Gated(Mutex::new(Some(gate))),
        refresh.clone(),
    );
    let mut rx = h.orchestrator.subscribe();

    let running = tokio::spawn({
        let orchestrator = h.orchestrator.clone();
        async move { orchestrator.start().await }
    });
    tokio::time::timeout(
        Duration::from_secs(1),
        rx.wait_for(|state| *state == LinkFlowState::AwaitingHandoff),
    )
    .await
    .unwrap()
    .unwrap();

    h.orchestrator.reset();
    assert_eq!(h.orchestrator.state(), LinkFlowState::Idle);

    let _ = release.send(LinkOutcome::Success {
        public_token: PublicToken::new("public-late"),
    });
    let state = running.await.unwrap().unwrap();

    assert_eq!(state, LinkFlowState::Idle);
    assert!(h.tokens.exchanged.lock().unwrap().is_empty());
    assert_eq!(refresh.0.load(Ordering::SeqCst), 0);
}

/// Holds the first accounts fetch open until the test answers it.
struct GatedAccounts {
    gate: Mutex<Option<oneshot::Receiver<Vec<Account>>>>,
    calls: AtomicUsize,
}

#[async_trait]
impl PageSource<Account> for GatedAccounts {
    async fn fetch_page(
        &self,
        _offset: usize,
        _limit: usize,
        _filters: &ListFilters,
    ) -> Result<Page<Account>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        let accounts = match gate {
            Some(gate) => gate.await.unwrap_or_default(),
            None => vec![account("acc-old"), account("acc-new")],
        };
        let total = accounts.len();
        Ok(Page::new(accounts, total))
    }
}

#[tokio::test]
async fn success_during_accounts_load_refreshes_once_it_lands() {
    let (answer, gate) = oneshot::channel();
    let source = Arc::new(GatedAccounts {
        gate: Mutex::new(Some(gate)),
        calls: AtomicUsize::new(0),
    });
    let accounts = Arc::new(PaginatedFetchController::new("accounts", source.clone()));
    let h = harness(
        false,
        SdkBehaviour::Immediate(LinkOutcome::Success {
            public_token: PublicToken::new("public-sandbox-xyz"),
        }),
        accounts.clone(),
    );

    let loading = tokio::spawn({
        let accounts = accounts.clone();
        async move { accounts.load().await }
    });
    let mut rx = accounts.subscribe();
    tokio::time::timeout(
        Duration::from_secs(1),
        rx.wait_for(|snapshot| snapshot.status.is_busy()),
    )
    .await
    .unwrap()
    .unwrap();

    let state = h.orchestrator.start().await.unwrap();
    assert!(matches!(state, LinkFlowState::Succeeded { .. }));
    assert!(accounts.snapshot().refresh_pending);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    let _ = answer.send(vec![account("acc-old")]);
    assert_eq!(loading.await.unwrap(), FetchOutcome::Applied);

    let snapshot = accounts.snapshot();
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert!(!snapshot.refresh_pending);
    assert!(!snapshot.status.is_busy());
    assert!(snapshot.buffer.get("acc-new").is_some());
    assert_eq!(snapshot.buffer.len(), 2);
}
