//! Link-flow orchestrator.
//!
//! Drives [`LinkFlowStateMachine`] and executes the actions it emits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, info_span, Instrument};

use fw_core::link::{LinkFlowAction, LinkFlowEvent, LinkFlowState, LinkFlowStateMachine};
use fw_core::ports::{LinkOutcome, LinkSdkPort, LinkTokenPort, RefreshTriggerPort};

use crate::usecases::internal::{with_timeout, DEFAULT_REQUEST_TIMEOUT};

/// Errors produced by the link-flow orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkFlowError {
    #[error("A bank link is already in progress")]
    AlreadyInProgress,
}

pub struct LinkFlowOrchestrator {
    state: watch::Sender<LinkFlowState>,
    // Bumped by `start` and `reset`; only touched inside `state` closures.
    generation: AtomicU64,
    tokens: Arc<dyn LinkTokenPort>,
    sdk: Arc<dyn LinkSdkPort>,
    accounts: Arc<dyn RefreshTriggerPort>,
    request_timeout: Duration,
}

impl LinkFlowOrchestrator {
    pub fn new(
        tokens: Arc<dyn LinkTokenPort>,
        sdk: Arc<dyn LinkSdkPort>,
        accounts: Arc<dyn RefreshTriggerPort>,
    ) -> Self {
        let (state, _) = watch::channel(LinkFlowState::Idle);
        Self {
            state,
            generation: AtomicU64::new(0),
            tokens,
            sdk,
            accounts,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn state(&self) -> LinkFlowState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LinkFlowState> {
        self.state.subscribe()
    }

    /// Run one link handshake to its terminal state.
    ///
    /// Accepted from `Idle` and from any terminal state.
    pub async fn start(&self) -> Result<LinkFlowState, LinkFlowError> {
        let mut started = None;
        self.state.send_if_modified(|state| {
            let (next, actions) =
                LinkFlowStateMachine::transition(state.clone(), LinkFlowEvent::StartRequested);
            if actions.is_empty() {
                return false;
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = next;
            started = Some((generation, actions));
            true
        });

        let Some((generation, actions)) = started else {
            debug!(state = self.state().name(), "link flow start rejected");
            return Err(LinkFlowError::AlreadyInProgress);
        };

        let span = info_span!("usecase.link_flow.run", generation);
        Ok(self.drive(generation, actions).instrument(span).await)
    }

    /// Abandon the current flow. An outcome arriving later is ignored.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let (next, _) = LinkFlowStateMachine::transition(state.clone(), LinkFlowEvent::Reset);
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        debug!("link flow reset");
    }

    async fn drive(&self, generation: u64, actions: Vec<LinkFlowAction>) -> LinkFlowState {
        let mut pending: VecDeque<LinkFlowAction> = actions.into();

        while let Some(action) = pending.pop_front() {
            debug!(?action, "link flow executing action");
            let event = match action {
                LinkFlowAction::RequestLinkToken => {
                    match with_timeout(
                        "create link token",
                        self.request_timeout,
                        self.tokens.create_link_token(),
                    )
                    .await
                    {
                        Ok(token) => LinkFlowEvent::LinkTokenIssued { token },
                        Err(err) => LinkFlowEvent::LinkTokenFailed {
                            reason: err.to_string(),
                        },
                    }
                }
                LinkFlowAction::OpenLink { token } => match self.sdk.open_link(token).await {
                    LinkOutcome::Success { public_token } => {
                        LinkFlowEvent::LinkSucceeded { public_token }
                    }
                    LinkOutcome::Exit => LinkFlowEvent::LinkExited,
                    LinkOutcome::Error { message } => LinkFlowEvent::LinkErrored { reason: message },
                },
                LinkFlowAction::ExchangePublicToken { public_token } => {
                    match with_timeout(
                        "exchange public token",
                        self.request_timeout,
                        self.tokens.exchange_public_token(&public_token),
                    )
                    .await
                    {
                        Ok(()) => LinkFlowEvent::ExchangeCompleted,
                        Err(err) => LinkFlowEvent::ExchangeFailed {
                            reason: err.to_string(),
                        },
                    }
                }
                LinkFlowAction::RefreshAccounts => {
                    info!("bank linked, refreshing accounts");
                    self.accounts.trigger_refresh().await;
                    continue;
                }
            };

            match self.apply(generation, event) {
                Some(follow_up) => pending.extend(follow_up),
                None => {
                    debug!("link flow superseded, outcome discarded");
                    break;
                }
            }
        }

        self.state()
    }

    /// Feed an event produced by `generation`. `None` if that flow is stale.
    fn apply(&self, generation: u64, event: LinkFlowEvent) -> Option<Vec<LinkFlowAction>> {
        let mut follow_up = None;
        let event_name = event.name();
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let from = state.name();
            let (next, actions) = LinkFlowStateMachine::transition(state.clone(), event);
            info!(from, to = next.name(), event = event_name, "link flow transition");
            let changed = *state != next;
            *state = next;
            follow_up = Some(actions);
            changed
        });
        follow_up
    }
}
