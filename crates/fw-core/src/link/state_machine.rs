//! Link-flow state machine.
//!
//! Defines a pure state transition function for the bank-link handshake.

#[cfg(feature = "tracing")]
use tracing::warn;

use super::action::LinkFlowAction;
use super::event::LinkFlowEvent;
use super::state::LinkFlowState;

/// Pure link-flow state machine: no side effects.
pub struct LinkFlowStateMachine;

impl LinkFlowStateMachine {
    pub fn transition(
        state: LinkFlowState,
        event: LinkFlowEvent,
    ) -> (LinkFlowState, Vec<LinkFlowAction>) {
        match (state, event) {
            // ===== Reset =====
            (_, LinkFlowEvent::Reset) => (LinkFlowState::Idle, Vec::new()),

            // ===== Start =====
            (state, LinkFlowEvent::StartRequested)
                if matches!(state, LinkFlowState::Idle) || state.is_terminal() =>
            {
                (
                    LinkFlowState::Opening,
                    vec![LinkFlowAction::RequestLinkToken],
                )
            }

            // ===== Token =====
            (LinkFlowState::Opening, LinkFlowEvent::LinkTokenIssued { token }) => (
                LinkFlowState::AwaitingHandoff,
                vec![LinkFlowAction::OpenLink { token }],
            ),
            (LinkFlowState::Opening, LinkFlowEvent::LinkTokenFailed { reason }) => {
                (LinkFlowState::Failed { reason }, Vec::new())
            }

            // ===== Handoff outcome =====
            (LinkFlowState::AwaitingHandoff, LinkFlowEvent::LinkSucceeded { public_token }) => (
                LinkFlowState::Succeeded {
                    public_token: public_token.clone(),
                },
                vec![LinkFlowAction::ExchangePublicToken { public_token }],
            ),
            (LinkFlowState::AwaitingHandoff, LinkFlowEvent::LinkExited) => {
                (LinkFlowState::Exited, Vec::new())
            }
            (LinkFlowState::AwaitingHandoff, LinkFlowEvent::LinkErrored { reason }) => {
                (LinkFlowState::Failed { reason }, Vec::new())
            }

            // ===== Exchange =====
            (state @ LinkFlowState::Succeeded { .. }, LinkFlowEvent::ExchangeCompleted) => {
                (state, vec![LinkFlowAction::RefreshAccounts])
            }
            (LinkFlowState::Succeeded { .. }, LinkFlowEvent::ExchangeFailed { reason }) => {
                (LinkFlowState::Failed { reason }, Vec::new())
            }

            (state, _event) => {
                #[cfg(feature = "tracing")]
                warn!(state = state.name(), event = _event.name(), "link flow event ignored");
                (state, Vec::new())
            }
        }
    }
}
