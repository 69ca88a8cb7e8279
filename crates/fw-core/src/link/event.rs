use super::state::{LinkToken, PublicToken};

/// Events that drive the link flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFlowEvent {
    /// User asked to link a bank account.
    StartRequested,
    /// Backend issued a link token.
    LinkTokenIssued { token: LinkToken },
    /// Link token request failed before the external UI opened.
    LinkTokenFailed { reason: String },
    /// External SDK reported success.
    LinkSucceeded { public_token: PublicToken },
    /// User left the external UI without linking.
    LinkExited,
    /// External SDK reported an error.
    LinkErrored { reason: String },
    /// Server-side exchange of the public token completed.
    ExchangeCompleted,
    /// Server-side exchange of the public token failed.
    ExchangeFailed { reason: String },
    /// Caller abandons the flow (screen unmount and similar).
    Reset,
}

impl LinkFlowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LinkFlowEvent::StartRequested => "start_requested",
            LinkFlowEvent::LinkTokenIssued { .. } => "link_token_issued",
            LinkFlowEvent::LinkTokenFailed { .. } => "link_token_failed",
            LinkFlowEvent::LinkSucceeded { .. } => "link_succeeded",
            LinkFlowEvent::LinkExited => "link_exited",
            LinkFlowEvent::LinkErrored { .. } => "link_errored",
            LinkFlowEvent::ExchangeCompleted => "exchange_completed",
            LinkFlowEvent::ExchangeFailed { .. } => "exchange_failed",
            LinkFlowEvent::Reset => "reset",
        }
    }
}
