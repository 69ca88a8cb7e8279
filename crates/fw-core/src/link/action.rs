use super::state::{LinkToken, PublicToken};

/// Side-effects produced by link-flow transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFlowAction {
    /// Ask the backend for a short-lived link token.
    RequestLinkToken,
    /// Launch the external link UI with the issued token.
    OpenLink { token: LinkToken },
    /// Exchange the public token for a persistent item server-side.
    ExchangePublicToken { public_token: PublicToken },
    /// Re-sync the accounts list so the new accounts show up.
    RefreshAccounts,
}
