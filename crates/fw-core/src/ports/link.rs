use async_trait::async_trait;

use super::errors::GatewayError;
use crate::link::{LinkToken, PublicToken};

/// Backend half of the bank-link handshake.
#[async_trait]
pub trait LinkTokenPort: Send + Sync {
    /// Short-lived token used to open the link UI.
    async fn create_link_token(&self) -> Result<LinkToken, GatewayError>;

    /// Trade the SDK's public token for a persistent item server-side.
    async fn exchange_public_token(&self, public_token: &PublicToken) -> Result<(), GatewayError>;
}

/// Single terminal outcome reported by the link SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Success { public_token: PublicToken },
    Exit,
    Error { message: String },
}

/// External link UI.
#[async_trait]
pub trait LinkSdkPort: Send + Sync {
    /// Launch the UI and wait for its outcome. Launch failures are reported
    /// as [`LinkOutcome::Error`].
    async fn open_link(&self, token: LinkToken) -> LinkOutcome;
}
