use std::fmt;

use serde::Serialize;

/// Short-lived token used to open the external link UI.
#[derive(Clone, PartialEq, Eq)]
pub struct LinkToken(String);

/// Opaque token returned by the link SDK on success.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PublicToken(String);

macro_rules! impl_token {
    ($($name:ident),*) => {
        $(
            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}(<redacted>)", stringify!($name))
                }
            }
        )*
    };
}

impl_token!(LinkToken, PublicToken);

/// Link handshake state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum LinkFlowState {
    #[default]
    Idle,
    /// Link token request outstanding.
    Opening,
    /// External UI launched, waiting for its callback.
    AwaitingHandoff,
    Succeeded {
        public_token: PublicToken,
    },
    Exited,
    Failed {
        reason: String,
    },
}

impl LinkFlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LinkFlowState::Succeeded { .. } | LinkFlowState::Exited | LinkFlowState::Failed { .. }
        )
    }

    /// True while an external SDK session is being set up or is open.
    pub fn is_open(&self) -> bool {
        matches!(self, LinkFlowState::Opening | LinkFlowState::AwaitingHandoff)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LinkFlowState::Idle => "idle",
            LinkFlowState::Opening => "opening",
            LinkFlowState::AwaitingHandoff => "awaiting_handoff",
            LinkFlowState::Succeeded { .. } => "succeeded",
            LinkFlowState::Exited => "exited",
            LinkFlowState::Failed { .. } => "failed",
        }
    }
}
