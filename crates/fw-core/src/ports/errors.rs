use thiserror::Error;

use crate::auth::CredentialsError;

/// Coarse failure class, used to pick a recovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transient, safe to retry.
    NetworkFailure,
    /// Session invalid or expired; forces a sign-out.
    Unauthorized,
    /// Rejected locally before any remote call.
    ValidationFailure,
    /// Remote side returned a defined error.
    RemoteRejection,
}

/// Error returned by every remote port.
///
/// `Display` renders a message fit for showing to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Your session has expired. Please sign in again.")]
    Unauthorized { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Rejected {
        message: String,
        status: Option<u16>,
    },
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        GatewayError::Network {
            message: message.into(),
        }
    }

    pub fn timeout(operation: &str) -> Self {
        GatewayError::Network {
            message: format!("{} timed out", operation),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        GatewayError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>, status: Option<u16>) -> Self {
        GatewayError::Rejected {
            message: message.into(),
            status,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Network { .. } => ErrorKind::NetworkFailure,
            GatewayError::Unauthorized { .. } => ErrorKind::Unauthorized,
            GatewayError::Validation { .. } => ErrorKind::ValidationFailure,
            GatewayError::Rejected { .. } => ErrorKind::RemoteRejection,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::NetworkFailure
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Unauthorized { .. } => Some(401),
            GatewayError::Rejected { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<CredentialsError> for GatewayError {
    fn from(err: CredentialsError) -> Self {
        GatewayError::validation(err.to_string())
    }
}
