use std::fmt;

use thiserror::Error;

/// Minimum password length accepted for new accounts.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    #[error("Email is required")]
    EmptyEmail,
    #[error("Email address is not valid")]
    InvalidEmail,
    #[error("Password is required")]
    EmptyPassword,
    #[error("Password must be at least {min_len} characters")]
    PasswordTooShort { min_len: usize },
}

/// Which gateway operation the credentials are meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsPurpose {
    SignIn,
    SignUp,
}

/// Email/password pair submitted to the auth gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Format checks performed before any remote call.
    pub fn validate(&self, purpose: CredentialsPurpose) -> Result<(), CredentialsError> {
        if self.email.is_empty() {
            return Err(CredentialsError::EmptyEmail);
        }
        if !looks_like_email(&self.email) {
            return Err(CredentialsError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(CredentialsError::EmptyPassword);
        }
        if purpose == CredentialsPurpose::SignUp && self.password.chars().count() < MIN_PASSWORD_LEN
        {
            return Err(CredentialsError::PasswordTooShort {
                min_len: MIN_PASSWORD_LEN,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
