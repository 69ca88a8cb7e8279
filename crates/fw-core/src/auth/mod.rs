//! Authentication domain module.
//!
//! Session and identity records, the observable [`AuthState`] snapshot, and
//! credential validation that runs before any remote call.

mod credentials;
mod session;
mod state;

pub use credentials::{Credentials, CredentialsError, CredentialsPurpose, MIN_PASSWORD_LEN};
pub use session::{Identity, Session, SessionChange, SignedInSession};
pub use state::AuthState;
