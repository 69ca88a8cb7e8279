//! Authentication session use cases.
//!
//! [`SessionStore`] is the single source of truth for who is signed in;
//! [`AuthSessionManager`] is its only writer.

mod listener;
mod manager;
mod store;

pub use listener::SessionChangeListener;
pub use manager::{AuthError, AuthSessionManager};
pub use store::SessionStore;
