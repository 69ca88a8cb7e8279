//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. The remote auth gateway, the list
//! API, the link SDK and the observability sink are all reached through
//! these traits, so `fw-app` never depends on a concrete backend.

mod auth_gateway;
mod clock;
pub mod errors;
mod link;
mod list_api;
mod observability;
mod refresh;
mod session;

pub use auth_gateway::{AuthGatewayPort, SessionChangeFeed, SessionSubscription};
pub use clock::ClockPort;
pub use errors::{ErrorKind, GatewayError};
pub use link::{LinkOutcome, LinkSdkPort, LinkTokenPort};
pub use list_api::{ListApiPort, PageSource};
pub use observability::ObservabilityPort;
pub use refresh::RefreshTriggerPort;
pub use session::{AccessTokenProvider, SessionInvalidationPort};
