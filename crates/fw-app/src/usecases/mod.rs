//! Business logic use cases
//!
//! Every use case publishes a plain snapshot on a `watch` channel; the
//! presentation layer reads snapshots and calls operations, nothing else.

pub mod auth;
pub(crate) mod internal;
pub mod link_flow;
pub mod pagination;

pub use auth::{AuthSessionManager, SessionChangeListener, SessionStore};
pub use internal::DEFAULT_REQUEST_TIMEOUT;
pub use link_flow::LinkFlowOrchestrator;
pub use pagination::{FetchOutcome, PaginatedFetchController};
