//! finwatch application orchestration layer
//!
//! Use cases that own the observable client state: the authentication
//! session, paginated list synchronization and the bank-link handshake.

pub mod usecases;

pub use usecases::{
    AuthSessionManager, FetchOutcome, LinkFlowOrchestrator, PaginatedFetchController,
    SessionChangeListener, SessionStore,
};
