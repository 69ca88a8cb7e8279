//! # fw-core
//!
//! Core domain models and business rules for finwatch.
//!
//! This crate contains pure logic without any infrastructure dependencies:
//! session/identity records, the page buffer used by list synchronization,
//! the bank-link state machine, and the port traits implemented by
//! `fw-infra` and `fw-runtime`.

pub mod auth;
pub mod config;
pub mod finance;
pub mod ids;
pub mod link;
pub mod ports;

// Re-export commonly used types at the crate root
pub use auth::{AuthState, Credentials, Identity, Session, SessionChange, SignedInSession};
pub use config::AppConfig;
pub use finance::{
    Account, Collection, FetchStatus, ListFilters, Page, PageBuffer, PageItem, Transaction,
};
pub use ids::{AccountId, TransactionId, UserId};
pub use link::{LinkFlowState, LinkFlowStateMachine};
pub use ports::{ErrorKind, GatewayError};
