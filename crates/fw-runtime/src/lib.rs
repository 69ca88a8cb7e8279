//! Runtime layer for finwatch
//!
//! Loads configuration, initialises tracing and assembles the application
//! context from the infra adapters and the use cases.

pub mod adapters;
pub mod bootstrap;

pub use bootstrap::{wire_context, AppContext, RuntimeSettings};
