//! Bank-link use cases.
//!
//! This module exposes the link-flow orchestrator.

pub mod orchestrator;

pub use orchestrator::{LinkFlowError, LinkFlowOrchestrator};
