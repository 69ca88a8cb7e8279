//! Bank-link domain module.
//!
//! This module defines the link handshake state machine types.

pub mod action;
pub mod event;
pub mod state;
pub mod state_machine;

pub use action::LinkFlowAction;
pub use event::LinkFlowEvent;
pub use state::{LinkFlowState, LinkToken, PublicToken};
pub use state_machine::LinkFlowStateMachine;
