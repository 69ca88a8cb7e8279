//! Shared HTTP plumbing for the backend-as-a-service endpoints.

mod client;
mod error;

pub use client::ApiClient;
pub use error::{map_status, map_transport};
pub(crate) use error::read_error;
