//! Auth gateway adapter for a GoTrue-compatible identity service.

mod gateway;
mod session_cache;
mod wire;

pub use gateway::{RestAuthGateway, DEFAULT_REFRESH_INTERVAL};
pub use session_cache::{FileSessionCache, DEFAULT_SESSION_FILE};
