pub mod config;
pub mod settings;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use settings::RuntimeSettings;
pub use wiring::{wire_context, AppContext, WiringError, WiringResult};
