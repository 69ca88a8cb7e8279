pub mod auth;
pub mod http;
pub mod link;
pub mod list;
pub mod time;

pub use auth::{FileSessionCache, RestAuthGateway};
pub use http::ApiClient;
pub use link::RestLinkTokenClient;
pub use list::RestListApi;
pub use time::SystemClock;
