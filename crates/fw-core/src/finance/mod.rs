//! Financial records and the paginated list model.

mod account;
mod filters;
mod page;
mod transaction;

pub use account::{Account, AccountKind};
pub use filters::{Collection, ListFilters};
pub use page::{FetchStatus, Page, PageBuffer, PageItem};
pub use transaction::Transaction;
