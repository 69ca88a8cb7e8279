//! Paginated list synchronization.
//!
//! One [`PaginatedFetchController`] per remote collection keeps a single
//! in-memory [`PageBuffer`](fw_core::PageBuffer) consistent across load,
//! refresh, load-more and local mutations.

mod collection_source;
mod controller;

pub use collection_source::CollectionSource;
pub use controller::{FetchOutcome, PageSnapshot, PaginatedFetchController, DEFAULT_PAGE_SIZE};
