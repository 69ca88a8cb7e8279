use async_trait::async_trait;

use super::errors::GatewayError;
use crate::finance::{Collection, ListFilters, Page};

/// Offset-paginated remote list API, untyped rows.
#[async_trait]
pub trait ListApiPort: Send + Sync {
    async fn fetch_page(
        &self,
        collection: Collection,
        offset: usize,
        limit: usize,
        filters: &ListFilters,
    ) -> Result<Page<serde_json::Value>, GatewayError>;
}

/// Typed page source consumed by the paginated fetch controller.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
        filters: &ListFilters,
    ) -> Result<Page<T>, GatewayError>;
}
