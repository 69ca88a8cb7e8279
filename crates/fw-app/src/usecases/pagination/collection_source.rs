use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::warn;

use fw_core::finance::{Collection, ListFilters, Page};
use fw_core::ports::{GatewayError, ListApiPort, PageSource};

/// Typed view over one collection of the untyped list API.
pub struct CollectionSource<T> {
    api: Arc<dyn ListApiPort>,
    collection: Collection,
    _item: PhantomData<fn() -> T>,
}

impl<T> CollectionSource<T> {
    pub fn new(api: Arc<dyn ListApiPort>, collection: Collection) -> Self {
        Self {
            api,
            collection,
            _item: PhantomData,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }
}

#[async_trait]
impl<T> PageSource<T> for CollectionSource<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch_page(
        &self,
        offset: usize,
        limit: usize,
        filters: &ListFilters,
    ) -> Result<Page<T>, GatewayError> {
        let page = self
            .api
            .fetch_page(self.collection, offset, limit, filters)
            .await?;

        // A malformed row fails the whole page; skipping it would desync
        // the offset from the server window.
        let items = page
            .items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|err| {
                warn!(collection = %self.collection, error = %err, "malformed row in page");
                GatewayError::rejected(
                    format!("Received unreadable {} from the server", self.collection),
                    None,
                )
            })?;

        Ok(Page::new(items, page.total))
    }
}
