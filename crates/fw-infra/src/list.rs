//! List API adapter for a PostgREST-style data endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use fw_core::finance::{Collection, ListFilters, Page};
use fw_core::ports::{AccessTokenProvider, GatewayError, ListApiPort};
use reqwest::header::CONTENT_RANGE;
use reqwest::Method;
use tracing::debug;

use crate::http::{map_transport, read_error, ApiClient};

pub struct RestListApi {
    client: ApiClient,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl RestListApi {
    pub fn new(client: ApiClient, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { client, tokens }
    }
}

/// Query parameters for one page of `collection`.
fn query_params(
    collection: Collection,
    offset: usize,
    limit: usize,
    filters: &ListFilters,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", "*".to_string()),
        ("offset", offset.to_string()),
        ("limit", limit.to_string()),
    ];

    match collection {
        Collection::Transactions => {
            params.push(("order", "posted_at.desc,id.desc".to_string()));
            if let Some(account_id) = &filters.account_id {
                params.push(("account_id", format!("eq.{account_id}")));
            }
            if let Some(search) = &filters.search {
                params.push(("description", format!("ilike.*{search}*")));
            }
            if let Some(category) = &filters.category {
                params.push(("category", format!("eq.{category}")));
            }
            if let Some(from) = filters.from {
                params.push(("posted_at", format!("gte.{from}")));
            }
            if let Some(to) = filters.to {
                params.push(("posted_at", format!("lte.{to}")));
            }
        }
        Collection::Accounts => {
            params.push(("order", "name.asc,id.asc".to_string()));
            if let Some(account_id) = &filters.account_id {
                params.push(("id", format!("eq.{account_id}")));
            }
            if let Some(search) = &filters.search {
                params.push(("name", format!("ilike.*{search}*")));
            }
        }
    }
    params
}

/// Collection size from a `Content-Range` value such as `0-24/57` or `*/0`.
fn parse_total(content_range: &str) -> Option<usize> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse().ok()
}

#[async_trait]
impl ListApiPort for RestListApi {
    async fn fetch_page(
        &self,
        collection: Collection,
        offset: usize,
        limit: usize,
        filters: &ListFilters,
    ) -> Result<Page<serde_json::Value>, GatewayError> {
        let token = self
            .tokens
            .access_token()
            .ok_or_else(|| GatewayError::unauthorized("Not signed in"))?;

        let response = self
            .client
            .request(
                Method::GET,
                &format!("rest/v1/{}", collection.resource()),
                Some(&token),
            )
            .header("Prefer", "count=exact")
            .query(&query_params(collection, offset, limit, filters))
            .send()
            .await
            .map_err(map_transport)?;

        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_total);
        let items: Vec<serde_json::Value> = response.json().await.map_err(map_transport)?;
        // Without a count the server gave no size; assume nothing beyond this page
        // unless it came back full.
        let total = total.unwrap_or_else(|| {
            let seen = offset + items.len();
            if items.len() == limit {
                seen + 1
            } else {
                seen
            }
        });

        debug!(%collection, offset, returned = items.len(), total, "page fetched");
        Ok(Page::new(items, total))
    }
}
