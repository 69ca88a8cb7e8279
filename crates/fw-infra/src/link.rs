//! Link token client over the backend edge functions.

use std::sync::Arc;

use async_trait::async_trait;
use fw_core::link::{LinkToken, PublicToken};
use fw_core::ports::{AccessTokenProvider, GatewayError, LinkTokenPort};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::http::{map_transport, read_error, ApiClient};

const CREATE_LINK_TOKEN: &str = "functions/v1/create-link-token";
const EXCHANGE_PUBLIC_TOKEN: &str = "functions/v1/exchange-public-token";

#[derive(Debug, Deserialize)]
struct LinkTokenBody {
    link_token: String,
}

#[derive(Debug, Serialize)]
struct ExchangeBody<'a> {
    public_token: &'a str,
}

pub struct RestLinkTokenClient {
    client: ApiClient,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl RestLinkTokenClient {
    pub fn new(client: ApiClient, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self { client, tokens }
    }

    fn bearer(&self) -> Result<String, GatewayError> {
        self.tokens
            .access_token()
            .ok_or_else(|| GatewayError::unauthorized("Not signed in"))
    }
}

#[async_trait]
impl LinkTokenPort for RestLinkTokenClient {
    async fn create_link_token(&self) -> Result<LinkToken, GatewayError> {
        let token = self.bearer()?;
        let response = self
            .client
            .request(Method::POST, CREATE_LINK_TOKEN, Some(&token))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(map_transport)?;
        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        let body: LinkTokenBody = response.json().await.map_err(map_transport)?;
        Ok(LinkToken::new(body.link_token))
    }

    async fn exchange_public_token(&self, public_token: &PublicToken) -> Result<(), GatewayError> {
        let token = self.bearer()?;
        let response = self
            .client
            .request(Method::POST, EXCHANGE_PUBLIC_TOKEN, Some(&token))
            .json(&ExchangeBody {
                public_token: public_token.as_str(),
            })
            .send()
            .await
            .map_err(map_transport)?;
        if !response.status().is_success() {
            return Err(read_error(response).await);
        }

        info!("public token exchanged");
        Ok(())
    }
}
