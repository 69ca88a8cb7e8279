//! # Dependency Injection
//!
//! ## Responsibilities
//!
//! - Create the infra adapters (HTTP client, auth gateway, list and link APIs)
//! - Inject them into the use cases through their port traits
//! - Hand the assembled [`AppContext`] to the caller
//!
//! ## Prohibited
//!
//! No business logic and no configuration validation. Settings arrive
//! already resolved from [`RuntimeSettings`].
//!
//! > This is the only place allowed to depend on fw-infra and fw-app at the
//! > same time. The privilege is for assembly, not for decision making.

use std::sync::Arc;

use fw_app::usecases::auth::{AuthSessionManager, SessionStore};
use fw_app::usecases::link_flow::LinkFlowOrchestrator;
use fw_app::usecases::pagination::{CollectionSource, PaginatedFetchController};
use fw_core::finance::{Account, Collection, Transaction};
use fw_core::ports::{
    AccessTokenProvider, AuthGatewayPort, ClockPort, LinkSdkPort, LinkTokenPort, ListApiPort,
    ObservabilityPort, SessionInvalidationPort,
};
use fw_infra::{
    ApiClient, FileSessionCache, RestAuthGateway, RestLinkTokenClient, RestListApi, SystemClock,
};

use super::settings::RuntimeSettings;
use crate::adapters::SentryObservability;

pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(String),
}

/// Everything a front end needs to drive finwatch.
///
/// Controllers are shared handles; clone the `Arc`s freely.
pub struct AppContext {
    pub session_store: Arc<SessionStore>,
    pub auth: Arc<AuthSessionManager>,
    pub transactions: Arc<PaginatedFetchController<Transaction>>,
    pub accounts: Arc<PaginatedFetchController<Account>>,
    pub link_flow: Arc<LinkFlowOrchestrator>,
}

/// Assemble the application context.
///
/// `link_sdk` is supplied by the caller since it fronts a UI the runtime
/// does not own (see [`ChannelLinkSdk`](crate::adapters::ChannelLinkSdk)).
///
/// # Errors
///
/// Returns `WiringError::HttpClientInit` if the HTTP client cannot be built.
pub fn wire_context(
    settings: &RuntimeSettings,
    link_sdk: Arc<dyn LinkSdkPort>,
) -> WiringResult<AppContext> {
    let client = ApiClient::new(
        settings.api_base_url.clone(),
        settings.anon_key.clone(),
        settings.request_timeout,
    )
    .map_err(|e| WiringError::HttpClientInit(format!("{e:#}")))?;

    let session_store = Arc::new(SessionStore::new());
    let tokens: Arc<dyn AccessTokenProvider> = session_store.clone();

    // Auth
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let cache = settings.session_cache_path.clone().map(FileSessionCache::new);
    let gateway: Arc<dyn AuthGatewayPort> = Arc::new(RestAuthGateway::new(
        client.clone(),
        cache,
        clock,
        settings.refresh_margin,
    ));
    let observability: Arc<dyn ObservabilityPort> = Arc::new(SentryObservability::new());
    let auth = Arc::new(
        AuthSessionManager::new(session_store.clone(), gateway, observability)
            .with_request_timeout(settings.request_timeout),
    );
    let invalidation: Arc<dyn SessionInvalidationPort> = auth.clone();

    // Lists
    let list_api: Arc<dyn ListApiPort> = Arc::new(RestListApi::new(client.clone(), tokens.clone()));
    let transactions = Arc::new(
        PaginatedFetchController::new(
            "transactions",
            Arc::new(CollectionSource::<Transaction>::new(
                list_api.clone(),
                Collection::Transactions,
            )),
        )
        .with_page_size(settings.page_size)
        .with_request_timeout(settings.request_timeout)
        .with_session_invalidation(invalidation.clone()),
    );
    let accounts = Arc::new(
        PaginatedFetchController::new(
            "accounts",
            Arc::new(CollectionSource::<Account>::new(list_api, Collection::Accounts)),
        )
        .with_page_size(settings.page_size)
        .with_request_timeout(settings.request_timeout)
        .with_session_invalidation(invalidation),
    );

    // Bank link
    let link_tokens: Arc<dyn LinkTokenPort> = Arc::new(RestLinkTokenClient::new(client, tokens));
    let link_flow = Arc::new(
        LinkFlowOrchestrator::new(link_tokens, link_sdk, accounts.clone())
            .with_request_timeout(settings.request_timeout),
    );

    tracing::debug!(base_url = %settings.api_base_url, page_size = settings.page_size, "Application context wired");

    Ok(AppContext {
        session_store,
        auth,
        transactions,
        accounts,
        link_flow,
    })
}
