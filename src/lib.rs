//! finwatch
//!
//! Headless entry point: restores the stored session, keeps it fresh and
//! syncs accounts and transactions until interrupted.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use fw_app::usecases::pagination::FetchOutcome;
use fw_core::ports::LinkOutcome;
use fw_runtime::adapters::{ChannelLinkSdk, LinkRequest};
use fw_runtime::bootstrap::{load_config, tracing::init_tracing_subscriber};
use fw_runtime::{wire_context, AppContext, RuntimeSettings};

pub const ENV_CONFIG_PATH: &str = "FINWATCH_CONFIG";
pub const ENV_EMAIL: &str = "FINWATCH_EMAIL";
pub const ENV_PASSWORD: &str = "FINWATCH_PASSWORD";
pub const DEFAULT_CONFIG_FILE: &str = "finwatch.toml";

const LINK_REQUEST_BUFFER: usize = 4;

/// Pick the config file: CLI argument, then `FINWATCH_CONFIG`, then
/// `finwatch.toml` in the working directory.
pub fn config_path(arg: Option<String>) -> PathBuf {
    let non_blank = |p: &String| !p.trim().is_empty();
    arg.filter(non_blank)
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().filter(non_blank))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let settings = RuntimeSettings::from_env(config)?;
    init_tracing_subscriber(settings.log_dir.as_deref())
        .context("Failed to initialize tracing")?;

    let (link_sdk, link_requests) = ChannelLinkSdk::new(LINK_REQUEST_BUFFER);
    let ctx = wire_context(&settings, Arc::new(link_sdk))?;
    let link_ui = tokio::spawn(decline_link_requests(link_requests));

    let listener = ctx.auth.listen_for_session_changes();
    let state = ctx.auth.restore_session().await;
    if !state.is_authenticated() {
        sign_in_from_env(&ctx).await;
    }

    if ctx.auth.is_authenticated() {
        sync_lists(&ctx).await;
    } else {
        tracing::info!("Not signed in; set {ENV_EMAIL} and {ENV_PASSWORD} to sign in");
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutting down");

    listener.unsubscribe();
    link_ui.abort();
    Ok(())
}

async fn sign_in_from_env(ctx: &AppContext) {
    let (Ok(email), Ok(password)) = (std::env::var(ENV_EMAIL), std::env::var(ENV_PASSWORD)) else {
        return;
    };
    if let Err(err) = ctx.auth.sign_in(&email, &password).await {
        tracing::warn!(error = %err, "Sign-in failed");
    }
}

async fn sync_lists(ctx: &AppContext) {
    let (accounts, transactions) = tokio::join!(ctx.accounts.load(), ctx.transactions.load());
    report("accounts", &accounts, ctx.accounts.snapshot().buffer.len());
    report(
        "transactions",
        &transactions,
        ctx.transactions.snapshot().buffer.len(),
    );
}

fn report(list: &str, outcome: &FetchOutcome, loaded: usize) {
    match outcome {
        FetchOutcome::Failed { kind } => {
            tracing::warn!(list, ?kind, "Initial load failed")
        }
        _ => tracing::info!(list, loaded, "Initial load finished"),
    }
}

/// No widget is hosted headless; every link request ends as an exit.
async fn decline_link_requests(mut requests: mpsc::Receiver<LinkRequest>) {
    while let Some(request) = requests.recv().await {
        tracing::info!("Bank linking needs an interactive front end");
        request.complete(LinkOutcome::Exit);
    }
}
