//! Runtime settings resolved from [`AppConfig`] plus environment overrides.
//!
//! This is the one place where defaults are applied. The config loader
//! reports facts; the wiring layer consumes only [`RuntimeSettings`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use fw_core::config::AppConfig;

pub const ENV_API_URL: &str = "FINWATCH_API_URL";
pub const ENV_ANON_KEY: &str = "FINWATCH_ANON_KEY";

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub api_base_url: String,
    pub anon_key: String,
    pub request_timeout: Duration,
    pub page_size: usize,
    /// `None` keeps the session in memory only.
    pub session_cache_path: Option<PathBuf>,
    pub refresh_margin: chrono::Duration,
    /// `None` logs to stdout only.
    pub log_dir: Option<PathBuf>,
}

impl RuntimeSettings {
    /// Resolve settings from the process environment.
    ///
    /// Loads a `.env` file first when one is present.
    pub fn from_env(config: AppConfig) -> anyhow::Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(error = %err, "Ignoring unreadable .env file");
            }
        }
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    /// Apply environment overrides and defaults to a loaded config.
    ///
    /// # Errors
    ///
    /// Fails when no API base URL is configured anywhere.
    pub fn resolve(
        config: AppConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let api_base_url = non_empty(env(ENV_API_URL))
            .or_else(|| non_empty(Some(config.api_base_url)))
            .unwrap_or_default();
        if api_base_url.is_empty() {
            bail!("API base URL is not configured (set [api].base_url or {ENV_API_URL})");
        }
        let anon_key = non_empty(env(ENV_ANON_KEY)).unwrap_or(config.anon_key);

        let request_timeout = match config.request_timeout_ms {
            0 => DEFAULT_REQUEST_TIMEOUT,
            ms => Duration::from_millis(ms),
        };
        let page_size = match config.page_size {
            0 => DEFAULT_PAGE_SIZE,
            size => size,
        };
        let refresh_margin_secs = if config.refresh_margin_secs > 0 {
            config.refresh_margin_secs
        } else {
            DEFAULT_REFRESH_MARGIN_SECS
        };
        let optional_path = |path: PathBuf| (!path.as_os_str().is_empty()).then_some(path);

        Ok(Self {
            api_base_url,
            anon_key,
            request_timeout,
            page_size,
            session_cache_path: optional_path(config.session_cache_path),
            refresh_margin: chrono::Duration::seconds(refresh_margin_secs),
            log_dir: optional_path(config.log_dir),
        })
    }
}
