use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend base URL (may be empty - this is a fact, not an error)
    pub api_base_url: String,

    /// Public API key sent with every backend request
    pub anon_key: String,

    /// Per-request timeout in milliseconds (0 = not configured)
    pub request_timeout_ms: u64,

    /// Page size for paginated lists (0 = not configured)
    pub page_size: usize,

    /// Where the auth gateway caches the current session (path info only)
    pub session_cache_path: PathBuf,

    /// Refresh the access token this many seconds before it expires
    pub refresh_margin_secs: i64,

    /// Directory for log files (empty = stdout only)
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// **Prohibited**: This method must NOT contain any validation
    /// or default value logic. Empty strings and zeros are valid "facts".
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let str_at = |section: &str, key: &str| -> String {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let int_at = |section: &str, key: &str| -> i64 {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
                .unwrap_or(0)
        };

        Ok(Self {
            api_base_url: str_at("api", "base_url"),
            anon_key: str_at("api", "anon_key"),
            request_timeout_ms: int_at("api", "request_timeout_ms").max(0) as u64,
            page_size: int_at("sync", "page_size").max(0) as usize,
            session_cache_path: PathBuf::from(str_at("session", "cache_path")),
            refresh_margin_secs: int_at("session", "refresh_margin_secs"),
            log_dir: PathBuf::from(str_at("logging", "log_dir")),
        })
    }

    /// Create empty AppConfig (all empty/zero values)
    pub fn empty() -> Self {
        Self {
            api_base_url: String::new(),
            anon_key: String::new(),
            request_timeout_ms: 0,
            page_size: 0,
            session_cache_path: PathBuf::new(),
            refresh_margin_secs: 0,
            log_dir: PathBuf::new(),
        }
    }
}
