//! File-based session cache
//!
//! Persists the signed-in session to a local JSON file so the next process
//! start can restore it.

use std::path::PathBuf;

use anyhow::Context;
use fw_core::auth::SignedInSession;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub const DEFAULT_SESSION_FILE: &str = "session.json";

pub struct FileSessionCache {
    path: PathBuf,
}

impl FileSessionCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self {
            path: base_dir.join(DEFAULT_SESSION_FILE),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn load(&self) -> anyhow::Result<Option<SignedInSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read session cache {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let session = serde_json::from_str(&content).context("Failed to parse session cache")?;
        Ok(Some(session))
    }

    pub async fn save(&self, session: &SignedInSession) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        let mut file = fs::File::create(&self.path)
            .await
            .context("Failed to create session cache")?;
        file.write_all(json.as_bytes())
            .await
            .context("Failed to write session cache")?;
        file.sync_all()
            .await
            .context("Failed to sync session cache")?;
        Ok(())
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}
