use async_trait::async_trait;

/// Something that can be told to re-sync from the remote source.
#[async_trait]
pub trait RefreshTriggerPort: Send + Sync {
    async fn trigger_refresh(&self);
}
