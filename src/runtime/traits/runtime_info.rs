// ABOUTME: Runtime info trait for container engines.
// ABOUTME: Query engine version and the negotiated API version.

use super::shared_types::RuntimeMetadata;
use async_trait::async_trait;

#[async_trait]
pub trait RuntimeInfo: Send + Sync {
    /// Engine version and metadata.
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError>;

    /// Ping the engine to check connectivity.
    async fn ping(&self) -> Result<(), RuntimeInfoError>;

    /// API version negotiated with the engine at connect time.
    fn api_version(&self) -> &str;
}

/// Errors from runtime info operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeInfoError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
