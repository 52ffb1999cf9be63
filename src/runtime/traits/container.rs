// ABOUTME: Container operations trait for container engines.
// ABOUTME: Create containers through the compatibility gate and inspect running ones.

use super::shared_types::{ContainerInfo, ContainerSpec};
use crate::types::ContainerId;
use async_trait::async_trait;

#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// Create a container.
    ///
    /// Endpoint fields the engine's API version cannot accept are dropped
    /// before the request is sent; `spec` itself is left untouched.
    async fn create_container(&self, spec: &ContainerSpec) -> Result<ContainerId, ContainerError>;

    /// Inspect a container by name or ID.
    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo, ContainerError>;

    /// Remove a container; `force` also removes a running one.
    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError>;
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
