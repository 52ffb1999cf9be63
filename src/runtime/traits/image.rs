// ABOUTME: Image operations trait for container engines.
// ABOUTME: Inspect and list local images; pull only on the caller's explicit request.

use super::shared_types::{ImageDetails, ImageSummary, RegistryAuth};
use crate::types::ImageRef;
use async_trait::async_trait;

/// Local image queries against a Docker-compatible engine.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Inspect a local image by reference or ID.
    async fn inspect_image(&self, reference: &str) -> Result<ImageDetails, ImageError>;

    /// List all local images.
    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError>;

    /// Pull an image from its registry.
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("authentication failed for registry: {0}")]
    AuthenticationFailed(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
