// ABOUTME: Shared types used across engine trait definitions.
// ABOUTME: ImageDetails, ImageSummary, ContainerSpec, ContainerInfo, RegistryAuth, RuntimeMetadata.

use crate::compat::EndpointSettingsMap;
use crate::types::{ContainerId, ImageId, ImageRef};
use std::collections::HashMap;

/// A local image as reported by inspect.
#[derive(Debug, Clone)]
pub struct ImageDetails {
    /// Content-addressed image ID (`sha256:...`).
    pub id: ImageId,
    /// `repository@digest` entries recorded when the image was pulled.
    pub repo_digests: Vec<String>,
    pub repo_tags: Vec<String>,
}

/// A local image as reported by list.
#[derive(Debug, Clone)]
pub struct ImageSummary {
    pub id: ImageId,
    pub repo_tags: Vec<String>,
}

/// Request to create a container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: ImageRef,
    pub env: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    /// Per-network endpoint settings, keyed by network name.
    pub endpoints: Option<EndpointSettingsMap>,
}

/// A container as reported by inspect.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub id: ContainerId,
    pub name: String,
    /// Reference the container was created from.
    pub image: String,
    /// Image ID the container is running.
    pub image_id: ImageId,
}

/// Registry credentials used for pulls.
#[derive(Debug, Clone)]
pub struct RegistryAuth {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Bearer or identity token.
    pub token: Option<String>,
    /// Registry server (e.g., "ghcr.io").
    pub server: Option<String>,
}

impl RegistryAuth {
    pub fn token(token: impl Into<String>, server: Option<String>) -> Self {
        Self {
            username: None,
            password: None,
            token: Some(token.into()),
            server,
        }
    }
}

/// Engine metadata.
#[derive(Debug, Clone)]
pub struct RuntimeMetadata {
    /// Engine name (e.g., "Docker", "Podman").
    pub name: String,
    pub version: String,
    /// Highest API version the engine supports.
    pub max_api_version: String,
    /// API version this client negotiated.
    pub api_version: String,
    pub os: String,
    pub arch: String,
}
