// ABOUTME: Bollard-based engine client for Docker and Podman.
// ABOUTME: Negotiates the API version on connect and gates create requests on it.

use crate::compat::{EndpointSettings, sanitize_endpoint_settings};
use crate::runtime::traits::{
    ContainerError, ContainerInfo, ContainerOps, ContainerSpec, ImageDetails, ImageError,
    ImageOps, ImageSummary, RegistryAuth, RuntimeInfo, RuntimeInfoError, RuntimeMetadata,
};
use crate::runtime::types::{DetectedRuntime, RuntimeType};
use crate::types::{ContainerId, ImageId, ImageRef};
use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{ContainerCreateBody, EndpointIpamConfig, NetworkingConfig};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, ListImagesOptions,
    RemoveContainerOptions,
};
use futures::StreamExt;
use std::collections::HashMap;

const CONNECT_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_inspect_error(e: bollard::errors::Error, reference: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => ImageError::NotFound(reference.to_string()),
        _ => ImageError::Runtime(format!("failed to inspect {}: {}", reference, e)),
    }
}

fn map_image_pull_error(e: bollard::errors::Error, reference: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 401 | 403,
            ..
        } => ImageError::AuthenticationFailed(reference.to_string()),
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => ImageError::NotFound(reference.to_string()),
        _ => ImageError::PullFailed(format!("{}: {}", reference, e)),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Engine client over the Docker-compatible API.
///
/// Works for Docker and Podman. The API version is negotiated once in
/// [`BollardRuntime::connect`] and reused for capability gating.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
    api_version: String,
}

impl BollardRuntime {
    /// Wrap an already negotiated client.
    pub fn new(client: Docker, runtime_type: RuntimeType) -> Self {
        let version = client.client_version();
        Self {
            client,
            runtime_type,
            api_version: format!("{}.{}", version.major_version, version.minor_version),
        }
    }

    /// Connect to a detected runtime socket and negotiate the API version.
    pub async fn connect(info: &DetectedRuntime) -> Result<Self, RuntimeInfoError> {
        let client = Docker::connect_with_unix(
            &info.socket_path,
            CONNECT_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?
        .negotiate_version()
        .await
        .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;

        let runtime = Self::new(client, info.runtime_type);
        tracing::debug!(
            runtime = %runtime.runtime_type,
            api_version = %runtime.api_version,
            "negotiated engine API version"
        );
        Ok(runtime)
    }

    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }
}

fn to_bollard_endpoint(endpoint: EndpointSettings) -> bollard::models::EndpointSettings {
    let ipam_config = (!endpoint.ip_address.is_empty()).then(|| {
        if endpoint.ip_address.contains(':') {
            EndpointIpamConfig {
                ipv6_address: Some(endpoint.ip_address.clone()),
                ..Default::default()
            }
        } else {
            EndpointIpamConfig {
                ipv4_address: Some(endpoint.ip_address.clone()),
                ..Default::default()
            }
        }
    });

    bollard::models::EndpointSettings {
        aliases: (!endpoint.aliases.is_empty()).then_some(endpoint.aliases),
        mac_address: (!endpoint.mac_address.is_empty()).then_some(endpoint.mac_address),
        ipam_config,
        ..Default::default()
    }
}

#[async_trait]
impl RuntimeInfo for BollardRuntime {
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError> {
        let version = self
            .client
            .version()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;

        let name = match self.runtime_type {
            RuntimeType::Docker => "Docker".to_string(),
            RuntimeType::Podman => "Podman".to_string(),
        };

        Ok(RuntimeMetadata {
            name,
            version: version.version.unwrap_or_default(),
            max_api_version: version.api_version.unwrap_or_default(),
            api_version: self.api_version.clone(),
            os: version.os.unwrap_or_default(),
            arch: version.arch.unwrap_or_default(),
        })
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn inspect_image(&self, reference: &str) -> Result<ImageDetails, ImageError> {
        let image = self
            .client
            .inspect_image(reference)
            .await
            .map_err(|e| map_image_inspect_error(e, reference))?;

        let id = image
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ImageError::Runtime(format!("engine returned no ID for {}", reference)))?;

        Ok(ImageDetails {
            id: ImageId::new(id),
            repo_digests: image.repo_digests.unwrap_or_default(),
            repo_tags: image.repo_tags.unwrap_or_default(),
        })
    }

    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError> {
        let images = self
            .client
            .list_images(None::<ListImagesOptions>)
            .await
            .map_err(|e| ImageError::Runtime(format!("failed to list images: {}", e)))?;

        Ok(images
            .into_iter()
            .map(|image| ImageSummary {
                id: ImageId::new(image.id),
                repo_tags: image.repo_tags,
            })
            .collect())
    }

    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        let image_name = reference.to_string();

        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        let credentials = auth.map(|a| bollard::auth::DockerCredentials {
            username: a.username.clone(),
            password: a.password.clone(),
            registrytoken: a.token.clone(),
            serveraddress: a.server.clone(),
            ..Default::default()
        });

        // Progress updates must be drained for the pull to complete.
        let mut stream = self.client.create_image(Some(opts), None, credentials);
        while let Some(result) = stream.next().await {
            result.map_err(|e| map_image_pull_error(e, &image_name))?;
        }

        tracing::debug!(reference = %image_name, "pulled image");
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn create_container(&self, spec: &ContainerSpec) -> Result<ContainerId, ContainerError> {
        let env: Vec<String> = spec
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        let networking_config =
            sanitize_endpoint_settings(spec.endpoints.as_ref(), &self.api_version).map(|endpoints| {
                let endpoints_config: HashMap<String, bollard::models::EndpointSettings> = endpoints
                    .into_iter()
                    .map(|(network, endpoint)| (network, to_bollard_endpoint(endpoint)))
                    .collect();
                NetworkingConfig {
                    endpoints_config: Some(endpoints_config),
                }
            });

        let body = ContainerCreateBody {
            image: Some(spec.image.to_string()),
            env: if env.is_empty() { None } else { Some(env) },
            labels: if spec.labels.is_empty() {
                None
            } else {
                Some(spec.labels.clone())
            },
            networking_config,
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            name: Some(spec.name.clone()),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), body)
            .await
            .map_err(map_container_create_error)?;

        Ok(ContainerId::new(response.id))
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo, ContainerError> {
        let details = self
            .client
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(map_container_not_found_error)?;

        let image = details
            .config
            .as_ref()
            .and_then(|c| c.image.clone())
            .unwrap_or_default();

        Ok(ContainerInfo {
            id: ContainerId::new(details.id.unwrap_or_default()),
            name: details
                .name
                .map(|n| n.trim_start_matches('/').to_string())
                .unwrap_or_default(),
            image,
            image_id: ImageId::new(details.image.unwrap_or_default()),
        })
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_not_found_error)?;

        Ok(())
    }
}
