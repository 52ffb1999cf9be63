// ABOUTME: Remote digest lookup against OCI distribution registries.
// ABOUTME: One manifest HEAD request per check, never a blob download.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use std::time::Duration;
use tracing::debug;

use crate::types::DEFAULT_REGISTRY;

/// Host that actually serves the Docker Hub distribution API.
const DOCKER_HUB_API_HOST: &str = "registry-1.docker.io";
const DIGEST_HEADER: &str = "Docker-Content-Digest";

/// Manifest media types, index types first so multi-arch tags resolve to the
/// same digest the engine records in `RepoDigests`.
const MANIFEST_ACCEPT: &str = "application/vnd.oci.image.index.v1+json, \
     application/vnd.docker.distribution.manifest.list.v2+json, \
     application/vnd.oci.image.manifest.v1+json, \
     application/vnd.docker.distribution.manifest.v2+json";

/// Query for the digest a registry currently serves for a tag.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn latest_digest(
        &self,
        registry_host: &str,
        repository: &str,
        tag: &str,
        auth_token: Option<&str>,
    ) -> Result<String, RegistryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry rejected credentials for {0}")]
    Unauthorized(String),

    #[error("manifest not found: {0}")]
    ManifestNotFound(String),

    #[error("registry returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("registry response for {0} has no usable digest header")]
    MissingDigest(String),

    #[error("invalid authorization token")]
    InvalidToken,

    #[error("registry request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// [`RegistryClient`] speaking the distribution API over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: reqwest::Client,
    insecure: Vec<String>,
}

impl HttpRegistry {
    /// `insecure` lists registry hosts reached over plain HTTP.
    pub fn new(timeout: Duration, insecure: Vec<String>) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lookout/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, insecure })
    }

    fn manifest_url(&self, registry_host: &str, repository: &str, tag: &str) -> String {
        let host = if registry_host == DEFAULT_REGISTRY {
            DOCKER_HUB_API_HOST
        } else {
            registry_host
        };
        let scheme = if self
            .insecure
            .iter()
            .any(|h| h.eq_ignore_ascii_case(registry_host))
        {
            "http"
        } else {
            "https"
        };
        format!("{}://{}/v2/{}/manifests/{}", scheme, host, repository, tag)
    }
}

#[async_trait]
impl RegistryClient for HttpRegistry {
    async fn latest_digest(
        &self,
        registry_host: &str,
        repository: &str,
        tag: &str,
        auth_token: Option<&str>,
    ) -> Result<String, RegistryError> {
        let url = self.manifest_url(registry_host, repository, tag);
        debug!(url = %url, "querying registry for manifest digest");

        let mut request = self
            .client
            .head(&url)
            .header(ACCEPT, HeaderValue::from_static(MANIFEST_ACCEPT));
        if let Some(token) = auth_token.filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RegistryError::InvalidToken)?;
            request = request.header(AUTHORIZATION, value);
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(RegistryError::Unauthorized(registry_host.to_string()));
            }
            StatusCode::NOT_FOUND => {
                return Err(RegistryError::ManifestNotFound(format!(
                    "{}/{}:{}",
                    registry_host, repository, tag
                )));
            }
            status => {
                return Err(RegistryError::Status {
                    status: status.as_u16(),
                    url,
                });
            }
        }

        response
            .headers()
            .get(DIGEST_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|d| d.contains(':'))
            .map(str::to_string)
            .ok_or(RegistryError::MissingDigest(url))
    }
}
