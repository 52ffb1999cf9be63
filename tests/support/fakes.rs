// ABOUTME: In-memory ImageOps and RegistryClient implementations.
// ABOUTME: Record calls so tests can assert which network paths were taken.

use async_trait::async_trait;
use lookout::registry::{RegistryClient, RegistryError};
use lookout::runtime::{ImageDetails, ImageError, ImageOps, ImageSummary, RegistryAuth};
use lookout::types::{ImageId, ImageRef};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Local images keyed by the exact string `inspect_image` is called with.
#[derive(Default)]
pub struct FakeImages {
    pub by_ref: HashMap<String, ImageDetails>,
    pub listed: Vec<ImageSummary>,
    pub fail_list: bool,
    /// Never resolve inspect calls.
    pub hang: bool,
    pub inspect_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl FakeImages {
    pub fn with_image(mut self, reference: &str, id: &str, repo_digests: &[&str]) -> Self {
        self.by_ref.insert(
            reference.to_string(),
            ImageDetails {
                id: ImageId::new(id),
                repo_digests: repo_digests.iter().map(|s| s.to_string()).collect(),
                repo_tags: vec![reference.to_string()],
            },
        );
        self
    }

    pub fn with_listed(mut self, id: &str, repo_tags: &[&str]) -> Self {
        self.listed.push(ImageSummary {
            id: ImageId::new(id),
            repo_tags: repo_tags.iter().map(|s| s.to_string()).collect(),
        });
        self
    }
}

#[async_trait]
impl ImageOps for FakeImages {
    async fn inspect_image(&self, reference: &str) -> Result<ImageDetails, ImageError> {
        self.inspect_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.by_ref
            .get(reference)
            .cloned()
            .ok_or_else(|| ImageError::NotFound(reference.to_string()))
    }

    async fn list_images(&self) -> Result<Vec<ImageSummary>, ImageError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(ImageError::Runtime("engine unavailable".to_string()));
        }
        Ok(self.listed.clone())
    }

    async fn pull_image(
        &self,
        reference: &ImageRef,
        _auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        Err(ImageError::PullFailed(reference.to_string()))
    }
}

/// Registry answering from a fixed table of `host/repo:tag` → digest.
#[derive(Default)]
pub struct FakeRegistry {
    pub digests: HashMap<String, String>,
    pub unauthorized: bool,
    pub hang: bool,
    pub calls: Mutex<Vec<(String, String, String, Option<String>)>>,
}

impl FakeRegistry {
    pub fn with_digest(mut self, key: &str, digest: &str) -> Self {
        self.digests.insert(key.to_string(), digest.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RegistryClient for FakeRegistry {
    async fn latest_digest(
        &self,
        registry_host: &str,
        repository: &str,
        tag: &str,
        auth_token: Option<&str>,
    ) -> Result<String, RegistryError> {
        self.calls.lock().unwrap().push((
            registry_host.to_string(),
            repository.to_string(),
            tag.to_string(),
            auth_token.map(str::to_string),
        ));
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.unauthorized {
            return Err(RegistryError::Unauthorized(registry_host.to_string()));
        }
        let key = format!("{}/{}:{}", registry_host, repository, tag);
        self.digests
            .get(&key)
            .cloned()
            .ok_or(RegistryError::ManifestNotFound(key))
    }
}
