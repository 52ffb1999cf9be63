// ABOUTME: Decides whether a local image is behind its registry tag.
// ABOUTME: Compares local repo digests to a remote manifest digest, or IDs after a pull.

use crate::context::{CheckContext, Interrupted};
use crate::registry::{RegistryClient, RegistryError};
use crate::runtime::{ImageDetails, ImageError, ImageOps};
use crate::types::{ImageId, NormalizedRef, parse_image_ref};
use tracing::{debug, warn};

/// Why a check did not reach a definitive answer.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The image is not present locally, so an update is needed.
    #[error("local image {reference} not found: {source}")]
    LocalImageNotFound {
        reference: String,
        #[source]
        source: ImageError,
    },

    /// The registry could not be asked; fall back to a pull-based comparison.
    #[error("remote digest lookup for {reference} failed: {source}")]
    RemoteLookupFailed {
        reference: String,
        #[source]
        source: RegistryError,
    },

    #[error("check cancelled")]
    Cancelled,

    #[error("check deadline exceeded")]
    DeadlineExceeded,
}

impl From<Interrupted> for CheckError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::Cancelled => CheckError::Cancelled,
            Interrupted::DeadlineExceeded => CheckError::DeadlineExceeded,
        }
    }
}

/// Outcome of one update check. Built fresh per call and never cached.
#[derive(Debug)]
pub struct CheckResult {
    pub needs_update: bool,
    pub local_digest: String,
    pub remote_digest: String,
    pub error: Option<CheckError>,
    /// True only when `remote_digest` came from a registry query.
    pub checked_via_api: bool,
}

impl CheckResult {
    fn local_missing(reference: &NormalizedRef, source: ImageError) -> Self {
        Self {
            needs_update: true,
            local_digest: String::new(),
            remote_digest: String::new(),
            error: Some(CheckError::LocalImageNotFound {
                reference: reference.to_string(),
                source,
            }),
            checked_via_api: false,
        }
    }

    fn interrupted(local_digest: String, err: Interrupted) -> Self {
        Self {
            needs_update: false,
            local_digest,
            remote_digest: String::new(),
            error: Some(err.into()),
            checked_via_api: false,
        }
    }

    /// Whether the caller should pull and use [`UpdateChecker::compare_with_pulled`].
    pub fn should_fall_back_to_pull(&self) -> bool {
        matches!(self.error, Some(CheckError::RemoteLookupFailed { .. }))
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match (&self.error, self.needs_update) {
            (Some(CheckError::LocalImageNotFound { .. }), _) => {
                "update needed: image not present locally".to_string()
            }
            (Some(err), _) => format!("undetermined: {}", err),
            (None, true) => format!(
                "update available: {} -> {}",
                self.local_digest, self.remote_digest
            ),
            (None, false) => format!("up to date: {}", self.local_digest),
        }
    }
}

/// Update detection over borrowed engine and registry clients.
pub struct UpdateChecker<'a, I: ?Sized, R: ?Sized> {
    images: &'a I,
    registry: &'a R,
}

impl<'a, I, R> UpdateChecker<'a, I, R>
where
    I: ImageOps + ?Sized,
    R: RegistryClient + ?Sized,
{
    pub fn new(images: &'a I, registry: &'a R) -> Self {
        Self { images, registry }
    }

    /// Compare the local image for `reference` with the digest its registry
    /// serves now, without pulling.
    pub async fn check_image_needs_update(
        &self,
        ctx: &CheckContext,
        reference: &str,
        auth_token: Option<&str>,
    ) -> CheckResult {
        let normalized = parse_image_ref(reference);

        let details = match ctx.run(self.images.inspect_image(reference)).await {
            Ok(Ok(details)) => details,
            Ok(Err(e)) => {
                debug!(reference = %normalized, error = %e, "local image lookup failed");
                return CheckResult::local_missing(&normalized, e);
            }
            Err(interrupted) => return CheckResult::interrupted(String::new(), interrupted),
        };
        let local_digest = local_digest_for(&details, &normalized);

        let lookup = self.registry.latest_digest(
            &normalized.registry_host,
            &normalized.repository,
            &normalized.tag,
            auth_token,
        );
        let remote_digest = match ctx.run(lookup).await {
            Ok(Ok(digest)) => digest,
            Ok(Err(e)) => {
                warn!(reference = %normalized, error = %e, "remote digest lookup failed");
                return CheckResult {
                    needs_update: false,
                    local_digest,
                    remote_digest: String::new(),
                    error: Some(CheckError::RemoteLookupFailed {
                        reference: normalized.to_string(),
                        source: e,
                    }),
                    checked_via_api: false,
                };
            }
            Err(interrupted) => return CheckResult::interrupted(local_digest, interrupted),
        };

        let needs_update = local_digest != remote_digest;
        debug!(
            reference = %normalized,
            local = %local_digest,
            remote = %remote_digest,
            needs_update,
            "compared digests"
        );
        CheckResult {
            needs_update,
            local_digest,
            remote_digest,
            error: None,
            checked_via_api: true,
        }
    }

    /// After the caller pulled `pulled_reference`, report whether it differs
    /// from the image the container is running.
    pub async fn compare_with_pulled(
        &self,
        ctx: &CheckContext,
        running_image_id: &ImageId,
        pulled_reference: &str,
    ) -> CheckResult {
        match ctx.run(self.images.inspect_image(pulled_reference)).await {
            Ok(Ok(pulled)) => CheckResult {
                needs_update: pulled.id != *running_image_id,
                local_digest: running_image_id.to_string(),
                remote_digest: pulled.id.into_inner(),
                error: None,
                checked_via_api: false,
            },
            Ok(Err(e)) => CheckResult::local_missing(&parse_image_ref(pulled_reference), e),
            Err(interrupted) => {
                CheckResult::interrupted(running_image_id.to_string(), interrupted)
            }
        }
    }

    /// All local image IDs that `reference` resolves to.
    ///
    /// Tries a direct inspect, then matches every local tag by normalized
    /// form. Failures yield an empty list.
    pub async fn image_ids_for_ref(&self, ctx: &CheckContext, reference: &str) -> Vec<ImageId> {
        match ctx.run(self.images.inspect_image(reference)).await {
            Ok(Ok(details)) => return vec![details.id],
            Ok(Err(e)) => {
                debug!(reference, error = %e, "direct inspect failed, scanning local images");
            }
            Err(interrupted) => {
                debug!(reference, error = %interrupted, "image lookup interrupted");
                return Vec::new();
            }
        }

        let images = match ctx.run(self.images.list_images()).await {
            Ok(Ok(images)) => images,
            Ok(Err(e)) => {
                warn!(reference, error = %e, "failed to list local images");
                return Vec::new();
            }
            Err(interrupted) => {
                debug!(reference, error = %interrupted, "image listing interrupted");
                return Vec::new();
            }
        };

        let wanted = parse_image_ref(reference).canonical();
        let mut ids: Vec<ImageId> = Vec::new();
        for image in images {
            let matches = image
                .repo_tags
                .iter()
                .any(|tag| parse_image_ref(tag).canonical() == wanted);
            if matches && !ids.contains(&image.id) {
                ids.push(image.id);
            }
        }
        ids
    }
}

/// Repo digest recorded for the same registry and repository, else the image ID.
fn local_digest_for(details: &ImageDetails, reference: &NormalizedRef) -> String {
    let recorded = details.repo_digests.iter().find_map(|entry| {
        let (name, digest) = entry.split_once('@')?;
        parse_image_ref(name)
            .same_repository(reference)
            .then(|| digest.to_string())
    });

    match recorded {
        Some(digest) => {
            debug!(reference = %reference, digest = %digest, "using recorded repo digest");
            digest
        }
        None => {
            debug!(reference = %reference, id = %details.id, "no repo digest for repository, using image ID");
            details.id.to_string()
        }
    }
}
