// ABOUTME: Canonical registry/repository/tag triples for image references.
// ABOUTME: Structured OCI grammar first, heuristic fallback, shared host canonicalization.

use oci_spec::distribution::Reference;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_REGISTRY: &str = "docker.io";
pub const DEFAULT_TAG: &str = "latest";
const OFFICIAL_NAMESPACE: &str = "library";

/// Alternate spellings of the public Docker Hub registry.
const DEFAULT_REGISTRY_ALIASES: &[&str] = &[
    "index.docker.io",
    "registry-1.docker.io",
    "registry.hub.docker.com",
];

/// A reference reduced to the parts that identify a tag in a registry.
///
/// The tag is never empty and normalizing twice gives the same triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedRef {
    pub registry_host: String,
    pub repository: String,
    pub tag: String,
}

impl NormalizedRef {
    /// Lower-cased `host/repository:tag`, for equality checks only.
    pub fn canonical(&self) -> String {
        format!("{}/{}:{}", self.registry_host, self.repository, self.tag).to_lowercase()
    }

    /// Whether a repo digest entry such as `ghcr.io/org/app@sha256:...` was
    /// recorded for the same registry and repository as this reference.
    pub fn same_repository(&self, other: &NormalizedRef) -> bool {
        self.registry_host.eq_ignore_ascii_case(&other.registry_host)
            && self.repository.eq_ignore_ascii_case(&other.repository)
    }
}

impl fmt::Display for NormalizedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.registry_host, self.repository, self.tag)
    }
}

/// Parse any reference string into a normalized triple. Never fails.
pub fn parse_image_ref(input: &str) -> NormalizedRef {
    let input = input.trim();
    match Reference::from_str(input) {
        Ok(reference) => {
            let tag = reference.tag().unwrap_or(DEFAULT_TAG);
            canonicalize(reference.registry(), reference.repository(), tag)
        }
        Err(e) => {
            tracing::debug!(reference = %input, error = %e, "falling back to heuristic reference parsing");
            parse_heuristic(input)
        }
    }
}

/// Canonical string form of `input`, see [`NormalizedRef::canonical`].
pub fn normalize_ref(input: &str) -> String {
    parse_image_ref(input).canonical()
}

/// Whether two references name the same registry tag.
pub fn same_image_ref(a: &str, b: &str) -> bool {
    normalize_ref(a) == normalize_ref(b)
}

fn parse_heuristic(input: &str) -> NormalizedRef {
    let without_digest = match input.split_once('@') {
        Some((before, _)) => before,
        None => input,
    };

    // A colon only introduces a tag when it follows the last slash; otherwise
    // it belongs to a registry port.
    let last_slash = without_digest.rfind('/');
    let (name, tag) = match without_digest.rfind(':') {
        Some(colon) if last_slash.is_none_or(|slash| colon > slash) => (
            &without_digest[..colon],
            &without_digest[colon + 1..],
        ),
        _ => (without_digest, ""),
    };
    let tag = if tag.is_empty() { DEFAULT_TAG } else { tag };

    let (host, repository) = match name.split_once('/') {
        Some((first, rest)) if looks_like_registry(first) => (first, rest),
        _ => ("", name),
    };

    canonicalize(host, repository, tag)
}

fn looks_like_registry(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}

/// Map registry aliases to one host and apply the official-image namespace.
///
/// Both parse paths end here so alias handling cannot diverge between them.
fn canonicalize(host: &str, repository: &str, tag: &str) -> NormalizedRef {
    let host = if host.is_empty()
        || host.eq_ignore_ascii_case(DEFAULT_REGISTRY)
        || DEFAULT_REGISTRY_ALIASES
            .iter()
            .any(|alias| host.eq_ignore_ascii_case(alias))
    {
        DEFAULT_REGISTRY.to_string()
    } else {
        host.to_string()
    };

    let repository = if host == DEFAULT_REGISTRY && !repository.contains('/') {
        format!("{}/{}", OFFICIAL_NAMESPACE, repository)
    } else {
        repository.to_string()
    };

    NormalizedRef {
        registry_host: host,
        repository,
        tag: tag.to_string(),
    }
}
