// ABOUTME: Engine API version comparison and capability gating.
// ABOUTME: Drops container-create fields the negotiated API version cannot accept.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Minimum engine API version that accepts a MAC address per network endpoint.
///
/// Older engines only know the container-wide `MacAddress` and reject the
/// per-endpoint field.
pub const MIN_API_VERSION_ENDPOINT_MAC_ADDRESS: &str = "1.44";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid API version string: {0:?}")]
pub struct InvalidVersionString(pub String);

/// A dotted numeric API version such as `1.44` or `v1.41.2`.
///
/// Missing trailing components compare as zero, so `1.44 == 1.44.0`.
#[derive(Debug, Clone)]
pub struct ApiVersion {
    components: Vec<u64>,
}

impl ApiVersion {
    pub fn parse(input: &str) -> Result<Self, InvalidVersionString> {
        let trimmed = input.trim();
        let stripped = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if stripped.is_empty() {
            return Err(InvalidVersionString(input.to_string()));
        }

        let components = stripped
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| InvalidVersionString(input.to_string()))?;

        Ok(Self { components })
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for ApiVersion {
    type Err = InvalidVersionString;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for ApiVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ApiVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ApiVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ApiVersion {}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Returns true when `current >= minimum`.
///
/// Either side failing to parse yields `false`.
pub fn is_api_version_at_least(current: &str, minimum: &str) -> bool {
    match (ApiVersion::parse(current), ApiVersion::parse(minimum)) {
        (Ok(current), Ok(minimum)) => current >= minimum,
        _ => {
            tracing::debug!(current, minimum, "API version comparison failed closed");
            false
        }
    }
}

/// Container-create features that depend on the negotiated API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// `MacAddress` inside a per-network `EndpointSettings`.
    EndpointMacAddress,
}

impl Feature {
    pub const ALL: &'static [Feature] = &[Feature::EndpointMacAddress];

    pub fn min_api_version(self) -> &'static str {
        match self {
            Feature::EndpointMacAddress => MIN_API_VERSION_ENDPOINT_MAC_ADDRESS,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::EndpointMacAddress => write!(f, "endpoint-mac-address"),
        }
    }
}

pub fn supports_feature(feature: Feature, api_version: &str) -> bool {
    is_api_version_at_least(api_version, feature.min_api_version())
}

pub fn supports_endpoint_mac_address(api_version: &str) -> bool {
    supports_feature(Feature::EndpointMacAddress, api_version)
}

/// Per-network settings requested at container creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSettings {
    pub mac_address: String,
    pub ip_address: String,
    pub aliases: Vec<String>,
}

/// Network name to endpoint settings.
pub type EndpointSettingsMap = HashMap<String, EndpointSettings>;

/// Copy `settings`, clearing fields the engine at `api_version` cannot accept.
///
/// Returns `None` for absent or empty input. The caller's map is only
/// borrowed, so it can be reused against engines with other versions.
pub fn sanitize_endpoint_settings(
    settings: Option<&EndpointSettingsMap>,
    api_version: &str,
) -> Option<EndpointSettingsMap> {
    let settings = settings.filter(|s| !s.is_empty())?;
    let mac_supported = supports_endpoint_mac_address(api_version);

    let sanitized = settings
        .iter()
        .map(|(network, endpoint)| {
            let mut copy = endpoint.clone();
            if !mac_supported && !copy.mac_address.is_empty() {
                tracing::debug!(
                    network = %network,
                    api_version = %api_version,
                    "dropping endpoint MAC address unsupported by engine"
                );
                copy.mac_address.clear();
            }
            (network.clone(), copy)
        })
        .collect();

    Some(sanitized)
}
