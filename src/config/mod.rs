// ABOUTME: Configuration types and parsing for lookout.yml.
// ABOUTME: Runtime override, registry settings and the default image list.

mod deserialize;
mod env_value;
mod init;

pub use env_value::EnvValue;
pub use init::init_config;

use crate::error::{Error, Result};
use crate::registry::HttpRegistry;
use crate::runtime::{RuntimeConfig, RuntimeType};
use crate::types::{DEFAULT_REGISTRY, ImageRef, parse_image_ref};
use deserialize::deserialize_image_refs;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "lookout.yml";
pub const CONFIG_FILENAME_ALT: &str = "lookout.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".lookout/config.yml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, deserialize_with = "deserialize_image_refs")]
    pub images: Vec<ImageRef>,

    #[serde(default)]
    pub runtime: Option<RuntimeType>,

    #[serde(default)]
    pub socket: Option<String>,

    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default)]
    pub insecure: Vec<String>,

    /// Bearer tokens keyed by registry host.
    #[serde(default)]
    pub tokens: HashMap<String, EnvValue>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            timeout: default_registry_timeout(),
            insecure: Vec::new(),
            tokens: HashMap::new(),
        }
    }
}

fn default_registry_timeout() -> Duration {
    Duration::from_secs(10)
}

impl RegistryConfig {
    /// Token for `registry_host`, matching configured hosts by their
    /// canonical spelling so `index.docker.io` finds a `docker.io` entry.
    pub fn token_for(&self, registry_host: &str) -> Result<Option<String>> {
        let wanted = canonical_host(registry_host);
        self.tokens
            .iter()
            .find(|(host, _)| canonical_host(host) == wanted)
            .map(|(_, value)| value.resolve())
            .transpose()
    }

    pub fn client(&self) -> Result<HttpRegistry> {
        let insecure = self.insecure.iter().map(|h| canonical_host(h)).collect();
        HttpRegistry::new(self.timeout, insecure)
            .map_err(|e| Error::InvalidConfig(format!("registry client: {}", e)))
    }
}

fn canonical_host(host: &str) -> String {
    if host.is_empty() {
        return DEFAULT_REGISTRY.to_string();
    }
    parse_image_ref(&format!("{}/probe", host)).registry_host
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like [`Config::discover`], but a missing file yields the defaults.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            runtime: self.runtime,
            socket: self.socket.clone(),
        }
    }
}
