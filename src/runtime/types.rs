// ABOUTME: Runtime type definitions for Docker and Podman.
// ABOUTME: Includes RuntimeType enum, detected socket info and the config override.

use serde::{Deserialize, Serialize};

/// The container engine flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeType {
    Docker,
    Podman,
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeType::Docker => write!(f, "docker"),
            RuntimeType::Podman => write!(f, "podman"),
        }
    }
}

/// Detected runtime socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedRuntime {
    pub runtime_type: RuntimeType,
    pub socket_path: String,
}

/// Explicit runtime override from config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    /// Explicit runtime type (overrides auto-detection).
    pub runtime: Option<RuntimeType>,
    /// Explicit socket path (overrides default).
    pub socket: Option<String>,
}
