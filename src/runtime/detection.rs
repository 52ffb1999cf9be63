// ABOUTME: Local container runtime detection.
// ABOUTME: Honors config and DOCKER_HOST, then checks Podman sockets before Docker.

use super::types::{DetectedRuntime, RuntimeConfig, RuntimeType};
use std::path::Path;

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked Podman and Docker sockets)")]
    NoRuntimeFound,

    #[error("configured socket does not exist: {0}")]
    SocketMissing(String),

    #[error("unsupported DOCKER_HOST (only unix:// is supported): {0}")]
    UnsupportedHost(String),
}

/// Detect the container runtime on this machine.
///
/// Resolution order:
/// 1. Explicit `runtime`/`socket` from config
/// 2. `DOCKER_HOST=unix://...`
/// 3. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 4. Rootful Podman socket (`/run/podman/podman.sock`)
/// 5. Docker socket (`/var/run/docker.sock`)
pub fn detect_local(config: Option<&RuntimeConfig>) -> Result<DetectedRuntime, DetectionError> {
    if let Some(cfg) = config
        && (cfg.runtime.is_some() || cfg.socket.is_some())
    {
        let socket_path = cfg.socket.clone().unwrap_or_else(|| {
            default_socket_path(cfg.runtime.unwrap_or(RuntimeType::Docker))
        });
        if !Path::new(&socket_path).exists() {
            return Err(DetectionError::SocketMissing(socket_path));
        }
        let runtime_type = cfg
            .runtime
            .unwrap_or_else(|| runtime_type_for_socket(&socket_path));
        return Ok(DetectedRuntime {
            runtime_type,
            socket_path,
        });
    }

    if let Ok(host) = std::env::var("DOCKER_HOST")
        && !host.is_empty()
    {
        let socket_path = host
            .strip_prefix("unix://")
            .ok_or_else(|| DetectionError::UnsupportedHost(host.clone()))?;
        return Ok(DetectedRuntime {
            runtime_type: runtime_type_for_socket(socket_path),
            socket_path: socket_path.to_string(),
        });
    }

    if let Some(uid) = get_uid() {
        let rootless_socket = format!("/run/user/{}/podman/podman.sock", uid);
        if Path::new(&rootless_socket).exists() {
            return Ok(DetectedRuntime {
                runtime_type: RuntimeType::Podman,
                socket_path: rootless_socket,
            });
        }
    }

    if Path::new(ROOTFUL_PODMAN).exists() {
        return Ok(DetectedRuntime {
            runtime_type: RuntimeType::Podman,
            socket_path: ROOTFUL_PODMAN.to_string(),
        });
    }

    if Path::new(DOCKER_SOCKET).exists() {
        return Ok(DetectedRuntime {
            runtime_type: RuntimeType::Docker,
            socket_path: DOCKER_SOCKET.to_string(),
        });
    }

    Err(DetectionError::NoRuntimeFound)
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}

fn runtime_type_for_socket(path: &str) -> RuntimeType {
    if path.contains("podman") {
        RuntimeType::Podman
    } else {
        RuntimeType::Docker
    }
}

fn default_socket_path(runtime: RuntimeType) -> String {
    match runtime {
        RuntimeType::Docker => DOCKER_SOCKET.to_string(),
        RuntimeType::Podman => ROOTFUL_PODMAN.to_string(),
    }
}
