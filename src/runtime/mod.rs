// ABOUTME: Container engine access for Docker and Podman.
// ABOUTME: Detection, the engine traits and the bollard-backed implementation.

mod bollard;
mod detection;
mod error;
pub mod traits;
mod types;

pub use self::bollard::BollardRuntime;
pub use detection::{DetectionError, detect_local};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::*;
pub use types::{DetectedRuntime, RuntimeConfig, RuntimeType};

/// Detect the local engine and connect with a negotiated API version.
pub async fn connect_local(config: Option<&RuntimeConfig>) -> Result<BollardRuntime, RuntimeError> {
    let detected = detect_local(config)?;
    tracing::debug!(
        runtime = %detected.runtime_type,
        socket = %detected.socket_path,
        "detected container runtime"
    );
    Ok(BollardRuntime::connect(&detected).await?)
}
