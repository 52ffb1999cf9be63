// ABOUTME: Runtime error types with SNAFU pattern.
// ABOUTME: Unifies detection and connection errors for programmatic handling.

use snafu::Snafu;

use super::detection::DetectionError;
use super::traits::RuntimeInfoError;

/// Unified runtime error for detection and connection failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RuntimeError {
    #[snafu(display("runtime detection failed: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("runtime connection failed: {source}"))]
    Connection { source: RuntimeInfoError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// No container runtime found on the system.
    NoRuntimeFound,
    /// Configured socket or DOCKER_HOST is unusable.
    BadSocket,
    /// Failed to connect to runtime socket.
    ConnectionFailed,
    /// Runtime operation error.
    RuntimeOperation,
}

impl RuntimeError {
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            RuntimeError::Detection { source } => match source {
                DetectionError::NoRuntimeFound => RuntimeErrorKind::NoRuntimeFound,
                DetectionError::SocketMissing(_) | DetectionError::UnsupportedHost(_) => {
                    RuntimeErrorKind::BadSocket
                }
            },
            RuntimeError::Connection { source } => match source {
                RuntimeInfoError::ConnectionFailed(_) => RuntimeErrorKind::ConnectionFailed,
                RuntimeInfoError::Runtime(_) => RuntimeErrorKind::RuntimeOperation,
            },
        }
    }
}

impl From<DetectionError> for RuntimeError {
    fn from(source: DetectionError) -> Self {
        RuntimeError::Detection { source }
    }
}

impl From<RuntimeInfoError> for RuntimeError {
    fn from(source: RuntimeInfoError) -> Self {
        RuntimeError::Connection { source }
    }
}
