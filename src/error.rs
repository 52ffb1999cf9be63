// ABOUTME: Application-wide error types for lookout.
// ABOUTME: Covers config, runtime connection and CLI failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::runtime::{ContainerError, ImageError, RuntimeError, RuntimeInfoError};
use crate::types::ParseImageRefError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no images given and none configured")]
    NoImages,

    #[error(transparent)]
    ImageRef(#[from] ParseImageRefError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    RuntimeInfo(#[from] RuntimeInfoError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
