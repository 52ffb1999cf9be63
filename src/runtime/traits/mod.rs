// ABOUTME: Narrow engine client traits consumed by the update checker and CLI.
// ABOUTME: Defines ImageOps, ContainerOps and RuntimeInfo plus their shared types.

mod container;
mod image;
mod runtime_info;
mod shared_types;

pub use container::{ContainerError, ContainerOps};
pub use image::{ImageError, ImageOps};
pub use runtime_info::{RuntimeInfo, RuntimeInfoError};
pub use shared_types::*;
