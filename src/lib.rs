// ABOUTME: Library root for lookout - engine compatibility and image update detection.
// ABOUTME: The CLI binary is in main.rs.

pub mod compat;
pub mod config;
pub mod context;
pub mod error;
pub mod registry;
pub mod runtime;
pub mod types;
pub mod update;
