// ABOUTME: Validated image reference handed to the container engine.
// ABOUTME: Keeps the caller's spelling for engine calls and the normalized triple for comparisons.

use super::normalize::{NormalizedRef, parse_image_ref};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),
}

/// An image reference the engine can be asked about.
///
/// Unlike [`parse_image_ref`], construction validates the input; use this for
/// strings that come from users or config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    raw: String,
    normalized: NormalizedRef,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        if let Some(c) = input.chars().find(|c| {
            !c.is_ascii_alphanumeric() && !matches!(c, '/' | ':' | '.' | '-' | '_' | '@')
        }) {
            return Err(ParseImageRefError::InvalidChar(c));
        }

        let (name, digest) = match input.split_once('@') {
            Some((name, digest)) => (name, Some(digest)),
            None => (input, None),
        };

        if name.is_empty()
            || name.starts_with('/')
            || name.ends_with('/')
            || name.ends_with(':')
            || name.contains("//")
        {
            return Err(ParseImageRefError::InvalidFormat(input.to_string()));
        }
        if digest.is_some_and(|d| !d.contains(':') || d.contains('@')) {
            return Err(ParseImageRefError::InvalidFormat(input.to_string()));
        }

        Ok(Self {
            raw: input.to_string(),
            normalized: parse_image_ref(input),
            digest: digest.map(str::to_string),
        })
    }

    /// The reference as written, which is what the engine is asked for.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &NormalizedRef {
        &self.normalized
    }

    pub fn registry(&self) -> &str {
        &self.normalized.registry_host
    }

    pub fn repository(&self) -> &str {
        &self.normalized.repository
    }

    pub fn tag(&self) -> &str {
        &self.normalized.tag
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
