// ABOUTME: Phantom-typed engine identifiers.
// ABOUTME: Keeps image IDs and container IDs from being swapped at compile time.

use serde::{Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

pub enum ContainerMarker {}
pub enum ImageMarker {}

/// An engine-assigned identifier tagged with the kind of object it names.
#[must_use = "IDs reference engine objects and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }

    /// First 12 hex characters, without the algorithm prefix.
    pub fn short(&self) -> &str {
        let hex = self
            .value
            .split_once(':')
            .map(|(_, hex)| hex)
            .unwrap_or(&self.value);
        hex.get(..12).unwrap_or(hex)
    }
}

// T is only a marker, so these impls must not require T: Trait.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Id").field(&self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

pub type ContainerId = Id<ContainerMarker>;
pub type ImageId = Id<ImageMarker>;
