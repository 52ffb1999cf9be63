// ABOUTME: Identifiers and image reference types.
// ABOUTME: Validated references for engine calls, normalized triples for comparison.

mod id;
mod image_ref;
mod normalize;

pub use id::{ContainerId, ImageId};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use normalize::{
    DEFAULT_REGISTRY, DEFAULT_TAG, NormalizedRef, normalize_ref, parse_image_ref, same_image_ref,
};
