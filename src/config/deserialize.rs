// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates image references while the config is parsed.

use serde::Deserialize;

use crate::types::ImageRef;

pub fn deserialize_image_refs<'de, D>(deserializer: D) -> Result<Vec<ImageRef>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<String> = Vec::deserialize(deserializer)?;
    values
        .iter()
        .map(|s| ImageRef::parse(s).map_err(|e| format!("{}: {}", s, e)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}
