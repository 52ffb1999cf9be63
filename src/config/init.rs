// ABOUTME: Config scaffolding.
// ABOUTME: Writes a commented lookout.yml template.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ImageRef;

use super::CONFIG_FILENAME;

const TEMPLATE: &str = r#"# Images checked by `lookout check` when no image is given.
images:
{images}
# Uncomment to skip socket detection.
# runtime: podman
# socket: /run/podman/podman.sock

registry:
  timeout: 10s
  # Registries reached over plain HTTP.
  insecure: []
  # Bearer tokens per registry host, literal or from the environment.
  # tokens:
  #   ghcr.io:
  #     env: GHCR_TOKEN
"#;

pub fn init_config(dir: &Path, images: &[String], force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let images = if images.is_empty() {
        vec!["nginx:latest".to_string()]
    } else {
        images.to_vec()
    };
    for image in &images {
        ImageRef::parse(image).map_err(|e| Error::InvalidConfig(format!("{}: {}", image, e)))?;
    }

    let list: Vec<String> = images.iter().map(|i| format!("  - {}", i)).collect();
    let yaml = TEMPLATE.replace("{images}", &list.join("\n"));
    std::fs::write(&config_path, yaml)?;

    Ok(())
}
