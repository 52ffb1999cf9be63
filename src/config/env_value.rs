// ABOUTME: Config values that are either literals or environment variable references.
// ABOUTME: Keeps registry tokens out of the config file itself.

use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) => Ok(val),
                Err(_) => default
                    .clone()
                    .ok_or_else(|| Error::MissingEnvVar(var.clone())),
            },
        }
    }
}
