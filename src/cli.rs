// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lookout")]
#[command(about = "Image update detection and API compatibility checks for Docker and Podman")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether images have newer versions in their registries
    Check {
        /// Image references (defaults to the images in lookout.yml)
        images: Vec<String>,

        /// Check the image backing this container instead
        #[arg(short, long, conflicts_with = "images")]
        container: Option<String>,

        /// Pull and compare image IDs when the registry cannot be queried
        #[arg(long)]
        pull: bool,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// Print one JSON object per image
        #[arg(long)]
        json: bool,
    },

    /// List local image IDs matching a reference
    ImageIds {
        /// Image reference
        image: String,
    },

    /// Show the negotiated API version and which gated features it supports
    Compat {
        /// Evaluate this API version instead of connecting to the engine
        #[arg(long)]
        api_version: Option<String>,
    },

    /// Write a lookout.yml template
    Init {
        /// Images to list in the template
        images: Vec<String>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}
