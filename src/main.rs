// ABOUTME: Entry point for the lookout CLI application.
// ABOUTME: Parses arguments and dispatches to the check, image-ids, compat and init handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use lookout::compat::{ApiVersion, Feature, supports_feature};
use lookout::config::{self, Config};
use lookout::context::CheckContext;
use lookout::error::{Error, Result};
use lookout::registry::HttpRegistry;
use lookout::runtime::{
    BollardRuntime, ContainerOps, ImageOps, RegistryAuth, RuntimeInfo, connect_local,
};
use lookout::types::{ImageId, ImageRef, parse_image_ref};
use lookout::update::{CheckResult, UpdateChecker};
use serde::Serialize;
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check {
            images,
            container,
            pull,
            timeout,
            json,
        } => {
            let config = Config::discover_or_default(&env::current_dir()?)?;
            let opts = CheckOptions {
                pull,
                json,
                timeout: Duration::from_secs(timeout),
            };
            check(&config, images, container, &opts).await
        }
        Commands::ImageIds { image } => {
            let config = Config::discover_or_default(&env::current_dir()?)?;
            image_ids(&config, &image).await
        }
        Commands::Compat { api_version } => match api_version {
            Some(version) => {
                print_feature_support(&version);
                Ok(())
            }
            None => {
                let config = Config::discover_or_default(&env::current_dir()?)?;
                compat(&config).await
            }
        },
        Commands::Init { images, force } => {
            config::init_config(&env::current_dir()?, &images, force)?;
            println!("Wrote {}", config::CONFIG_FILENAME);
            Ok(())
        }
    }
}

struct CheckOptions {
    pull: bool,
    json: bool,
    timeout: Duration,
}

/// One line of `check --json` output.
#[derive(Serialize)]
struct CheckReport<'a> {
    reference: &'a str,
    needs_update: bool,
    local_digest: &'a str,
    remote_digest: &'a str,
    checked_via_api: bool,
    pulled: bool,
    error: Option<String>,
}

async fn check(
    config: &Config,
    images: Vec<String>,
    container: Option<String>,
    opts: &CheckOptions,
) -> Result<()> {
    let runtime = connect_local(Some(&config.runtime_config())).await?;
    let registry = config.registry.client()?;

    let ctx = CheckContext::new().with_timeout(opts.timeout);
    let token = ctx.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    // (reference, image ID the container runs)
    let targets: Vec<(String, Option<ImageId>)> = if let Some(name) = container {
        let info = runtime.inspect_container(&name).await?;
        vec![(info.image, Some(info.image_id))]
    } else if !images.is_empty() {
        images.into_iter().map(|i| (i, None)).collect()
    } else if !config.images.is_empty() {
        config
            .images
            .iter()
            .map(|i| (i.to_string(), None))
            .collect()
    } else {
        return Err(Error::NoImages);
    };

    for (reference, running_id) in targets {
        let host = parse_image_ref(&reference).registry_host;
        let auth_token = config.registry.token_for(&host)?;

        let (result, pulled) = check_one(
            &runtime,
            &registry,
            &ctx,
            &reference,
            running_id,
            auth_token.as_deref(),
            opts.pull,
        )
        .await?;

        if opts.json {
            let report = CheckReport {
                reference: &reference,
                needs_update: result.needs_update,
                local_digest: &result.local_digest,
                remote_digest: &result.remote_digest,
                checked_via_api: result.checked_via_api,
                pulled,
                error: result.error.as_ref().map(ToString::to_string),
            };
            let line = serde_json::to_string(&report)
                .map_err(|e| Error::InvalidConfig(format!("JSON output: {}", e)))?;
            println!("{line}");
        } else {
            let via = if result.checked_via_api {
                " (registry API)"
            } else if pulled {
                " (pulled)"
            } else {
                ""
            };
            println!("{}: {}{}", reference, result.summary(), via);
        }
    }

    Ok(())
}

/// Check one reference, pulling only when asked and the registry failed.
async fn check_one(
    runtime: &BollardRuntime,
    registry: &HttpRegistry,
    ctx: &CheckContext,
    reference: &str,
    running_id: Option<ImageId>,
    auth_token: Option<&str>,
    allow_pull: bool,
) -> Result<(CheckResult, bool)> {
    let checker = UpdateChecker::new(runtime, registry);
    let result = checker
        .check_image_needs_update(ctx, reference, auth_token)
        .await;

    if !(allow_pull && result.should_fall_back_to_pull()) {
        return Ok((result, false));
    }

    let running_id = match running_id {
        Some(id) => id,
        None => match checker.image_ids_for_ref(ctx, reference).await.into_iter().next() {
            Some(id) => id,
            None => return Ok((result, false)),
        },
    };

    let image = ImageRef::parse(reference)?;
    let auth = auth_token.map(|t| RegistryAuth::token(t, Some(image.registry().to_string())));
    tracing::debug!(reference, "registry lookup failed, pulling to compare");
    runtime.pull_image(&image, auth.as_ref()).await?;

    let result = checker
        .compare_with_pulled(ctx, &running_id, reference)
        .await;
    Ok((result, true))
}

async fn image_ids(config: &Config, image: &str) -> Result<()> {
    let runtime = connect_local(Some(&config.runtime_config())).await?;
    let registry = config.registry.client()?;
    let checker = UpdateChecker::new(&runtime, &registry);

    let ids = checker.image_ids_for_ref(&CheckContext::new(), image).await;
    if ids.is_empty() {
        println!("No local images match {}", image);
    }
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

async fn compat(config: &Config) -> Result<()> {
    let runtime = connect_local(Some(&config.runtime_config())).await?;
    let info = runtime.info().await?;
    println!(
        "{} {} ({}/{}), engine API {}",
        info.name, info.version, info.os, info.arch, info.max_api_version
    );
    print_feature_support(runtime.api_version());
    Ok(())
}

fn print_feature_support(api_version: &str) {
    match ApiVersion::parse(api_version) {
        Ok(version) => println!("API version: {}", version),
        Err(e) => println!("API version: {} ({})", api_version, e),
    }
    for feature in Feature::ALL {
        let status = if supports_feature(*feature, api_version) {
            "supported"
        } else {
            "unsupported"
        };
        println!(
            "  {} (requires {}): {}",
            feature,
            feature.min_api_version(),
            status
        );
    }
}
