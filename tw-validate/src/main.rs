//! tw-validate - species-name validity scan for FinBIF specimen data
//!
//! Pages through the warehouse and reports the specimens whose species name
//! could not be matched to a taxon, as a single-column CSV for curation.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tw_common::config::{resolve_settings, CliOverrides, TomlConfig};

#[derive(Parser)]
#[command(name = "tw-validate")]
#[command(about = "Find FinBIF specimens without a valid species name")]
struct Cli {
    /// Path to a TOML config file (default: ~/.config/taxonwatch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// laji.fi access token (overrides TW_ACCESS_TOKEN and the config file)
    #[arg(long)]
    access_token: Option<String>,

    /// Taxon identifiers to scan, comma separated
    #[arg(long, value_delimiter = ',')]
    taxa: Option<Vec<String>>,

    /// Folder the result CSV file is written into
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// API root override
    #[arg(long)]
    base_url: Option<String>,

    /// Scan every specimen, not only those placed in a biogeographical
    /// province
    #[arg(long)]
    all_specimens: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting taxonwatch name validation (tw-validate) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let toml_config = TomlConfig::load(cli.config.as_deref())?;
    let settings = resolve_settings(
        CliOverrides {
            access_token: cli.access_token,
            taxa: cli.taxa,
            output_dir: cli.output_dir,
            base_url: cli.base_url,
        },
        &toml_config,
    )?;

    tw_validate::run(&settings, !cli.all_specimens).await?;

    info!("Done");
    Ok(())
}
