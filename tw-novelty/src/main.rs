//! tw-novelty - new occurrence detection for FinBIF specimen data
//!
//! Harvests preserved-specimen records from the laji.fi warehouse and
//! compares them against the Taxon Editor reference distributions. Writes
//! two CSV reports: potentially new biogeographical-province records, and
//! potentially new species for Finland.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tw_common::config::{resolve_settings, CliOverrides, TomlConfig};

#[derive(Parser)]
#[command(name = "tw-novelty")]
#[command(about = "Detect new species occurrences in FinBIF specimen data")]
struct Cli {
    /// Path to a TOML config file (default: ~/.config/taxonwatch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// laji.fi access token (overrides TW_ACCESS_TOKEN and the config file)
    #[arg(long)]
    access_token: Option<String>,

    /// Taxon identifiers to harvest, comma separated
    #[arg(long, value_delimiter = ',')]
    taxa: Option<Vec<String>>,

    /// Folder the result CSV files are written into
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// API root override
    #[arg(long)]
    base_url: Option<String>,
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
        "Starting taxonwatch novelty detection (tw-novelty) v{} [{}] built {} ({})",
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

    tw_novelty::run(&settings).await?;

    info!("Done");
    Ok(())
}
