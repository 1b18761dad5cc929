//! Configuration resolution for the taxonwatch tools
//!
//! Provides multi-tier resolution with CLI → ENV → TOML file → default
//! priority. The access token is the only required value; everything else
//! has a compiled default.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default laji.fi API root
pub const DEFAULT_BASE_URL: &str = "https://api.laji.fi/v0";

/// Default taxa of interest: liverworts and bryophytes
pub const DEFAULT_TAXA: &[&str] = &["MX.44394", "MX.44109"];

/// Environment variable holding the API access token
pub const ACCESS_TOKEN_ENV: &str = "TW_ACCESS_TOKEN";

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// laji.fi access token, sent as a query parameter on every request
    pub access_token: String,
    /// Taxon identifiers the harvest is limited to
    pub taxa: Vec<String>,
    /// Folder the result CSV files are written into
    pub output_dir: PathBuf,
    /// API root, overridable for tests
    pub base_url: String,
}

/// Raw values read from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub access_token: Option<String>,
    pub taxa: Option<Vec<String>>,
    pub output_dir: Option<String>,
    pub base_url: Option<String>,
}

/// Values supplied on the command line (already parsed by the binary's clap
/// struct); `None` falls through to the next tier.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub access_token: Option<String>,
    pub taxa: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

impl TomlConfig {
    /// Load the TOML config file.
    ///
    /// An explicitly given path must exist and parse; the default path
    /// (`~/.config/taxonwatch/config.toml`) is optional and an absent file
    /// yields an empty config.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = match explicit_path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("Could not read config file {}: {}", path.display(), e))
        })?;
        let config: TomlConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Could not parse config file {}: {}", path.display(), e))
        })?;
        info!("Loaded config file {}", path.display());
        Ok(config)
    }
}

/// Default per-user config file path for the platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("taxonwatch").join("config.toml"))
}

/// Resolve the access token with CLI → ENV → TOML priority.
///
/// Warns when the token is set in several tiers (potential
/// misconfiguration), then uses the highest-priority one.
pub fn resolve_access_token(cli: Option<&str>, toml_config: &TomlConfig) -> Result<String> {
    let env_token = std::env::var(ACCESS_TOKEN_ENV).ok().filter(|t| !t.trim().is_empty());
    let cli_token = cli.filter(|t| !t.trim().is_empty());
    let toml_token = toml_config
        .access_token
        .as_deref()
        .filter(|t| !t.trim().is_empty());

    let mut sources = Vec::new();
    if cli_token.is_some() {
        sources.push("command line");
    }
    if env_token.is_some() {
        sources.push("environment");
    }
    if toml_token.is_some() {
        sources.push("TOML");
    }
    if sources.len() > 1 {
        warn!(
            "Access token found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(token) = cli_token {
        return Ok(token.to_string());
    }
    if let Some(token) = env_token {
        return Ok(token);
    }
    if let Some(token) = toml_token {
        return Ok(token.to_string());
    }

    Err(Error::Config(format!(
        "laji.fi access token not configured. Please configure using one of:\n\
         1. Command line: --access-token your-token-here\n\
         2. Environment: {}=your-token-here\n\
         3. TOML config: ~/.config/taxonwatch/config.toml (access_token = \"your-token\")\n\
         \n\
         Obtain an access token at: https://api.laji.fi",
        ACCESS_TOKEN_ENV
    )))
}

/// Resolve the full settings from the three tiers plus compiled defaults.
pub fn resolve_settings(cli: CliOverrides, toml_config: &TomlConfig) -> Result<Settings> {
    let access_token = resolve_access_token(cli.access_token.as_deref(), toml_config)?;

    let taxa = cli
        .taxa
        .or_else(|| toml_config.taxa.clone())
        .unwrap_or_else(|| DEFAULT_TAXA.iter().map(|t| t.to_string()).collect());
    if taxa.is_empty() {
        return Err(Error::Config("Taxa list must not be empty".to_string()));
    }

    let output_dir = cli
        .output_dir
        .or_else(|| toml_config.output_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let base_url = cli
        .base_url
        .or_else(|| toml_config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    Ok(Settings {
        access_token,
        taxa,
        output_dir,
        base_url,
    })
}
