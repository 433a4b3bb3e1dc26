//! Server configuration
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, an optional YAML file (`--config`), and built-in defaults. The
//! result is an immutable [`Config`] built once at startup.
//!
//! ```yaml
//! listen_addr: "0.0.0.0:4221"
//! files_directory: /tmp/files
//! encodings: [gzip]
//! read_timeout_secs: 30
//! limits:
//!   max_line_bytes: 8192
//!   max_body_bytes: 16777216
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::encoding::Encoding;
use crate::http::line::DEFAULT_MAX_LINE_BYTES;
use crate::http::parser::{ParseLimits, DEFAULT_MAX_BODY_BYTES};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:4221";

/// Command-line flags.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "tern")]
#[command(about = "Minimal HTTP/1.1 server with echo and file endpoints")]
pub struct Cli {
    /// Directory served and written by the /files endpoint
    #[arg(long)]
    pub directory: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "LISTEN")]
    pub listen: Option<String>,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// YAML file layout. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub listen_addr: Option<String>,
    pub files_directory: Option<PathBuf>,
    pub encodings: Option<Vec<String>>,
    pub read_timeout_secs: Option<u64>,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_line_bytes: Option<usize>,
    pub max_body_bytes: Option<usize>,
}

impl FileConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Invalid configuration YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Effective server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// `None` disables the /files endpoint (it answers 404)
    pub files_directory: Option<PathBuf>,
    pub encodings: Vec<Encoding>,
    /// `None` waits for a request indefinitely
    pub read_timeout: Option<Duration>,
    pub limits: ParseLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            files_directory: None,
            encodings: vec![Encoding::Gzip],
            read_timeout: None,
            limits: ParseLimits::default(),
        }
    }
}

impl Config {
    /// Parses the process arguments and builds the configuration.
    pub fn load() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    /// Builds the configuration from parsed flags, reading the YAML file if
    /// one was named.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Applies `cli` over `file` over the defaults.
    pub fn merge(cli: Cli, file: FileConfig) -> Result<Self> {
        let defaults = Config::default();

        let encodings = match file.encodings {
            Some(names) => names
                .iter()
                .map(|name| {
                    Encoding::from_token(name)
                        .with_context(|| format!("Unsupported content encoding {:?}", name))
                })
                .collect::<Result<Vec<_>>>()?,
            None => defaults.encodings,
        };

        let read_timeout = match file.read_timeout_secs {
            Some(0) | None => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        let limits = ParseLimits {
            max_line_bytes: file.limits.max_line_bytes.unwrap_or(DEFAULT_MAX_LINE_BYTES),
            max_body_bytes: file.limits.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES),
        };

        Ok(Self {
            listen_addr: cli
                .listen
                .or(file.listen_addr)
                .unwrap_or(defaults.listen_addr),
            files_directory: cli.directory.or(file.files_directory),
            encodings,
            read_timeout,
            limits,
        })
    }
}
