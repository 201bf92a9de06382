use anyhow::{Context, Result};
use clap::Args;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::convert::ConverterConfig;

/// Converter settings shared by every subcommand that converts documents
#[derive(Debug, Clone, Args)]
pub struct ConverterArgs {
    /// Seconds to wait for an external converter before giving up
    #[arg(long, env = "DOCSPLIT_CONVERT_TIMEOUT", default_value_t = 30)]
    pub convert_timeout_secs: u64,

    /// Office suite binary (probes known install paths, then `soffice` on PATH)
    #[arg(long, env = "SOFFICE_PATH")]
    pub soffice: Option<PathBuf>,
}

impl ConverterArgs {
    pub fn to_config(&self) -> ConverterConfig {
        ConverterConfig {
            timeout: Duration::from_secs(self.convert_timeout_secs),
            soffice: self.soffice.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "DOCSPLIT_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5001)]
    pub port: u16,

    /// Directory for uploads and converted PDFs (defaults to the system temp dir)
    #[arg(long, env = "DOCSPLIT_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Largest accepted upload, in megabytes
    #[arg(long, env = "DOCSPLIT_MAX_UPLOAD_MB", default_value_t = 50)]
    pub max_upload_mb: usize,

    #[command(flatten)]
    pub converter: ConverterArgs,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub temp_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub converter: ConverterConfig,
}

impl ServerConfig {
    /// Resolve CLI/environment settings, creating the temp dir if needed
    pub fn from_args(args: &ServeArgs) -> Result<Self> {
        let temp_dir = args.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&temp_dir)
            .with_context(|| format!("Failed to create temp dir: {}", temp_dir.display()))?;

        Ok(ServerConfig {
            addr: SocketAddr::new(args.host, args.port),
            temp_dir,
            max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
            converter: args.converter.to_config(),
        })
    }
}
