use crate::infrastructure::registry::DeliveryMode;
use crate::utils::security::RootPath;
use anyhow::Result;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dirshare")]
#[command(about = "Share a directory over HTTP with live change notifications")]
#[command(version)]
pub struct Cli {
    /// Port for the HTTP server
    #[arg(short = 'p', long, env = "DIRSHARE_PORT", default_value_t = 80)]
    pub port: u16,

    /// Directory to be shared
    #[arg(short = 'd', long = "dir", env = "DIRSHARE_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Name shown for the top-level directory
    #[arg(short = 'n', long, env = "DIRSHARE_NAME", default_value = "Shared")]
    pub name: String,

    /// Address to bind
    #[arg(long, env = "DIRSHARE_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// How filesystem events are handed to live clients
    #[arg(long, value_enum, default_value_t = DeliveryMode::Blocking)]
    pub delivery: DeliveryMode,

    /// Per-client queue length for `--delivery drop-if-full`
    #[arg(long, default_value_t = 16)]
    pub client_buffer: usize,
}

/// Startup configuration. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub bind: IpAddr,
    pub root: RootPath,
    pub name: String,
    pub delivery: DeliveryMode,
    pub client_buffer: usize,
}

impl ServerConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let root = RootPath::from_dir(&cli.dir)?;
        Ok(Self {
            port: cli.port,
            bind: cli.bind,
            root,
            name: cli.name,
            delivery: cli.delivery,
            client_buffer: cli.client_buffer.max(1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_flags() {
        let cli = Cli::try_parse_from(["dirshare"]).unwrap();
        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(cli.name, "Shared");
        assert_eq!(cli.delivery, DeliveryMode::Blocking);
    }

    #[test]
    fn root_is_resolved_to_an_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "dirshare",
            "-p",
            "8080",
            "-n",
            "Team",
            "-d",
            dir.path().to_str().unwrap(),
            "--delivery",
            "drop-if-full",
            "--client-buffer",
            "0",
        ])
        .unwrap();

        let config = ServerConfig::from_cli(cli).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.name, "Team");
        assert!(config.root.as_path().is_absolute());
        assert_eq!(config.delivery, DeliveryMode::DropIfFull);
        assert_eq!(config.client_buffer, 1);
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let cli =
            Cli::try_parse_from(["dirshare", "-d", missing.to_str().unwrap()]).unwrap();
        assert!(ServerConfig::from_cli(cli).is_err());
    }
}
