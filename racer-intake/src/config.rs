//! racer-intake configuration
//!
//! Resolved from CLI arguments, `RACER_INTAKE_*` / `RACER_DOWNSTREAM_URL`
//! environment variables, an optional TOML file (`[intake]` table), then
//! compiled defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use racer_common::config::{
    load_optional_config, parse_listen_addr, require_positive, resolve_setting, validate_url,
    DEFAULT_DOWNSTREAM_URL, DEFAULT_INTAKE_CAPACITY, DEFAULT_INTAKE_LISTEN,
    DEFAULT_INTAKE_WORKERS,
};
use racer_common::Result;

use crate::forwarder::ForwarderConfig;

/// Command-line arguments for racer-intake
#[derive(Parser, Debug, Clone)]
#[command(name = "racer-intake")]
#[command(about = "Intake service: buffers answers and relays them to the decision engine")]
#[command(version)]
pub struct Args {
    /// Address to listen on (ip:port, hostname:port or :port)
    #[arg(short, long, env = "RACER_INTAKE_LISTEN")]
    pub listen: Option<String>,

    /// Decision engine ingestion URL
    #[arg(short, long, env = "RACER_DOWNSTREAM_URL")]
    pub downstream_url: Option<String>,

    /// Intake buffer capacity
    #[arg(long, env = "RACER_INTAKE_CAPACITY")]
    pub capacity: Option<usize>,

    /// Number of forwarding workers
    #[arg(short, long, env = "RACER_INTAKE_WORKERS")]
    pub workers: Option<usize>,

    /// Optional TOML config file
    #[arg(short, long, env = "RACER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Fully resolved intake settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    pub listen_addr: SocketAddr,
    pub downstream_url: String,
    pub forwarder: ForwarderConfig,
}

impl Args {
    pub fn resolve(self) -> Result<IntakeConfig> {
        let file = load_optional_config(self.config.as_deref())?.intake;

        let listen = resolve_setting(
            self.listen,
            file.listen_addr,
            DEFAULT_INTAKE_LISTEN.to_string(),
        );
        let downstream_url = resolve_setting(
            self.downstream_url,
            file.downstream_url,
            DEFAULT_DOWNSTREAM_URL.to_string(),
        );
        let capacity = resolve_setting(self.capacity, file.capacity, DEFAULT_INTAKE_CAPACITY);
        let workers = resolve_setting(self.workers, file.workers, DEFAULT_INTAKE_WORKERS);

        validate_url(&downstream_url)?;

        Ok(IntakeConfig {
            listen_addr: parse_listen_addr(&listen)?,
            downstream_url,
            forwarder: ForwarderConfig {
                capacity: require_positive("capacity", capacity)?,
                workers: require_positive("workers", workers)?,
            },
        })
    }
}
