//! racer-engine configuration
//!
//! Resolved from CLI arguments, `RACER_ENGINE_*` environment variables, an
//! optional TOML file (`[engine]` table), then compiled defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use racer_common::config::{
    load_optional_config, parse_listen_addr, require_positive, resolve_setting,
    DEFAULT_DECISION_CAPACITY, DEFAULT_ENGINE_LISTEN,
};
use racer_common::Result;

/// Command-line arguments for racer-engine
#[derive(Parser, Debug, Clone)]
#[command(name = "racer-engine")]
#[command(about = "Decision engine: records the first correct answer")]
#[command(version)]
pub struct Args {
    /// Address to listen on (ip:port, hostname:port or :port)
    #[arg(short, long, env = "RACER_ENGINE_LISTEN")]
    pub listen: Option<String>,

    /// Decision buffer capacity
    #[arg(long, env = "RACER_ENGINE_CAPACITY")]
    pub capacity: Option<usize>,

    /// Optional TOML config file
    #[arg(short, long, env = "RACER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Fully resolved engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub listen_addr: SocketAddr,
    pub capacity: usize,
}

impl Args {
    pub fn resolve(self) -> Result<EngineConfig> {
        let file = load_optional_config(self.config.as_deref())?.engine;

        let listen = resolve_setting(
            self.listen,
            file.listen_addr,
            DEFAULT_ENGINE_LISTEN.to_string(),
        );
        let capacity = resolve_setting(self.capacity, file.capacity, DEFAULT_DECISION_CAPACITY);

        Ok(EngineConfig {
            listen_addr: parse_listen_addr(&listen)?,
            capacity: require_positive("capacity", capacity)?,
        })
    }
}
