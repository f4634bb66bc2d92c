//! Configuration loading and setting resolution
//!
//! Every setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (handled by clap's `env` attribute)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the services log a warning and start
//! with defaults. A file that exists but does not parse is rejected.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result};

/// Default intake listening address
pub const DEFAULT_INTAKE_LISTEN: &str = "0.0.0.0:8080";

/// Default decision engine listening address
pub const DEFAULT_ENGINE_LISTEN: &str = "0.0.0.0:9090";

/// Default relay target for the intake workers
pub const DEFAULT_DOWNSTREAM_URL: &str = "http://localhost:9090/game/response";

/// Default simulator target
pub const DEFAULT_SUBMIT_URL: &str = "http://localhost:8080/submit";

/// Intake buffer capacity
pub const DEFAULT_INTAKE_CAPACITY: usize = 1000;

/// Intake forwarding worker count
pub const DEFAULT_INTAKE_WORKERS: usize = 5;

/// Decision buffer capacity
pub const DEFAULT_DECISION_CAPACITY: usize = 100;

/// `[intake]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downstream_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

/// `[engine]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

/// Contents of a racer TOML config file; one file can configure both services
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub intake: IntakeSection,
    pub engine: EngineSection,
}

/// Load and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Load the config file if one was given
///
/// No path, or a path that does not exist, yields defaults.
pub fn load_optional_config(path: Option<&Path>) -> Result<TomlConfig> {
    match path {
        None => Ok(TomlConfig::default()),
        Some(path) if !path.exists() => {
            warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        Some(path) => load_toml_config(path),
    }
}

/// Write a config file (used by tests and for generating templates)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Pick the highest-priority value that is present
pub fn resolve_setting<T>(cli_or_env: Option<T>, file: Option<T>, default: T) -> T {
    cli_or_env.or(file).unwrap_or(default)
}

/// Resolve a listening address
///
/// Accepts `ip:port`, `hostname:port`, or `:port` for every interface.
pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr> {
    let invalid = |reason: String| Error::Config(format!("Invalid listen address '{}': {}", addr, reason));

    if let Some(port) = addr.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|e| invalid(format!("{}", e)))?;
        return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
    }
    if let Ok(parsed) = addr.parse() {
        return Ok(parsed);
    }

    addr.to_socket_addrs()
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("host resolved to no addresses".to_string()))
}

/// Reject sizes that would make a pipeline stage unusable
pub fn require_positive(name: &str, value: usize) -> Result<usize> {
    if value == 0 {
        Err(Error::Config(format!("{} must be greater than zero", name)))
    } else {
        Ok(value)
    }
}

/// Downstream URL must be an absolute http(s) URL
pub fn validate_url(url: &str) -> Result<&str> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(Error::Config(format!(
            "Downstream URL must start with http:// or https://, got '{}'",
            url
        )))
    }
}
