//! Server configuration.
//!
//! Loaded from the YAML file named by `BURROW_CONFIG` when set, otherwise
//! built from defaults. `LISTEN=host:port` overrides the listen address
//! either way.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::http::connection::HttpLimits;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: Option<StaticFilesConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backlog: i32,
    pub max_request_size: usize,
    pub write_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
    #[serde(default = "default_index")]
    pub index: String,
}

fn default_index() -> String {
    "index.html".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            backlog: 128,
            max_request_size: 64 * 1024,
            write_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    /// `host:port`, with IPv6 hosts in brackets.
    pub fn listen_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn limits(&self) -> HttpLimits {
        HttpLimits {
            max_request_size: self.max_request_size,
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }

    fn apply_listen(&mut self, listen: &str) -> anyhow::Result<()> {
        let Some((host, port)) = listen.rsplit_once(':') else {
            bail!("LISTEN must look like host:port, got {listen:?}");
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            bail!("LISTEN has an empty host: {listen:?}");
        }

        self.port = port
            .parse()
            .with_context(|| format!("LISTEN has an invalid port: {listen:?}"))?;
        self.host = host.to_string();
        Ok(())
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = match lookup("BURROW_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(listen) = lookup("LISTEN") {
            config.server.apply_listen(&listen)?;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn listen_addr(&self) -> String {
        self.server.listen_addr()
    }
}
