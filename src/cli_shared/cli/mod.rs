// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod client;
mod config;

use std::path::PathBuf;

use clap::Args;
use directories::ProjectDirs;
use tracing::{info, warn};

pub use self::config::*;
use crate::networks::NetworkChain;
use crate::rpc_client::ApiInfo;
use crate::utils::misc::LoggingColor;

pub const CONFIG_PATH_ENV: &str = "FOREST_DEAL_CONFIG_PATH";

/// Options shared by every subcommand
#[derive(Default, Debug, Clone, Args)]
pub struct CliOpts {
    /// A TOML file containing relevant configurations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Lotus JSON-RPC endpoint, a URL or `[token:]multiaddr`
    #[arg(long, global = true)]
    pub api: Option<String>,
    /// Token for the Lotus JSON-RPC endpoint
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// Directory holding the wallet keystore
    #[arg(long, global = true)]
    pub keystore_dir: Option<PathBuf>,
    /// Network used for address prefixes. Asked from the node when not set
    #[arg(long, global = true)]
    pub chain: Option<NetworkChain>,
    /// Enable or disable colored logging in `stderr`
    #[arg(long, global = true, default_value = "auto")]
    pub color: LoggingColor,
    /// Directory for rolling log files
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

impl CliOpts {
    /// Reads the configuration file and applies the command line overrides.
    pub fn to_config(&self) -> anyhow::Result<(Option<ConfigPath>, Config)> {
        let (path, mut cfg) = read_config(self.config.as_ref())?;
        if let Some(info) = ApiInfo::from_env()? {
            cfg.client.api_url = info.url.to_string();
            cfg.client.api_token = info.token;
        }
        if let Some(api) = &self.api {
            cfg.client.api_url = api.clone();
        }
        if self.token.is_some() {
            cfg.client.api_token = self.token.clone();
        }
        if let Some(dir) = &self.keystore_dir {
            cfg.client.keystore_dir = dir.clone();
        }
        if self.chain.is_some() {
            cfg.client.chain = self.chain.clone();
        }
        Ok((path, cfg))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigPath {
    Cli(PathBuf),
    Env(PathBuf),
    Project(PathBuf),
}

impl ConfigPath {
    pub fn to_path_buf(&self) -> &PathBuf {
        match self {
            ConfigPath::Cli(path) | ConfigPath::Env(path) | ConfigPath::Project(path) => path,
        }
    }
}

/// Config file location: the `--config` flag, then `FOREST_DEAL_CONFIG_PATH`,
/// then `config.toml` in the platform config directory.
pub fn find_config_path(config: Option<&PathBuf>) -> Option<ConfigPath> {
    if let Some(path) = config {
        return Some(ConfigPath::Cli(path.clone()));
    }
    if let Ok(config_file) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_file);
        if path.exists() {
            info!("{CONFIG_PATH_ENV} detected, using configuration at {}", path.display());
            return Some(ConfigPath::Env(path));
        }
        warn!("{CONFIG_PATH_ENV} points to {}, which does not exist", path.display());
    }
    if let Some(dir) = ProjectDirs::from("com", "ChainSafe", "ForestDeal") {
        let path = dir.config_dir().join("config.toml");
        if path.exists() {
            info!("Found a config file at {}", path.display());
            return Some(ConfigPath::Project(path));
        }
    }
    None
}

pub fn read_config(config: Option<&PathBuf>) -> anyhow::Result<(Option<ConfigPath>, Config)> {
    use anyhow::Context as _;

    match find_config_path(config) {
        Some(path) => {
            let toml = std::fs::read_to_string(path.to_path_buf())
                .with_context(|| format!("reading {}", path.to_path_buf().display()))?;
            let config = crate::utils::io::read_toml(&toml)
                .with_context(|| format!("parsing {}", path.to_path_buf().display()))?;
            Ok((Some(path), config))
        }
        None => Ok((None, Config::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_config_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let default_config = Config::default();
        std::fs::write(&path, toml::to_string(&default_config).unwrap()).unwrap();

        let (config_path, config) = read_config(Some(&path)).unwrap();
        assert_eq!(config_path.unwrap(), ConfigPath::Cli(path));
        assert_eq!(config, default_config);
    }

    #[test]
    fn read_config_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[deal]\nrequest_timeout = \"soon\"\n").unwrap();
        assert!(read_config(Some(&path)).is_err());
        assert!(read_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[client]\napi_url = \"http://file:1234/rpc/v1\"\n").unwrap();

        let opts = CliOpts {
            config: Some(path.clone()),
            api: Some("http://flag:1234/rpc/v1".into()),
            chain: Some(NetworkChain::Calibnet),
            ..Default::default()
        };
        let (_, config) = opts.to_config().unwrap();
        assert_eq!(config.client.api_url, "http://flag:1234/rpc/v1");
        assert_eq!(config.client.chain, Some(NetworkChain::Calibnet));

        let opts = CliOpts {
            config: Some(path),
            ..Default::default()
        };
        let (_, config) = opts.to_config().unwrap();
        assert_eq!(config.client.api_url, "http://file:1234/rpc/v1");
        assert_eq!(config.client.chain, None);
    }
}
