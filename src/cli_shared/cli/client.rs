// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::networks::NetworkChain;

pub const DEFAULT_API_URL: &str = "https://api.calibration.node.glif.io/rpc/v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Client {
    /// Lotus JSON-RPC endpoint, a URL or `[token:]multiaddr`.
    pub api_url: String,
    pub api_token: Option<String>,
    /// Directory holding `keystore.json`.
    pub keystore_dir: PathBuf,
    /// Network the addresses are printed for. Asked from the node when unset.
    pub chain: Option<NetworkChain>,
}

pub fn default_data_dir() -> PathBuf {
    match ProjectDirs::from("com", "ChainSafe", "ForestDeal") {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => PathBuf::from("~/.forest-deal"),
    }
}

impl Default for Client {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            keystore_dir: default_data_dir(),
            chain: None,
        }
    }
}
