// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt::Display;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::shim::address::Network;

/// Chain the client talks to. Selects the address prefix used in output and
/// labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum NetworkChain {
    #[default]
    Mainnet,
    Calibnet,
    Devnet(String),
}

impl FromStr for NetworkChain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(NetworkChain::Mainnet),
            // `calibrationnet` is the name reported by `Filecoin.StateNetworkName`
            "calibnet" | "calibrationnet" => Ok(NetworkChain::Calibnet),
            "" => anyhow::bail!("network name must not be empty"),
            name => Ok(NetworkChain::Devnet(name.to_owned())),
        }
    }
}

impl Display for NetworkChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkChain::Mainnet => write!(f, "mainnet"),
            NetworkChain::Calibnet => write!(f, "calibnet"),
            NetworkChain::Devnet(name) => write!(f, "{name}"),
        }
    }
}

impl NetworkChain {
    pub fn is_testnet(&self) -> bool {
        !matches!(self, NetworkChain::Mainnet)
    }

    /// Address network for this chain: `f` on mainnet, `t` everywhere else.
    pub fn address_network(&self) -> Network {
        if self.is_testnet() {
            Network::Testnet
        } else {
            Network::Mainnet
        }
    }
}
