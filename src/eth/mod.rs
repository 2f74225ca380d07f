// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::shim::address::{Address, ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID, Payload};
use crate::utils::encoding::keccak_256;
use anyhow::{Context as _, bail, ensure};
use std::{fmt, str::FromStr};

/// Length of an uncompressed secp256k1 public key, including the `0x04` tag.
const UNCOMPRESSED_PUB_KEY_LEN: usize = 65;

/// A 20-byte Ethereum account address.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EthAddress(pub ethereum_types::H160);

impl EthAddress {
    /// Derives the address of a secp256k1 key from its uncompressed public key.
    pub fn eth_address_from_pub_key(pubkey: &[u8]) -> anyhow::Result<Self> {
        ensure!(
            pubkey.len() == UNCOMPRESSED_PUB_KEY_LEN && pubkey[0] == 0x04,
            "public key should be uncompressed"
        );
        let hash = keccak_256(&pubkey[1..]);
        Ok(Self(ethereum_types::H160::from_slice(&hash[12..])))
    }

    /// Converts into an `f410` address in the Ethereum Address Manager namespace.
    pub fn to_filecoin_address(&self) -> anyhow::Result<Address> {
        Ok(Address::new_delegated(
            ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID,
            self.0.as_bytes(),
        )?)
    }

    pub fn from_filecoin_address(addr: &Address) -> anyhow::Result<Self> {
        match addr.payload() {
            Payload::Delegated(delegated)
                if delegated.namespace() == ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID =>
            {
                let sub = delegated.subaddress();
                ensure!(
                    sub.len() == ethereum_types::H160::len_bytes(),
                    "invalid delegated sub-address length {}",
                    sub.len()
                );
                Ok(Self(ethereum_types::H160::from_slice(sub)))
            }
            _ => bail!("{addr} is not an Ethereum-namespace delegated address"),
        }
    }
}

impl FromStr for EthAddress {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).with_context(|| format!("invalid hex in address {s}"))?;
        ensure!(
            bytes.len() == ethereum_types::H160::len_bytes(),
            "Ethereum address must be 20 bytes, got {}",
            bytes.len()
        );
        Ok(Self(ethereum_types::H160::from_slice(&bytes)))
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}
