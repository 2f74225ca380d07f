// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use super::fvm_shared_latest::ActorID;
pub use super::fvm_shared_latest::address::{
    Address, Error, Network, Payload, Protocol,
};

/// ID of the Ethereum Address Manager actor, the namespace of `f410` addresses.
pub const ETHEREUM_ACCOUNT_MANAGER_ACTOR_ID: ActorID = 10;

/// The network prefix (`f` or `t`) used when addresses are rendered as strings.
pub struct CurrentNetwork;

impl CurrentNetwork {
    pub fn set_global(network: Network) {
        super::fvm_shared_latest::address::set_current_network(network);
    }
}

/// Parses an address string accepting either network prefix.
pub fn parse_address(s: &str) -> Result<Address, Error> {
    Network::Testnet
        .parse_address(s)
        .or_else(|_| Network::Mainnet.parse_address(s))
}
