// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod deal;
mod transport;

pub use libp2p::{Multiaddr, PeerId, StreamProtocol};

pub use self::transport::ProviderConnection;

/// Network identity and dialable addresses of a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddrInfo {
    pub peer_id: PeerId,
    pub addrs: Vec<Multiaddr>,
}
