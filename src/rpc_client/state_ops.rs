// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::{Context as _, bail, ensure};
use jsonrpsee::rpc_params;
use num::{BigInt, Signed as _};
use serde::Deserialize;
use serde_with::{base64::Base64, serde_as};

use super::LotusClient;
use crate::deal::chain::CollateralBounds;
use crate::libp2p::{Multiaddr, PeerAddrInfo, PeerId};
use crate::shim::{
    address::{Address, Protocol, parse_address},
    econ::TokenAmount,
    piece::PaddedPieceSize,
};

pub const STATE_DEAL_PROVIDER_COLLATERAL_BOUNDS: &str =
    "Filecoin.StateDealProviderCollateralBounds";
pub const STATE_LOOKUP_ID: &str = "Filecoin.StateLookupID";
pub const STATE_MINER_INFO: &str = "Filecoin.StateMinerInfo";
pub const STATE_NETWORK_NAME: &str = "Filecoin.StateNetworkName";

#[derive(Debug, Clone, Deserialize)]
pub(super) struct LotusCollateralBounds {
    #[serde(rename = "Min")]
    min: String,
    #[serde(rename = "Max")]
    max: String,
}

fn parse_atto(field: &str, value: &str) -> anyhow::Result<TokenAmount> {
    let atto: BigInt = value
        .parse()
        .with_context(|| format!("{field} is not an integer: {value:?}"))?;
    ensure!(!atto.is_negative(), "{field} is negative: {value}");
    Ok(TokenAmount::from_atto(atto))
}

impl TryFrom<LotusCollateralBounds> for CollateralBounds {
    type Error = anyhow::Error;

    fn try_from(value: LotusCollateralBounds) -> Result<Self, Self::Error> {
        let min = parse_atto("Min", &value.min)?;
        let max = parse_atto("Max", &value.max)?;
        ensure!(min <= max, "collateral bounds are inverted: {min} > {max}");
        Ok(CollateralBounds { min, max })
    }
}

/// The networking part of a miner's on-chain info.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct MinerInfo {
    #[serde(rename = "PeerId")]
    peer_id: Option<String>,
    #[serde(rename = "Multiaddrs")]
    #[serde_as(as = "Option<Vec<Base64>>")]
    multiaddrs: Option<Vec<Vec<u8>>>,
}

impl MinerInfo {
    /// Resolves the peer id and listen addresses. Fails when the miner has
    /// not published a peer id.
    pub fn peer_addr_info(&self) -> anyhow::Result<PeerAddrInfo> {
        let Some(peer_id) = self.peer_id.as_deref() else {
            bail!("miner has no peer id on chain");
        };
        let peer_id: PeerId = peer_id
            .parse()
            .with_context(|| format!("invalid miner peer id {peer_id:?}"))?;
        let addrs = self
            .multiaddrs
            .iter()
            .flatten()
            .map(|bytes| Multiaddr::try_from(bytes.clone()).context("invalid miner multiaddr"))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(PeerAddrInfo { peer_id, addrs })
    }
}

fn ensure_id_address(input: &str) -> anyhow::Result<Address> {
    let addr = parse_address(input).with_context(|| format!("invalid id address {input:?}"))?;
    if addr.protocol() != Protocol::ID {
        bail!("expected an id address, got {input}");
    }
    Ok(addr)
}

impl LotusClient {
    pub async fn state_deal_provider_collateral_bounds(
        &self,
        size: PaddedPieceSize,
        verified: bool,
    ) -> anyhow::Result<CollateralBounds> {
        let bounds: LotusCollateralBounds = self
            .call(
                STATE_DEAL_PROVIDER_COLLATERAL_BOUNDS,
                rpc_params![size.0, verified, serde_json::Value::Null],
            )
            .await?;
        bounds.try_into()
    }

    pub async fn state_lookup_id(&self, addr: &Address) -> anyhow::Result<Address> {
        let id: String = self
            .call(
                STATE_LOOKUP_ID,
                rpc_params![addr.to_string(), serde_json::Value::Null],
            )
            .await?;
        ensure_id_address(&id)
    }

    pub async fn state_miner_info(&self, miner: &Address) -> anyhow::Result<MinerInfo> {
        self.call(
            STATE_MINER_INFO,
            rpc_params![miner.to_string(), serde_json::Value::Null],
        )
        .await
    }

    pub async fn state_network_name(&self) -> anyhow::Result<String> {
        self.call(STATE_NETWORK_NAME, rpc_params![]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, prelude::BASE64_STANDARD};

    #[test]
    fn decode_collateral_bounds() {
        let raw: LotusCollateralBounds =
            serde_json::from_str(r#"{"Min":"100","Max":"1000000000000000000000"}"#).unwrap();
        let bounds = CollateralBounds::try_from(raw).unwrap();
        assert_eq!(bounds.min, TokenAmount::from_atto(100));
        assert_eq!(
            bounds.max,
            TokenAmount::from_atto(BigInt::from(10).pow(21))
        );
    }

    #[test]
    fn reject_malformed_collateral_bounds() {
        for json in [
            r#"{"Min":"-1","Max":"10"}"#,
            r#"{"Min":"ten","Max":"10"}"#,
            r#"{"Min":"11","Max":"10"}"#,
        ] {
            let raw: LotusCollateralBounds = serde_json::from_str(json).unwrap();
            assert!(CollateralBounds::try_from(raw).is_err(), "{json}");
        }
        assert!(serde_json::from_str::<LotusCollateralBounds>(r#"{"Min":1,"Max":2}"#).is_err());
    }

    #[test]
    fn decode_miner_info() {
        let peer_id = PeerId::random();
        let addr: Multiaddr = "/ip4/10.0.0.1/tcp/24001".parse().unwrap();
        let json = serde_json::json!({
            "Owner": "f01234",
            "PeerId": peer_id.to_string(),
            "Multiaddrs": [BASE64_STANDARD.encode(addr.to_vec())],
            "SectorSize": 34359738368u64,
        });
        let info: MinerInfo = serde_json::from_value(json).unwrap();
        let resolved = info.peer_addr_info().unwrap();
        assert_eq!(resolved.peer_id, peer_id);
        assert_eq!(resolved.addrs, vec![addr]);
    }

    #[test]
    fn miner_without_peer_id_or_addrs() {
        let info: MinerInfo =
            serde_json::from_str(r#"{"PeerId":null,"Multiaddrs":null}"#).unwrap();
        assert!(info.peer_addr_info().is_err());

        let json = serde_json::json!({ "PeerId": PeerId::random().to_string(), "Multiaddrs": null });
        let info: MinerInfo = serde_json::from_value(json).unwrap();
        assert!(info.peer_addr_info().unwrap().addrs.is_empty());
    }

    #[test]
    fn reject_bad_miner_info() {
        let info: MinerInfo = serde_json::from_str(r#"{"PeerId":"nope"}"#).unwrap();
        assert!(info.peer_addr_info().is_err());

        let json = serde_json::json!({
            "PeerId": PeerId::random().to_string(),
            "Multiaddrs": [BASE64_STANDARD.encode([0xff, 0xff, 0xff])],
        });
        let info: MinerInfo = serde_json::from_value(json).unwrap();
        assert!(info.peer_addr_info().is_err());
    }

    #[test]
    fn lookup_id_must_return_id_address() {
        assert_eq!(ensure_id_address("f01234").unwrap(), Address::new_id(1234));
        assert!(ensure_id_address("f410fkkld55ioe7qg24wvt7fu6pbknb56ht7pt4zamxa").is_err());
        assert!(ensure_id_address("").is_err());
    }
}
