// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::ensure;
use jsonrpsee::rpc_params;
use serde::Deserialize;

use super::LotusClient;
use crate::shim::clock::ChainEpoch;

pub const CHAIN_HEAD: &str = "Filecoin.ChainHead";

/// The part of a Lotus tipset the deal client needs.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct HeadTipset {
    #[serde(rename = "Height")]
    height: ChainEpoch,
}

impl HeadTipset {
    pub(super) fn epoch(&self) -> anyhow::Result<ChainEpoch> {
        ensure!(self.height >= 0, "chain head has negative height {}", self.height);
        Ok(self.height)
    }
}

impl LotusClient {
    pub async fn chain_head(&self) -> anyhow::Result<ChainEpoch> {
        let head: HeadTipset = self.call(CHAIN_HEAD, rpc_params![]).await?;
        head.epoch()
    }
}
