// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use async_trait::async_trait;

use crate::shim::{
    address::Address, clock::ChainEpoch, econ::TokenAmount, piece::PaddedPieceSize,
};

/// Bounds on the provider collateral the market actor accepts for a deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollateralBounds {
    pub min: TokenAmount,
    pub max: TokenAmount,
}

/// Read-only view of the chain the deal client needs.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Height of the current heaviest tipset.
    async fn chain_head_epoch(&self) -> anyhow::Result<ChainEpoch>;

    async fn deal_provider_collateral_bounds(
        &self,
        size: PaddedPieceSize,
        verified: bool,
    ) -> anyhow::Result<CollateralBounds>;

    /// Resolves any address to its `f0`/`t0` ID address.
    async fn lookup_id(&self, addr: &Address) -> anyhow::Result<Address>;
}
