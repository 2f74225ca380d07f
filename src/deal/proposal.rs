// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_encoding::tuple::*;

use super::epoch::DealEpochs;
use super::errors::DealError;
use super::pricing::storage_price_per_epoch;
use crate::shim::{
    address::{Address, parse_address},
    clock::ChainEpoch,
    crypto::Signature,
    econ::TokenAmount,
    piece::{PaddedPieceSize, is_valid_padded_size},
};

/// Storage market deal proposal. The field order is the on-chain tuple
/// encoding and must not change.
///
/// Note: Collaterals are denominated in attoFIL and locked for the whole
/// deal. This client never puts up client collateral.
#[derive(Clone, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
pub struct DealProposal {
    pub piece_cid: Cid,
    pub piece_size: PaddedPieceSize,
    pub verified_deal: bool,
    pub client: Address,
    pub provider: Address,
    pub label: String,
    pub start_epoch: ChainEpoch,
    pub end_epoch: ChainEpoch,
    pub storage_price_per_epoch: TokenAmount,
    pub provider_collateral: TokenAmount,
    pub client_collateral: TokenAmount,
}

impl DealProposal {
    /// DAG-CBOR encoding of the proposal. This is what the client signs.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, fvm_ipld_encoding::Error> {
        fvm_ipld_encoding::to_vec(self)
    }
}

/// `ClientDealProposal` is a `DealProposal` signed by a client
#[derive(Clone, Debug, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
pub struct ClientDealProposal {
    pub proposal: DealProposal,
    pub client_signature: Signature,
}

impl ClientDealProposal {
    /// Checks the signature over the proposal's canonical bytes against
    /// `signer`.
    pub fn verify(&self, signer: &Address) -> anyhow::Result<()> {
        let bytes = self.proposal.canonical_bytes()?;
        self.client_signature.verify(&bytes, signer)
    }
}

/// Everything needed to assemble a [`DealProposal`], with identifiers
/// already parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalTerms {
    pub piece_cid: Cid,
    pub piece_size: PaddedPieceSize,
    pub verified_deal: bool,
    pub client: Address,
    pub provider: Address,
    pub label: String,
    pub epochs: DealEpochs,
    /// attoFIL per GiB per epoch.
    pub price_per_gib_per_epoch: TokenAmount,
    pub provider_collateral: TokenAmount,
}

impl ProposalTerms {
    pub fn build(self) -> Result<DealProposal, DealError> {
        if !is_valid_padded_size(self.piece_size) {
            return Err(DealError::InvalidPieceSize(self.piece_size.0));
        }
        match self.epochs.end.checked_sub(self.epochs.start) {
            Some(duration) if duration > 0 => {}
            Some(duration) => return Err(DealError::InvalidDuration(duration)),
            None => {
                return Err(DealError::EpochOverflow {
                    base: self.epochs.end,
                    offset: self.epochs.start,
                });
            }
        }
        Ok(DealProposal {
            piece_cid: self.piece_cid,
            piece_size: self.piece_size,
            verified_deal: self.verified_deal,
            client: self.client,
            provider: self.provider,
            label: self.label,
            start_epoch: self.epochs.start,
            end_epoch: self.epochs.end,
            storage_price_per_epoch: storage_price_per_epoch(
                self.piece_size,
                &self.price_per_gib_per_epoch,
            ),
            provider_collateral: self.provider_collateral,
            client_collateral: TokenAmount::default(),
        })
    }
}

/// Parses a CID, naming `what` it is in the error.
pub fn parse_cid(what: &'static str, input: &str) -> Result<Cid, DealError> {
    Cid::try_from(input).map_err(|e| DealError::malformed(what, input, e))
}

/// Parses an `f`/`t` address, naming `what` it is in the error.
pub fn parse_chain_address(what: &'static str, input: &str) -> Result<Address, DealError> {
    parse_address(input).map_err(|e| DealError::malformed(what, input, e))
}
