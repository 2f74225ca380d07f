// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use cid::Cid;
use libp2p::StreamProtocol;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use super::{
    chain::ChainReader,
    epoch::{DealEpochs, StartEpochSpec, resolve_epochs},
    errors::DealError,
    label::label_from_actor_id,
    params::{DealParams, Transfer, parse_http_headers},
    pricing::resolve_provider_collateral,
    proposal::{ClientDealProposal, ProposalTerms, parse_chain_address, parse_cid},
    signer::{KeyCustodian, sign_proposal},
};
use crate::eth::EthAddress;
use crate::libp2p::deal::{DealNegotiator, NegotiationOutcome, select_protocol};
use crate::shim::{
    address::Address,
    clock::ChainEpoch,
    econ::TokenAmount,
    piece::{PaddedPieceSize, is_valid_padded_size},
};

/// A bidirectional byte stream to a provider.
pub trait DealStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> DealStream for T {}

/// An established connection to a provider that can open deal streams.
#[async_trait]
pub trait DealConnection: Send + Sync {
    /// Protocols the provider advertises.
    fn protocols(&self) -> Vec<StreamProtocol>;

    async fn open_stream(&self, protocol: StreamProtocol) -> anyhow::Result<Box<dyn DealStream>>;
}

/// How the provider receives the deal data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferRequest {
    /// Data is imported by the provider out of band.
    Offline,
    /// Provider downloads the CAR file from `url`.
    Http {
        url: Url,
        /// `key=value` pairs.
        headers: Vec<String>,
        car_size: u64,
    },
}

/// Everything a user specifies for a deal. Identifiers are kept as given and
/// parsed by [`DealRequest::check`].
#[derive(Debug, Clone)]
pub struct DealRequest {
    pub provider: String,
    pub piece_cid: String,
    pub piece_size: u64,
    pub payload_cid: String,
    /// Ethereum address of the contract that acts as the deal client.
    pub client_contract: String,
    /// Wallet address that signs the proposal.
    pub signer: Address,
    pub start: StartEpochSpec,
    pub duration: ChainEpoch,
    /// Zero to use the chain minimum plus a margin.
    pub provider_collateral: TokenAmount,
    /// attoFIL per GiB per epoch.
    pub storage_price: TokenAmount,
    pub verified: bool,
    pub remove_unsealed_copy: bool,
    pub skip_ipni_announce: bool,
    pub transfer: TransferRequest,
}

/// A [`DealRequest`] that passed every check not needing the chain.
#[derive(Debug, Clone)]
pub struct CheckedRequest {
    pub provider: Address,
    pub piece_cid: Cid,
    pub piece_size: PaddedPieceSize,
    pub payload_cid: Cid,
    pub client: Address,
    pub transfer: Transfer,
    pub transfer_url: Option<Url>,
}

impl DealRequest {
    /// Validates the request. Runs before any chain query or network access.
    pub fn check(&self) -> Result<CheckedRequest, DealError> {
        self.start.check()?;
        if self.duration <= 0 {
            return Err(DealError::InvalidDuration(self.duration));
        }
        let piece_size = PaddedPieceSize(self.piece_size);
        if !is_valid_padded_size(piece_size) {
            return Err(DealError::InvalidPieceSize(self.piece_size));
        }
        let provider = parse_chain_address("provider address", &self.provider)?;
        let piece_cid = parse_cid("piece cid", &self.piece_cid)?;
        let payload_cid = parse_cid("payload cid", &self.payload_cid)?;
        let client = self
            .client_contract
            .parse::<EthAddress>()
            .and_then(|eth| eth.to_filecoin_address())
            .map_err(|e| DealError::InvalidEthAddress {
                input: self.client_contract.clone(),
                reason: format!("{e:#}"),
            })?;
        let (transfer, transfer_url) = match &self.transfer {
            TransferRequest::Offline => (Transfer::default(), None),
            TransferRequest::Http {
                url,
                headers,
                car_size,
            } => {
                let headers = parse_http_headers(headers)?;
                (Transfer::http(url, headers, *car_size)?, Some(url.clone()))
            }
        };
        Ok(CheckedRequest {
            provider,
            piece_cid,
            piece_size,
            payload_cid,
            client,
            transfer,
            transfer_url,
        })
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.transfer, TransferRequest::Offline)
    }
}

/// A signed deal, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDeal {
    pub params: DealParams,
    pub signer: Address,
    pub transfer_url: Option<Url>,
}

impl PreparedDeal {
    pub fn proposal(&self) -> &ClientDealProposal {
        &self.params.client_deal_proposal
    }
}

/// What the caller gets back from a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealReceipt {
    pub deal: PreparedDeal,
    pub protocol: StreamProtocol,
    pub outcome: NegotiationOutcome,
}

impl DealReceipt {
    pub fn deal_uuid(&self) -> Uuid {
        self.deal.params.deal_uuid
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, NegotiationOutcome::Accepted { .. })
    }
}

/// Multi-line description of the deal, printed after it was sent.
impl fmt::Display for DealReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = &self.deal.params;
        let proposal = &params.client_deal_proposal.proposal;
        if params.is_offline {
            writeln!(f, "sent deal proposal for offline deal")?;
        } else {
            writeln!(f, "sent deal proposal")?;
        }
        writeln!(f, "  deal uuid: {}", params.deal_uuid)?;
        writeln!(f, "  storage provider: {}", proposal.provider)?;
        writeln!(f, "  client contract address: {}", proposal.client)?;
        writeln!(f, "  signer wallet: {}", self.deal.signer)?;
        writeln!(f, "  payload cid: {}", params.deal_data_root)?;
        if let Some(url) = &self.deal.transfer_url {
            writeln!(f, "  url: {url}")?;
        }
        writeln!(f, "  commp: {}", proposal.piece_cid)?;
        writeln!(f, "  start epoch: {}", proposal.start_epoch)?;
        writeln!(f, "  end epoch: {}", proposal.end_epoch)?;
        writeln!(
            f,
            "  provider collateral: {} attoFIL",
            proposal.provider_collateral.atto()
        )
    }
}

/// Builds, signs and sends deal proposals. Collaborators are injected so the
/// client holds no key material and no chain state of its own.
pub struct DealClient {
    chain: Arc<dyn ChainReader>,
    custodian: Arc<dyn KeyCustodian>,
    negotiator: DealNegotiator,
}

impl DealClient {
    pub fn new(
        chain: Arc<dyn ChainReader>,
        custodian: Arc<dyn KeyCustodian>,
        negotiator: DealNegotiator,
    ) -> Self {
        Self {
            chain,
            custodian,
            negotiator,
        }
    }

    async fn resolve_epochs(&self, request: &DealRequest) -> Result<DealEpochs, DealError> {
        let head = if request.start.needs_head() {
            self.chain
                .chain_head_epoch()
                .await
                .map_err(DealError::ChainRead)?
        } else {
            0
        };
        resolve_epochs(request.start, request.duration, head)
    }

    /// Checks the request, queries the chain and signs the proposal. Nothing
    /// is sent.
    pub async fn prepare(&self, request: &DealRequest) -> Result<PreparedDeal, DealError> {
        let checked = request.check()?;
        let provider_collateral = resolve_provider_collateral(
            &request.provider_collateral,
            checked.piece_size,
            request.verified,
            self.chain.as_ref(),
        )
        .await?;
        let epochs = self.resolve_epochs(request).await?;
        let signer_id = self
            .chain
            .lookup_id(&request.signer)
            .await
            .map_err(DealError::ChainRead)?;
        let label = label_from_actor_id(&signer_id)?;

        let proposal = ProposalTerms {
            piece_cid: checked.piece_cid,
            piece_size: checked.piece_size,
            verified_deal: request.verified,
            client: checked.client,
            provider: checked.provider,
            label,
            epochs,
            price_per_gib_per_epoch: request.storage_price.clone(),
            provider_collateral,
        }
        .build()?;
        let client_deal_proposal =
            sign_proposal(self.custodian.as_ref(), &request.signer, proposal).await?;

        let params = DealParams {
            deal_uuid: Uuid::new_v4(),
            is_offline: request.is_offline(),
            client_deal_proposal,
            deal_data_root: checked.payload_cid,
            transfer: checked.transfer,
            remove_unsealed_copy: request.remove_unsealed_copy,
            skip_ipni_announce: request.skip_ipni_announce,
        };
        debug!(deal_uuid = %params.deal_uuid, "prepared deal proposal");
        Ok(PreparedDeal {
            params,
            signer: request.signer,
            transfer_url: checked.transfer_url,
        })
    }

    /// Sends a prepared deal over `conn` and waits for the answer.
    pub async fn send(
        &self,
        deal: PreparedDeal,
        conn: &dyn DealConnection,
        cancel: &CancellationToken,
    ) -> Result<DealReceipt, DealError> {
        let advertised = conn.protocols();
        let protocol = select_protocol(&self.negotiator.config().supported, &advertised)
            .ok_or_else(|| self.negotiator.unsupported(&advertised))?;
        let stream = conn
            .open_stream(protocol.clone())
            .await
            .map_err(|e| DealError::transport(false, e))?;
        info!(deal_uuid = %deal.params.deal_uuid, %protocol, "about to submit deal proposal");
        let outcome = self
            .negotiator
            .negotiate(stream, &advertised, &deal.params, cancel)
            .await?;
        Ok(DealReceipt {
            deal,
            protocol,
            outcome,
        })
    }

    /// Checks the request and the provider's protocols, prepares the deal
    /// and sends it. Nothing is signed or sent when a check fails.
    pub async fn make_deal(
        &self,
        request: &DealRequest,
        conn: &dyn DealConnection,
        cancel: &CancellationToken,
    ) -> Result<DealReceipt, DealError> {
        request.check()?;
        let advertised = conn.protocols();
        if select_protocol(&self.negotiator.config().supported, &advertised).is_none() {
            return Err(self.negotiator.unsupported(&advertised));
        }
        let deal = self.prepare(request).await?;
        self.send(deal, conn, cancel).await
    }
}
