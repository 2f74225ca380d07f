// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use anyhow::Context as _;
use clap::{ArgAction, Args, Subcommand};
use num::BigInt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use super::CommandContext;
use crate::deal::{
    DEFAULT_DEAL_DURATION, DealClient, DealRequest, StartEpochSpec, TransferRequest,
    proposal::parse_chain_address,
};
use crate::libp2p::{
    ProviderConnection,
    deal::{DealNegotiator, NegotiationOutcome},
};
use crate::shim::{clock::ChainEpoch, econ::TokenAmount};

/// Flags shared by online and offline deals.
#[derive(Debug, Clone, Args)]
pub struct DealArgs {
    /// Storage provider on-chain address
    #[arg(long)]
    pub provider: String,
    /// Piece CID (commp) of the CAR file
    #[arg(long)]
    pub commp: String,
    /// Size of the CAR file as a padded piece
    #[arg(long)]
    pub piece_size: u64,
    /// Root CID of the CAR file
    #[arg(long)]
    pub payload_cid: String,
    /// Ethereum address of the deal client contract
    #[arg(long, short)]
    pub contract: String,
    /// Start epoch relative to the current chain head
    #[arg(long, default_value_t = 0)]
    pub start_epoch_head_offset: ChainEpoch,
    /// Absolute start epoch
    #[arg(long, default_value_t = 0)]
    pub start_epoch: ChainEpoch,
    /// Duration of the deal in epochs
    #[arg(long, default_value_t = DEFAULT_DEAL_DURATION)]
    pub duration: ChainEpoch,
    /// Provider collateral in attoFIL. 0 uses the chain minimum plus 20%
    #[arg(long, default_value = "0")]
    pub provider_collateral: BigInt,
    /// Storage price in attoFIL per epoch per GiB
    #[arg(long, default_value = "1")]
    pub storage_price: BigInt,
    /// Whether the deal funds come from the client's verified data cap
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub verified: bool,
    /// The provider does not need to keep an unsealed copy for fast retrieval
    #[arg(long)]
    pub remove_unsealed_copy: bool,
    /// Do not announce the deal to the network indexer
    #[arg(long)]
    pub skip_ipni_announce: bool,
    /// Wallet address signing the proposal. Defaults to the default wallet
    #[arg(long)]
    pub wallet: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DealCommands {
    /// Make a deal where the provider downloads the CAR file over HTTP
    Online {
        #[command(flatten)]
        args: DealArgs,
        /// HTTP URL of the CAR file
        #[arg(long)]
        http_url: Url,
        /// HTTP headers sent with the download, as key=value
        #[arg(long)]
        http_headers: Vec<String>,
        /// Size of the CAR file in bytes
        #[arg(long)]
        car_size: u64,
    },
    /// Make a deal whose data is imported by the provider out of band
    Offline {
        #[command(flatten)]
        args: DealArgs,
    },
}

impl DealCommands {
    fn into_request(self, ctx: &CommandContext) -> anyhow::Result<DealRequest> {
        let (args, transfer) = match self {
            DealCommands::Online {
                args,
                http_url,
                http_headers,
                car_size,
            } => (
                args,
                TransferRequest::Http {
                    url: http_url,
                    headers: http_headers,
                    car_size,
                },
            ),
            DealCommands::Offline { args } => (args, TransferRequest::Offline),
        };
        let wallet = ctx.wallet()?;
        let signer = ctx.signer(&wallet, args.wallet.as_deref())?;
        Ok(DealRequest {
            provider: args.provider,
            piece_cid: args.commp,
            piece_size: args.piece_size,
            payload_cid: args.payload_cid,
            client_contract: args.contract,
            signer,
            start: StartEpochSpec {
                head_offset: args.start_epoch_head_offset,
                explicit_start: args.start_epoch,
            },
            duration: args.duration,
            provider_collateral: TokenAmount::from_atto(args.provider_collateral),
            storage_price: TokenAmount::from_atto(args.storage_price),
            verified: args.verified,
            remove_unsealed_copy: args.remove_unsealed_copy,
            skip_ipni_announce: args.skip_ipni_announce,
            transfer,
        })
    }

    pub async fn run(self, ctx: CommandContext) -> anyhow::Result<()> {
        let request = self.into_request(&ctx)?;
        // Fail on bad input before touching the node or the provider.
        let checked = request.check()?;

        let lotus = Arc::new(ctx.lotus()?);
        ctx.set_network(Some(lotus.as_ref())).await?;
        println!("selected wallet {}", request.signer);

        let provider = parse_chain_address("provider address", &request.provider)?;
        let peer = lotus
            .state_miner_info(&provider)
            .await?
            .peer_addr_info()
            .with_context(|| format!("resolving storage provider {provider}"))?;
        info!(peer_id = %peer.peer_id, addrs = ?peer.addrs, %provider, "found storage provider");

        let conn = ProviderConnection::connect(&peer, ctx.config.deal.connect_timeout).await?;

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, abandoning deal");
                on_interrupt.cancel();
            }
        });

        let client = DealClient::new(
            lotus,
            Arc::new(ctx.wallet()?),
            DealNegotiator::new(ctx.config.deal.negotiator_config()?),
        );
        let receipt = client
            .make_deal(&request, &conn, &cancel)
            .await
            .with_context(|| format!("deal with {} failed", checked.provider))?;

        match &receipt.outcome {
            NegotiationOutcome::Accepted { message } => {
                if !message.is_empty() {
                    info!(%message, "provider accepted the deal");
                }
                print!("{receipt}");
                Ok(())
            }
            NegotiationOutcome::Rejected { message } => {
                anyhow::bail!("deal proposal rejected: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::subcommands::Cli;
    use crate::cli_shared::cli::Config;
    use crate::key_management::KeyStoreConfig;
    use crate::shim::crypto::SignatureType;
    use clap::Parser as _;

    fn parse(args: &[&str]) -> DealCommands {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.cmd {
            crate::cli::subcommands::Subcommand::Deal(cmd) => cmd,
            _ => panic!("not a deal command"),
        }
    }

    const COMMON: &[&str] = &[
        "--provider",
        "f01000",
        "--commp",
        "baga6ea4seaqao7s73y24kcutaosvacpdjgfe5pw76ooefnyqw4ynr3d2y6x2mpq",
        "--piece-size",
        "34359738368",
        "--payload-cid",
        "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi",
        "--contract",
        "0xd4c5fb16488aa48081296299d54b0c648c9333da",
    ];

    fn context_with_wallet() -> (tempfile::TempDir, CommandContext) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.client.keystore_dir = dir.path().to_path_buf();
        let ctx = CommandContext::new(config);
        let mut wallet = ctx.wallet().unwrap();
        wallet.generate_addr(SignatureType::Secp256k1).unwrap();
        (dir, ctx)
    }

    #[test]
    fn offline_deal_defaults() {
        let mut args = vec!["forest-deal", "deal", "offline"];
        args.extend_from_slice(COMMON);
        let (_dir, ctx) = context_with_wallet();
        let request = parse(&args).into_request(&ctx).unwrap();

        assert_eq!(request.duration, DEFAULT_DEAL_DURATION);
        assert_eq!(request.start, StartEpochSpec::default());
        assert!(request.verified);
        assert_eq!(request.storage_price, TokenAmount::from_atto(1));
        assert_eq!(request.transfer, TransferRequest::Offline);
        assert_eq!(
            Some(request.signer),
            ctx.wallet().unwrap().get_default().unwrap()
        );
        request.check().unwrap();
    }

    #[test]
    fn online_deal_flags() {
        let mut args = vec![
            "forest-deal",
            "deal",
            "online",
            "--http-url",
            "https://example.com/data.car",
            "--http-headers",
            "Authorization=Bearer x",
            "--car-size",
            "1024",
            "--verified",
            "false",
            "--start-epoch",
            "2000",
        ];
        args.extend_from_slice(COMMON);
        let (_dir, ctx) = context_with_wallet();
        let request = parse(&args).into_request(&ctx).unwrap();
        assert!(!request.verified);
        assert_eq!(request.start.explicit_start, 2000);
        assert!(matches!(
            request.transfer,
            TransferRequest::Http { car_size: 1024, ref headers, .. } if headers.len() == 1
        ));
    }

    #[test]
    fn online_deal_requires_url() {
        let mut args = vec!["forest-deal", "deal", "online", "--car-size", "1024"];
        args.extend_from_slice(COMMON);
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn missing_wallet_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.client.keystore_dir = dir.path().to_path_buf();
        let ctx = CommandContext::new(config);
        let mut args = vec!["forest-deal", "deal", "offline"];
        args.extend_from_slice(COMMON);
        assert!(parse(&args).into_request(&ctx).is_err());
        assert!(
            crate::key_management::KeyStore::new(KeyStoreConfig::Persistent(
                dir.path().to_path_buf()
            ))
            .unwrap()
            .list()
            .is_empty()
        );
    }
}
