// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod actor_id_cmd;
mod config_cmd;
mod deal_cmd;
mod price_cmd;
mod wallet_cmd;

pub(super) use self::{
    actor_id_cmd::ActorIdCommand, config_cmd::ConfigCommands, deal_cmd::DealCommands,
    price_cmd::PriceCommands, wallet_cmd::WalletCommands,
};
use crate::cli_shared::cli::{CliOpts, Config};
use crate::key_management::{KeyStore, KeyStoreConfig, Wallet};
use crate::networks::NetworkChain;
use crate::rpc_client::{ApiInfo, DEFAULT_TIMEOUT, LotusClient};
use crate::shim::address::{Address, CurrentNetwork, parse_address};
use crate::utils::io::expand_home;
use anyhow::Context as _;
use clap::Parser;
use tracing::debug;

/// CLI structure generated when interacting with the forest-deal binary
#[derive(Parser)]
#[command(name = "forest-deal", author = env!("CARGO_PKG_AUTHORS"), version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    #[command(flatten)]
    pub opts: CliOpts,
    #[command(subcommand)]
    pub cmd: Subcommand,
}

/// forest-deal sub-commands available.
#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Make storage deals on behalf of a deal client contract
    #[command(subcommand)]
    Deal(DealCommands),

    /// Manage the local wallet
    #[command(subcommand)]
    Wallet(WalletCommands),

    /// Print the actor id of a wallet address, the deal label it signs with
    ActorId(ActorIdCommand),

    /// Storage price helpers
    #[command(subcommand)]
    Price(PriceCommands),

    /// Inspect the configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Subcommand {
    pub async fn run(self, ctx: CommandContext) -> anyhow::Result<()> {
        match self {
            Subcommand::Deal(cmd) => cmd.run(ctx).await,
            Subcommand::Wallet(cmd) => cmd.run(ctx).await,
            Subcommand::ActorId(cmd) => cmd.run(ctx).await,
            Subcommand::Price(cmd) => cmd.run(&mut std::io::stdout()),
            Subcommand::Config(cmd) => cmd.run(ctx, &mut std::io::stdout()),
        }
    }
}

/// Effective configuration plus the helpers commands use to reach the node
/// and the keystore.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
}

impl CommandContext {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn lotus(&self) -> anyhow::Result<LotusClient> {
        let info: ApiInfo = self
            .config
            .client
            .api_url
            .parse()
            .with_context(|| format!("invalid api url {}", self.config.client.api_url))?;
        let info = info.set_token(self.config.client.api_token.clone());
        debug!(api = %info, "using lotus endpoint");
        LotusClient::new(&info, DEFAULT_TIMEOUT)
    }

    pub fn wallet(&self) -> anyhow::Result<Wallet> {
        let dir = expand_home(&self.config.client.keystore_dir);
        let keystore = KeyStore::new(KeyStoreConfig::Persistent(dir.clone()))
            .with_context(|| format!("opening keystore in {}", dir.display()))?;
        Ok(Wallet::new(keystore))
    }

    /// Sets the address prefix for output. Uses the configured chain, or
    /// asks the node when one is given.
    pub async fn set_network(&self, lotus: Option<&LotusClient>) -> anyhow::Result<()> {
        let chain = match (&self.config.client.chain, lotus) {
            (Some(chain), _) => chain.clone(),
            (None, Some(lotus)) => lotus.state_network_name().await?.parse()?,
            (None, None) => NetworkChain::default(),
        };
        debug!(%chain, "address network");
        CurrentNetwork::set_global(chain.address_network());
        Ok(())
    }

    /// The given address, or the wallet's default one.
    pub fn signer(&self, wallet: &Wallet, address: Option<&str>) -> anyhow::Result<Address> {
        match address {
            Some(addr) => parse_address(addr).with_context(|| format!("invalid address {addr}")),
            None => wallet
                .get_default()?
                .context("no wallet address given and no default wallet set"),
        }
    }
}
