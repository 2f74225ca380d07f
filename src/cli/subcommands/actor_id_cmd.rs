// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use clap::Args;

use super::CommandContext;
use crate::deal::label::label_from_actor_id;

#[derive(Debug, Args)]
pub struct ActorIdCommand {
    /// Wallet address to look up. Defaults to the default wallet
    pub address: Option<String>,
}

impl ActorIdCommand {
    pub async fn run(self, ctx: CommandContext) -> anyhow::Result<()> {
        let lotus = ctx.lotus()?;
        ctx.set_network(Some(&lotus)).await?;
        let wallet = ctx.wallet()?;
        let addr = ctx.signer(&wallet, self.address.as_deref())?;
        println!("Using Filecoin Address: {addr}");

        let id = lotus.state_lookup_id(&addr).await?;
        println!("Actor ID: {}", label_from_actor_id(&id)?);
        Ok(())
    }
}
