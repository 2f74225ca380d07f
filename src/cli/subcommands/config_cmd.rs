// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Write;

use anyhow::Context as _;
use clap::Subcommand;

use super::CommandContext;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Dump the effective configuration, after defaults and overrides, as
    /// TOML
    Dump,
}

impl ConfigCommands {
    pub fn run(self, ctx: CommandContext, sink: &mut impl Write) -> anyhow::Result<()> {
        match self {
            Self::Dump => {
                let config = toml::to_string(&ctx.config)
                    .context("could not serialize the configuration")?;
                writeln!(sink, "{}", config.trim_end())
                    .context("failed to write the configuration")?;
                Ok(())
            }
        }
    }
}
