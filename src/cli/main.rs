// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::ffi::OsString;

use crate::cli_shared::logger;
use clap::Parser;
use tracing::debug;

use super::subcommands::{Cli, CommandContext};

pub fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    // Capture Cli inputs
    let Cli { opts, cmd } = Cli::parse_from(args);
    let (config_path, config) = opts.to_config()?;
    logger::setup_logger(&opts, &config.log);
    if let Some(path) = &config_path {
        debug!("using configuration at {}", path.to_path_buf().display());
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(cmd.run(CommandContext::new(config)))
}
