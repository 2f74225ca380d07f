// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Write;

use bigdecimal::BigDecimal;
use clap::Subcommand;

use crate::deal::pricing::convert_price;

#[derive(Debug, Subcommand)]
pub enum PriceCommands {
    /// Convert a price in FIL per TiB per month into attoFIL per byte per
    /// epoch
    Convert {
        /// Price in FIL per TiB per month
        #[arg(allow_negative_numbers = true)]
        price: BigDecimal,
    },
}

impl PriceCommands {
    pub fn run(self, out: &mut impl Write) -> anyhow::Result<()> {
        match self {
            Self::Convert { price } => {
                writeln!(out, "{}", convert_price(&price).atto())?;
            }
        }
        Ok(())
    }
}
