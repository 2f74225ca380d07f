// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Conversions between the price units used by providers and the per-epoch
//! amounts recorded in a deal proposal. All arithmetic is exact and rounds
//! towards negative infinity.

use bigdecimal::BigDecimal;
use num::{BigInt, Integer as _, Zero as _};
use tracing::debug;

use super::chain::ChainReader;
use super::errors::DealError;
use crate::shim::{
    clock::{ChainEpoch, EPOCHS_IN_DAY},
    econ::{FILECOIN_PRECISION, TokenAmount},
    piece::{GIB, PaddedPieceSize, TIB},
};

/// Epochs in a 30 day month.
pub const EPOCHS_PER_MONTH: ChainEpoch = 30 * EPOCHS_IN_DAY;

/// Converts a price in FIL per TiB per month into attoFIL per byte per epoch.
pub fn convert_price(price_per_tib_per_month: &BigDecimal) -> TokenAmount {
    let (mantissa, scale) = price_per_tib_per_month.as_bigint_and_exponent();
    let mut numerator = mantissa * BigInt::from(FILECOIN_PRECISION);
    let mut denominator = BigInt::from(TIB) * BigInt::from(EPOCHS_PER_MONTH);
    // value = mantissa * 10^-scale
    match u32::try_from(scale) {
        Ok(exp) => denominator *= BigInt::from(10).pow(exp),
        Err(_) => numerator *= BigInt::from(10).pow(scale.unsigned_abs() as u32),
    }
    TokenAmount::from_atto(numerator.div_floor(&denominator))
}

/// Total price per epoch of storing `piece_size` bytes at
/// `price_per_gib_per_epoch` attoFIL per GiB per epoch.
pub fn storage_price_per_epoch(
    piece_size: PaddedPieceSize,
    price_per_gib_per_epoch: &TokenAmount,
) -> TokenAmount {
    let total = BigInt::from(piece_size.0) * price_per_gib_per_epoch.atto();
    TokenAmount::from_atto(total.div_floor(&BigInt::from(GIB)))
}

/// Minimum collateral plus 20%.
pub fn collateral_with_margin(min: &TokenAmount) -> TokenAmount {
    TokenAmount::from_atto((min.atto() * BigInt::from(6)).div_floor(&BigInt::from(5)))
}

/// Uses a non-zero `supplied` collateral as is, otherwise the chain's minimum
/// for this piece plus a 20% margin.
pub async fn resolve_provider_collateral(
    supplied: &TokenAmount,
    piece_size: PaddedPieceSize,
    verified: bool,
    chain: &dyn ChainReader,
) -> Result<TokenAmount, DealError> {
    if !supplied.atto().is_zero() {
        return Ok(supplied.clone());
    }
    let bounds = chain
        .deal_provider_collateral_bounds(piece_size, verified)
        .await
        .map_err(DealError::ChainRead)?;
    let collateral = collateral_with_margin(&bounds.min);
    debug!(
        min = %bounds.min.atto(),
        max = %bounds.max.atto(),
        collateral = %collateral.atto(),
        "resolved provider collateral from chain bounds"
    );
    Ok(collateral)
}
