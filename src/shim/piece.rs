// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use super::fvm_shared_latest::piece::PaddedPieceSize;

/// Size of one GiB, the unit deal prices are quoted against.
pub const GIB: u64 = 1 << 30;
/// Size of one TiB, the unit provider registration prices are quoted against.
pub const TIB: u64 = 1 << 40;

/// Padded piece sizes are powers of two.
pub fn is_valid_padded_size(size: PaddedPieceSize) -> bool {
    size.0.is_power_of_two()
}
