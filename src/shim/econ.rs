// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use super::fvm_shared_latest::econ::TokenAmount;

/// Number of attoFIL in one FIL.
pub const FILECOIN_PRECISION: u64 = 1_000_000_000_000_000_000;
