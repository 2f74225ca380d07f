// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use super::fvm_shared_latest::clock::ChainEpoch;

/// Duration of each tipset epoch.
pub const EPOCH_DURATION_SECONDS: i64 = 30;
pub const SECONDS_IN_DAY: i64 = 86400;
pub const EPOCHS_IN_DAY: ChainEpoch = SECONDS_IN_DAY / EPOCH_DURATION_SECONDS;
