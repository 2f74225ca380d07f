// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod cli;
mod cli_shared;
mod deal;
mod eth;
mod key_management;
mod libp2p;
mod networks;
mod rpc_client;
mod shim;
mod utils;

/// These items are semver-exempt, and exist for forest author use only
// We want to have doctests, but don't want our internals to be public because:
// - We don't want to be concerned with library compat
//   (We want our cargo semver to be _for the command line_).
// - We don't want to mistakenly export items which we never actually use.
//
// So we re-export the relevant items and test with `cargo test --doc --features doctest-private`
#[cfg(feature = "doctest-private")]
#[doc(hidden)]
pub mod doctest_private {
    pub use crate::utils::{encoding::blake2b_256, io::read_toml};
}

pub use cli::main::main as forest_deal_main;
