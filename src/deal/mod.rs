// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Building, signing and sending storage deal proposals on behalf of a
//! deal client contract.

pub mod chain;
pub mod client;
pub mod epoch;
mod errors;
pub mod label;
pub mod params;
pub mod pricing;
pub mod proposal;
pub mod signer;

pub use client::{DealClient, DealRequest, TransferRequest};
pub use epoch::{DEFAULT_DEAL_DURATION, StartEpochSpec};
pub use errors::DealError;
