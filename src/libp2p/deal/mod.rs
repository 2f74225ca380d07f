// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod codec;
mod negotiator;

pub use codec::*;
pub use negotiator::*;
