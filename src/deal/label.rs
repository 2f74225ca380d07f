// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::DealError;
use crate::shim::address::Address;

/// Builds the deal label from the signer's ID address: the decimal actor id
/// without its `f0`/`t0` prefix. The contract receiving the deal uses it to
/// authenticate the signer.
pub fn label_from_actor_id(id_addr: &Address) -> Result<String, DealError> {
    label_from_actor_id_str(&id_addr.to_string())
}

pub fn label_from_actor_id_str(id: &str) -> Result<String, DealError> {
    match id.get(..2) {
        Some("f0" | "t0") if id.len() > 2 => Ok(id[2..].to_string()),
        _ => Err(DealError::InvalidLabelSource(id.to_string())),
    }
}
