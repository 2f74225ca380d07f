// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// info that corresponds to key does not exist
    #[error("Key info not found")]
    KeyInfo,
    /// Key already exists in key store
    #[error("Key already exists")]
    KeyExists,
    #[error("Key does not exist")]
    KeyNotExists,
    #[error(transparent)]
    IO(#[from] io::Error),
    #[error("Keystore file is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}
