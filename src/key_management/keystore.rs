// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, base64::Base64, serde_as};
use tracing::{debug, warn};

use super::errors::Error;
use crate::shim::crypto::SignatureType;
use crate::utils::io::write_new_sensitive_file;

pub const KEYSTORE_NAME: &str = "keystore.json";

/// `KeyInfo` contains the type of key and the private key. Its JSON form is
/// the one produced by `lotus wallet export`:
/// `{"Type":"secp256k1","PrivateKey":"<base64>"}`.
#[serde_as]
#[derive(Clone, PartialEq, Debug, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    #[serde(rename = "Type")]
    #[serde_as(as = "DisplayFromStr")]
    key_type: SignatureType,
    #[serde(rename = "PrivateKey")]
    #[serde_as(as = "Base64")]
    private_key: Vec<u8>,
}

impl KeyInfo {
    /// Return a new `KeyInfo` given the key type and private key
    pub fn new(key_type: SignatureType, private_key: Vec<u8>) -> Self {
        KeyInfo {
            key_type,
            private_key,
        }
    }

    pub fn key_type(&self) -> &SignatureType {
        &self.key_type
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// Decodes a hex-encoded Lotus key export (hex of the JSON form above).
    pub fn from_lotus_hex(encoded: &str) -> anyhow::Result<Self> {
        use anyhow::Context as _;

        let decoded = hex::decode(encoded.trim()).context("Key must be hex encoded")?;
        let json = std::str::from_utf8(&decoded).context("Key must be UTF-8 JSON")?;
        serde_json::from_str(json).context("invalid key format")
    }

    /// Hex-encoded JSON, the format accepted by `lotus wallet import`.
    pub fn to_lotus_hex(&self) -> anyhow::Result<String> {
        Ok(hex::encode(serde_json::to_string(self)?))
    }
}

/// Where a [`KeyStore`] keeps its keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyStoreConfig {
    Memory,
    Persistent(PathBuf),
}

/// `KeyStore` is a set of `KeyInfo`s resolved by name. Persistent stores are
/// flushed to disk after every mutation.
#[derive(Clone, PartialEq, Debug, Eq)]
pub struct KeyStore {
    key_info: BTreeMap<String, KeyInfo>,
    persistence: Option<PathBuf>,
}

impl KeyStore {
    pub fn new(config: KeyStoreConfig) -> Result<Self, Error> {
        match config {
            KeyStoreConfig::Memory => Ok(Self {
                key_info: BTreeMap::new(),
                persistence: None,
            }),
            KeyStoreConfig::Persistent(location) => {
                let file_path = location.join(KEYSTORE_NAME);
                let key_info = Self::load(&file_path)?;
                Ok(Self {
                    key_info,
                    persistence: Some(file_path),
                })
            }
        }
    }

    fn load(file_path: &Path) -> Result<BTreeMap<String, KeyInfo>, Error> {
        match std::fs::read(file_path) {
            Ok(bytes) if bytes.is_empty() => {
                warn!("Keystore file {} is empty", file_path.display());
                Ok(BTreeMap::new())
            }
            Ok(bytes) => {
                let keys: BTreeMap<String, KeyInfo> = serde_json::from_slice(&bytes)?;
                debug!("Loaded {} keys from {}", keys.len(), file_path.display());
                Ok(keys)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Keystore does not exist, initializing new keystore");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the key store to disk, if it is persistent.
    pub fn flush(&self) -> Result<(), Error> {
        if let Some(path) = &self.persistence {
            let data = serde_json::to_vec_pretty(&self.key_info)?;
            write_new_sensitive_file(&data, path)?;
        }
        Ok(())
    }

    /// Return all of the key names that are stored in the `KeyStore`
    pub fn list(&self) -> Vec<String> {
        self.key_info.keys().cloned().collect()
    }

    /// Return `KeyInfo` that corresponds to a given key
    pub fn get(&self, k: &str) -> Result<KeyInfo, Error> {
        self.key_info.get(k).cloned().ok_or(Error::KeyInfo)
    }

    /// Save a key/`KeyInfo` pair to the `KeyStore`
    pub fn put(&mut self, key: &str, key_info: KeyInfo) -> Result<(), Error> {
        if self.key_info.contains_key(key) {
            return Err(Error::KeyExists);
        }
        self.key_info.insert(key.to_string(), key_info);
        self.flush()
    }

    /// Remove the key and corresponding `KeyInfo` from the `KeyStore`
    pub fn remove(&mut self, key: &str) -> Result<KeyInfo, Error> {
        let key_out = self.key_info.remove(key).ok_or(Error::KeyInfo)?;
        self.flush()?;
        Ok(key_out)
    }
}
