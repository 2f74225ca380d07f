// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use async_trait::async_trait;
use tracing::debug;

use super::errors::Error;
use super::keystore::{KeyInfo, KeyStore};
use super::wallet_helpers;
use crate::deal::signer::{KeyCustodian, MessageType};
use crate::shim::address::{Address, parse_address};
use crate::shim::crypto::{Signature, SignatureType};

const WALLET_PREFIX: &str = "wallet-";
const DEFAULT_KEY: &str = "default";

/// A key resolved from its `KeyInfo`.
#[derive(Clone, PartialEq, Debug, Eq)]
pub struct Key {
    pub key_info: KeyInfo,
    pub public_key: Vec<u8>,
    pub address: Address,
}

impl TryFrom<KeyInfo> for Key {
    type Error = Error;

    fn try_from(key_info: KeyInfo) -> Result<Self, Self::Error> {
        let public_key = wallet_helpers::to_public(*key_info.key_type(), key_info.private_key())?;
        let address = wallet_helpers::new_address(*key_info.key_type(), &public_key)?;
        Ok(Key {
            key_info,
            public_key,
            address,
        })
    }
}

/// Generates a new key of the given type.
pub fn generate_key(typ: SignatureType) -> Result<Key, Error> {
    let private_key = wallet_helpers::generate(typ)?;
    Key::try_from(KeyInfo::new(typ, private_key))
}

/// A set of keys backed by a [`KeyStore`]. Keys are stored under
/// `wallet-<address>`, the default one additionally under `default`.
#[derive(Clone, PartialEq, Debug, Eq)]
pub struct Wallet {
    keystore: KeyStore,
}

impl Wallet {
    pub fn new(keystore: KeyStore) -> Self {
        Wallet { keystore }
    }

    /// Looks up the key for `addr`. Key names are compared as addresses, so a
    /// key saved under one network prefix is found under the other.
    pub fn find_key(&self, addr: &Address) -> Result<Key, Error> {
        for name in self.keystore.list() {
            let Some(stored) = name.strip_prefix(WALLET_PREFIX) else {
                continue;
            };
            if parse_address(stored).is_ok_and(|stored| stored == *addr) {
                return Key::try_from(self.keystore.get(&name)?);
            }
        }
        Err(Error::KeyNotExists)
    }

    pub fn has_key(&self, addr: &Address) -> bool {
        self.find_key(addr).is_ok()
    }

    pub fn export(&self, addr: &Address) -> Result<KeyInfo, Error> {
        Ok(self.find_key(addr)?.key_info)
    }

    pub fn import(&mut self, key_info: KeyInfo) -> Result<Address, Error> {
        let k = Key::try_from(key_info)?;
        if self.has_key(&k.address) {
            return Err(Error::KeyExists);
        }
        self.keystore
            .put(&format!("{WALLET_PREFIX}{}", k.address), k.key_info)?;
        Ok(k.address)
    }

    pub fn list_addrs(&self) -> Result<Vec<Address>, Error> {
        self.keystore
            .list()
            .iter()
            .filter_map(|name| name.strip_prefix(WALLET_PREFIX))
            .map(|name| parse_address(name).map_err(|err| Error::Other(err.to_string())))
            .collect()
    }

    /// Returns the default address, if one is set.
    pub fn get_default(&self) -> Result<Option<Address>, Error> {
        match self.keystore.get(DEFAULT_KEY) {
            Ok(key_info) => Ok(Some(Key::try_from(key_info)?.address)),
            Err(Error::KeyInfo) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set_default(&mut self, addr: &Address) -> Result<(), Error> {
        let key = self.find_key(addr)?;
        match self.keystore.remove(DEFAULT_KEY) {
            Ok(_) | Err(Error::KeyInfo) => {}
            Err(e) => return Err(e),
        }
        self.keystore.put(DEFAULT_KEY, key.key_info)
    }

    /// Generates a new key, saves it and makes it the default if there was
    /// none.
    pub fn generate_addr(&mut self, typ: SignatureType) -> Result<Address, Error> {
        let key = generate_key(typ)?;
        self.keystore
            .put(&format!("{WALLET_PREFIX}{}", key.address), key.key_info.clone())?;
        if self.get_default()?.is_none() {
            self.keystore.put(DEFAULT_KEY, key.key_info)?;
        }
        Ok(key.address)
    }

    pub fn sign(&self, addr: &Address, msg: &[u8]) -> Result<Signature, Error> {
        let key = self.find_key(addr)?;
        wallet_helpers::sign(*key.key_info.key_type(), key.key_info.private_key(), msg)
    }
}

#[async_trait]
impl KeyCustodian for Wallet {
    async fn sign(
        &self,
        signer: &Address,
        data: &[u8],
        purpose: MessageType,
    ) -> anyhow::Result<Signature> {
        debug!(%signer, %purpose, len = data.len(), "signing with local wallet");
        Ok(Wallet::sign(self, signer, data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_management::KeyStoreConfig;

    fn memory_wallet() -> Wallet {
        Wallet::new(KeyStore::new(KeyStoreConfig::Memory).unwrap())
    }

    #[test]
    fn first_generated_key_becomes_default() {
        let mut wallet = memory_wallet();
        assert_eq!(wallet.get_default().unwrap(), None);
        let first = wallet.generate_addr(SignatureType::Secp256k1).unwrap();
        let second = wallet.generate_addr(SignatureType::Bls).unwrap();
        assert_eq!(wallet.get_default().unwrap(), Some(first));

        wallet.set_default(&second).unwrap();
        assert_eq!(wallet.get_default().unwrap(), Some(second));

        let mut addrs = wallet.list_addrs().unwrap();
        addrs.sort_by_key(|a| a.to_string());
        let mut expected = vec![first, second];
        expected.sort_by_key(|a| a.to_string());
        assert_eq!(addrs, expected);
    }

    #[test]
    fn import_and_export() {
        let mut wallet = memory_wallet();
        let key = generate_key(SignatureType::Delegated).unwrap();
        let addr = wallet.import(key.key_info.clone()).unwrap();
        assert_eq!(addr, key.address);
        assert_eq!(wallet.export(&addr).unwrap(), key.key_info);
        assert!(matches!(
            wallet.import(key.key_info),
            Err(Error::KeyExists)
        ));
    }

    #[test]
    fn unknown_address_has_no_key() {
        let wallet = memory_wallet();
        let addr = Address::new_id(1000);
        assert!(!wallet.has_key(&addr));
        assert!(matches!(wallet.sign(&addr, b"x"), Err(Error::KeyNotExists)));
        assert!(matches!(
            memory_wallet().set_default(&addr),
            Err(Error::KeyNotExists)
        ));
    }

    #[tokio::test]
    async fn wallet_signs_as_custodian() {
        let mut wallet = memory_wallet();
        let addr = wallet.generate_addr(SignatureType::Secp256k1).unwrap();
        let custodian: &dyn KeyCustodian = &wallet;
        let sig = custodian
            .sign(&addr, b"proposal", MessageType::DealProposal)
            .await
            .unwrap();
        sig.verify(b"proposal", &addr).unwrap();
    }
}
