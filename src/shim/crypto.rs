// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::address::{Address, Protocol};
use crate::eth::EthAddress;
use crate::utils::encoding::{blake2b_256, keccak_256};
use anyhow::{Context as _, ensure};
use bls_signatures::{
    PublicKey as BlsPublicKey, Serialize as _, Signature as BlsSignature,
};
use fvm_ipld_encoding::{
    de,
    repr::{Deserialize_repr, Serialize_repr},
    ser, strict_bytes,
};
use k256::elliptic_curve::sec1::ToEncodedPoint as _;
use std::borrow::Cow;

/// Secp256k1 signature length in bytes (`r || s || v`).
pub const SECP_SIG_LEN: usize = 65;
/// Uncompressed secp256k1 public key length in bytes.
const SECP_PUB_LEN: usize = 65;

/// A cryptographic signature, represented in bytes, of any key protocol.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub sig_type: SignatureType,
    pub bytes: Vec<u8>,
}

impl ser::Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        strict_bytes::Serialize::serialize(&self.to_bytes(), serializer)
    }
}

impl<'de> de::Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        let bytes: Cow<'de, [u8]> = strict_bytes::Deserialize::deserialize(deserializer)?;
        match bytes.split_first() {
            None => Err(de::Error::custom("Cannot deserialize empty bytes")),
            Some((&sig_byte, rest)) => {
                // Remove signature type byte
                let sig_type = SignatureType::try_from(sig_byte).map_err(|_| {
                    de::Error::custom(format!(
                        "Invalid signature type byte (must be 1, 2 or 3), was {sig_byte}"
                    ))
                })?;

                Ok(Signature {
                    bytes: rest.to_vec(),
                    sig_type,
                })
            }
        }
    }
}

impl Signature {
    pub fn new(sig_type: SignatureType, bytes: Vec<u8>) -> Self {
        Self { sig_type, bytes }
    }

    /// Creates a BLS Signature given the raw bytes.
    pub fn new_bls(bytes: Vec<u8>) -> Self {
        Self::new(SignatureType::Bls, bytes)
    }

    /// Creates a SECP Signature given the raw bytes.
    pub fn new_secp256k1(bytes: Vec<u8>) -> Self {
        Self::new(SignatureType::Secp256k1, bytes)
    }

    /// Creates a Delegated Signature given the raw bytes.
    pub fn new_delegated(bytes: Vec<u8>) -> Self {
        Self::new(SignatureType::Delegated, bytes)
    }

    /// Creates a signature from bytes whose first byte is the signature type.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let (first_byte, signature_data) = bytes
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("Empty signature bytes"))?;
        let sig_type = SignatureType::try_from(*first_byte)?;
        Ok(Self::new(sig_type, signature_data.to_vec()))
    }

    /// Returns the signature bytes including the signature type byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.bytes.len() + 1);
        bytes.push(self.sig_type as u8);
        bytes.extend_from_slice(&self.bytes);
        bytes
    }

    pub fn signature_type(&self) -> SignatureType {
        self.sig_type
    }

    /// Returns reference to signature bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Checks if a signature is valid given data and address.
    pub fn verify(&self, data: &[u8], addr: &Address) -> anyhow::Result<()> {
        match self.sig_type {
            SignatureType::Bls => verify_bls_sig(&self.bytes, data, addr),
            SignatureType::Secp256k1 => verify_secp256k1_sig(&self.bytes, data, addr),
            SignatureType::Delegated => verify_delegated_sig(&self.bytes, data, addr),
        }
    }
}

/// Recovers the uncompressed public key that produced a secp256k1 signature
/// over a 32-byte digest.
pub fn recover_secp_public_key(
    hash: &[u8; 32],
    signature: &[u8],
) -> anyhow::Result<[u8; SECP_PUB_LEN]> {
    let sig: &[u8; SECP_SIG_LEN] = signature.try_into().with_context(|| {
        format!(
            "invalid secp256k1 signature length. Was {}, must be {}",
            signature.len(),
            SECP_SIG_LEN,
        )
    })?;
    let (rs, v) = sig.split_at(64);
    let recovery_id = k256::ecdsa::RecoveryId::from_byte(v[0])
        .with_context(|| format!("invalid recovery id {}", v[0]))?;
    let sig = k256::ecdsa::Signature::from_slice(rs)?;
    let key = k256::ecdsa::VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)?;
    let point = key.as_affine().to_encoded_point(false);
    point
        .as_bytes()
        .try_into()
        .context("recovered public key has unexpected length")
}

/// Returns an error if a secp256k1 signature over `blake2b_256(data)` was not
/// produced by the key behind `addr`.
pub fn verify_secp256k1_sig(signature: &[u8], data: &[u8], addr: &Address) -> anyhow::Result<()> {
    ensure!(
        addr.protocol() == Protocol::Secp256k1,
        "cannot validate a secp256k1 signature against a {} address",
        addr.protocol()
    );
    let pub_key = recover_secp_public_key(&blake2b_256(data), signature)?;
    let rec_addr = Address::new_secp256k1(&pub_key)?;
    ensure!(rec_addr == *addr, "Secp256k1 signature verification failed");
    Ok(())
}

/// Returns an error if a BLS signature is invalid.
pub fn verify_bls_sig(signature: &[u8], data: &[u8], addr: &Address) -> anyhow::Result<()> {
    ensure!(
        addr.protocol() == Protocol::BLS,
        "cannot validate a BLS signature against a {} address",
        addr.protocol()
    );
    let pub_key = BlsPublicKey::from_bytes(&addr.payload_bytes())?;
    let sig = BlsSignature::from_bytes(signature)?;
    ensure!(
        bls_signatures::verify_messages(&sig, &[data], &[pub_key]),
        "bls signature verification failed for addr: {addr}"
    );
    Ok(())
}

/// Returns an error if a delegated signature is invalid.
pub fn verify_delegated_sig(signature: &[u8], data: &[u8], addr: &Address) -> anyhow::Result<()> {
    ensure!(
        addr.protocol() == Protocol::Delegated,
        "cannot validate a delegated signature against a {} address",
        addr.protocol()
    );

    let pub_key = recover_secp_public_key(&keccak_256(data), signature)?;
    let eth_addr = EthAddress::eth_address_from_pub_key(&pub_key)?;
    let rec_addr = eth_addr.to_filecoin_address()?;

    // check address against recovered address
    ensure!(rec_addr == *addr, "Delegated signature verification failed");

    Ok(())
}

/// Signature variants for Filecoin signatures.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Copy,
    Eq,
    Serialize_repr,
    Deserialize_repr,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
pub enum SignatureType {
    Secp256k1 = 1,
    Bls = 2,
    Delegated = 3,
}

impl TryFrom<u8> for SignatureType {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SignatureType::Secp256k1),
            2 => Ok(SignatureType::Bls),
            3 => Ok(SignatureType::Delegated),
            invalid => anyhow::bail!("Invalid signature type byte: {}", invalid),
        }
    }
}
