// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::Error;
use crate::eth::EthAddress;
use crate::shim::{
    address::Address,
    crypto::{SECP_SIG_LEN, Signature, SignatureType},
};
use crate::utils::encoding::{blake2b_256, keccak_256};
use bls_signatures::{PrivateKey as BlsPrivate, Serialize};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint as _;
use rand::rngs::OsRng;

fn secp_signing_key(private_key: &[u8]) -> Result<SigningKey, Error> {
    SigningKey::from_slice(private_key).map_err(|err| Error::Other(err.to_string()))
}

/// Signs a 32-byte digest, returning `r || s || recovery_id`.
fn sign_secp_digest(private_key: &[u8], digest: &[u8; 32]) -> Result<Vec<u8>, Error> {
    let priv_key = secp_signing_key(private_key)?;
    let (sig, recovery_id) = priv_key
        .sign_prehash_recoverable(digest)
        .map_err(|err| Error::Other(err.to_string()))?;
    let mut new_bytes = [0; SECP_SIG_LEN];
    new_bytes[..64].copy_from_slice(&sig.to_bytes());
    new_bytes[64] = recovery_id.to_byte();
    Ok(new_bytes.to_vec())
}

/// Return the public key for a given private key and `SignatureType`
pub fn to_public(sig_type: SignatureType, private_key: &[u8]) -> Result<Vec<u8>, Error> {
    match sig_type {
        SignatureType::Bls => Ok(BlsPrivate::from_bytes(private_key)
            .map_err(|err| Error::Other(err.to_string()))?
            .public_key()
            .as_bytes()),
        SignatureType::Secp256k1 | SignatureType::Delegated => {
            let private_key = secp_signing_key(private_key)?;
            let public_key = private_key.verifying_key().as_affine().to_encoded_point(false);
            Ok(public_key.as_bytes().to_vec())
        }
    }
}

/// Return a new Address that is of a given `SignatureType` and uses the
/// supplied public key
pub fn new_address(sig_type: SignatureType, public_key: &[u8]) -> Result<Address, Error> {
    match sig_type {
        SignatureType::Bls => {
            let addr = Address::new_bls(public_key).map_err(|err| Error::Other(err.to_string()))?;
            Ok(addr)
        }
        SignatureType::Secp256k1 => {
            let addr =
                Address::new_secp256k1(public_key).map_err(|err| Error::Other(err.to_string()))?;
            Ok(addr)
        }
        SignatureType::Delegated => {
            let eth_addr = EthAddress::eth_address_from_pub_key(public_key)
                .map_err(|err| Error::Other(err.to_string()))?;
            eth_addr
                .to_filecoin_address()
                .map_err(|err| Error::Other(err.to_string()))
        }
    }
}

/// Sign takes in `SignatureType`, private key and message. Returns a
/// `Signature` for that message
pub fn sign(sig_type: SignatureType, private_key: &[u8], msg: &[u8]) -> Result<Signature, Error> {
    match sig_type {
        SignatureType::Bls => {
            let priv_key =
                BlsPrivate::from_bytes(private_key).map_err(|err| Error::Other(err.to_string()))?;
            // this returns a signature from bls-signatures, so we need to convert this to a crypto signature
            let sig = priv_key.sign(msg);
            Ok(Signature::new_bls(sig.as_bytes()))
        }
        SignatureType::Secp256k1 => Ok(Signature::new_secp256k1(sign_secp_digest(
            private_key,
            &blake2b_256(msg),
        )?)),
        SignatureType::Delegated => Ok(Signature::new_delegated(sign_secp_digest(
            private_key,
            &keccak_256(msg),
        )?)),
    }
}

/// Generate a new private key
pub fn generate(sig_type: SignatureType) -> Result<Vec<u8>, Error> {
    let rng = &mut OsRng;
    match sig_type {
        SignatureType::Bls => {
            let key = BlsPrivate::generate(rng);
            Ok(key.as_bytes())
        }
        SignatureType::Secp256k1 | SignatureType::Delegated => {
            let key = SigningKey::random(rng);
            Ok(key.to_bytes().to_vec())
        }
    }
}
