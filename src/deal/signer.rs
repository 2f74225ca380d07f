// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use async_trait::async_trait;
use tracing::debug;

use super::errors::DealError;
use super::proposal::{ClientDealProposal, DealProposal};
use crate::shim::{address::Address, crypto::Signature};

/// What a signature request is for, so a custodian can refuse to sign
/// arbitrary bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MessageType {
    DealProposal,
    Unknown,
}

/// Holder of signing keys. Private key material never leaves it.
#[async_trait]
pub trait KeyCustodian: Send + Sync {
    async fn sign(
        &self,
        signer: &Address,
        data: &[u8],
        purpose: MessageType,
    ) -> anyhow::Result<Signature>;
}

/// Signs the canonical encoding of `proposal` as `signer`.
pub async fn sign_proposal(
    custodian: &dyn KeyCustodian,
    signer: &Address,
    proposal: DealProposal,
) -> Result<ClientDealProposal, DealError> {
    let bytes = proposal
        .canonical_bytes()
        .map_err(|e| DealError::Signing(anyhow::Error::new(e).context("encoding proposal")))?;
    let client_signature = custodian
        .sign(signer, &bytes, MessageType::DealProposal)
        .await
        .map_err(DealError::Signing)?;
    debug!(%signer, sig_type = %client_signature.signature_type(), "signed deal proposal");
    Ok(ClientDealProposal {
        proposal,
        client_signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::proposal::tests::sample_terms;
    use crate::key_management::{KeyStore, KeyStoreConfig, Wallet};
    use crate::shim::crypto::SignatureType;

    struct Locked;

    #[async_trait]
    impl KeyCustodian for Locked {
        async fn sign(&self, _: &Address, _: &[u8], _: MessageType) -> anyhow::Result<Signature> {
            anyhow::bail!("wallet is locked")
        }
    }

    #[tokio::test]
    async fn signed_proposal_verifies_against_signer() {
        let mut wallet = Wallet::new(KeyStore::new(KeyStoreConfig::Memory).unwrap());
        let signer = wallet.generate_addr(SignatureType::Secp256k1).unwrap();
        let proposal = sample_terms().build().unwrap();
        let signed = sign_proposal(&wallet, &signer, proposal.clone())
            .await
            .unwrap();
        assert_eq!(signed.proposal, proposal);
        signed.verify(&signer).unwrap();
    }

    #[tokio::test]
    async fn custodian_failure_is_a_signing_error() {
        let err = sign_proposal(&Locked, &Address::new_id(1), sample_terms().build().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DealError::Signing(_)));
        assert!(!err.request_sent());
        assert!(err.to_string().contains("wallet is locked"));
    }

    #[test]
    fn message_type_names() {
        assert_eq!(MessageType::DealProposal.to_string(), "dealproposal");
    }
}
