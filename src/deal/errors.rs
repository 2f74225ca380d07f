// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

use crate::shim::clock::ChainEpoch;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of a single deal attempt. Apart from [`DealError::TransportFailed`]
/// and [`DealError::TimedOut`], every variant is raised before anything is
/// written to the provider.
#[derive(Debug, Error)]
pub enum DealError {
    #[error("only one of the start epoch head offset and the explicit start epoch can be set")]
    ConflictingStartEpoch,
    #[error("malformed {what} {input:?}: {reason}")]
    MalformedIdentifier {
        what: &'static str,
        input: String,
        reason: String,
    },
    #[error("cannot derive a deal label from {0:?}: expected an f0 or t0 actor id")]
    InvalidLabelSource(String),
    #[error("piece size {0} is not a power of two")]
    InvalidPieceSize(u64),
    #[error("deal duration must be positive, got {0}")]
    InvalidDuration(ChainEpoch),
    #[error("epoch {base} with offset {offset} is out of range")]
    EpochOverflow { base: ChainEpoch, offset: ChainEpoch },
    #[error("malformed http header {0:?}, expected key=value")]
    MalformedHttpHeader(String),
    #[error("size of car file cannot be 0 for an online deal")]
    MissingTransferSize,
    #[error("invalid Ethereum address {input:?}: {reason}")]
    InvalidEthAddress { input: String, reason: String },
    #[error("chain read failed: {0:#}")]
    ChainRead(anyhow::Error),
    #[error("signing the deal proposal failed: {0:#}")]
    Signing(anyhow::Error),
    #[error("provider supports none of the deal protocols {supported:?}, it advertises {advertised:?}")]
    UnsupportedProtocol {
        supported: Vec<String>,
        advertised: Vec<String>,
    },
    #[error("deal transport failed (request sent: {request_sent}): {source}")]
    TransportFailed {
        request_sent: bool,
        #[source]
        source: BoxError,
    },
    #[error("no response from provider before the deadline (request sent: {request_sent})")]
    TimedOut { request_sent: bool },
}

impl DealError {
    /// Whether the deal request may have reached the provider. When this is
    /// `true` the outcome of the deal is unknown.
    pub fn request_sent(&self) -> bool {
        match self {
            DealError::TransportFailed { request_sent, .. }
            | DealError::TimedOut { request_sent } => *request_sent,
            _ => false,
        }
    }

    pub(crate) fn malformed(
        what: &'static str,
        input: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        DealError::MalformedIdentifier {
            what,
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn transport(request_sent: bool, source: impl Into<BoxError>) -> Self {
        DealError::TransportFailed {
            request_sent,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_wire_errors_report_a_sent_request() {
        assert!(!DealError::ConflictingStartEpoch.request_sent());
        assert!(!DealError::Signing(anyhow::anyhow!("locked")).request_sent());
        assert!(
            !DealError::UnsupportedProtocol {
                supported: vec![],
                advertised: vec![],
            }
            .request_sent()
        );
        assert!(DealError::TimedOut { request_sent: true }.request_sent());
        assert!(!DealError::TimedOut { request_sent: false }.request_sent());
        assert!(
            DealError::transport(true, std::io::Error::other("reset")).request_sent()
        );
    }

    #[test]
    fn messages_carry_context() {
        let err = DealError::malformed("piece cid", "bafy-nope", "bad base");
        assert_eq!(
            err.to_string(),
            "malformed piece cid \"bafy-nope\": bad base"
        );
        let err = DealError::ChainRead(anyhow::anyhow!("boom").context("ChainHead"));
        assert_eq!(err.to_string(), "chain read failed: ChainHead: boom");
    }
}
