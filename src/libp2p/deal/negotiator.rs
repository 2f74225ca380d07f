// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::time::Duration;

use futures::{SinkExt as _, StreamExt as _};
use libp2p::StreamProtocol;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt as _};
use tokio_util::{codec::Framed, sync::CancellationToken};
use tracing::{debug, trace, warn};

use super::codec::{CborFrameCodec, CodecError, DEFAULT_MAX_FRAME_SIZE};
use crate::deal::{
    DealError,
    params::{DealParams, DealResponse},
};

/// Boost storage deal protocol, version 1.2.0.
pub const DEAL_PROTOCOL_V120: StreamProtocol = StreamProtocol::new("/fil/storage/mk/1.2.0");

/// Result of a completed exchange. A rejection is an answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationOutcome {
    Accepted { message: String },
    Rejected { message: String },
}

impl From<DealResponse> for NegotiationOutcome {
    fn from(response: DealResponse) -> Self {
        if response.accepted {
            NegotiationOutcome::Accepted {
                message: response.message,
            }
        } else {
            NegotiationOutcome::Rejected {
                message: response.message,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
enum NegotiationState {
    PeerConnected,
    VersionChecked,
    RequestSent,
    AwaitingResponse,
    Accepted,
    Rejected,
    TimedOut,
    TransportFailed,
}

#[derive(Debug, Clone)]
pub struct NegotiatorConfig {
    /// Protocols this client speaks, in any order.
    pub supported: Vec<StreamProtocol>,
    pub max_frame_size: usize,
    /// Deadline for the whole exchange. `None` waits for cancellation only.
    pub timeout: Option<Duration>,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            supported: vec![DEAL_PROTOCOL_V120],
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            timeout: None,
        }
    }
}

/// Semantic version from the last path segment of a protocol id, e.g.
/// `1.2.0` in `/fil/storage/mk/1.2.0`.
fn protocol_version(protocol: &StreamProtocol) -> semver::Version {
    protocol
        .as_ref()
        .rsplit('/')
        .next()
        .and_then(|v| semver::Version::parse(v).ok())
        .unwrap_or_else(|| semver::Version::new(0, 0, 0))
}

/// Picks the highest version present in both `supported` and `advertised`.
pub fn select_protocol(
    supported: &[StreamProtocol],
    advertised: &[StreamProtocol],
) -> Option<StreamProtocol> {
    supported
        .iter()
        .filter(|p| advertised.contains(p))
        .max_by_key(|p| protocol_version(p))
        .cloned()
}

/// Runs a single deal request/response exchange over an open stream.
#[derive(Debug, Clone, Default)]
pub struct DealNegotiator {
    config: NegotiatorConfig,
}

impl DealNegotiator {
    pub fn new(config: NegotiatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NegotiatorConfig {
        &self.config
    }

    pub(crate) fn unsupported(&self, advertised: &[StreamProtocol]) -> DealError {
        DealError::UnsupportedProtocol {
            supported: self.config.supported.iter().map(|p| p.to_string()).collect(),
            advertised: advertised.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Sends `params` and waits for the provider's answer. The stream is shut
    /// down exactly once before this returns, whatever the result. Nothing is
    /// written when the peer speaks none of the supported protocols.
    pub async fn negotiate<S>(
        &self,
        mut stream: S,
        advertised: &[StreamProtocol],
        params: &DealParams,
        cancel: &CancellationToken,
    ) -> Result<NegotiationOutcome, DealError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let deal_uuid = params.deal_uuid;
        trace!(%deal_uuid, state = %NegotiationState::PeerConnected);

        let Some(protocol) = select_protocol(&self.config.supported, advertised) else {
            release(&mut stream).await;
            return Err(self.unsupported(advertised));
        };
        trace!(%deal_uuid, %protocol, state = %NegotiationState::VersionChecked);

        let mut framed = Framed::new(
            stream,
            CborFrameCodec::<DealParams, DealResponse>::new(self.config.max_frame_size),
        );
        let mut request_sent = false;
        let exchange = async {
            framed
                .feed(params.clone())
                .await
                .map_err(|e| DealError::transport(false, e))?;
            // the frame is encoded and handed to the stream from here on
            request_sent = true;
            framed
                .flush()
                .await
                .map_err(|e| DealError::transport(true, e))?;
            trace!(%deal_uuid, state = %NegotiationState::RequestSent);
            trace!(%deal_uuid, state = %NegotiationState::AwaitingResponse);
            match framed.next().await {
                Some(Ok(response)) => Ok::<_, DealError>(response),
                Some(Err(e)) => Err(DealError::transport(true, e)),
                None => Err(DealError::transport(true, CodecError::UnexpectedEof)),
            }
        };
        let timeout = self.config.timeout;
        let deadline = async move {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        let finished = tokio::select! {
            response = exchange => Some(response),
            _ = cancel.cancelled() => None,
            _ = deadline => None,
        };
        release(framed.get_mut()).await;

        match finished {
            Some(Ok(response)) => {
                let outcome = NegotiationOutcome::from(response);
                let state = match outcome {
                    NegotiationOutcome::Accepted { .. } => NegotiationState::Accepted,
                    NegotiationOutcome::Rejected { .. } => NegotiationState::Rejected,
                };
                debug!(%deal_uuid, %protocol, %state, "deal negotiation finished");
                Ok(outcome)
            }
            Some(Err(e)) => {
                warn!(%deal_uuid, state = %NegotiationState::TransportFailed, "{e}");
                Err(e)
            }
            None => {
                warn!(%deal_uuid, request_sent, state = %NegotiationState::TimedOut, "deal negotiation cancelled");
                Err(DealError::TimedOut { request_sent })
            }
        }
    }
}

async fn release<S: AsyncWrite + Unpin>(stream: &mut S) {
    if let Err(e) = stream.shutdown().await {
        debug!("closing deal stream: {e}");
    }
}
