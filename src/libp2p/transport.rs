// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::time::Duration;

use anyhow::{Context as _, bail};
use async_trait::async_trait;
use futures::StreamExt as _;
use libp2p::{
    PeerId, StreamProtocol, Swarm, SwarmBuilder, identify,
    identity::Keypair,
    noise,
    swarm::{SwarmEvent, dial_opts::DialOpts},
    tcp, yamux,
};
use tokio::task::JoinHandle;
use tokio_util::compat::FuturesAsyncReadCompatExt as _;
use tracing::{debug, info, trace};

use super::PeerAddrInfo;
use crate::deal::client::{DealConnection, DealStream};

const IDENTIFY_PROTOCOL: &str = "/ipfs/id/1.0.0";

#[derive(libp2p::swarm::NetworkBehaviour)]
#[behaviour(prelude = "libp2p::swarm::derive_prelude")]
struct DealBehaviour {
    identify: identify::Behaviour,
    stream: libp2p_stream::Behaviour,
}

impl DealBehaviour {
    fn new(keypair: &Keypair) -> Self {
        let identify = identify::Behaviour::new(
            identify::Config::new(IDENTIFY_PROTOCOL.into(), keypair.public())
                .with_agent_version(format!("forest-deal/{}", env!("CARGO_PKG_VERSION"))),
        );
        Self {
            identify,
            stream: libp2p_stream::Behaviour::new(),
        }
    }
}

fn new_swarm(keypair: Keypair, idle_timeout: Duration) -> anyhow::Result<Swarm<DealBehaviour>> {
    Ok(SwarmBuilder::with_existing_identity(keypair)
        .with_tokio()
        .with_tcp(
            tcp::Config::default().nodelay(true),
            noise::Config::new,
            yamux::Config::default,
        )?
        .with_dns()?
        .with_behaviour(DealBehaviour::new)?
        .with_swarm_config(|config| config.with_idle_connection_timeout(idle_timeout))
        .build())
}

/// A libp2p connection to a storage provider. The swarm is driven by a
/// background task that stops when this is dropped.
pub struct ProviderConnection {
    peer_id: PeerId,
    protocols: Vec<StreamProtocol>,
    control: libp2p_stream::Control,
    driver: JoinHandle<()>,
}

impl ProviderConnection {
    /// Dials the provider with a fresh ed25519 identity and waits for its
    /// identify record, which lists the protocols it speaks.
    pub async fn connect(peer: &PeerAddrInfo, timeout: Duration) -> anyhow::Result<Self> {
        if peer.addrs.is_empty() {
            bail!("provider peer {} has no known addresses", peer.peer_id);
        }
        let mut swarm = new_swarm(Keypair::generate_ed25519(), timeout.max(Duration::from_secs(60)))?;
        debug!(local_peer_id = %swarm.local_peer_id(), "created deal client swarm");
        swarm
            .dial(
                DialOpts::peer_id(peer.peer_id)
                    .addresses(peer.addrs.clone())
                    .build(),
            )
            .with_context(|| format!("failed to dial peer {}", peer.peer_id))?;

        let protocols = tokio::time::timeout(timeout, wait_for_identify(&mut swarm, peer.peer_id))
            .await
            .with_context(|| format!("timed out connecting to peer {}", peer.peer_id))??;
        info!(peer_id = %peer.peer_id, protocols = protocols.len(), "connected to storage provider");

        let control = swarm.behaviour().stream.new_control();
        let driver = tokio::spawn(async move {
            loop {
                let event = swarm.select_next_some().await;
                trace!("deal swarm event: {event:?}");
            }
        });
        Ok(Self {
            peer_id: peer.peer_id,
            protocols,
            control,
            driver,
        })
    }
}

impl Drop for ProviderConnection {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn wait_for_identify(
    swarm: &mut Swarm<DealBehaviour>,
    peer_id: PeerId,
) -> anyhow::Result<Vec<StreamProtocol>> {
    loop {
        match swarm.select_next_some().await {
            SwarmEvent::Behaviour(DealBehaviourEvent::Identify(identify::Event::Received {
                peer_id: from,
                info,
                ..
            })) if from == peer_id => return Ok(info.protocols),
            SwarmEvent::OutgoingConnectionError {
                peer_id: Some(failed),
                error,
                ..
            } if failed == peer_id => {
                bail!("failed to connect to peer {peer_id}: {error}")
            }
            SwarmEvent::ConnectionClosed {
                peer_id: closed,
                cause,
                ..
            } if closed == peer_id => {
                bail!("connection to peer {peer_id} closed: {cause:?}")
            }
            event => trace!("deal swarm event: {event:?}"),
        }
    }
}

#[async_trait]
impl DealConnection for ProviderConnection {
    fn protocols(&self) -> Vec<StreamProtocol> {
        self.protocols.clone()
    }

    async fn open_stream(&self, protocol: StreamProtocol) -> anyhow::Result<Box<dyn DealStream>> {
        let stream = self
            .control
            .clone()
            .open_stream(self.peer_id, protocol.clone())
            .await
            .with_context(|| format!("failed to open {protocol} stream to peer {}", self.peer_id))?;
        Ok(Box::new(stream.compat()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::params::{DealParams, DealResponse};
    use crate::libp2p::deal::{CborFrameCodec, DEAL_PROTOCOL_V120};
    use futures::{SinkExt as _, StreamExt as _};
    use tokio_util::codec::Framed;

    /// A provider that accepts every deal it is sent.
    async fn spawn_provider() -> anyhow::Result<PeerAddrInfo> {
        let mut swarm = new_swarm(Keypair::generate_ed25519(), Duration::from_secs(60))?;
        let mut incoming = swarm
            .behaviour()
            .stream
            .new_control()
            .accept(DEAL_PROTOCOL_V120)?;
        swarm.listen_on("/ip4/127.0.0.1/tcp/0".parse()?)?;
        let addr = loop {
            if let SwarmEvent::NewListenAddr { address, .. } = swarm.select_next_some().await {
                break address;
            }
        };
        let peer_id = *swarm.local_peer_id();
        tokio::spawn(async move {
            loop {
                swarm.select_next_some().await;
            }
        });
        tokio::spawn(async move {
            while let Some((_, stream)) = incoming.next().await {
                let mut framed = Framed::new(
                    stream.compat(),
                    CborFrameCodec::<DealResponse, DealParams>::default(),
                );
                if let Some(Ok(params)) = framed.next().await {
                    let _ = framed
                        .send(DealResponse {
                            accepted: true,
                            message: format!("accepted {}", params.deal_uuid),
                        })
                        .await;
                }
            }
        });
        Ok(PeerAddrInfo {
            peer_id,
            addrs: vec![addr],
        })
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn connect_and_open_deal_stream() {
        let provider = spawn_provider().await.unwrap();
        let conn = ProviderConnection::connect(&provider, Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(conn.peer_id, provider.peer_id);
        assert!(conn.protocols().contains(&DEAL_PROTOCOL_V120));
        let stream = conn.open_stream(DEAL_PROTOCOL_V120).await;
        assert!(stream.is_ok());
    }

    #[tokio::test]
    async fn connect_without_addresses_fails() {
        let peer = PeerAddrInfo {
            peer_id: PeerId::random(),
            addrs: vec![],
        };
        assert!(
            ProviderConnection::connect(&peer, Duration::from_secs(1))
                .await
                .is_err()
        );
    }
}
