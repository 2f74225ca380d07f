// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Lotus JSON-RPC client. Results are decoded into typed records and
//! validated before they reach the deal client.

mod chain_ops;
mod state_ops;

use std::{env, fmt, str::FromStr, time::Duration};

use anyhow::{Context as _, bail};
use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, header};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::traits::ToRpcParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::deal::chain::{ChainReader, CollateralBounds};
use crate::libp2p::Multiaddr;
use crate::shim::{address::Address, clock::ChainEpoch, piece::PaddedPieceSize};
use libp2p::multiaddr::Protocol;

pub const API_INFO_KEY: &str = "FULLNODE_API_INFO";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_RPC_PATH: &str = "/rpc/v1";

/// Endpoint and optional token of a Lotus node, as found in
/// `FULLNODE_API_INFO`. Accepts either a URL or `[token:]multiaddr`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiInfo {
    pub url: Url,
    pub token: Option<String>,
}

impl fmt::Display for ApiInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.token.is_some() {
            write!(f, "<token>:")?;
        }
        write!(f, "{}", self.url)
    }
}

impl FromStr for ApiInfo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(ApiInfo {
                url: s.parse()?,
                token: None,
            });
        }
        let (token, host) = match s.split_once(':') {
            Some((token, host)) => (Some(token), host),
            None => (None, s),
        };
        let multiaddr: Multiaddr = host.parse()?;
        let mut url = multiaddr2url(&multiaddr).context("couldn't convert multiaddr to URL")?;
        url.set_path(DEFAULT_RPC_PATH);
        Ok(ApiInfo {
            url,
            token: token.map(String::from),
        })
    }
}

impl ApiInfo {
    /// Reads `FULLNODE_API_INFO`, if set. Fails if it is malformed.
    pub fn from_env() -> anyhow::Result<Option<Self>> {
        match env::var(API_INFO_KEY) {
            Ok(it) => Ok(Some(it.parse()?)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(it @ env::VarError::NotUnicode(_)) => Err(it.into()),
        }
    }

    pub fn set_token(self, token: Option<String>) -> Self {
        ApiInfo {
            token: token.or(self.token),
            ..self
        }
    }
}

/// `"/dns/example.com/tcp/8080/http" -> "http://example.com:8080/"`
///
/// Returns [`None`] on unsupported formats, or if there is a URL parsing error.
fn multiaddr2url(m: &Multiaddr) -> Option<Url> {
    let mut components = m.iter().peekable();
    let host = match components.next()? {
        Protocol::Dns(it) | Protocol::Dns4(it) | Protocol::Dns6(it) | Protocol::Dnsaddr(it) => {
            it.to_string()
        }
        Protocol::Ip4(it) => it.to_string(),
        Protocol::Ip6(it) => format!("[{it}]"),
        _ => return None,
    };
    let port = match components.peek() {
        Some(Protocol::Tcp(port)) => {
            let port = *port;
            components.next();
            Some(port)
        }
        _ => None,
    };
    let scheme = match components.next()? {
        Protocol::Http => "http",
        Protocol::Https => "https",
        _ => return None,
    };
    let None = components.next() else {
        return None;
    };
    let parse_me = match port {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    };
    parse_me.parse().ok()
}

/// JSON-RPC client for the subset of the Lotus full node API used to make
/// deals.
#[derive(Clone, Debug)]
pub struct LotusClient {
    inner: HttpClient,
}

impl LotusClient {
    pub fn new(info: &ApiInfo, timeout: Duration) -> anyhow::Result<Self> {
        let headers = match &info.token {
            Some(token) => HeaderMap::from_iter([(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .context("invalid authorization token")?,
            )]),
            None => HeaderMap::new(),
        };
        match info.url.scheme() {
            "http" | "https" => {}
            it => bail!("unsupported URL scheme: {it}"),
        }
        let inner = HttpClientBuilder::default()
            .set_headers(headers)
            .request_timeout(timeout)
            .build(info.url.as_str())
            .with_context(|| format!("couldn't create RPC client for {}", info.url))?;
        Ok(Self { inner })
    }

    async fn call<R, P>(&self, method: &'static str, params: P) -> anyhow::Result<R>
    where
        R: DeserializeOwned,
        P: ToRpcParams + Send,
    {
        debug!(method, "calling lotus");
        self.inner
            .request(method, params)
            .await
            .with_context(|| format!("{method} failed"))
    }
}

#[async_trait]
impl ChainReader for LotusClient {
    async fn chain_head_epoch(&self) -> anyhow::Result<ChainEpoch> {
        self.chain_head().await
    }

    async fn deal_provider_collateral_bounds(
        &self,
        size: PaddedPieceSize,
        verified: bool,
    ) -> anyhow::Result<CollateralBounds> {
        self.state_deal_provider_collateral_bounds(size, verified)
            .await
    }

    async fn lookup_id(&self, addr: &Address) -> anyhow::Result<Address> {
        self.state_lookup_id(addr).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiaddr2url() {
        #[track_caller]
        fn do_test(input: &str, expected: &str) {
            let multiaddr = input.parse().unwrap();
            let url = multiaddr2url(&multiaddr).unwrap();
            assert_eq!(url.as_str(), expected);
        }
        do_test("/dns/example.com/http", "http://example.com/");
        do_test("/dns/example.com/tcp/8080/http", "http://example.com:8080/");
        do_test("/ip4/127.0.0.1/tcp/1234/https", "https://127.0.0.1:1234/");
        assert!(multiaddr2url(&"/ip4/127.0.0.1/tcp/1234".parse().unwrap()).is_none());
    }

    #[test]
    fn api_info_from_lotus_format() {
        let info: ApiInfo = "secret:/ip4/127.0.0.1/tcp/1234/http".parse().unwrap();
        assert_eq!(info.url.as_str(), "http://127.0.0.1:1234/rpc/v1");
        assert_eq!(info.token.as_deref(), Some("secret"));
        assert_eq!(info.to_string(), "<token>:http://127.0.0.1:1234/rpc/v1");

        let info: ApiInfo = "/ip4/127.0.0.1/tcp/1234/http".parse().unwrap();
        assert_eq!(info.token, None);
    }

    #[test]
    fn api_info_from_url() {
        let info: ApiInfo = "https://api.calibration.node.glif.io/rpc/v1".parse().unwrap();
        assert_eq!(info.url.host_str(), Some("api.calibration.node.glif.io"));
        assert_eq!(info.token, None);
        let info = info.set_token(Some("t".into()));
        assert_eq!(info.token.as_deref(), Some("t"));
    }

    #[test]
    fn api_info_rejects_garbage() {
        assert!("token:not-a-multiaddr".parse::<ApiInfo>().is_err());
        assert!("/ip4/127.0.0.1/tcp/1234".parse::<ApiInfo>().is_err());
    }

    #[test]
    fn client_rejects_non_http_urls() {
        let info = ApiInfo {
            url: "ws://127.0.0.1:1234/rpc/v1".parse().unwrap(),
            token: None,
        };
        assert!(LotusClient::new(&info, DEFAULT_TIMEOUT).is_err());
        let info: ApiInfo = "http://127.0.0.1:1234/rpc/v1".parse().unwrap();
        assert!(LotusClient::new(&info, DEFAULT_TIMEOUT).is_ok());
    }
}
