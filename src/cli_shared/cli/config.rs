// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, DurationSeconds, serde_as};
use tracing_subscriber::filter::LevelFilter;

use super::client::Client;
use crate::libp2p::{
    StreamProtocol,
    deal::{DEAL_PROTOCOL_V120, DEFAULT_MAX_FRAME_SIZE, NegotiatorConfig},
};

#[serde_as]
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone)]
pub struct LogValue {
    pub module: String,
    #[serde_as(as = "DisplayFromStr")]
    pub level: LevelFilter,
}

impl LogValue {
    pub fn new(module: &str, level: LevelFilter) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct LogConfig {
    pub filters: Vec<LogValue>,
}

impl LogConfig {
    pub(in crate::cli_shared) fn to_filter_string(&self) -> String {
        self.filters
            .iter()
            .map(|f| format!("{}={}", f.module, f.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filters: vec![
                LogValue::new("libp2p_swarm", LevelFilter::WARN),
                LogValue::new("libp2p_tcp", LevelFilter::WARN),
                LogValue::new("libp2p_noise", LevelFilter::WARN),
                LogValue::new("yamux", LevelFilter::ERROR),
                LogValue::new("hickory_resolver", LevelFilter::OFF),
                LogValue::new("jsonrpsee", LevelFilter::WARN),
            ],
        }
    }
}

/// Deal transport settings.
#[serde_as]
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct DealConfig {
    /// Time allowed to dial the provider and learn its protocols.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub connect_timeout: Duration,
    /// Time allowed between opening the deal stream and the provider's answer.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub request_timeout: Duration,
    /// Largest accepted response frame, in bytes.
    pub max_frame_size: usize,
    /// Deal protocols this client speaks. The highest version the provider
    /// also speaks is used.
    pub protocols: Vec<String>,
}

impl Default for DealConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            protocols: vec![DEAL_PROTOCOL_V120.to_string()],
        }
    }
}

impl DealConfig {
    pub fn negotiator_config(&self) -> anyhow::Result<NegotiatorConfig> {
        let supported = self
            .protocols
            .iter()
            .map(|p| {
                StreamProtocol::try_from_owned(p.clone())
                    .with_context(|| format!("invalid deal protocol {p:?}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        anyhow::ensure!(!supported.is_empty(), "no deal protocols configured");
        Ok(NegotiatorConfig {
            supported,
            max_frame_size: self.max_frame_size,
            timeout: (!self.request_timeout.is_zero()).then_some(self.request_timeout),
        })
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Default, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub client: Client,
    pub deal: DealConfig,
    pub log: LogConfig,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::networks::NetworkChain;
    use pretty_assertions::assert_eq;
    use quickcheck::Arbitrary;
    use quickcheck_macros::quickcheck;
    use std::path::PathBuf;
    use tracing_subscriber::EnvFilter;

    #[derive(Clone, Debug)]
    struct ConfigPartial(Config);

    impl Arbitrary for ConfigPartial {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            ConfigPartial(Config {
                client: Client {
                    api_url: String::arbitrary(g),
                    api_token: Option::arbitrary(g),
                    keystore_dir: PathBuf::arbitrary(g),
                    chain: bool::arbitrary(g).then_some(NetworkChain::Calibnet),
                },
                deal: DealConfig {
                    connect_timeout: Duration::from_secs(u32::arbitrary(g).into()),
                    request_timeout: Duration::from_secs(u32::arbitrary(g).into()),
                    max_frame_size: u32::arbitrary(g) as usize,
                    protocols: Vec::arbitrary(g),
                },
                log: Default::default(),
            })
        }
    }

    #[quickcheck]
    fn test_config_all_params_under_section(config: ConfigPartial) {
        let serialized_config =
            toml::to_string(&config.0).expect("could not serialize the configuration");
        assert_eq!(
            serialized_config
                .trim_start()
                .chars()
                .next()
                .expect("configuration empty"),
            '['
        )
    }

    #[test]
    fn test_default_log_filters() {
        let config = LogConfig::default();
        EnvFilter::builder()
            .parse(config.to_filter_string())
            .unwrap();
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [deal]
            request_timeout = 5

            [client]
            chain = "calibnet"
            "#,
        )
        .unwrap();
        assert_eq!(config.deal.request_timeout, Duration::from_secs(5));
        assert_eq!(config.deal.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.client.chain, Some(NetworkChain::Calibnet));
        assert_eq!(config.client.api_url, Client::default().api_url);
    }

    #[test]
    fn negotiator_config_from_deal_config() {
        let negotiator = DealConfig::default().negotiator_config().unwrap();
        assert_eq!(negotiator.supported, vec![DEAL_PROTOCOL_V120]);
        assert_eq!(negotiator.timeout, Some(Duration::from_secs(60)));

        let no_deadline = DealConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(no_deadline.negotiator_config().unwrap().timeout, None);

        let bad = DealConfig {
            protocols: vec!["fil/storage".into()],
            ..Default::default()
        };
        assert!(bad.negotiator_config().is_err());

        let empty = DealConfig {
            protocols: vec![],
            ..Default::default()
        };
        assert!(empty.negotiator_config().is_err());
    }
}
