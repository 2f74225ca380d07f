// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Request and response records of the `/fil/storage/mk/1.2.0` deal
//! protocol. Field names follow the provider's CBOR map keys.

use std::collections::BTreeMap;

use cid::Cid;
use fvm_ipld_encoding::strict_bytes;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::errors::DealError;
use super::proposal::ClientDealProposal;

pub const HTTP_TRANSFER_TYPE: &str = "http";

/// Parameters of an HTTP data transfer, carried as JSON inside
/// [`Transfer::params`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Headers")]
    pub headers: Option<BTreeMap<String, String>>,
}

/// How the provider gets the deal data. Left empty for offline deals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "ClientID")]
    pub client_id: String,
    #[serde(rename = "Params", with = "strict_bytes")]
    pub params: Vec<u8>,
    /// Size of the CAR file in bytes.
    #[serde(rename = "Size")]
    pub size: u64,
}

impl Transfer {
    pub fn http(url: &Url, headers: BTreeMap<String, String>, size: u64) -> Result<Self, DealError> {
        if size == 0 {
            return Err(DealError::MissingTransferSize);
        }
        let request = HttpRequest {
            url: url.to_string(),
            headers: Some(headers),
        };
        let params = serde_json::to_vec(&request)
            .map_err(|e| DealError::malformed("transfer parameters", url.as_str(), e))?;
        Ok(Self {
            kind: HTTP_TRANSFER_TYPE.into(),
            client_id: String::new(),
            params,
            size,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    /// Decodes the HTTP parameters of an `http` transfer.
    pub fn http_request(&self) -> Option<HttpRequest> {
        if self.kind != HTTP_TRANSFER_TYPE {
            return None;
        }
        serde_json::from_slice(&self.params).ok()
    }
}

/// Parses `key=value` pairs into HTTP headers.
pub fn parse_http_headers<S: AsRef<str>>(
    headers: &[S],
) -> Result<BTreeMap<String, String>, DealError> {
    headers
        .iter()
        .map(|header| {
            let header = header.as_ref();
            let mut parts = header.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => Ok((key.to_string(), value.to_string())),
                _ => Err(DealError::MalformedHttpHeader(header.to_string())),
            }
        })
        .collect()
}

/// A deal request as sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealParams {
    #[serde(rename = "DealUUID")]
    pub deal_uuid: Uuid,
    #[serde(rename = "IsOffline")]
    pub is_offline: bool,
    #[serde(rename = "ClientDealProposal")]
    pub client_deal_proposal: ClientDealProposal,
    #[serde(rename = "DealDataRoot")]
    pub deal_data_root: Cid,
    #[serde(rename = "Transfer")]
    pub transfer: Transfer,
    #[serde(rename = "RemoveUnsealedCopy")]
    pub remove_unsealed_copy: bool,
    #[serde(rename = "SkipIPNIAnnounce")]
    pub skip_ipni_announce: bool,
}

/// The provider's answer to [`DealParams`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealResponse {
    #[serde(rename = "Accepted")]
    pub accepted: bool,
    /// Reason for rejection, may be set on acceptance too.
    #[serde(rename = "Message")]
    pub message: String,
}
