// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{io, marker::PhantomData};

use bytes::{Bytes, BytesMut};
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::codec::{Decoder, Encoder};
use unsigned_varint::codec::UviBytes;

/// Default upper bound on a single decoded frame.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

/// Errors returned by encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An io error happened on the underlying stream.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error happened when encoding/decoding CBOR data.
    #[error("cbor: {0}")]
    Cbor(#[from] fvm_ipld_encoding::Error),
    #[error("stream closed before a response was received")]
    UnexpectedEof,
}

/// Frames values as unsigned-varint length prefixed DAG-CBOR. Writes `Out`,
/// reads `In`.
pub struct CborFrameCodec<Out, In> {
    inner: UviBytes<Bytes>,
    _data: PhantomData<fn(Out) -> In>,
}

impl<Out, In> CborFrameCodec<Out, In> {
    pub fn new(max_frame_size: usize) -> Self {
        let mut inner = UviBytes::default();
        inner.set_max_len(max_frame_size);
        Self {
            inner,
            _data: PhantomData,
        }
    }
}

impl<Out, In> Default for CborFrameCodec<Out, In> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SIZE)
    }
}

impl<Out: Serialize, In> Encoder<Out> for CborFrameCodec<Out, In> {
    type Error = CodecError;

    fn encode(&mut self, item: Out, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = fvm_ipld_encoding::to_vec(&item)?;
        self.inner.encode(Bytes::from(bytes), dst)?;
        Ok(())
    }
}

impl<Out, In: DeserializeOwned> Decoder for CborFrameCodec<Out, In> {
    type Item = In;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode(src)? {
            Some(frame) => Ok(Some(fvm_ipld_encoding::from_slice(&frame)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::params::DealResponse;

    fn response() -> DealResponse {
        DealResponse {
            accepted: true,
            message: "ok".into(),
        }
    }

    #[test]
    fn frame_is_varint_length_prefixed_cbor() {
        let mut codec = CborFrameCodec::<DealResponse, DealResponse>::default();
        let mut buf = BytesMut::new();
        codec.encode(response(), &mut buf).unwrap();

        let body = fvm_ipld_encoding::to_vec(&response()).unwrap();
        assert!(body.len() < 128);
        assert_eq!(buf[0] as usize, body.len());
        assert_eq!(&buf[1..], &body[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(response()));
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_frame_waits_for_more_bytes() {
        let mut codec = CborFrameCodec::<DealResponse, DealResponse>::default();
        let mut full = BytesMut::new();
        codec.encode(response(), &mut full).unwrap();

        let mut partial = BytesMut::from(&full[..full.len() - 1]);
        assert_eq!(codec.decode(&mut partial).unwrap(), None);
        partial.extend_from_slice(&full[full.len() - 1..]);
        assert_eq!(codec.decode(&mut partial).unwrap(), Some(response()));
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut codec = CborFrameCodec::<DealResponse, DealResponse>::new(8);
        let mut buf = BytesMut::new();
        // length prefix of 200, more than the limit
        buf.extend_from_slice(&[0xc8, 0x01]);
        buf.extend_from_slice(&[0; 16]);
        assert!(matches!(codec.decode(&mut buf), Err(CodecError::Io(_))));
    }

    #[test]
    fn garbage_payload_is_a_cbor_error() {
        let mut codec = CborFrameCodec::<DealResponse, DealResponse>::default();
        let mut buf = BytesMut::from(&[3u8, 0xff, 0xff, 0xff][..]);
        assert!(matches!(codec.decode(&mut buf), Err(CodecError::Cbor(_))));
    }
}
