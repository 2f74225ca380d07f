// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use blake2b_simd::Params;

/// Generates BLAKE2b hash of fixed 32 bytes size.
///
/// # Example
/// ```
/// use forest_deal::doctest_private::blake2b_256;
///
/// let ingest: Vec<u8> = vec![];
/// let hash = blake2b_256(&ingest);
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake2b_256(ingest: &[u8]) -> [u8; 32] {
    let digest = Params::new()
        .hash_length(32)
        .to_state()
        .update(ingest)
        .finalize();

    let mut ret = [0u8; 32];
    ret.clone_from_slice(digest.as_bytes());
    ret
}

/// Generates Keccak-256 hash of fixed 32 bytes size.
pub fn keccak_256(ingest: &[u8]) -> [u8; 32] {
    keccak_hash::keccak(ingest).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_256_of_empty_input() {
        assert_eq!(
            hex::encode(blake2b_256(&[])),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn keccak_256_of_empty_input() {
        assert_eq!(
            hex::encode(keccak_256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
