//! `H'`, the length-doubling hash used to derive both the initial blocks
//! of each lane and the final tag from the post-mixing accumulator.

use crate::blake2b::Blake2b;

/// Variable-length hash of `input`, producing exactly `outlen` bytes.
///
/// For `outlen <= 64` this is a single BLAKE2b call. Longer outputs are
/// built from overlapping 32-byte windows of chained 64-byte BLAKE2b
/// digests, as specified by Argon2's `H'`.
pub fn h_prime(outlen: usize, input: &[u8]) -> Vec<u8> {
    let len_prefix = (outlen as u32).to_le_bytes();

    if outlen <= 64 {
        let mut h = Blake2b::new(outlen);
        h.update(&len_prefix);
        h.update(input);
        return h.finalize();
    }

    let mut out = Vec::with_capacity(outlen);

    let mut h = Blake2b::new(64);
    h.update(&len_prefix);
    h.update(input);
    let mut v = h.finalize();
    out.extend_from_slice(&v[..32]);

    let mut remaining = outlen - 32;
    while remaining > 64 {
        let mut h = Blake2b::new(64);
        h.update(&v);
        v = h.finalize();
        out.extend_from_slice(&v[..32]);
        remaining -= 32;
    }

    let mut h = Blake2b::new(remaining);
    h.update(&v);
    out.extend_from_slice(&h.finalize());

    debug_assert_eq!(out.len(), outlen);
    out
}
