//! A from-scratch BLAKE2b (RFC 7693), keyed and variable-output (1-64
//! bytes). Argon2 treats BLAKE2b as one of its own components rather than
//! an external dependency, so it is implemented here instead of pulled in
//! from a hashing crate.

const IV: [u64; 8] = [
    0x6a09e667f3bcc908,
    0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b,
    0xa54ff53a5f1d36f1,
    0x510e527fade682d1,
    0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b,
    0x5be0cd19137e2179,
];

const SIGMA: [[usize; 16]; 12] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
];

const BLOCK_BYTES: usize = 128;

#[inline(always)]
fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

fn compress(h: &mut [u64; 8], block: &[u8; BLOCK_BYTES], t: u128, last: bool) {
    let mut m = [0u64; 16];
    for (i, word) in m.iter_mut().enumerate() {
        *word = u64::from_le_bytes(block[i * 8..i * 8 + 8].try_into().unwrap());
    }

    let mut v = [0u64; 16];
    v[..8].copy_from_slice(h);
    v[8..].copy_from_slice(&IV);
    v[12] ^= t as u64;
    v[13] ^= (t >> 64) as u64;
    if last {
        v[14] = !v[14];
    }

    for round in 0..12 {
        let s = &SIGMA[round];
        g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
        g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
        g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
        g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
        g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
        g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
        g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
        g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

/// Incremental BLAKE2b hasher, digest length 1-64 bytes, optional key.
pub struct Blake2b {
    h: [u64; 8],
    t: u128,
    buf: [u8; BLOCK_BYTES],
    buflen: usize,
    outlen: usize,
}

impl Blake2b {
    pub fn new(outlen: usize) -> Self {
        Self::new_keyed(outlen, &[])
    }

    pub fn new_keyed(outlen: usize, key: &[u8]) -> Self {
        assert!((1..=64).contains(&outlen), "blake2b output length out of range");
        assert!(key.len() <= 64, "blake2b key too long");

        let mut h = IV;
        h[0] ^= 0x0101_0000 ^ ((key.len() as u64) << 8) ^ outlen as u64;

        let mut hasher = Blake2b {
            h,
            t: 0,
            buf: [0u8; BLOCK_BYTES],
            buflen: 0,
            outlen,
        };

        if !key.is_empty() {
            let mut block = [0u8; BLOCK_BYTES];
            block[..key.len()].copy_from_slice(key);
            hasher.update(&block);
        }

        hasher
    }

    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            if self.buflen == BLOCK_BYTES {
                self.t += BLOCK_BYTES as u128;
                let buf = self.buf;
                compress(&mut self.h, &buf, self.t, false);
                self.buflen = 0;
            }
            let take = (BLOCK_BYTES - self.buflen).min(data.len());
            self.buf[self.buflen..self.buflen + take].copy_from_slice(&data[..take]);
            self.buflen += take;
            data = &data[take..];
        }
    }

    pub fn finalize(mut self) -> Vec<u8> {
        self.t += self.buflen as u128;
        for byte in &mut self.buf[self.buflen..] {
            *byte = 0;
        }
        let buf = self.buf;
        compress(&mut self.h, &buf, self.t, true);

        let mut out = Vec::with_capacity(self.outlen);
        for word in &self.h {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out.truncate(self.outlen);
        out
    }
}

/// One-shot unkeyed BLAKE2b over `parts`, concatenated in order.
pub fn hash(parts: &[&[u8]], outlen: usize) -> Vec<u8> {
    let mut h = Blake2b::new(outlen);
    for part in parts {
        h.update(part);
    }
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7693 appendix A: BLAKE2b("abc"), 64-byte digest.
    #[test]
    fn rfc7693_abc() {
        let digest = hash(&[b"abc"], 64);
        let expected = hex_literal::hex!(
            "ba80a53f981c4d0d6a2797b69f12f6e94c212f14685ac4b74b12bb6fdbffa2d17d87c5392aab792dc252d5de4533cc9518d38aa8dbf1925ab92386edd4009923"
        );
        assert_eq!(digest, expected);
    }

    #[test]
    fn empty_input_64() {
        let digest = hash(&[], 64);
        let expected = hex_literal::hex!(
            "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be8"
        );
        assert_eq!(digest, expected);
    }

    #[test]
    fn respects_output_length() {
        let digest = hash(&[b"argon2"], 32);
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn keyed_differs_from_unkeyed() {
        let unkeyed = hash(&[b"data"], 32);
        let mut keyed = Blake2b::new_keyed(32, b"key");
        keyed.update(b"data");
        assert_ne!(unkeyed, keyed.finalize());
    }
}
