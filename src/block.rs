//! The 1024-byte working-memory block, viewed as 128 little-endian 64-bit
//! words. Scalar representation: the teacher crate (`argon2rs`) stores a
//! block as `[u64x2; 64]` using nightly SIMD intrinsics (`octword.rs`);
//! this crate instead follows the stable-Rust scalar layout used by the
//! old `rust-crypto` Argon2 implementation (`[u64; 128]`), which performs
//! the same arithmetic with plain `wrapping_add`/`rotate_right`.

use std::ops::{BitXor, BitXorAssign, Index, IndexMut};

pub const WORDS: usize = 128;
pub const BYTES: usize = WORDS * 8;

#[derive(Clone, Copy)]
pub struct Block(pub [u64; WORDS]);

impl Block {
    pub const fn zero() -> Self {
        Block([0u64; WORDS])
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        debug_assert_eq!(bytes.len(), BYTES);
        let mut words = [0u64; WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = u64::from_le_bytes(bytes[i * 8..i * 8 + 8].try_into().unwrap());
        }
        Block(words)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BYTES);
        for word in &self.0 {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out
    }

    pub fn xor_with(&mut self, other: &Block) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a ^= b;
        }
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::zero()
    }
}

impl Index<usize> for Block {
    type Output = u64;
    fn index(&self, i: usize) -> &u64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for Block {
    fn index_mut(&mut self, i: usize) -> &mut u64 {
        &mut self.0[i]
    }
}

impl BitXor for &Block {
    type Output = Block;
    fn bitxor(self, rhs: &Block) -> Block {
        let mut out = *self;
        out.xor_with(rhs);
        out
    }
}

impl BitXorAssign<&Block> for Block {
    fn bitxor_assign(&mut self, rhs: &Block) {
        self.xor_with(rhs);
    }
}

#[cfg(feature = "zeroize")]
impl zeroize::Zeroize for Block {
    fn zeroize(&mut self) {
        for word in self.0.iter_mut() {
            word.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_bytes() {
        let mut bytes = vec![0u8; BYTES];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i % 251) as u8;
        }
        let block = Block::from_bytes(&bytes);
        assert_eq!(block.to_bytes(), bytes);
    }

    #[test]
    fn xor_is_its_own_inverse() {
        let a = Block::from_bytes(&vec![0xAAu8; BYTES]);
        let b = Block::from_bytes(&vec![0x55u8; BYTES]);
        let mut c = a;
        c.xor_with(&b);
        c.xor_with(&b);
        assert_eq!(c.to_bytes(), a.to_bytes());
    }
}
