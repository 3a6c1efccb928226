//! A memory-hard Argon2 (d/i/id) filling and finalization core, RFC 9106
//! compatible, including the legacy `0x10` wire version.
//!
//! This crate covers the algorithm itself: parameter validation, the
//! initial BLAKE2b-based prehash, memory allocation and filling across
//! lanes, and finalization into a tag. It deliberately stops there —
//! the PHC encoded-hash text format (`$argon2id$v=...$...`), a
//! `PasswordHasher`/`PasswordVerifier` convenience layer, CLI glue, and
//! constant-time tag verification are all left to a layer built on top;
//! this crate only needs to guarantee that its own internals avoid
//! secret-dependent branches outside the indexing paths that are
//! data-dependent by design (Argon2d, and Argon2id past its first two
//! slices).
//!
//! ```
//! use argon2_core::{Argon2, ParamsBuilder, Variant, Version};
//!
//! let params = ParamsBuilder::new()
//!     .m_cost(8 * 4)
//!     .t_cost(3)
//!     .p_cost(4)
//!     .output_len(32)
//!     .build()
//!     .unwrap();
//! let argon2 = Argon2::new(Variant::Argon2id, Version::V0x13, params);
//!
//! let mut out = [0u8; 32];
//! argon2.hash_password_into(b"password", b"somesalt", &mut out).unwrap();
//! ```

mod blake2b;
mod block;
mod compress;
mod error;
mod hprime;
mod index;
mod instance;
mod params;
mod variant;
mod version;

pub use block::Block;
pub use error::Error;
pub use instance::{Instance, Memory};
pub use params::{Params, ParamsBuilder};
pub use variant::Variant;
pub use version::Version;

use instance::initial_hash;

/// Facade combining a [`Variant`], a [`Version`], validated [`Params`],
/// and an optional secret key into a ready-to-run hasher.
pub struct Argon2<'key> {
    variant: Variant,
    version: Version,
    params: Params,
    secret: Option<&'key [u8]>,
    threads: u32,
}

impl<'key> Argon2<'key> {
    pub fn new(variant: Variant, version: Version, params: Params) -> Self {
        let threads = params.p_cost();
        Argon2 {
            variant,
            version,
            params,
            secret: None,
            threads,
        }
    }

    pub fn new_with_secret(
        variant: Variant,
        version: Version,
        params: Params,
        secret: &'key [u8],
    ) -> Result<Self, Error> {
        params::validate_secret(secret)?;
        let mut argon2 = Self::new(variant, version, params);
        argon2.secret = Some(secret);
        Ok(argon2)
    }

    /// Builds an `Argon2` from the raw `type`/`version` bytes used by the
    /// encoded-hash text format and the C reference's wire representation
    /// (`type ∈ {0,1,2}`, `version ∈ {0x10, 0x13}`), rejecting anything else
    /// with [`Error::IncorrectType`]/[`Error::IncorrectVersion`] rather than
    /// requiring the caller to already hold a [`Variant`]/[`Version`].
    pub fn from_raw(variant: u32, version: u32, params: Params) -> Result<Self, Error> {
        let variant = Variant::try_from(variant)?;
        let version = Version::try_from(version)?;
        Ok(Self::new(variant, version, params))
    }

    /// Overrides the worker-thread count, silently capped to `p_cost`.
    /// Defaults to `p_cost`.
    pub fn with_threads(mut self, threads: u32) -> Result<Self, Error> {
        self.threads = params::validate_threads(threads, self.params.p_cost())?;
        Ok(self)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Number of 1024-byte blocks the working memory must hold — the
    /// size a caller-supplied buffer passed to
    /// [`hash_password_into_with_memory`](Self::hash_password_into_with_memory)
    /// must meet or exceed.
    pub fn block_count(&self) -> usize {
        self.params.memory_blocks() as usize
    }

    /// Hashes `pwd` under `salt`, writing exactly `out.len()` bytes.
    /// `out.len()` must match `params.output_len()`.
    pub fn hash_password_into(&self, pwd: &[u8], salt: &[u8], out: &mut [u8]) -> Result<(), Error> {
        let memory = Memory::new(self.params.p_cost(), self.params.lane_length());
        let tag = self.run(pwd, salt, memory)?;
        self.write_out(tag, out)
    }

    /// As [`hash_password_into`](Self::hash_password_into), but zeroizes
    /// `pwd` immediately after it has been absorbed into the prehash —
    /// the core's equivalent of the reference implementation's
    /// clear-password option. Unlike a naive "hash then zeroize", the
    /// buffer is cleared *before* the memory-hard fill runs, not after: the
    /// password would otherwise sit in memory for the full duration of the
    /// fill instead of just the prehash.
    #[cfg(feature = "zeroize")]
    pub fn hash_password_into_and_clear(
        &self,
        pwd: &mut [u8],
        salt: &[u8],
        out: &mut [u8],
    ) -> Result<(), Error> {
        params::validate_pwd(pwd)?;
        params::validate_salt(salt)?;

        let memory = Memory::new(self.params.p_cost(), self.params.lane_length());
        let mut h0 = initial_hash(
            self.variant,
            self.version,
            &self.params,
            pwd,
            salt,
            self.secret.unwrap_or(&[]),
        );

        use zeroize::Zeroize;
        pwd.zeroize();

        let tag = self.run_from_h0(&mut h0, memory)?;
        self.write_out(tag, out)
    }

    /// As [`hash_password_into`](Self::hash_password_into), but fills a
    /// caller-supplied `Vec<Block>` instead of allocating a fresh one —
    /// the idiomatic replacement for the C reference's
    /// `allocate_fptr`/`deallocate_fptr` hooks. `memory.len()` must be at
    /// least [`block_count`](Self::block_count).
    pub fn hash_password_into_with_memory(
        &self,
        pwd: &[u8],
        salt: &[u8],
        out: &mut [u8],
        memory: Vec<block::Block>,
    ) -> Result<(), Error> {
        if memory.len() < self.block_count() {
            return Err(Error::MemoryAllocationError);
        }
        let memory = Memory::from_vec(memory, self.params.lane_length());
        let tag = self.run(pwd, salt, memory)?;
        self.write_out(tag, out)
    }

    /// Fills the working memory without computing a tag, returning the
    /// filled instance. Intended for collaborators that need the raw
    /// memory array itself — e.g. a proof-of-work layer built over this
    /// crate — rather than just the final tag.
    pub fn fill_memory(&self, pwd: &[u8], salt: &[u8]) -> Result<Instance, Error> {
        params::validate_pwd(pwd)?;
        params::validate_salt(salt)?;

        let memory = Memory::new(self.params.p_cost(), self.params.lane_length());
        let h0 = initial_hash(
            self.variant,
            self.version,
            &self.params,
            pwd,
            salt,
            self.secret.unwrap_or(&[]),
        );
        let mut instance = Instance::new(self.variant, self.version, &self.params, self.threads, memory);
        instance.fill_first_blocks(&h0);
        instance.fill_memory_blocks();
        Ok(instance)
    }

    fn run(&self, pwd: &[u8], salt: &[u8], memory: Memory) -> Result<Vec<u8>, Error> {
        params::validate_pwd(pwd)?;
        params::validate_salt(salt)?;

        let mut h0 = initial_hash(
            self.variant,
            self.version,
            &self.params,
            pwd,
            salt,
            self.secret.unwrap_or(&[]),
        );

        self.run_from_h0(&mut h0, memory)
    }

    /// Shared tail of the pipeline once `h0` has been computed: fills the
    /// per-lane initial blocks, zeroizes `h0`, then runs the memory-hard
    /// fill and finalizes into a tag.
    fn run_from_h0(&self, h0: &mut [u8; 64], memory: Memory) -> Result<Vec<u8>, Error> {
        let mut instance = Instance::new(self.variant, self.version, &self.params, self.threads, memory);
        instance.fill_first_blocks(h0);

        #[cfg(feature = "zeroize")]
        {
            use zeroize::Zeroize;
            h0.zeroize();
        }
        #[cfg(not(feature = "zeroize"))]
        {
            let _ = &mut *h0;
        }

        instance.fill_memory_blocks();
        Ok(instance.finalize(self.params.output_len()))
    }

    fn write_out(&self, tag: Vec<u8>, out: &mut [u8]) -> Result<(), Error> {
        if out.len() != self.params.output_len() {
            return if out.len() < self.params.output_len() {
                Err(Error::OutputTooShort)
            } else {
                Err(Error::OutputTooLong)
            };
        }
        out.copy_from_slice(&tag);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc9106_params() -> Params {
        ParamsBuilder::new()
            .m_cost(32)
            .t_cost(3)
            .p_cost(4)
            .output_len(32)
            .ad(&b"\x04\x04\x04\x04\x04\x04\x04\x04\x04\x04\x04\x04"[..])
            .build()
            .unwrap()
    }

    const PWD: [u8; 32] = [0x01; 32];
    const SALT: [u8; 16] = [0x02; 16];
    const SECRET: [u8; 8] = [0x03; 8];

    fn run(variant: Variant) -> Vec<u8> {
        let params = rfc9106_params();
        let argon2 = Argon2::new_with_secret(variant, Version::V0x13, params, &SECRET).unwrap();
        let mut out = vec![0u8; 32];
        argon2.hash_password_into(&PWD, &SALT, &mut out).unwrap();
        out
    }

    #[test]
    fn rfc9106_argon2d_vector() {
        let expected =
            hex_literal::hex!("512b391b6f1162975371d30919734294f868e3be3984f3c1a13a4db9fabe4acb");
        assert_eq!(run(Variant::Argon2d), expected);
    }

    #[test]
    fn rfc9106_argon2i_vector() {
        let expected =
            hex_literal::hex!("c814d9d1dc7f37aa13f0d77f2494bda1c8de6b016dd388d29952a4c4672b6ce8");
        assert_eq!(run(Variant::Argon2i), expected);
    }

    #[test]
    fn rfc9106_argon2id_vector() {
        let expected =
            hex_literal::hex!("0d640df58d78766c08c037a34a8b53c9d01ef0452d75b65eb52520e96b01e659");
        assert_eq!(run(Variant::Argon2id), expected);
    }

    #[test]
    fn empty_password_with_minimum_salt() {
        let params = ParamsBuilder::new().m_cost(32).t_cost(1).p_cost(1).output_len(32).build().unwrap();
        let argon2 = Argon2::new(Variant::Argon2id, Version::V0x13, params);
        let mut out = vec![0u8; 32];
        assert!(argon2.hash_password_into(&[], &[0u8; 8], &mut out).is_ok());
    }

    #[test]
    fn thread_override_is_capped_to_lanes() {
        let params = ParamsBuilder::new().m_cost(32).t_cost(1).p_cost(2).output_len(32).build().unwrap();
        let argon2 = Argon2::new(Variant::Argon2id, Version::V0x13, params).with_threads(16).unwrap();
        assert_eq!(argon2.threads, 2);
    }

    #[test]
    fn rejects_output_buffer_of_the_wrong_length() {
        let params = ParamsBuilder::new().m_cost(32).t_cost(1).p_cost(1).output_len(32).build().unwrap();
        let argon2 = Argon2::new(Variant::Argon2id, Version::V0x13, params);
        let mut too_short = vec![0u8; 16];
        assert_eq!(
            argon2.hash_password_into(b"pwd", b"somesalt", &mut too_short),
            Err(Error::OutputTooShort)
        );
    }

    #[test]
    fn long_output_exercises_h_prime_multi_block_path() {
        let params = ParamsBuilder::new().m_cost(32).t_cost(1).p_cost(1).output_len(112).build().unwrap();
        let argon2 = Argon2::new(Variant::Argon2id, Version::V0x13, params);
        let mut out = vec![0u8; 112];
        assert!(argon2.hash_password_into(b"pwd", b"somesalt", &mut out).is_ok());
    }

    #[test]
    fn with_memory_rejects_undersized_buffer() {
        let params = ParamsBuilder::new().m_cost(32).t_cost(1).p_cost(1).output_len(32).build().unwrap();
        let argon2 = Argon2::new(Variant::Argon2id, Version::V0x13, params);
        let mut out = vec![0u8; 32];
        let undersized = vec![block::Block::zero(); 4];
        assert_eq!(
            argon2.hash_password_into_with_memory(b"pwd", b"somesalt", &mut out, undersized),
            Err(Error::MemoryAllocationError)
        );
    }

    #[test]
    fn and_clear_zeroizes_pwd_and_still_matches_hash_password_into() {
        let params = ParamsBuilder::new().m_cost(32).t_cost(1).p_cost(1).output_len(32).build().unwrap();
        let argon2 = Argon2::new(Variant::Argon2id, Version::V0x13, params);

        let mut pwd = b"correct horse battery staple".to_vec();
        let mut cleared_out = vec![0u8; 32];
        argon2
            .hash_password_into_and_clear(&mut pwd, b"somesalt", &mut cleared_out)
            .unwrap();
        assert!(pwd.iter().all(|&b| b == 0), "pwd must be zeroized after the call returns");

        let mut plain_out = vec![0u8; 32];
        argon2
            .hash_password_into(b"correct horse battery staple", b"somesalt", &mut plain_out)
            .unwrap();
        assert_eq!(cleared_out, plain_out);
    }

    #[test]
    fn from_raw_accepts_valid_type_and_version_bytes() {
        let params = ParamsBuilder::new().m_cost(32).t_cost(1).p_cost(1).output_len(32).build().unwrap();
        let argon2 = Argon2::from_raw(2, 0x13, params).unwrap();
        assert_eq!(argon2.variant(), Variant::Argon2id);
        assert_eq!(argon2.version(), Version::V0x13);
    }

    #[test]
    fn from_raw_rejects_unknown_type() {
        let params = ParamsBuilder::new().m_cost(32).t_cost(1).p_cost(1).output_len(32).build().unwrap();
        assert!(matches!(Argon2::from_raw(9, 0x13, params), Err(Error::IncorrectType)));
    }

    #[test]
    fn from_raw_rejects_unknown_version() {
        let params = ParamsBuilder::new().m_cost(32).t_cost(1).p_cost(1).output_len(32).build().unwrap();
        assert!(matches!(Argon2::from_raw(2, 0x42, params), Err(Error::IncorrectVersion)));
    }
}
