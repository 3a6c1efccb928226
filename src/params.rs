//! Parameter validation and the `Params`/`ParamsBuilder` configuration
//! types.
//!
//! Bounds are taken from the original MTPArgon2 C reference
//! (`mtp_argon2.h`): minimum/maximum lanes, threads, memory, time cost,
//! and buffer lengths. The builder pattern itself follows the shape
//! RustCrypto's `argon2` crate uses for the same job.

use crate::error::Error;

pub const SYNC_POINTS: u32 = 4;

pub const MIN_LANES: u32 = 1;
pub const MAX_LANES: u32 = 0x00FF_FFFF;
pub const MIN_THREADS: u32 = 1;
pub const MAX_THREADS: u32 = 0x00FF_FFFF;

pub const MIN_OUTLEN: u32 = 4;
pub const MAX_OUTLEN: u32 = u32::MAX;

pub const MIN_TIME: u32 = 1;
pub const MAX_TIME: u32 = u32::MAX;

pub const MIN_SALT_LEN: u32 = 8;
pub const MAX_SALT_LEN: u32 = u32::MAX;

pub const MIN_PWD_LEN: u32 = 0;
pub const MAX_PWD_LEN: u32 = u32::MAX;

pub const MIN_SECRET_LEN: u32 = 0;
pub const MAX_SECRET_LEN: u32 = u32::MAX;

pub const MIN_AD_LEN: u32 = 0;
pub const MAX_AD_LEN: u32 = u32::MAX;

/// Upper bound on `m_cost`, derived from the address space the way the C
/// reference derives `ARGON2_MAX_MEMORY_BITS` from `sizeof(void*)`.
fn max_memory_kib() -> u32 {
    let max_bits = (usize::BITS as u32 - 10 - 1).min(32);
    (1u64 << max_bits).min(u32::MAX as u64) as u32
}

/// Default RFC 9106 recommended parameters: 19 MiB memory, 2 passes, 1
/// lane.
const DEFAULT_M_COST: u32 = 19 * 1024;
const DEFAULT_T_COST: u32 = 2;
const DEFAULT_P_COST: u32 = 1;
const DEFAULT_OUTLEN: u32 = 32;

/// Validated hashing parameters. Construct via [`ParamsBuilder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
    output_len: u32,
    ad: Vec<u8>,
}

impl Params {
    pub fn m_cost(&self) -> u32 {
        self.m_cost
    }

    pub fn t_cost(&self) -> u32 {
        self.t_cost
    }

    pub fn p_cost(&self) -> u32 {
        self.p_cost
    }

    pub fn output_len(&self) -> usize {
        self.output_len as usize
    }

    pub fn ad(&self) -> &[u8] {
        &self.ad
    }

    /// Number of 1 KiB blocks actually allocated: `m_cost` rounded down to
    /// a multiple of `4 * p_cost`, floored at `8 * p_cost`.
    pub fn memory_blocks(&self) -> u32 {
        let p = self.p_cost;
        let blocks = (self.m_cost / (SYNC_POINTS * p)) * SYNC_POINTS * p;
        blocks.max(2 * SYNC_POINTS * p)
    }

    pub fn lane_length(&self) -> u32 {
        self.memory_blocks() / self.p_cost
    }

    pub fn segment_length(&self) -> u32 {
        self.lane_length() / SYNC_POINTS
    }
}

impl Default for Params {
    fn default() -> Self {
        ParamsBuilder::new().build().expect("default params are valid")
    }
}

/// Fallible builder for [`Params`]. Setters are infallible; validation is
/// deferred to [`ParamsBuilder::build`].
#[derive(Clone, Debug)]
pub struct ParamsBuilder {
    m_cost: u32,
    t_cost: u32,
    p_cost: u32,
    output_len: u32,
    ad: Vec<u8>,
}

impl ParamsBuilder {
    pub fn new() -> Self {
        ParamsBuilder {
            m_cost: DEFAULT_M_COST,
            t_cost: DEFAULT_T_COST,
            p_cost: DEFAULT_P_COST,
            output_len: DEFAULT_OUTLEN,
            ad: Vec::new(),
        }
    }

    pub fn m_cost(mut self, m_cost: u32) -> Self {
        self.m_cost = m_cost;
        self
    }

    pub fn t_cost(mut self, t_cost: u32) -> Self {
        self.t_cost = t_cost;
        self
    }

    pub fn p_cost(mut self, p_cost: u32) -> Self {
        self.p_cost = p_cost;
        self
    }

    pub fn output_len(mut self, output_len: u32) -> Self {
        self.output_len = output_len;
        self
    }

    pub fn ad(mut self, ad: impl Into<Vec<u8>>) -> Self {
        self.ad = ad.into();
        self
    }

    pub fn build(self) -> Result<Params, Error> {
        if self.output_len < MIN_OUTLEN {
            return Err(Error::OutputTooShort);
        }
        if self.output_len > MAX_OUTLEN {
            return Err(Error::OutputTooLong);
        }
        if self.t_cost < MIN_TIME {
            return Err(Error::TimeTooSmall);
        }
        if self.t_cost > MAX_TIME {
            return Err(Error::TimeTooLarge);
        }
        if self.p_cost < MIN_LANES {
            return Err(Error::LanesTooFew);
        }
        if self.p_cost > MAX_LANES {
            return Err(Error::LanesTooMany);
        }
        if self.m_cost < 8 * self.p_cost {
            return Err(Error::MemoryTooLittle);
        }
        if self.m_cost > max_memory_kib() {
            return Err(Error::MemoryTooMuch);
        }
        if self.ad.len() as u64 > MAX_AD_LEN as u64 {
            return Err(Error::AdTooLong);
        }

        Ok(Params {
            m_cost: self.m_cost,
            t_cost: self.t_cost,
            p_cost: self.p_cost,
            output_len: self.output_len,
            ad: self.ad,
        })
    }
}

impl Default for ParamsBuilder {
    fn default() -> Self {
        ParamsBuilder::new()
    }
}

/// Validates `threads`, capping silently to `p_cost` per the reference
/// semantics, and rejecting anything outside the C reference's bounds.
pub fn validate_threads(threads: u32, p_cost: u32) -> Result<u32, Error> {
    if threads < MIN_THREADS {
        return Err(Error::ThreadsTooFew);
    }
    if threads > MAX_THREADS {
        return Err(Error::ThreadsTooMany);
    }
    Ok(threads.min(p_cost))
}

pub fn validate_salt(salt: &[u8]) -> Result<(), Error> {
    if (salt.len() as u64) < MIN_SALT_LEN as u64 {
        return Err(Error::SaltTooShort);
    }
    if salt.len() as u64 > MAX_SALT_LEN as u64 {
        return Err(Error::SaltTooLong);
    }
    Ok(())
}

pub fn validate_pwd(pwd: &[u8]) -> Result<(), Error> {
    if pwd.len() as u64 > MAX_PWD_LEN as u64 {
        return Err(Error::PwdTooLong);
    }
    Ok(())
}

pub fn validate_secret(secret: &[u8]) -> Result<(), Error> {
    if secret.len() as u64 > MAX_SECRET_LEN as u64 {
        return Err(Error::SecretTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_boundary() {
        assert!(validate_salt(&[0u8; 8]).is_ok());
        assert!(validate_salt(&[0u8; 7]).is_err());
    }

    #[test]
    fn outlen_boundary() {
        assert!(ParamsBuilder::new().output_len(4).build().is_ok());
        assert!(ParamsBuilder::new().output_len(3).build().is_err());
    }

    #[test]
    fn m_cost_boundary() {
        let lanes = 4;
        assert!(ParamsBuilder::new()
            .p_cost(lanes)
            .m_cost(8 * lanes)
            .build()
            .is_ok());
        assert!(ParamsBuilder::new()
            .p_cost(lanes)
            .m_cost(8 * lanes - 1)
            .build()
            .is_err());
    }

    #[test]
    fn m_cost_rounds_down_to_multiple_of_four_lanes() {
        let lanes = 4;
        let params = ParamsBuilder::new()
            .p_cost(lanes)
            .m_cost(8 * lanes + 1)
            .build()
            .unwrap();
        assert_eq!(params.memory_blocks(), 8 * lanes);
    }

    #[test]
    fn threads_are_capped_to_lanes() {
        assert_eq!(validate_threads(8, 4).unwrap(), 4);
        assert_eq!(validate_threads(2, 4).unwrap(), 2);
    }
}
